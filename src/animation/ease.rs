/// Quadratic ease-in-out over `[0, 1]`; input outside that range is clamped.
///
/// The pose function runs both its phase and its squash factor through this curve, which is
/// what gives the loop its settle at either extreme.
pub fn in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
