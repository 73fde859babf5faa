use super::*;

#[test]
fn endpoints_are_stable() {
    assert_eq!(in_out_quad(0.0), 0.0);
    assert_eq!(in_out_quad(1.0), 1.0);
}

#[test]
fn matches_reference_points() {
    assert!((in_out_quad(0.25) - 0.125).abs() < 1e-12);
    assert!((in_out_quad(0.5) - 0.5).abs() < 1e-12);
    assert!((in_out_quad(0.75) - 0.875).abs() < 1e-12);
    // Symmetric about the midpoint.
    for t in [0.1, 0.2, 0.3, 0.4] {
        assert!((in_out_quad(t) + in_out_quad(1.0 - t) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn monotonic_spot_check() {
    let samples: Vec<f64> = (0..=20).map(|i| in_out_quad(f64::from(i) / 20.0)).collect();
    assert!(samples.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn out_of_range_input_is_clamped() {
    assert_eq!(in_out_quad(-3.0), 0.0);
    assert_eq!(in_out_quad(7.0), 1.0);
}
