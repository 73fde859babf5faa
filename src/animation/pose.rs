//! Phase → pose mapping for the two-layer loop.
//!
//! One scalar phase drives both layers: a sine over the loop, shaped by a quadratic ease-in-out, produces
//! the upper layer's rotation and the shared press-down amount that offsets, tilts and squashes
//! the figure. The mapping is stateless and recomputed for every sample.

use std::f64::consts::TAU;

use crate::{animation::ease::in_out_quad, foundation::math::lerp};

/// Tuning constants for [`pose_at`]. Fixed per deployment, never exposed as user controls.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PoseParams {
    /// Peak rotation of the raising upper layer, in radians (applied as `±range`).
    pub rotation_range: f64,
    /// Vertical travel of both layers at full press, in pixels.
    pub press_down_strength: f64,
    /// Extra vertical travel of the upper layer while inserting, in pixels.
    pub insertion_strength: f64,
    /// Rotation of the upper layer at full insertion, in radians.
    pub insertion_angle: f64,
    /// Fraction of height the lower layer loses at full press (before easing).
    pub squash_strength: f64,
}

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            rotation_range: 0.045,
            press_down_strength: 50.0,
            insertion_strength: 30.0,
            insertion_angle: 0.045,
            squash_strength: 0.12,
        }
    }
}

/// Transform parameters for one sampled phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseDescriptor {
    /// Upper-layer rotation while raising (radians, negative means raising).
    pub rotation: f64,
    /// Whether the upper layer pivots about the raise point rather than the insertion point.
    pub is_raising_layer: bool,
    /// Shared downward offset for both layers, in pixels.
    pub vertical_offset: f64,
    /// Additional downward offset for the inserting upper layer, in pixels.
    pub insertion_offset: f64,
    /// Upper-layer rotation while inserting (radians).
    pub insertion_rotation: f64,
    /// Eased squash factor for the lower layer, `0` means undeformed.
    pub compression: f64,
}

impl PoseDescriptor {
    /// Largest absolute component-wise difference, used for loop-seam checks.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        [
            self.rotation - other.rotation,
            self.vertical_offset - other.vertical_offset,
            self.insertion_offset - other.insertion_offset,
            self.insertion_rotation - other.insertion_rotation,
            self.compression - other.compression,
        ]
        .into_iter()
        .map(f64::abs)
        .fold(0.0, f64::max)
    }
}

/// Evaluate the pose for `phase` (expected in `[0, 1)`; values outside wrap naturally).
pub fn pose_at(phase: f64, params: &PoseParams) -> PoseDescriptor {
    let base = ((phase * TAU).sin() + 1.0) / 2.0;
    let eased = in_out_quad(base);

    let rotation = lerp(-params.rotation_range, params.rotation_range, eased);
    let press = lerp(0.0, 1.0, eased);

    PoseDescriptor {
        rotation,
        is_raising_layer: rotation < 0.0,
        vertical_offset: press * params.press_down_strength,
        insertion_offset: press * params.insertion_strength,
        insertion_rotation: press * params.insertion_angle,
        compression: in_out_quad(press * params.squash_strength),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/pose.rs"]
mod tests;
