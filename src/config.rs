//! Deployment constants for sampling, timing, quantization and asset sources.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    animation::pose::PoseParams,
    assets::{
        catalog::{OFFLINE_ID_MAX, OFFLINE_ID_MIN},
        source::TierConfig,
    },
    encode::{gif::DEFAULT_GIF_SPEED, naming::DEFAULT_SUBJECT},
    foundation::error::{SpriteError, SpriteResult},
    render::quantize::ColorQuantizer,
};

/// Phase samples per loop, shared by export and the live preview.
pub const EXPORT_PHASE_STEPS: u32 = 48;
/// Frames an export aims for.
pub const TARGET_FRAME_COUNT: u32 = 24;
/// Display time of one phase step at speed 1.0 (30 steps per second).
pub const BASE_FRAME_DELAY_MS: f64 = 1000.0 / 30.0;
/// Smallest per-frame delay an export may carry.
pub const MIN_DELAY_MS: u32 = 20;

/// Engine-wide settings. Every field has a default, so a config file only lists overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub total_phase_steps: u32,
    pub target_frame_count: u32,
    pub base_frame_delay_ms: f64,
    pub min_delay_ms: u32,
    pub quantizer: ColorQuantizer,
    pub pose: PoseParams,
    /// NeuQuant sampling factor for GIF palettes, `1..=30`.
    pub gif_speed: i32,
    pub loop_forever: bool,
    /// Prefix of exported file names.
    pub subject: String,
    /// Layer source tiers, primary first.
    pub tiers: Vec<TierConfig>,
    /// Catalog files tried in order; none loading means offline range resolution.
    pub catalogs: Vec<PathBuf>,
    pub offline_id_min: u32,
    pub offline_id_max: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_phase_steps: EXPORT_PHASE_STEPS,
            target_frame_count: TARGET_FRAME_COUNT,
            base_frame_delay_ms: BASE_FRAME_DELAY_MS,
            min_delay_ms: MIN_DELAY_MS,
            quantizer: ColorQuantizer::default(),
            pose: PoseParams::default(),
            gif_speed: DEFAULT_GIF_SPEED,
            loop_forever: true,
            subject: DEFAULT_SUBJECT.to_string(),
            tiers: vec![
                TierConfig::standard("primary", "assets/primary"),
                TierConfig::standard("fallback", "assets/fallback"),
            ],
            catalogs: vec![PathBuf::from("assets/metadata.json")],
            offline_id_min: OFFLINE_ID_MIN,
            offline_id_max: OFFLINE_ID_MAX,
        }
    }
}

impl EngineConfig {
    pub fn from_json_slice(bytes: &[u8]) -> SpriteResult<Self> {
        let cfg: Self = serde_json::from_slice(bytes).context("parse engine config json")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> SpriteResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    pub fn validate(&self) -> SpriteResult<()> {
        if self.total_phase_steps == 0 {
            return Err(SpriteError::validation("total_phase_steps must be > 0"));
        }
        if self.target_frame_count == 0 {
            return Err(SpriteError::validation("target_frame_count must be > 0"));
        }
        if !self.base_frame_delay_ms.is_finite() || self.base_frame_delay_ms <= 0.0 {
            return Err(SpriteError::validation(
                "base_frame_delay_ms must be finite and > 0",
            ));
        }
        if !(1..=30).contains(&self.gif_speed) {
            return Err(SpriteError::validation("gif_speed must be within 1..=30"));
        }
        if self.subject.trim().is_empty() {
            return Err(SpriteError::validation("subject must be non-empty"));
        }
        if self.offline_id_min > self.offline_id_max {
            return Err(SpriteError::validation(
                "offline_id_min must not exceed offline_id_max",
            ));
        }
        let p = &self.pose;
        for (name, v) in [
            ("pose.rotation_range", p.rotation_range),
            ("pose.press_down_strength", p.press_down_strength),
            ("pose.insertion_strength", p.insertion_strength),
            ("pose.insertion_angle", p.insertion_angle),
            ("pose.squash_strength", p.squash_strength),
        ] {
            if !v.is_finite() {
                return Err(SpriteError::validation(format!("{name} must be finite")));
            }
        }
        for tier in &self.tiers {
            tier.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
