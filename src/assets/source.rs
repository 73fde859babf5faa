//! Tiered retrieval of layer assets.
//!
//! Each tier maps `(mode, layer, id)` to bytes through path templates. Tiers are tried in order
//! and a pair only counts as found when *both* layers come from the same tier.

use std::path::{Path, PathBuf};

use crate::{
    assets::decode::{LayerKind, LayerPair, decode_pair},
    foundation::error::{SpriteError, SpriteResult},
};

/// Placeholder substituted with the numeric identifier in every template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Asset variant to animate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    #[default]
    Normal,
    Santa,
}

impl AnimationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Santa => "santa",
        }
    }
}

impl std::fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnimationMode {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "santa" => Ok(Self::Santa),
            other => Err(SpriteError::validation(format!(
                "unknown animation mode '{other}' (expected 'normal' or 'santa')"
            ))),
        }
    }
}

/// Upper/lower path templates for one mode.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerTemplates {
    pub upper: String,
    pub lower: String,
}

impl LayerTemplates {
    fn get(&self, kind: LayerKind) -> &str {
        match kind {
            LayerKind::Upper => &self.upper,
            LayerKind::Lower => &self.lower,
        }
    }
}

/// Configuration for one source tier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TierConfig {
    /// Human-readable tier name used in logs and status messages.
    pub name: String,
    /// Directory the templates are resolved against.
    pub root: PathBuf,
    pub normal: LayerTemplates,
    pub santa: LayerTemplates,
}

impl TierConfig {
    /// Tier rooted at `root` using the standard directory layout.
    pub fn standard(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            normal: LayerTemplates {
                upper: "upperbody/{id}.png".to_string(),
                lower: "lowerbody/{id}.png".to_string(),
            },
            santa: LayerTemplates {
                upper: "santaupperbody/{id}.png".to_string(),
                lower: "santalowerbody/{id}.png".to_string(),
            },
        }
    }

    pub fn validate(&self) -> SpriteResult<()> {
        for t in [
            &self.normal.upper,
            &self.normal.lower,
            &self.santa.upper,
            &self.santa.lower,
        ] {
            if !t.contains(ID_PLACEHOLDER) {
                return Err(SpriteError::validation(format!(
                    "tier '{}': template '{t}' has no {ID_PLACEHOLDER} placeholder",
                    self.name
                )));
            }
        }
        Ok(())
    }

    fn templates(&self, mode: AnimationMode) -> &LayerTemplates {
        match mode {
            AnimationMode::Normal => &self.normal,
            AnimationMode::Santa => &self.santa,
        }
    }
}

/// One tier of layer assets.
pub trait LayerSource: Send + Sync {
    fn name(&self) -> &str;

    /// Bytes for one layer, `Ok(None)` when this tier does not have it.
    fn fetch(&self, mode: AnimationMode, kind: LayerKind, id: u32)
    -> SpriteResult<Option<Vec<u8>>>;
}

/// Filesystem tier driven by [`TierConfig`] templates.
#[derive(Clone, Debug)]
pub struct TemplateSource {
    cfg: TierConfig,
}

impl TemplateSource {
    pub fn new(cfg: TierConfig) -> SpriteResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn path_for(&self, mode: AnimationMode, kind: LayerKind, id: u32) -> PathBuf {
        let rel = self
            .cfg
            .templates(mode)
            .get(kind)
            .replace(ID_PLACEHOLDER, &id.to_string());
        self.cfg.root.join(Path::new(&rel))
    }
}

impl LayerSource for TemplateSource {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn fetch(
        &self,
        mode: AnimationMode,
        kind: LayerKind,
        id: u32,
    ) -> SpriteResult<Option<Vec<u8>>> {
        let path = self.path_for(mode, kind, id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SpriteError::Other(anyhow::Error::new(e).context(format!(
                "failed to read layer asset '{}'",
                path.display()
            )))),
        }
    }
}

/// Encoded bytes for both layers, all from one tier.
#[derive(Clone, Debug)]
pub struct FetchedPair {
    pub tier: String,
    pub upper: Vec<u8>,
    pub lower: Vec<u8>,
}

impl FetchedPair {
    /// Decode both layers (joined).
    pub fn decode(&self) -> SpriteResult<LayerPair> {
        decode_pair(&self.upper, &self.lower)
    }
}

/// Ordered list of tiers: primary first, then fallbacks.
#[derive(Default)]
pub struct TieredSources {
    tiers: Vec<Box<dyn LayerSource>>,
}

impl std::fmt::Debug for TieredSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tiers.iter().map(|t| t.name()))
            .finish()
    }
}

impl TieredSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[TierConfig]) -> SpriteResult<Self> {
        let mut out = Self::new();
        for cfg in configs {
            out.push(TemplateSource::new(cfg.clone())?);
        }
        Ok(out)
    }

    pub fn push(&mut self, source: impl LayerSource + 'static) {
        self.tiers.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// First tier that has both layers for `(mode, id)`.
    ///
    /// A tier that fails to read is skipped like a tier that lacks the files; the error is
    /// logged, not returned.
    #[tracing::instrument(skip(self))]
    pub fn fetch_pair(&self, mode: AnimationMode, id: u32) -> SpriteResult<FetchedPair> {
        if self.tiers.is_empty() {
            return Err(SpriteError::validation("no layer sources configured"));
        }

        for tier in &self.tiers {
            let upper = fetch_or_skip(tier.as_ref(), mode, LayerKind::Upper, id);
            let lower = fetch_or_skip(tier.as_ref(), mode, LayerKind::Lower, id);
            match (upper, lower) {
                (Some(upper), Some(lower)) => {
                    tracing::debug!(tier = tier.name(), "resolved layer pair");
                    return Ok(FetchedPair {
                        tier: tier.name().to_string(),
                        upper,
                        lower,
                    });
                }
                (upper, lower) => {
                    tracing::debug!(
                        tier = tier.name(),
                        has_upper = upper.is_some(),
                        has_lower = lower.is_some(),
                        "tier incomplete, trying next"
                    );
                }
            }
        }

        Err(SpriteError::not_found(format!(
            "no source has both {mode} layers for id {id}"
        )))
    }

    /// Fetch and decode in one step.
    pub fn load_pair(&self, mode: AnimationMode, id: u32) -> SpriteResult<(String, LayerPair)> {
        let fetched = self.fetch_pair(mode, id)?;
        let pair = fetched.decode()?;
        Ok((fetched.tier, pair))
    }
}

fn fetch_or_skip(
    tier: &dyn LayerSource,
    mode: AnimationMode,
    kind: LayerKind,
    id: u32,
) -> Option<Vec<u8>> {
    match tier.fetch(mode, kind, id) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(tier = tier.name(), layer = kind.as_str(), error = %e, "layer fetch failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
