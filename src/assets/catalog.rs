//! Metadata catalog: identifier resolution and body-colour backgrounds.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::foundation::{
    core::Rgba8,
    error::{SpriteError, SpriteResult},
};

/// Identifier range accepted when no catalog could be loaded.
pub const OFFLINE_ID_MIN: u32 = 1;
pub const OFFLINE_ID_MAX: u32 = 10_000;

/// Background colour per lower-cased `Body` attribute.
const BODY_COLORS: &[(&str, Rgba8)] = &[
    ("albino", Rgba8::opaque(0xbd, 0xad, 0xad)),
    ("alien", Rgba8::opaque(0x04, 0xcf, 0xe7)),
    ("beak", Rgba8::opaque(0xf8, 0xac, 0x00)),
    ("binary", Rgba8::opaque(0x01, 0x01, 0x01)),
    ("boned", Rgba8::opaque(0x00, 0x00, 0x00)),
    ("bot", Rgba8::opaque(0x48, 0x48, 0x48)),
    ("brown", Rgba8::opaque(0x31, 0x00, 0x00)),
    ("dark", Rgba8::opaque(0x48, 0x25, 0x10)),
    ("deathbot", Rgba8::opaque(0x28, 0x28, 0x31)),
    ("dos", Rgba8::opaque(0x00, 0x02, 0xa5)),
    ("gold", Rgba8::opaque(0xff, 0xaa, 0x01)),
    ("green", Rgba8::opaque(0x00, 0x22, 0x05)),
    ("grey", Rgba8::opaque(0x23, 0x2a, 0x30)),
    ("hyena", Rgba8::opaque(0xba, 0x88, 0x37)),
    ("ion", Rgba8::opaque(0x06, 0x0f, 0x26)),
    ("light", Rgba8::opaque(0xb7, 0x84, 0x4f)),
    ("medium", Rgba8::opaque(0x94, 0x53, 0x21)),
    ("mempool", Rgba8::opaque(0xbe, 0x0b, 0x3a)),
    ("moon", Rgba8::opaque(0x35, 0x01, 0xbb)),
    ("patriot", Rgba8::opaque(0x0d, 0x00, 0x60)),
    ("pepe", Rgba8::opaque(0x12, 0x76, 0x02)),
    ("pink", Rgba8::opaque(0xe8, 0x44, 0xce)),
    ("purple", Rgba8::opaque(0x38, 0x03, 0x4a)),
    ("rainbow", Rgba8::opaque(0x00, 0x9d, 0xff)),
    ("red", Rgba8::opaque(0x63, 0x00, 0x01)),
    ("safemode", Rgba8::opaque(0x00, 0x0d, 0xff)),
    ("striped", Rgba8::opaque(0x11, 0x06, 0x54)),
    ("underlord", Rgba8::opaque(0x9c, 0x09, 0x01)),
    ("vhs", Rgba8::opaque(0x06, 0x00, 0xff)),
    ("white", Rgba8::opaque(0xc7, 0xbc, 0xb6)),
    ("wrapped", Rgba8::opaque(0xff, 0xff, 0xff)),
    ("zombie", Rgba8::opaque(0x10, 0x41, 0x19)),
];

/// Palette colour for a body type, matched case-insensitively.
pub fn body_color(body: &str) -> Option<Rgba8> {
    let key = body.trim().to_ascii_lowercase();
    BODY_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, c)| *c)
}

/// Trait values attached to a catalog record. `Body` drives the auto background.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogAttributes {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogRecord {
    pub id: u32,
    pub inscription: u64,
    pub attributes: CatalogAttributes,
}

/// How identifiers are validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogPolicy {
    /// Ids must exist in the catalog; inscription numbers are mapped to ids.
    Strict,
    /// No catalog available: any id in `min..=max` is accepted.
    OfflineRange { min: u32, max: u32 },
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self::OfflineRange {
            min: OFFLINE_ID_MIN,
            max: OFFLINE_ID_MAX,
        }
    }
}

/// How an input string turned into an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedVia {
    Id,
    Inscription,
    OfflineRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: u32,
    pub via: ResolvedVia,
}

/// Loaded metadata plus the resolution policy that goes with it.
#[derive(Clone, Debug)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
    by_id: HashMap<u32, usize>,
    by_inscription: HashMap<u64, usize>,
    policy: CatalogPolicy,
    /// Plain id range; also tells ids from inscription numbers in not-found errors.
    id_min: u32,
    id_max: u32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            by_id: HashMap::new(),
            by_inscription: HashMap::new(),
            policy: CatalogPolicy::default(),
            id_min: OFFLINE_ID_MIN,
            id_max: OFFLINE_ID_MAX,
        }
    }
}

impl Catalog {
    /// Empty catalog resolving ids by range only.
    pub fn offline(min: u32, max: u32) -> SpriteResult<Self> {
        Self::default().with_offline_range(min, max)
    }

    /// Index `records`. An empty list resolves by the offline range instead of rejecting
    /// every id.
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_inscription = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            // First record wins on duplicates.
            by_id.entry(r.id).or_insert(i);
            by_inscription.entry(r.inscription).or_insert(i);
        }
        let policy = if records.is_empty() {
            CatalogPolicy::default()
        } else {
            CatalogPolicy::Strict
        };
        Self {
            records,
            by_id,
            by_inscription,
            policy,
            ..Self::default()
        }
    }

    /// Replace the plain id range, `OFFLINE_ID_MIN..=OFFLINE_ID_MAX` unless set here.
    pub fn with_offline_range(mut self, min: u32, max: u32) -> SpriteResult<Self> {
        if min > max {
            return Err(SpriteError::validation(format!(
                "offline id range {min}..={max} is empty"
            )));
        }
        self.id_min = min;
        self.id_max = max;
        if let CatalogPolicy::OfflineRange { .. } = self.policy {
            self.policy = CatalogPolicy::OfflineRange { min, max };
        }
        Ok(self)
    }

    pub fn from_json_slice(bytes: &[u8]) -> SpriteResult<Self> {
        let records: Vec<CatalogRecord> =
            serde_json::from_slice(bytes).context("parse catalog json")?;
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: &Path) -> SpriteResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    /// Load the first catalog that reads and parses; fall back to the offline range policy.
    #[tracing::instrument(skip(paths), fields(candidates = paths.len()))]
    pub fn load_first(paths: &[PathBuf], offline_min: u32, offline_max: u32) -> SpriteResult<Self> {
        let offline = Self::offline(offline_min, offline_max)?;
        for path in paths {
            match Self::from_path(path) {
                Ok(catalog) => {
                    tracing::info!(path = %path.display(), records = catalog.len(), "catalog loaded");
                    if catalog.is_empty() {
                        tracing::info!("catalog is empty, accepting ids by range");
                    }
                    return catalog.with_offline_range(offline_min, offline_max);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "catalog unavailable");
                }
            }
        }
        tracing::info!(
            min = offline_min,
            max = offline_max,
            "no catalog loaded, accepting ids by range"
        );
        Ok(offline)
    }

    pub fn policy(&self) -> CatalogPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: u32) -> Option<&CatalogRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    /// Map user input (an id or an inscription number) to an id.
    pub fn resolve_id(&self, input: &str) -> SpriteResult<ResolvedId> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SpriteError::validation("enter an id or inscription number"));
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SpriteError::validation(format!(
                "'{input}' is not a plain number"
            )));
        }
        let value: u64 = input
            .parse()
            .map_err(|_| SpriteError::not_found(format!("{input} is out of range")))?;

        match self.policy {
            CatalogPolicy::Strict => {
                if let Ok(id) = u32::try_from(value)
                    && self.by_id.contains_key(&id)
                {
                    return Ok(ResolvedId {
                        id,
                        via: ResolvedVia::Id,
                    });
                }
                if let Some(&i) = self.by_inscription.get(&value) {
                    let id = self.records[i].id;
                    tracing::debug!(inscription = value, id, "resolved inscription number");
                    return Ok(ResolvedId {
                        id,
                        via: ResolvedVia::Inscription,
                    });
                }
                if (u64::from(self.id_min)..=u64::from(self.id_max)).contains(&value) {
                    Err(SpriteError::not_found(format!("id {value} is not in the catalog")))
                } else {
                    Err(SpriteError::not_found(format!(
                        "inscription {value} has no matching record"
                    )))
                }
            }
            CatalogPolicy::OfflineRange { min, max } => match u32::try_from(value) {
                Ok(id) if (min..=max).contains(&id) => Ok(ResolvedId {
                    id,
                    via: ResolvedVia::OfflineRange,
                }),
                _ => Err(SpriteError::not_found(format!(
                    "id {value} is outside {min}..={max}"
                ))),
            },
        }
    }

    /// Palette colour for the record's body type, if both are known.
    pub fn auto_background(&self, id: u32) -> Option<Rgba8> {
        self.record(id).and_then(|r| body_color(&r.attributes.body))
    }
}

/// Background policy for rendered frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundChoice {
    /// Plain white.
    #[default]
    None,
    /// Palette colour derived from the catalog's body type.
    Auto,
    Custom(Rgba8),
}

impl BackgroundChoice {
    pub fn resolve(self, catalog: &Catalog, id: u32) -> SpriteResult<Rgba8> {
        match self {
            Self::None => Ok(Rgba8::WHITE),
            Self::Auto => catalog.auto_background(id).ok_or_else(|| {
                SpriteError::not_found(format!("no automatic background known for id {id}"))
            }),
            Self::Custom(c) => Ok(c),
        }
    }
}

impl std::str::FromStr for BackgroundChoice {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "auto" => Ok(Self::Auto),
            _ => Rgba8::from_hex(s).map(Self::Custom),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
