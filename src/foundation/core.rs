use crate::foundation::error::{SpriteError, SpriteResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Smallest accepted square side length in pixels.
pub const MIN_RESOLUTION: u32 = 100;
/// Largest accepted square side length in pixels.
pub const MAX_RESOLUTION: u32 = 1200;
/// Granularity the UI offers for resolution input.
pub const RESOLUTION_STEP: u32 = 100;

/// Slowest accepted playback multiplier.
pub const MIN_SPEED: f64 = 0.1;
/// Fastest accepted playback multiplier.
pub const MAX_SPEED: f64 = 5.0;

/// Side length of the square output raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Resolution(u32);

impl Resolution {
    pub fn new(px: u32) -> SpriteResult<Self> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&px) {
            return Err(SpriteError::validation(format!(
                "resolution {px} is outside {MIN_RESOLUTION}..={MAX_RESOLUTION}"
            )));
        }
        Ok(Self(px))
    }

    /// Snap arbitrary input onto the accepted grid (nearest step, then clamped).
    pub fn clamped(px: u32) -> Self {
        let snapped = (px + RESOLUTION_STEP / 2) / RESOLUTION_STEP * RESOLUTION_STEP;
        Self(snapped.clamp(MIN_RESOLUTION, MAX_RESOLUTION))
    }

    pub fn px(self) -> u32 {
        self.0
    }
}

/// Playback-rate multiplier; `1.0` is the native loop speed.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize)]
pub struct Speed(f64);

impl Speed {
    pub fn new(v: f64) -> SpriteResult<Self> {
        if !v.is_finite() || v <= 0.0 {
            return Err(SpriteError::validation(format!(
                "speed must be a positive number, got {v}"
            )));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&v) {
            return Err(SpriteError::validation(format!(
                "speed {v} is outside {MIN_SPEED}..={MAX_SPEED}"
            )));
        }
        Ok(Self(v))
    }

    pub fn clamped(v: f64) -> Self {
        if v.is_nan() {
            return Self(1.0);
        }
        Self(v.clamp(MIN_SPEED, MAX_SPEED))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> SpriteResult<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(SpriteError::validation(format!("invalid hex colour '{s}'")));
        }

        let channel = |i: usize, len: usize| -> SpriteResult<u8> {
            let digits = &hex[i..i + len];
            let v = u8::from_str_radix(digits, 16)
                .map_err(|_| SpriteError::validation(format!("invalid hex colour '{s}'")))?;
            Ok(if len == 1 { v * 17 } else { v })
        };

        match hex.len() {
            3 => Ok(Self::opaque(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Self::opaque(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            8 => Ok(Self {
                r: channel(0, 2)?,
                g: channel(2, 2)?,
                b: channel(4, 2)?,
                a: channel(6, 2)?,
            }),
            _ => Err(SpriteError::validation(format!("invalid hex colour '{s}'"))),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiplied form, as stored in render surfaces.
    pub fn premultiplied(self) -> [u8; 4] {
        use crate::foundation::math::mul_div255_u8;
        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl<'de> serde::Deserialize<'de> for Resolution {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let px = u32::deserialize(deserializer)?;
        Self::new(px).map_err(serde::de::Error::custom)
    }
}

impl<'de> serde::Deserialize<'de> for Speed {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        Self::new(v).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
