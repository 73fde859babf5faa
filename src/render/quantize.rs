use crate::foundation::error::{SpriteError, SpriteResult};

/// Posterizes RGB channels onto a coarse grid before palette encoding.
///
/// Each channel becomes `round(c / step) * step`, saturated at 255; alpha is left alone. The
/// transform is idempotent and per-pixel, so it can be applied in any order or more than once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorQuantizer {
    step: u8,
}

impl ColorQuantizer {
    pub const DEFAULT_STEP: u8 = 8;

    pub fn new(step: u8) -> SpriteResult<Self> {
        if step == 0 {
            return Err(SpriteError::validation("quantize step must be non-zero"));
        }
        Ok(Self { step })
    }

    pub fn step(self) -> u8 {
        self.step
    }

    #[inline]
    pub fn quantize_channel(self, c: u8) -> u8 {
        let step = u16::from(self.step);
        let q = (u16::from(c) + step / 2) / step * step;
        q.min(255) as u8
    }

    /// Quantize an RGBA8 buffer in place. A trailing partial pixel is left untouched.
    pub fn apply(self, rgba: &mut [u8]) {
        if self.step == 1 {
            return;
        }
        for px in rgba.chunks_exact_mut(4) {
            px[0] = self.quantize_channel(px[0]);
            px[1] = self.quantize_channel(px[1]);
            px[2] = self.quantize_channel(px[2]);
        }
    }
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
        }
    }
}

impl TryFrom<u8> for ColorQuantizer {
    type Error = SpriteError;

    fn try_from(step: u8) -> Result<Self, Self::Error> {
        Self::new(step)
    }
}

impl From<ColorQuantizer> for u8 {
    fn from(q: ColorQuantizer) -> Self {
        q.step
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/quantize.rs"]
mod tests;
