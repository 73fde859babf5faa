use std::sync::Arc;

use crate::foundation::{
    error::{SpriteError, SpriteResult},
    math::premultiply_rgba8_in_place,
};

/// Which of the two body layers an asset belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Upper,
    Lower,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }
}

/// Decoded layer raster, premultiplied and ready to be used as an image paint.
///
/// Cloning is cheap and the pixels are never mutated, so one decode can back a live preview
/// and an export at the same time.
#[derive(Clone)]
pub struct LayerImage {
    width: u32,
    height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for LayerImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl LayerImage {
    /// Build from straight (non-premultiplied) RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> SpriteResult<Self> {
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(SpriteError::decode("layer byte length mismatch"));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        let pixmap = premul_bytes_to_pixmap(&rgba8, width, height)?;
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(pixmap),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// The two layers of one figure.
#[derive(Clone, Debug)]
pub struct LayerPair {
    pub upper: LayerImage,
    pub lower: LayerImage,
}

/// Decode encoded image bytes (PNG or anything `image` understands) into a layer.
pub fn decode_layer(bytes: &[u8]) -> SpriteResult<LayerImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SpriteError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    LayerImage::from_rgba8(width, height, rgba.into_raw())
}

/// Decode both layers concurrently; the pair only exists if both succeed.
#[tracing::instrument(skip_all, fields(upper_len = upper.len(), lower_len = lower.len()))]
pub fn decode_pair(upper: &[u8], lower: &[u8]) -> SpriteResult<LayerPair> {
    let (upper, lower) = rayon::join(|| decode_layer(upper), || decode_layer(lower));
    let upper = upper.map_err(|e| tag_layer(e, LayerKind::Upper))?;
    let lower = lower.map_err(|e| tag_layer(e, LayerKind::Lower))?;
    Ok(LayerPair { upper, lower })
}

fn tag_layer(err: SpriteError, kind: LayerKind) -> SpriteError {
    match err {
        SpriteError::Decode(msg) => SpriteError::decode(format!("{} layer: {msg}", kind.as_str())),
        other => other,
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SpriteResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SpriteError::decode("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SpriteError::decode("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(SpriteError::decode("image has zero area"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
