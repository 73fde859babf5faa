use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use image::codecs::gif::{GifEncoder, Repeat};

use crate::{
    encode::session::{EncodingSession, SessionOptions, SessionState},
    foundation::{
        error::{SpriteError, SpriteResult},
        math::mul_div255_u16,
    },
    render::frame::FrameRgba,
};

/// NeuQuant sampling factor handed to the GIF palette builder (1 = best, 30 = fastest).
pub const DEFAULT_GIF_SPEED: i32 = 10;

/// Byte sink shared between the encoder and the session so finalize can reclaim the stream.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn take(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("gif output buffer poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Animated GIF encoding session backed by the `image` crate's GIF codec.
///
/// Frames are streamed into an in-memory buffer as they are submitted; `finalize` writes the
/// trailer and hands the buffer back, `abort` drops it.
pub struct GifSession {
    opts: SessionOptions,
    state: SessionState,
    encoder: Option<GifEncoder<SharedBuf>>,
    out: SharedBuf,
    scratch: Vec<u8>,
    frames: usize,
}

impl std::fmt::Debug for GifSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSession")
            .field("opts", &self.opts)
            .field("state", &self.state)
            .field("frames", &self.frames)
            .finish()
    }
}

impl GifSession {
    pub fn new(opts: SessionOptions) -> SpriteResult<Self> {
        Self::with_speed(opts, DEFAULT_GIF_SPEED)
    }

    pub fn with_speed(opts: SessionOptions, speed: i32) -> SpriteResult<Self> {
        opts.validate()?;
        if !(1..=30).contains(&speed) {
            return Err(SpriteError::validation("gif speed must be within 1..=30"));
        }

        let out = SharedBuf::default();
        let mut encoder = GifEncoder::new_with_speed(out.clone(), speed);
        if opts.loop_forever {
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| SpriteError::encode(format!("failed to set gif repeat: {e}")))?;
        }

        Ok(Self {
            scratch: vec![0u8; opts.width as usize * opts.height as usize * 4],
            opts,
            state: SessionState::Open,
            encoder: Some(encoder),
            out,
            frames: 0,
        })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.opts
    }
}

impl EncodingSession for GifSession {
    fn submit_frame(&mut self, frame: &FrameRgba, delay_ms: u32) -> SpriteResult<()> {
        self.state.ensure_open("submit frame")?;
        if frame.width != self.opts.width || frame.height != self.opts.height {
            return Err(SpriteError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.opts.width, self.opts.height
            )));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            self.opts.background.to_array(),
        )?;

        let image = image::RgbaImage::from_raw(
            self.opts.width,
            self.opts.height,
            self.scratch.clone(),
        )
        .ok_or_else(|| SpriteError::encode("frame buffer does not fit session size"))?;
        // GIF stores centiseconds; round instead of letting the codec truncate (67ms -> 70ms).
        let centis = delay_ms.saturating_add(5) / 10;
        let delay = image::Delay::from_numer_denom_ms(centis.max(1) * 10, 1);

        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| SpriteError::encode("gif encoder is missing (unexpected)"))?;
        encoder
            .encode_frame(image::Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| SpriteError::encode(format!("gif encoder rejected frame: {e}")))?;

        self.frames += 1;
        Ok(())
    }

    fn finalize(&mut self) -> SpriteResult<Vec<u8>> {
        self.state.ensure_open("finalize")?;
        if self.frames == 0 {
            self.abort();
            return Err(SpriteError::encode("cannot finalize a gif with no frames"));
        }

        // Dropping the encoder writes the GIF trailer into the shared buffer.
        drop(self.encoder.take());
        self.state = SessionState::Finalized;

        let bytes = self.out.take();
        if bytes.is_empty() {
            return Err(SpriteError::encode("gif encoder produced no output"));
        }
        Ok(bytes)
    }

    fn abort(&mut self) {
        if self.state == SessionState::Open {
            drop(self.encoder.take());
            let _ = self.out.take();
            self.state = SessionState::Aborted;
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn frames_submitted(&self) -> usize {
        self.frames
    }
}

fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> SpriteResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SpriteError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv);
        let g = mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv);
        let b = mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
