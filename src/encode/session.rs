use crate::{
    foundation::{
        core::Rgba8,
        error::{SpriteError, SpriteResult},
    },
    render::frame::FrameRgba,
};

/// Construction options for an encoding session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOptions {
    pub width: u32,
    pub height: u32,
    /// Colour that partially transparent pixels are flattened over.
    pub background: Rgba8,
    /// Whether players should repeat the animation indefinitely.
    pub loop_forever: bool,
}

impl SessionOptions {
    pub fn square(side: u32, background: Rgba8) -> Self {
        Self {
            width: side,
            height: side,
            background,
            loop_forever: true,
        }
    }

    pub fn validate(&self) -> SpriteResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpriteError::validation(
                "session width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(SpriteError::validation(
                "session width/height must fit in u16",
            ));
        }
        Ok(())
    }
}

/// Lifecycle state shared by session implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Finalized,
    Aborted,
}

impl SessionState {
    /// Error unless frames may still be submitted.
    pub fn ensure_open(self, op: &str) -> SpriteResult<()> {
        match self {
            Self::Open => Ok(()),
            Self::Finalized => Err(SpriteError::encode(format!(
                "cannot {op}: session is already finalized"
            ))),
            Self::Aborted => Err(SpriteError::encode(format!(
                "cannot {op}: session was aborted"
            ))),
        }
    }
}

/// A stateful encoder that accumulates frames and emits one byte stream.
///
/// Lifecycle: open → `submit_frame` N times in phase order → `finalize` exactly once. `abort`
/// discards everything buffered so far; after either terminal call the session rejects all
/// further use.
pub trait EncodingSession {
    /// Append a frame that stays on screen for `delay_ms`.
    fn submit_frame(&mut self, frame: &FrameRgba, delay_ms: u32) -> SpriteResult<()>;

    /// Flush and return the encoded stream. Fails if called twice or after `abort`.
    fn finalize(&mut self) -> SpriteResult<Vec<u8>>;

    /// Discard buffered output. Idempotent; never emits bytes.
    fn abort(&mut self);

    fn state(&self) -> SessionState;

    fn frames_submitted(&self) -> usize;
}

/// Receiver for fractional progress updates in `[0, 1]`.
pub trait ProgressSink {
    fn progress(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn progress(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Progress sink that drops every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&mut self, _fraction: f64) {}
}
