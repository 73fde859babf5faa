//! Procedural two-layer sprite animation with animated GIF export.
//!
//! Two static images, an upper and a lower body, are driven by a single loop phase in `[0, 1)`.
//! Each sampled phase becomes a pose, the pose places both layers on a square surface, and the
//! rendered frame is posterized and streamed into an encoder.
//!
//! # Pipeline overview
//!
//! 1. **Pose**: `phase -> PoseDescriptor` ([`pose_at`], pure)
//! 2. **Composite**: `LayerPair + PoseDescriptor -> Surface` ([`composite_frame`], CPU via `vello_cpu`)
//! 3. **Quantize**: posterize RGB channels in place ([`ColorQuantizer`])
//! 4. **Encode**: feed frames to an [`EncodingSession`] and finalize once ([`FramePipeline`])
//!
//! The live preview ([`LiveAnimator`]) reuses steps 1 and 2 on a clock instead of a fixed
//! schedule.
//!
//! Layer assets come from ordered tiers ([`TieredSources`]); a pair is only used when both
//! layers come from the same tier. Identifiers are resolved through a metadata [`Catalog`].
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod encode;
mod foundation;
mod pipeline;
mod render;

pub use animation::ease::in_out_quad;
pub use animation::pose::{PoseDescriptor, PoseParams, pose_at};
pub use assets::catalog::{
    BackgroundChoice, Catalog, CatalogAttributes, CatalogPolicy, CatalogRecord, OFFLINE_ID_MAX,
    OFFLINE_ID_MIN, ResolvedId, ResolvedVia, body_color,
};
pub use assets::decode::{LayerImage, LayerKind, LayerPair, decode_layer, decode_pair};
pub use assets::source::{
    AnimationMode, FetchedPair, ID_PLACEHOLDER, LayerSource, LayerTemplates, TemplateSource,
    TierConfig, TieredSources,
};
pub use config::{
    BASE_FRAME_DELAY_MS, EXPORT_PHASE_STEPS, EngineConfig, MIN_DELAY_MS, TARGET_FRAME_COUNT,
};
pub use encode::gif::{DEFAULT_GIF_SPEED, GifSession};
pub use encode::naming::{DEFAULT_SUBJECT, output_file_name};
pub use encode::session::{
    EncodingSession, NoProgress, ProgressSink, SessionOptions, SessionState,
};
pub use foundation::core::{
    Affine, MAX_RESOLUTION, MAX_SPEED, MIN_RESOLUTION, MIN_SPEED, Point, RESOLUTION_STEP, Rect,
    Resolution, Rgba8, Speed, Vec2,
};
pub use foundation::error::{SpriteError, SpriteResult};
pub use pipeline::cancel::CancelToken;
pub use pipeline::export::{
    ExportPlan, ExportRequest, ExportStats, FrameJob, FramePipeline, frame_delay_ms,
};
pub use pipeline::live::{LiveAnimator, refresh_clock};
pub use render::compositor::{
    composite_frame, lower_layer_transform, upper_layer_transform, upper_pivot,
};
pub use render::frame::FrameRgba;
pub use render::quantize::ColorQuantizer;
pub use render::surface::Surface;
