use crate::{
    animation::pose::pose_at,
    assets::decode::{LayerPair, decode_pair},
    config::EngineConfig,
    encode::session::{EncodingSession, ProgressSink},
    foundation::{
        core::{Resolution, Rgba8, Speed},
        error::{SpriteError, SpriteResult},
    },
    pipeline::cancel::CancelToken,
    render::{compositor::composite_frame, frame::FrameRgba, surface::Surface},
};

/// One unit of sampling work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameJob {
    pub phase: f64,
    pub delay_ms: u32,
}

/// Sampling schedule derived from an [`EngineConfig`] and a playback speed.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportPlan {
    /// Phase steps skipped between sampled frames.
    pub frame_skip: u32,
    pub frame_delay_ms: u32,
    pub target_frame_count: u32,
    /// Jobs in increasing phase order.
    pub jobs: Vec<FrameJob>,
}

impl ExportPlan {
    pub fn new(cfg: &EngineConfig, speed: Speed) -> SpriteResult<Self> {
        cfg.validate()?;

        let steps = cfg.total_phase_steps;
        let frame_skip = (steps / cfg.target_frame_count).max(1);
        let frame_delay_ms = frame_delay_ms(
            cfg.base_frame_delay_ms,
            frame_skip,
            speed,
            cfg.min_delay_ms,
        );

        let jobs = (0..steps)
            .step_by(frame_skip as usize)
            .map(|i| FrameJob {
                phase: f64::from(i) / f64::from(steps),
                delay_ms: frame_delay_ms,
            })
            .collect();

        Ok(Self {
            frame_skip,
            frame_delay_ms,
            target_frame_count: cfg.target_frame_count,
            jobs,
        })
    }

    /// Progress after `submitted` frames, clamped to `1.0`.
    pub fn progress_after(&self, submitted: usize) -> f64 {
        (submitted as f64 / f64::from(self.target_frame_count)).min(1.0)
    }
}

/// `max(min_delay, round(base * skip / speed))`; non-increasing in `speed`.
pub fn frame_delay_ms(base_ms: f64, frame_skip: u32, speed: Speed, min_delay_ms: u32) -> u32 {
    let raw = (base_ms * f64::from(frame_skip) / speed.get()).round();
    // Saturating float-to-int cast.
    (raw as u32).max(min_delay_ms)
}

/// Per-export inputs chosen by the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportRequest {
    pub background: Rgba8,
    pub speed: Speed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub frames_submitted: usize,
    pub frame_delay_ms: u32,
    pub bytes: usize,
}

/// Samples the loop, renders each sample and streams it into an [`EncodingSession`].
///
/// Owns the surface for its whole lifetime, so one pipeline can serve repeated exports at the
/// same resolution without reallocating.
#[derive(Debug)]
pub struct FramePipeline {
    cfg: EngineConfig,
    resolution: Resolution,
    surface: Surface,
}

impl FramePipeline {
    pub fn new(cfg: EngineConfig, resolution: Resolution) -> SpriteResult<Self> {
        cfg.validate()?;
        let surface = Surface::new(resolution)?;
        Ok(Self {
            cfg,
            resolution,
            surface,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn plan(&self, speed: Speed) -> SpriteResult<ExportPlan> {
        ExportPlan::new(&self.cfg, speed)
    }

    /// Composite and quantize one frame at `phase`.
    pub fn render_still(
        &mut self,
        layers: &LayerPair,
        phase: f64,
        background: Rgba8,
    ) -> SpriteResult<FrameRgba> {
        let pose = pose_at(phase, &self.cfg.pose);
        composite_frame(&mut self.surface, layers, &pose, background)?;
        let mut frame = self.surface.read_back()?;
        self.cfg.quantizer.apply(&mut frame.data);
        Ok(frame)
    }

    /// Render every planned frame into `session` and finalize it.
    ///
    /// On any error, including cancellation, the session is aborted and never finalized.
    #[tracing::instrument(
        skip_all,
        fields(resolution = self.resolution.px(), speed = req.speed.get())
    )]
    pub fn run(
        &mut self,
        layers: &LayerPair,
        req: &ExportRequest,
        session: &mut dyn EncodingSession,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> SpriteResult<(Vec<u8>, ExportStats)> {
        let plan = match self.plan(req.speed) {
            Ok(plan) => plan,
            Err(e) => {
                session.abort();
                return Err(e);
            }
        };
        tracing::debug!(
            frames = plan.jobs.len(),
            frame_skip = plan.frame_skip,
            delay_ms = plan.frame_delay_ms,
            "export planned"
        );

        if let Err(e) = self.submit_all(layers, req, &plan, session, progress, cancel) {
            session.abort();
            if e.is_cancelled() {
                tracing::info!(submitted = session.frames_submitted(), "export cancelled");
            } else {
                tracing::warn!(error = %e, "export failed, session aborted");
            }
            return Err(e);
        }

        let bytes = session.finalize()?;
        let stats = ExportStats {
            frames_submitted: session.frames_submitted(),
            frame_delay_ms: plan.frame_delay_ms,
            bytes: bytes.len(),
        };
        tracing::info!(
            frames = stats.frames_submitted,
            bytes = stats.bytes,
            "export finished"
        );
        Ok((bytes, stats))
    }

    /// Decode both layers (joined), then [`run`](Self::run).
    ///
    /// A decode failure of either layer aborts the session before any frame is submitted.
    pub fn run_encoded(
        &mut self,
        upper: &[u8],
        lower: &[u8],
        req: &ExportRequest,
        session: &mut dyn EncodingSession,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> SpriteResult<(Vec<u8>, ExportStats)> {
        let layers = match decode_pair(upper, lower) {
            Ok(layers) => layers,
            Err(e) => {
                session.abort();
                return Err(e);
            }
        };
        self.run(&layers, req, session, progress, cancel)
    }

    fn submit_all(
        &mut self,
        layers: &LayerPair,
        req: &ExportRequest,
        plan: &ExportPlan,
        session: &mut dyn EncodingSession,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> SpriteResult<()> {
        cancel.check("before the first frame")?;

        for (n, job) in plan.jobs.iter().enumerate() {
            let frame = self.render_still(layers, job.phase, req.background)?;
            session
                .submit_frame(&frame, job.delay_ms)
                .map_err(|e| match e {
                    SpriteError::Encode(msg) => {
                        SpriteError::encode(format!("frame {n} (phase {:.4}): {msg}", job.phase))
                    }
                    other => other,
                })?;

            progress.progress(plan.progress_after(n + 1));
            std::thread::yield_now();
            cancel.check(&format!("after frame {}", n + 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/export.rs"]
mod tests;
