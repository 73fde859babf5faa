use std::time::Duration;

use crate::{
    animation::pose::pose_at,
    assets::decode::LayerPair,
    config::EngineConfig,
    foundation::{
        core::{Resolution, Rgba8, Speed},
        error::SpriteResult,
    },
    pipeline::cancel::CancelToken,
    render::{compositor::composite_frame, surface::Surface},
};

/// Clock-driven preview: redraws the loop onto its own surface at the cadence `speed` implies.
///
/// Shares the pose function and compositor with export but never quantizes and never ends.
#[derive(Debug)]
pub struct LiveAnimator {
    layers: LayerPair,
    surface: Surface,
    cfg: EngineConfig,
    background: Rgba8,
    speed: Speed,
    phase: f64,
    last_drawn: Option<Duration>,
    frames_drawn: u64,
}

impl LiveAnimator {
    pub fn new(
        cfg: EngineConfig,
        layers: LayerPair,
        resolution: Resolution,
        background: Rgba8,
        speed: Speed,
    ) -> SpriteResult<Self> {
        cfg.validate()?;
        Ok(Self {
            layers,
            surface: Surface::new(resolution)?,
            cfg,
            background,
            speed,
            phase: 0.0,
            last_drawn: None,
            frames_drawn: 0,
        })
    }

    /// Phase the next draw will use.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn set_background(&mut self, background: Rgba8) {
        self.background = background;
    }

    /// Minimum clock distance between two draws.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.cfg.base_frame_delay_ms / self.speed.get() / 1000.0)
    }

    /// Wall-clock length of one full loop at the current speed.
    pub fn loop_period(&self) -> Duration {
        self.frame_interval().mul_f64(f64::from(self.cfg.total_phase_steps))
    }

    /// Advance to clock value `now`. Returns the phase drawn, if this tick drew.
    ///
    /// The first tick always draws. A clock that goes backwards never draws.
    pub fn tick(&mut self, now: Duration) -> SpriteResult<Option<f64>> {
        if let Some(last) = self.last_drawn {
            match now.checked_sub(last) {
                Some(elapsed) if elapsed >= self.frame_interval() => {}
                _ => return Ok(None),
            }
        }

        let drawn = self.phase;
        let pose = pose_at(drawn, &self.cfg.pose);
        composite_frame(&mut self.surface, &self.layers, &pose, self.background)?;

        self.phase = (self.phase + 1.0 / f64::from(self.cfg.total_phase_steps)) % 1.0;
        self.last_drawn = Some(now);
        self.frames_drawn += 1;
        Ok(Some(drawn))
    }

    /// Tick once per refresh until the clock runs out or `cancel` fires.
    ///
    /// `on_draw` sees the surface right after each draw.
    pub fn run<I>(
        &mut self,
        refresh: I,
        cancel: &CancelToken,
        mut on_draw: impl FnMut(f64, &Surface) -> SpriteResult<()>,
    ) -> SpriteResult<u64>
    where
        I: IntoIterator<Item = Duration>,
    {
        let start = self.frames_drawn;
        for now in refresh {
            if cancel.is_cancelled() {
                tracing::debug!("preview stopped");
                break;
            }
            if let Some(phase) = self.tick(now)? {
                on_draw(phase, &self.surface)?;
            }
        }
        Ok(self.frames_drawn - start)
    }
}

/// Clock values of a display refreshing at `hz`, starting at zero.
pub fn refresh_clock(hz: f64) -> impl Iterator<Item = Duration> {
    let period = 1.0 / hz.max(1.0);
    (0u64..).map(move |n| Duration::from_secs_f64(n as f64 * period))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/live.rs"]
mod tests;
