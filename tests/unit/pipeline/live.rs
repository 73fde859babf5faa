use super::*;
use crate::{assets::decode::LayerImage, pipeline::export::ExportPlan};

fn solid(rgba: [u8; 4]) -> LayerImage {
    let data = rgba.iter().copied().cycle().take(8 * 8 * 4).collect();
    LayerImage::from_rgba8(8, 8, data).unwrap()
}

fn animator(speed: f64) -> LiveAnimator {
    LiveAnimator::new(
        EngineConfig::default(),
        LayerPair {
            upper: solid([240, 10, 10, 255]),
            lower: solid([10, 10, 240, 255]),
        },
        Resolution::new(100).unwrap(),
        Rgba8::WHITE,
        Speed::new(speed).unwrap(),
    )
    .unwrap()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn first_tick_draws_phase_zero() {
    let mut a = animator(1.0);
    assert_eq!(a.tick(ms(500)).unwrap(), Some(0.0));
    assert!((a.phase() - 1.0 / 48.0).abs() < 1e-12);
    assert_eq!(a.frames_drawn(), 1);
}

#[test]
fn draws_only_after_the_frame_interval() {
    let mut a = animator(1.0);
    assert!(a.tick(ms(0)).unwrap().is_some());
    assert!(a.tick(ms(20)).unwrap().is_none());
    assert!(a.tick(ms(34)).unwrap().is_some());
    assert!(a.tick(ms(50)).unwrap().is_none());
    assert!(a.tick(ms(68)).unwrap().is_some());
    assert_eq!(a.frames_drawn(), 3);
}

#[test]
fn faster_speed_shortens_the_interval() {
    let mut slow = animator(1.0);
    let mut fast = animator(2.0);
    assert!(fast.frame_interval() < slow.frame_interval());

    for t in [0, 17, 34] {
        slow.tick(ms(t)).unwrap();
        fast.tick(ms(t)).unwrap();
    }
    assert_eq!(slow.frames_drawn(), 2);
    assert_eq!(fast.frames_drawn(), 3);
}

#[test]
fn backwards_clock_never_draws() {
    let mut a = animator(1.0);
    a.tick(ms(1000)).unwrap();
    assert!(a.tick(ms(10)).unwrap().is_none());
}

#[test]
fn phase_wraps_after_a_full_loop() {
    let mut a = animator(5.0);
    for n in 0..48u64 {
        assert!(a.tick(ms(n * 100)).unwrap().is_some());
        assert!((0.0..1.0).contains(&a.phase()));
    }
    let p = a.phase();
    assert!(!(1e-9..=1.0 - 1e-9).contains(&p), "phase {p} did not wrap");
}

#[test]
fn loop_period_matches_the_exported_loop() {
    let cfg = EngineConfig::default();
    for speed in [0.1, 1.0, 2.0] {
        let a = animator(speed);
        let plan = ExportPlan::new(&cfg, Speed::new(speed).unwrap()).unwrap();
        let export_ms = plan.jobs.len() as f64 * f64::from(plan.frame_delay_ms);
        let preview_ms = a.loop_period().as_secs_f64() * 1000.0;
        // Each exported delay is rounded to whole milliseconds.
        let tolerance = plan.jobs.len() as f64 * 0.5 + 1e-6;
        assert!(
            (export_ms - preview_ms).abs() <= tolerance,
            "speed {speed}: export {export_ms} ms, preview {preview_ms} ms"
        );
    }
}

#[test]
fn run_stops_when_cancelled() {
    let mut a = animator(1.0);
    let cancel = CancelToken::new();
    let stop = cancel.clone();
    let mut phases = Vec::new();
    let drawn = a
        .run(refresh_clock(60.0), &cancel, |phase, surface| {
            assert_eq!(surface.size(), 100);
            phases.push(phase);
            if phases.len() == 5 {
                stop.cancel();
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(drawn, 5);
    assert_eq!(phases.len(), 5);
    assert!(phases.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn run_over_a_finite_clock_returns_draw_count() {
    let mut a = animator(1.0);
    let clock = (0..10u64).map(|n| ms(n * 40));
    let drawn = a.run(clock, &CancelToken::new(), |_, _| Ok(())).unwrap();
    assert_eq!(drawn, 10);
}
