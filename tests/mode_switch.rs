//! Feedback-mode switching: clean teardown, no residual writers.

use aeolus::feedback::{FeedbackControls, FeedbackMode};
use aeolus::mixer::Mixer;
use aeolus::wind::control_targets;

const SR: f32 = 44_100.0;

fn wind_mixer() -> Mixer {
    let mut m = Mixer::new(SR, FeedbackMode::Wind, -6.0).unwrap();
    m.reseed_noise(3);
    m
}

#[test]
fn switching_replaces_the_gain_surface() {
    let mut m = wind_mixer();
    assert_eq!(m.controls().gains.names(), vec!["master", "voices", "wind"]);

    m.set_feedback(FeedbackMode::None).unwrap();
    assert_eq!(m.mode(), FeedbackMode::None);
    assert_eq!(m.controls().gains.names(), vec!["master", "voices"]);

    m.set_feedback(FeedbackMode::Wind).unwrap();
    assert_eq!(m.controls().gains.names(), vec!["master", "voices", "wind"]);
}

#[test]
fn master_and_voice_targets_survive_a_switch() {
    let mut m = wind_mixer();
    m.controls().gains.set_db("master", -20.0).unwrap();
    m.controls().gains.set_db("voices", -10.0).unwrap();

    m.set_feedback(FeedbackMode::None).unwrap();
    let gains = m.controls().gains;
    assert_eq!(gains.db("master").unwrap(), -20.0);
    assert_eq!(gains.db("voices").unwrap(), -10.0);
}

#[test]
fn no_residual_smoother_reaches_the_new_graph() {
    let mut m = wind_mixer();
    let stale = m.controls();

    m.set_feedback(FeedbackMode::Wind).unwrap();
    m.reseed_noise(3);
    let fresh = m.controls();

    // Drive the old handles hard; the rebuilt graph must stay at rest.
    stale.feedback.set_control(1.0, 0.0, 20.0);
    stale.gains.set_db("wind", -40.0).unwrap();

    match &fresh.feedback {
        FeedbackControls::Wind(w) => {
            assert_eq!(w.targets(), control_targets(0.5, 0.5, 0.0));
        }
        other => panic!("expected wind controls, got {other:?}"),
    }
    assert_eq!(fresh.gains.db("wind").unwrap(), -6.0);
}

#[test]
fn old_graph_output_stops_at_the_switch() {
    let mut m = wind_mixer();
    m.controls().feedback.set_control(0.5, 0.5, 10.0);

    let mut buf = vec![0.0f32; 512];
    let mut peak = 0.0f32;
    for _ in 0..200 {
        m.render_mono(&mut buf);
        peak = peak.max(buf.iter().fold(0.0f32, |a, &s| a.max(s.abs())));
    }
    assert!(peak > 1e-4, "wind graph never became audible");

    // After switching to the none graph the output is silent at once, with
    // no tail from the old delay line or smoothers.
    m.set_feedback(FeedbackMode::None).unwrap();
    for _ in 0..10 {
        m.render_mono(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }
}

#[test]
fn rendering_continues_after_repeated_switches() {
    let mut m = wind_mixer();
    let mut buf = vec![0.0f32; 256];
    for i in 0..12 {
        let mode = if i % 2 == 0 {
            FeedbackMode::None
        } else {
            FeedbackMode::Wind
        };
        m.set_feedback(mode).unwrap();
        m.controls().feedback.set_control(0.3, 0.3, 2.0);
        m.render_mono(&mut buf);
        assert!(buf.iter().all(|s| s.is_finite()));
    }
}
