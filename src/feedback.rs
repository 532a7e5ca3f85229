//! Feedback-mode selection.
//!
//! Each mode is a fixed-topology synthesis graph; the mixer owns exactly one
//! at a time. Switching modes tears the old graph down completely (its
//! smoothers and gain entries go with it) before the new one is built, so a
//! stale control handle can never write into the replacement graph.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ControlError;
use crate::gains::GainRegistry;
use crate::wind::{WindControls, WindGraph};

/// The available feedback graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    None,
    #[default]
    Wind,
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackMode::None => write!(f, "none"),
            FeedbackMode::Wind => write!(f, "wind"),
        }
    }
}

impl FromStr for FeedbackMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FeedbackMode::None),
            "wind" => Ok(FeedbackMode::Wind),
            other => Err(ControlError::UnknownName(other.to_string())),
        }
    }
}

impl FeedbackMode {
    pub const ALL: [FeedbackMode; 2] = [FeedbackMode::None, FeedbackMode::Wind];
}

/// The active graph, dispatched by mode. Lives on the audio side.
pub enum FeedbackGraph {
    None,
    Wind(WindGraph),
}

impl FeedbackGraph {
    /// Build the graph for `mode`, registering its gain stages with the
    /// mixer's registry.
    pub fn build(
        mode: FeedbackMode,
        sample_rate: f32,
        gains: &mut GainRegistry,
    ) -> Result<Self, ControlError> {
        match mode {
            FeedbackMode::None => Ok(FeedbackGraph::None),
            FeedbackMode::Wind => Ok(FeedbackGraph::Wind(WindGraph::new(sample_rate, gains)?)),
        }
    }

    pub fn mode(&self) -> FeedbackMode {
        match self {
            FeedbackGraph::None => FeedbackMode::None,
            FeedbackGraph::Wind(_) => FeedbackMode::Wind,
        }
    }

    /// Control-side handle matching the active mode.
    pub fn controls(&self) -> FeedbackControls {
        match self {
            FeedbackGraph::None => FeedbackControls::None,
            FeedbackGraph::Wind(w) => FeedbackControls::Wind(w.controls()),
        }
    }

    /// Sum one block of the graph's output into `buf`.
    pub fn render_into(&mut self, buf: &mut [f32]) {
        match self {
            FeedbackGraph::None => {}
            FeedbackGraph::Wind(w) => w.render_into(buf),
        }
    }

    /// Seed the graph's noise source. Test hook.
    pub fn reseed_noise(&mut self, seed: u64) {
        if let FeedbackGraph::Wind(w) = self {
            w.reseed_noise(seed);
        }
    }
}

/// Uniform gesture surface over whichever graph is active. For
/// [`FeedbackControls::None`] the setters are no-ops.
#[derive(Debug, Clone)]
pub enum FeedbackControls {
    None,
    Wind(WindControls),
}

impl FeedbackControls {
    pub fn set_control(&self, x: f32, y: f32, rate: f32) {
        if let FeedbackControls::Wind(w) = self {
            w.set_control(x, y, rate);
        }
    }

    pub fn mode(&self) -> FeedbackMode {
        match self {
            FeedbackControls::None => FeedbackMode::None,
            FeedbackControls::Wind(_) => FeedbackMode::Wind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wind::control_targets;

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("wind".parse::<FeedbackMode>().unwrap(), FeedbackMode::Wind);
        assert_eq!("NONE".parse::<FeedbackMode>().unwrap(), FeedbackMode::None);
        assert!("storm".parse::<FeedbackMode>().is_err());
        assert_eq!(FeedbackMode::Wind.to_string(), "wind");
    }

    #[test]
    fn none_mode_renders_nothing() {
        let mut gains = GainRegistry::new();
        let mut graph = FeedbackGraph::build(FeedbackMode::None, 44_100.0, &mut gains).unwrap();
        assert!(gains.names().is_empty());

        let mut buf = vec![0.25_f32; 64];
        graph.render_into(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.25));

        // Gestures on a none graph go nowhere.
        graph.controls().set_control(0.5, 0.5, 1.0);
    }

    #[test]
    fn stale_controls_cannot_reach_a_rebuilt_graph() {
        let mut gains = GainRegistry::new();
        let graph = FeedbackGraph::build(FeedbackMode::Wind, 44_100.0, &mut gains).unwrap();
        let stale = graph.controls();
        drop(graph);

        let mut gains = GainRegistry::new();
        let rebuilt = FeedbackGraph::build(FeedbackMode::Wind, 44_100.0, &mut gains).unwrap();
        let fresh = rebuilt.controls();

        stale.set_control(0.9, 0.9, 9.0);

        if let FeedbackControls::Wind(w) = &fresh {
            assert_eq!(w.targets(), control_targets(0.5, 0.5, 0.0));
        } else {
            panic!("expected a wind graph");
        }
    }
}
