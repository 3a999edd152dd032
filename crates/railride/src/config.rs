//! Ride configuration.
//!
//! Every option has a default matching the classic train-ride feel, so a
//! config file only needs to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, track::LookaheadWindow};

/// Upper bound for step and segment counts.
pub const MAX_STEPS: usize = 10_000;
/// Upper bound for `segment_length`, in ties.
pub const MAX_SEGMENT_LENGTH: f32 = 1_000.0;

/// One sine component of the straight-mode vibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    /// Peak offset in world units.
    pub amplitude: f32,
    /// Angular frequency (rad/s).
    pub frequency: f32,
}

impl Oscillation {
    #[must_use]
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }

    /// Offset contributed at time `t` (seconds).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, reason = "sine output is in [-1, 1]")]
    pub fn sample(&self, t: f64) -> f32 {
        // Phase in f64 so long sessions do not lose precision.
        self.amplitude * (t * f64::from(self.frequency)).sin() as f32
    }
}

/// Sum a set of oscillations at time `t`.
pub(crate) fn vibration(components: &[Oscillation], t: f64) -> f32 {
    components.iter().map(|c| c.sample(t)).sum()
}

/// Tunable constants for track generation and viewpoint animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    /// Delay between a direction select and the curve commit (seconds).
    pub reaction_delay: f64,
    /// Time taken to traverse one curve (seconds).
    pub traversal_duration: f64,
    /// Radius of spliced curves and planned paths.
    pub arc_radius: f32,
    /// Number of path steps; a path has `path_steps + 1` waypoints.
    pub path_steps: usize,
    /// Number of steps used to discretise curve rail geometry.
    pub curve_steps: usize,
    /// Lateral distance between the two rails.
    pub gauge: f32,
    /// Distance between consecutive ties.
    pub tie_spacing: f32,
    /// Length of a straight segment, in ties.
    pub segment_length: f32,
    /// Number of segments kept in the track.
    pub segment_count: usize,
    /// Distance from the viewpoint to the near edge of the splice window.
    pub lookahead_distance: f32,
    /// Depth of the splice window along the travel axis.
    pub lookahead_window: f32,
    /// Segments further than this behind the viewpoint are recycled.
    pub recycle_margin: f32,
    /// Straight-mode advance per tick.
    pub forward_speed: f32,
    /// Viewpoint height above the rails.
    pub eye_height: f32,
    /// Vertical vibration components.
    pub vertical_vibration: Vec<Oscillation>,
    /// Lateral vibration components.
    pub lateral_vibration: Vec<Oscillation>,
    /// Peak lean (radians) reached mid-curve.
    pub tilt_intensity: f32,
    /// Fraction of the remaining distance to the target waypoint covered each tick.
    pub smoothing: f32,
    /// How many waypoints ahead the viewpoint looks while curving.
    pub look_ahead_waypoints: usize,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            reaction_delay: 1.0,
            traversal_duration: 4.0,
            arc_radius: 20.0,
            path_steps: 60,
            curve_steps: 30,
            gauge: 2.0,
            tie_spacing: 1.5,
            segment_length: 10.0,
            segment_count: 20,
            lookahead_distance: 30.0,
            lookahead_window: 20.0,
            recycle_margin: 30.0,
            forward_speed: 0.15,
            eye_height: 1.0,
            vertical_vibration: vec![Oscillation::new(0.03, 5.0), Oscillation::new(0.01, 12.0)],
            lateral_vibration: vec![Oscillation::new(0.015, 3.0), Oscillation::new(0.005, 8.0)],
            tilt_intensity: 0.3,
            smoothing: 0.1,
            look_ahead_waypoints: 5,
        }
    }
}

impl RideConfig {
    /// Check every option, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        non_negative("reaction_delay", self.reaction_delay)?;
        positive("traversal_duration", self.traversal_duration)?;
        positive("gauge", f64::from(self.gauge))?;
        if !self.arc_radius.is_finite() || self.arc_radius <= self.gauge / 2.0 {
            return Err(Error::InvalidGeometry {
                radius: self.arc_radius,
                gauge: self.gauge,
            });
        }
        step_count("path_steps", self.path_steps)?;
        step_count("curve_steps", self.curve_steps)?;
        step_count("segment_count", self.segment_count)?;
        positive("tie_spacing", f64::from(self.tie_spacing))?;
        if !(1.0..=MAX_SEGMENT_LENGTH).contains(&self.segment_length) {
            return Err(Error::InvalidConfig {
                field: "segment_length",
                detail: format!(
                    "must be between 1 and {MAX_SEGMENT_LENGTH} ties, got {}",
                    self.segment_length
                ),
            });
        }
        non_negative("lookahead_distance", f64::from(self.lookahead_distance))?;
        positive("lookahead_window", f64::from(self.lookahead_window))?;
        non_negative("recycle_margin", f64::from(self.recycle_margin))?;
        non_negative("forward_speed", f64::from(self.forward_speed))?;
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(Error::InvalidConfig {
                field: "smoothing",
                detail: format!("must be in (0, 1], got {}", self.smoothing),
            });
        }
        finite("tilt_intensity", self.tilt_intensity)?;
        finite("eye_height", self.eye_height)?;
        if self.look_ahead_waypoints > self.path_steps {
            return Err(Error::InvalidConfig {
                field: "look_ahead_waypoints",
                detail: format!(
                    "must not exceed path_steps ({}), got {}",
                    self.path_steps, self.look_ahead_waypoints
                ),
            });
        }
        Ok(())
    }

    /// Distance between consecutive segment positions.
    #[must_use]
    pub fn segment_step(&self) -> f32 {
        self.segment_length.floor() * self.tie_spacing
    }

    /// The splice window derived from the lookahead options.
    #[must_use]
    pub fn splice_window(&self) -> LookaheadWindow {
        LookaheadWindow {
            distance: self.lookahead_distance,
            depth: self.lookahead_window,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("must be positive, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("must be non-negative, got {value}"),
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("must be finite, got {value}"),
        })
    }
}

fn step_count(field: &'static str, value: usize) -> Result<()> {
    if (1..=MAX_STEPS).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("must be between 1 and {MAX_STEPS}, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RideConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.segment_step() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_radius_must_exceed_half_gauge() {
        let config = RideConfig {
            arc_radius: 1.0,
            gauge: 2.0,
            ..RideConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(Error::InvalidGeometry {
                radius: 1.0,
                gauge: 2.0
            })
        );
    }

    #[test]
    fn test_rejects_bad_smoothing() {
        let config = RideConfig {
            smoothing: 0.0,
            ..RideConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "smoothing",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let config = RideConfig {
            traversal_duration: 0.0,
            ..RideConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "traversal_duration",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_oversized_counts() {
        let cases = [
            (
                RideConfig {
                    look_ahead_waypoints: usize::MAX,
                    ..RideConfig::default()
                },
                "look_ahead_waypoints",
            ),
            (
                RideConfig {
                    look_ahead_waypoints: 61,
                    ..RideConfig::default()
                },
                "look_ahead_waypoints",
            ),
            (
                RideConfig {
                    path_steps: usize::MAX,
                    ..RideConfig::default()
                },
                "path_steps",
            ),
            (
                RideConfig {
                    segment_count: MAX_STEPS + 1,
                    ..RideConfig::default()
                },
                "segment_count",
            ),
            (
                RideConfig {
                    segment_length: 1e9,
                    ..RideConfig::default()
                },
                "segment_length",
            ),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: expected InvalidConfig, got {other:?}"),
            }
        }

        let at_limit = RideConfig {
            look_ahead_waypoints: 60,
            ..RideConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_non_finite_fields_are_named() {
        let config = RideConfig {
            eye_height: f32::NAN,
            ..RideConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "eye_height",
                ..
            })
        ));

        let config = RideConfig {
            tilt_intensity: f32::INFINITY,
            ..RideConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "tilt_intensity",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RideConfig =
            serde_json::from_str(r#"{ "arc_radius": 35.0, "reaction_delay": 0.5 }"#).unwrap();
        assert_eq!(config.arc_radius, 35.0);
        assert_eq!(config.reaction_delay, 0.5);
        assert_eq!(config.path_steps, 60);
        assert_eq!(config.vertical_vibration.len(), 2);
    }

    #[test]
    fn test_vibration_sum() {
        let parts = [Oscillation::new(0.03, 5.0), Oscillation::new(0.01, 12.0)];
        assert_eq!(vibration(&parts, 0.0), 0.0);
        let t = 0.1;
        let expected = 0.03 * (0.5f64).sin() as f32 + 0.01 * (1.2f64).sin() as f32;
        assert!((vibration(&parts, t) - expected).abs() < 1e-6);
    }
}
