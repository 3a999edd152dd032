//! Curve path planning.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::Direction;

/// Waypoints sampled along one quarter-turn curve.
///
/// Immutable once planned; the animator drops it when the traversal ends.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePath {
    direction: Direction,
    waypoints: Vec<Vec3>,
}

impl CurvePath {
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).copied()
    }

    /// Waypoint index reached at a traversal fraction in `[0, 1)`.
    #[must_use]
    pub fn index_at(&self, fraction: f32) -> usize {
        let last = self.waypoints.len().saturating_sub(1);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "fraction is clamped to [0, 1]"
        )]
        let index = (fraction.clamp(0.0, 1.0) * last as f32).floor() as usize;
        index.min(last)
    }
}

/// Sample a quarter-circle arc starting at `start`.
///
/// Returns `steps + 1` waypoints. The arc starts heading sideways (towards
/// `direction`) and finishes `radius` to the side and `radius` further along
/// the travel axis. Height is held constant.
#[must_use]
pub fn plan_path(direction: Direction, start: Vec3, radius: f32, steps: usize) -> CurvePath {
    let sign = direction.sign();
    let steps = steps.max(1);

    let waypoints = (0..=steps)
        .map(|i| {
            let angle = FRAC_PI_2 * (i as f32 / steps as f32);
            Vec3::new(
                start.x + sign * radius * angle.sin(),
                start.y,
                start.z - radius * (1.0 - angle.cos()),
            )
        })
        .collect();

    CurvePath {
        direction,
        waypoints,
    }
}
