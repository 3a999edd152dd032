//! Per-frame viewpoint animation.
//!
//! The animator is a small state machine:
//!
//! ```text
//! Straight --select--> PendingCurve --delay elapsed, splice ok--> CurveFollowing
//!    ^                     |                                           |
//!    +----cancel / miss----+                       fraction >= 1 ------+
//! ```
//!
//! It never touches the track itself; [`RideSession`](crate::RideSession)
//! performs the splice when [`ViewpointAnimator::due_commit`] reports a choice
//! is ready and then calls [`ViewpointAnimator::begin_curve`] or
//! [`ViewpointAnimator::abort_pending`].

use std::f32::consts::PI;

use glam::{EulerRot, Quat, Vec3};

use crate::{CurvePath, Direction, RideConfig, config::vibration};

/// Coarse ride state reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RideMode {
    #[default]
    Straight,
    /// A direction has been chosen and the reaction delay is running.
    PendingCurve,
    CurveFollowing,
}

/// Result of a direction select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Accepted,
    /// A choice was already pending or a curve is being followed.
    Ignored,
}

/// Viewpoint position and orientation for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Unit look direction.
    pub forward: Vec3,
    /// Roll about the look direction (radians, negative leans left).
    pub tilt: f32,
}

impl Pose {
    /// Heading restored whenever the ride runs straight.
    pub const FORWARD: Vec3 = Vec3::NEG_Z;

    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            forward: Self::FORWARD,
            tilt: 0.0,
        }
    }

    /// Orientation for a camera that looks down its local -Z.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let yaw = (-self.forward.x).atan2(-self.forward.z);
        let pitch = self.forward.y.clamp(-1.0, 1.0).asin();
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, self.tilt)
    }

    /// Point `distance` units straight ahead.
    #[must_use]
    pub fn look_target(&self, distance: f32) -> Vec3 {
        self.position + self.forward * distance
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Straight,
    Pending {
        direction: Direction,
        commit_at: f64,
    },
    Following {
        path: CurvePath,
        entered_at: f64,
        fraction: f32,
    },
}

/// Drives the viewpoint from frame to frame.
#[derive(Debug, Clone)]
pub struct ViewpointAnimator {
    config: RideConfig,
    pose: Pose,
    phase: Phase,
}

impl ViewpointAnimator {
    /// Start in straight mode at the origin, eye height above the rails.
    #[must_use]
    pub fn new(config: &RideConfig) -> Self {
        Self {
            pose: Pose::new(Vec3::new(0.0, config.eye_height, 0.0)),
            config: config.clone(),
            phase: Phase::Straight,
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub fn mode(&self) -> RideMode {
        match self.phase {
            Phase::Straight => RideMode::Straight,
            Phase::Pending { .. } => RideMode::PendingCurve,
            Phase::Following { .. } => RideMode::CurveFollowing,
        }
    }

    /// Direction pending or being followed.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match &self.phase {
            Phase::Straight => None,
            Phase::Pending { direction, .. } => Some(*direction),
            Phase::Following { path, .. } => Some(path.direction()),
        }
    }

    /// Traversal fraction of the active curve.
    #[must_use]
    pub fn fraction(&self) -> Option<f32> {
        match &self.phase {
            Phase::Following { fraction, .. } => Some(*fraction),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&CurvePath> {
        match &self.phase {
            Phase::Following { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Time at which a pending choice will be committed.
    #[must_use]
    pub fn commit_at(&self) -> Option<f64> {
        match self.phase {
            Phase::Pending { commit_at, .. } => Some(commit_at),
            _ => None,
        }
    }

    /// Choose a direction. Only honoured while running straight.
    pub fn request_curve(&mut self, direction: Direction, at: f64) -> SelectOutcome {
        if !matches!(self.phase, Phase::Straight) {
            return SelectOutcome::Ignored;
        }
        self.phase = Phase::Pending {
            direction,
            commit_at: at + self.config.reaction_delay,
        };
        SelectOutcome::Accepted
    }

    /// Drop a pending choice before it commits.
    pub fn cancel(&mut self) -> Option<Direction> {
        self.abort_pending()
    }

    /// The pending direction, once its reaction delay has elapsed at `now`.
    #[must_use]
    pub fn due_commit(&self, now: f64) -> Option<Direction> {
        match self.phase {
            Phase::Pending {
                direction,
                commit_at,
            } if now >= commit_at => Some(direction),
            _ => None,
        }
    }

    /// Start following `path`, entering at `now`.
    pub fn begin_curve(&mut self, path: CurvePath, now: f64) {
        self.phase = Phase::Following {
            path,
            entered_at: now,
            fraction: 0.0,
        };
    }

    /// Return to straight mode from `PendingCurve`, discarding the choice.
    pub fn abort_pending(&mut self) -> Option<Direction> {
        match self.phase {
            Phase::Pending { direction, .. } => {
                self.phase = Phase::Straight;
                Some(direction)
            }
            _ => None,
        }
    }

    /// Advance one frame.
    ///
    /// Returns the direction of a curve that finished on this frame.
    pub fn advance(&mut self, now: f64) -> Option<Direction> {
        let mut completed = None;

        if let Phase::Following {
            path,
            entered_at,
            fraction,
        } = &mut self.phase
        {
            let progress = ((now - *entered_at) / self.config.traversal_duration).max(0.0);
            if progress >= 1.0 {
                completed = Some(path.direction());
            } else {
                #[allow(clippy::cast_possible_truncation, reason = "progress is in [0, 1)")]
                let progress = progress as f32;
                *fraction = progress;
                follow_path(&mut self.pose, path, *fraction, &self.config);
                return None;
            }
        }

        if completed.is_some() {
            self.phase = Phase::Straight;
            self.pose.tilt = 0.0;
            self.pose.forward = Pose::FORWARD;
        }

        self.step_straight(now);
        completed
    }

    fn step_straight(&mut self, now: f64) {
        let pose = &mut self.pose;
        pose.position.z -= self.config.forward_speed;
        pose.position.y = self.config.eye_height + vibration(&self.config.vertical_vibration, now);
        pose.position.x = vibration(&self.config.lateral_vibration, now);
    }
}

/// Ease the pose towards the waypoint for `fraction` and lean into the turn.
fn follow_path(pose: &mut Pose, path: &CurvePath, fraction: f32, config: &RideConfig) {
    let index = path.index_at(fraction);
    let Some(target) = path.get(index) else {
        return;
    };

    pose.position = pose.position.lerp(target, config.smoothing);

    let look_ahead = index.checked_add(config.look_ahead_waypoints);
    if let Some(look_at) = look_ahead.and_then(|i| path.get(i)) {
        pose.forward = (look_at - pose.position)
            .try_normalize()
            .unwrap_or(pose.forward);
    }

    pose.tilt = path.direction().sign() * (fraction * PI).sin() * config.tilt_intensity;
}
