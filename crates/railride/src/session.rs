//! Ride session: the single owner of the track and the viewpoint.
//!
//! A session is created at scene start, driven by one [`RideSession::tick`]
//! per displayed frame, and consumed by [`RideSession::finish`] at teardown.

use crate::{
    Direction, Error, Pose, Result, RideConfig, RideMode, SegmentGenerator, SelectOutcome, Track,
    ViewpointAnimator, plan_path,
};

/// Something the UI layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum RideEvent {
    /// A direction was accepted and will commit after the reaction delay.
    DirectionQueued { direction: Direction, commit_at: f64 },
    /// A direction was chosen while another was pending or being followed.
    SelectionIgnored { direction: Direction },
    /// A pending direction was cancelled before it committed.
    SelectionCancelled { direction: Direction },
    /// The curve was spliced in and the viewpoint started following it.
    CurveEntered { direction: Direction, position: f32 },
    /// The curve could not be spliced; the ride stays straight.
    SpliceWindowMissed { direction: Direction, error: Error },
    /// The viewpoint reached the end of the curve.
    CurveCompleted { direction: Direction },
    /// Segments behind the viewpoint were replaced at the far end.
    SegmentsRecycled { count: usize },
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub pose: Pose,
    pub mode: RideMode,
    /// Pending or committed direction.
    pub direction: Option<Direction>,
    /// Traversal fraction while following a curve.
    pub fraction: Option<f32>,
    /// Set when the last commit missed its splice window; cleared by the next
    /// accepted selection.
    pub splice_missed: bool,
    pub track_revision: u64,
}

/// Totals reported when a session is torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RideSummary {
    pub frames: u64,
    pub curves_completed: u32,
    pub windows_missed: u32,
    pub selections_ignored: u32,
    pub selections_cancelled: u32,
    /// Distance covered along the travel axis.
    pub distance: f32,
}

/// One scene's worth of track and viewpoint state.
#[derive(Debug, Clone)]
pub struct RideSession {
    config: RideConfig,
    generator: SegmentGenerator,
    track: Track,
    animator: ViewpointAnimator,
    events: Vec<RideEvent>,
    splice_missed: bool,
    summary: RideSummary,
}

impl RideSession {
    /// Validate `config` and build the initial straight track.
    pub fn new(config: RideConfig) -> Result<Self> {
        config.validate()?;
        let generator = SegmentGenerator::from_config(&config)?;
        let track = Track::new(&generator, &config);
        let animator = ViewpointAnimator::new(&config);

        tracing::info!(
            "Ride session started: {} segments, curve radius {}",
            track.len(),
            config.arc_radius
        );

        Ok(Self {
            config,
            generator,
            track,
            animator,
            events: Vec::new(),
            splice_missed: false,
            summary: RideSummary::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RideConfig {
        &self.config
    }

    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[must_use]
    pub fn animator(&self) -> &ViewpointAnimator {
        &self.animator
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        self.animator.pose()
    }

    #[must_use]
    pub fn mode(&self) -> RideMode {
        self.animator.mode()
    }

    #[must_use]
    pub fn splice_missed(&self) -> bool {
        self.splice_missed
    }

    /// Choose a direction at time `at`.
    ///
    /// Ignored while a choice is pending or a curve is being followed.
    pub fn select(&mut self, direction: Direction, at: f64) -> SelectOutcome {
        let outcome = self.animator.request_curve(direction, at);
        match outcome {
            SelectOutcome::Accepted => {
                self.splice_missed = false;
                let commit_at = self.animator.commit_at().unwrap_or(at);
                tracing::info!("Direction selected: {direction}");
                self.events.push(RideEvent::DirectionQueued {
                    direction,
                    commit_at,
                });
            }
            SelectOutcome::Ignored => {
                self.summary.selections_ignored += 1;
                tracing::debug!(
                    "Ignoring {direction} selection while {:?}",
                    self.animator.mode()
                );
                self.events.push(RideEvent::SelectionIgnored { direction });
            }
        }
        outcome
    }

    /// Cancel a pending choice. Returns the cancelled direction.
    pub fn cancel(&mut self, at: f64) -> Option<Direction> {
        let direction = self.animator.cancel()?;
        self.summary.selections_cancelled += 1;
        tracing::info!("Cancelled {direction} selection at t={at:.2}");
        self.events.push(RideEvent::SelectionCancelled { direction });
        Some(direction)
    }

    /// Advance the ride to time `now`.
    pub fn tick(&mut self, now: f64) -> Frame {
        let start_z = self.animator.pose().position.z;

        if let Some(direction) = self.animator.due_commit(now) {
            self.commit(direction, now);
        }

        if let Some(direction) = self.animator.advance(now) {
            self.track.release_curve();
            self.summary.curves_completed += 1;
            tracing::info!("Finished {direction} curve");
            self.events.push(RideEvent::CurveCompleted { direction });
        }

        let viewpoint_z = self.animator.pose().position.z;
        let count = self
            .track
            .recycle(&self.generator, viewpoint_z, self.config.recycle_margin);
        if count > 0 {
            self.events.push(RideEvent::SegmentsRecycled { count });
        }

        self.summary.frames += 1;
        self.summary.distance += (start_z - viewpoint_z).max(0.0);
        self.frame()
    }

    /// Snapshot of the current state without advancing.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            pose: self.animator.pose(),
            mode: self.animator.mode(),
            direction: self.animator.direction(),
            fraction: self.animator.fraction(),
            splice_missed: self.splice_missed,
            track_revision: self.track.revision(),
        }
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<RideEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tear the session down and report totals.
    #[must_use]
    pub fn finish(self) -> RideSummary {
        tracing::info!(
            "Ride session finished after {} frames, {} curve(s)",
            self.summary.frames,
            self.summary.curves_completed
        );
        self.summary
    }

    /// Splice and plan together; both succeed or the choice is discarded.
    fn commit(&mut self, direction: Direction, now: f64) {
        let start = self.animator.pose().position;
        let path = plan_path(
            direction,
            start,
            self.config.arc_radius,
            self.config.path_steps,
        );

        match self.track.splice(
            &self.generator,
            start.z,
            self.config.splice_window(),
            direction,
            self.config.arc_radius,
        ) {
            Ok(receipt) => {
                self.animator.begin_curve(path, now);
                tracing::info!("Entering {direction} curve");
                self.events.push(RideEvent::CurveEntered {
                    direction,
                    position: receipt.position,
                });
            }
            Err(error) => {
                self.animator.abort_pending();
                self.splice_missed = true;
                self.summary.windows_missed += 1;
                tracing::warn!("Curve commit failed: {error}");
                self.events
                    .push(RideEvent::SpliceWindowMissed { direction, error });
            }
        }
    }
}
