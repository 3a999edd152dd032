//! Procedural rail track and path-follow viewpoint animation.
//!
//! This crate contains the window-system agnostic core of a first-person train
//! ride: a track of straight segments that can have a quarter-circle curve
//! spliced in ahead of the rider, a planner that samples the curve into
//! waypoints, and a per-frame animator that moves a viewpoint either straight
//! ahead (with vibration) or along the planned curve (with lean).
//!
//! # Design principles
//!
//! - **Deterministic**: all time comes in through [`RideSession::tick`], so the
//!   whole ride can be replayed in tests without a clock or display
//! - **Renderer-agnostic**: geometry is returned as plain placements; drawing
//!   is left to the caller
//! - **Single owner**: a [`RideSession`] owns the track and the viewpoint for
//!   one scene lifetime
//!
//! # Example
//!
//! ```
//! use railride::{Direction, RideConfig, RideSession, RideMode};
//!
//! let mut session = RideSession::new(RideConfig::default())?;
//! session.select(Direction::Left, 0.0);
//!
//! // The curve commits once the one second reaction delay has elapsed.
//! for frame in 1..=90 {
//!     session.tick(f64::from(frame) / 60.0);
//! }
//! assert_eq!(session.mode(), RideMode::CurveFollowing);
//! # Ok::<(), railride::Error>(())
//! ```

pub mod animator;
pub mod config;
mod direction;
mod error;
pub mod planner;
pub mod segment;
pub mod session;
pub mod track;

pub use animator::{Pose, RideMode, SelectOutcome, ViewpointAnimator};
pub use config::{Oscillation, RideConfig};
pub use direction::Direction;
pub use error::{Error, Result};
pub use planner::{CurvePath, plan_path};
pub use segment::{Placement, Segment, SegmentGenerator, SegmentGeometry, SegmentKind};
pub use session::{Frame, RideEvent, RideSession, RideSummary};
pub use track::{LookaheadWindow, SpliceReceipt, Track};
