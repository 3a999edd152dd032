//! Ride session integration.
//!
//! Wraps the pure `RideSession` in a resource, feeds it rider actions and the
//! frame clock, and applies the resulting pose to the camera. Track geometry
//! is drawn with gizmos every frame.

use bevy::{camera::ClearColorConfig, prelude::*, window::PrimaryWindow};
use leafwing_input_manager::prelude::*;
use railride::{Direction, Frame, Placement, RideEvent, RideSession, SelectOutcome};

use crate::{
    input::{RideAction, default_ride_input_map},
    launch_params::LaunchParams,
};

/// Half the length of a drawn rail piece.
const RAIL_HALF_LENGTH: f32 = 0.6;
/// Half the width of a drawn tie.
const TIE_HALF_WIDTH: f32 = 1.75;
/// Track behind the viewpoint stays visible for this far.
const DRAW_BEHIND: f32 = 10.0;
/// How long a notice stays on the HUD, in seconds.
const NOTICE_DURATION: f64 = 2.5;

const RAIL_COLOR: Color = Color::WHITE;
const TIE_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);

/// Marker for the rider's camera.
#[derive(Component)]
pub struct RideCamera;

/// A short message shown on the HUD after a ride event.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub shown_at: f64,
    pub warning: bool,
}

impl Notice {
    pub fn is_visible(&self, now: f64) -> bool {
        now - self.shown_at < NOTICE_DURATION
    }
}

/// The running ride and the last frame it produced.
#[derive(Resource)]
pub struct RideState {
    pub session: RideSession,
    pub frame: Frame,
    pub notice: Option<Notice>,
}

impl RideState {
    pub fn new(session: RideSession) -> Self {
        let frame = session.frame();
        Self {
            session,
            frame,
            notice: None,
        }
    }

    /// Queue a direction for the next curve.
    pub fn select(&mut self, direction: Direction, now: f64) {
        if self.session.select(direction, now) == SelectOutcome::Accepted {
            self.notice = None;
        }
        self.frame = self.session.frame();
    }

    /// Drop a queued direction.
    pub fn cancel(&mut self, now: f64) {
        self.session.cancel(now);
        self.frame = self.session.frame();
    }

    /// Seconds until the queued direction commits, if one is queued.
    pub fn commit_in(&self, now: f64) -> Option<f64> {
        self.session
            .animator()
            .commit_at()
            .map(|at| (at - now).max(0.0))
    }

    fn tick(&mut self, now: f64) {
        self.frame = self.session.tick(now);
        for event in self.session.drain_events() {
            log_event(&event);
            if let Some((text, warning)) = describe_event(&event) {
                self.notice = Some(Notice {
                    text,
                    shown_at: now,
                    warning,
                });
            }
        }
    }
}

/// Frame phases of the ride. Drawing reads the pose written in `Advance`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RideSet {
    /// Input, session tick and camera pose.
    Advance,
    /// Gizmo drawing of track and scenery.
    Draw,
}

/// Order the ride sets within `Update`.
pub fn configure_ride_sets(app: &mut App) {
    app.configure_sets(Update, (RideSet::Advance, RideSet::Draw).chain());
}

/// Plugin that runs the ride.
pub struct RidePlugin;

impl Plugin for RidePlugin {
    fn build(&self, app: &mut App) {
        configure_ride_sets(app);
        app.add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (handle_ride_input, tick_ride, apply_pose)
                    .chain()
                    .in_set(RideSet::Advance),
            )
            .add_systems(Update, draw_track.in_set(RideSet::Draw));
    }
}

fn spawn_camera(mut commands: Commands, ride: Res<RideState>) {
    let pose = ride.frame.pose;

    commands.spawn((
        RideCamera,
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Transform::from_translation(pose.position).with_rotation(pose.rotation()),
        Projection::Perspective(PerspectiveProjection {
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..Default::default()
        }),
        default_ride_input_map(),
        ActionState::<RideAction>::default(),
    ));

    tracing::info!("Ride started - A/D or click either half of the window to pick a direction");
}

fn handle_ride_input(
    action_query: Query<&ActionState<RideAction>, With<RideCamera>>,
    window: Single<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
    mut ride: ResMut<RideState>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };
    let now = time.elapsed_secs_f64();

    if action_state.just_pressed(&RideAction::Cancel) {
        ride.cancel(now);
    }

    let tapped = if action_state.just_pressed(&RideAction::Tap) {
        window
            .cursor_position()
            .map(|cursor| tap_direction(cursor.x, window.width()))
    } else {
        None
    };

    if action_state.just_pressed(&RideAction::TurnLeft) {
        ride.select(Direction::Left, now);
    } else if action_state.just_pressed(&RideAction::TurnRight) {
        ride.select(Direction::Right, now);
    } else if let Some(direction) = tapped {
        ride.select(direction, now);
    }
}

/// The half of the window a click landed in picks the direction.
fn tap_direction(cursor_x: f32, width: f32) -> Direction {
    if cursor_x < width / 2.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

fn tick_ride(time: Res<Time>, mut ride: ResMut<RideState>) {
    ride.tick(time.elapsed_secs_f64());
}

fn apply_pose(ride: Res<RideState>, mut camera: Single<&mut Transform, With<RideCamera>>) {
    let pose = ride.frame.pose;
    camera.translation = pose.position;
    camera.rotation = pose.rotation();
}

fn draw_track(mut gizmos: Gizmos, ride: Res<RideState>, params: Res<LaunchParams>) {
    let z = ride.frame.pose.position.z;
    let far = z - params.draw_distance;
    let near = z + DRAW_BEHIND;

    for segment in ride.session.track().segments() {
        if segment.position < far {
            break;
        }
        for rail in &segment.geometry.rails {
            for piece in rail.iter().filter(|p| p.position.z <= near) {
                let (a, b) = rail_line(piece);
                gizmos.line(a, b, RAIL_COLOR);
            }
        }
        for tie in segment.geometry.ties.iter().filter(|p| p.position.z <= near) {
            let (a, b) = tie_line(tie);
            gizmos.line(a, b, TIE_COLOR);
        }
    }
}

/// A rail piece runs along its heading.
fn rail_line(piece: &Placement) -> (Vec3, Vec3) {
    let along = Vec3::new(piece.heading.sin(), 0.0, piece.heading.cos()) * RAIL_HALF_LENGTH;
    (piece.position - along, piece.position + along)
}

/// A tie runs across its heading.
fn tie_line(tie: &Placement) -> (Vec3, Vec3) {
    let across = Vec3::new(tie.heading.cos(), 0.0, -tie.heading.sin()) * TIE_HALF_WIDTH;
    (tie.position - across, tie.position + across)
}

fn log_event(event: &RideEvent) {
    match event {
        RideEvent::SpliceWindowMissed { direction, error } => {
            tracing::warn!("{direction} curve missed: {error}");
        }
        RideEvent::SegmentsRecycled { count } => {
            tracing::debug!("Recycled {count} segments");
        }
        RideEvent::SelectionIgnored { direction } => {
            tracing::debug!("Ignored {direction} selection");
        }
        other => tracing::info!("{other:?}"),
    }
}

/// HUD text for an event, flagged when it is a warning.
fn describe_event(event: &RideEvent) -> Option<(String, bool)> {
    match event {
        RideEvent::CurveEntered { direction, .. } => {
            Some((format!("Sharp {direction} curve!"), false))
        }
        RideEvent::SpliceWindowMissed { .. } => Some((
            "Missed the junction - pick a direction again".to_owned(),
            true,
        )),
        RideEvent::SelectionCancelled { direction } => {
            Some((format!("Cancelled {direction} turn"), false))
        }
        RideEvent::DirectionQueued { .. }
        | RideEvent::SelectionIgnored { .. }
        | RideEvent::CurveCompleted { .. }
        | RideEvent::SegmentsRecycled { .. } => None,
    }
}
