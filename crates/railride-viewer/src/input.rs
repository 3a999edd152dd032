//! Rider input actions.
//!
//! Keyboard and pointer bindings go through `leafwing-input-manager` so the
//! ride systems only ever see `RideAction`s. Input is routed away from the
//! ride while egui is using the keyboard or pointer.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

/// Actions the rider can take.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum RideAction {
    /// Take the next curve to the left (A / Left arrow).
    TurnLeft,
    /// Take the next curve to the right (D / Right arrow).
    TurnRight,
    /// Drop a queued direction before it commits (Escape / Backspace).
    Cancel,
    /// Pick a direction from the half of the window that was clicked.
    Tap,
    /// Toggle the HUD (Q).
    ToggleHud,
}

/// Create the default input map for ride actions.
pub fn default_ride_input_map() -> InputMap<RideAction> {
    InputMap::default()
        .with(RideAction::TurnLeft, KeyCode::KeyA)
        .with(RideAction::TurnLeft, KeyCode::ArrowLeft)
        .with(RideAction::TurnRight, KeyCode::KeyD)
        .with(RideAction::TurnRight, KeyCode::ArrowRight)
        .with(RideAction::Cancel, KeyCode::Escape)
        .with(RideAction::Cancel, KeyCode::Backspace)
        .with(RideAction::Tap, MouseButton::Left)
        .with(RideAction::ToggleHud, KeyCode::KeyQ)
}

/// Plugin that registers the action type and input focus management.
pub struct RideInputPlugin;

impl Plugin for RideInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<RideAction>::default())
            .add_systems(
                PreUpdate,
                manage_input_focus.after(InputManagerSystem::Update),
            );
    }
}

const KEYBOARD_ACTIONS: &[RideAction] = &[
    RideAction::TurnLeft,
    RideAction::TurnRight,
    RideAction::Cancel,
];

fn set_actions(action_state: &mut ActionState<RideAction>, actions: &[RideAction], enabled: bool) {
    for action in actions {
        if enabled {
            action_state.enable_action(action);
        } else {
            action_state.disable_action(action);
        }
    }
}

/// Disable keyboard actions while egui has keyboard focus, and the tap action
/// while the pointer is over an egui area. `ToggleHud` is always enabled.
fn manage_input_focus(
    mut action_query: Query<&mut ActionState<RideAction>>,
    mut contexts: EguiContexts,
) {
    let (wants_kb, wants_pointer) = contexts.ctx_mut().ok().map_or((false, false), |ctx| {
        (ctx.wants_keyboard_input(), ctx.is_pointer_over_area())
    });

    for mut action_state in &mut action_query {
        action_state.enable_action(&RideAction::ToggleHud);
        set_actions(&mut action_state, KEYBOARD_ACTIONS, !wants_kb);
        set_actions(&mut action_state, &[RideAction::Tap], !wants_pointer);
    }
}
