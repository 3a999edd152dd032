//! egui overlay with the ride status and direction buttons.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use leafwing_input_manager::prelude::*;
use railride::{Direction, RideMode};

use crate::{input::RideAction, ride::RideState};

/// Resource controlling whether the HUD is visible.
#[derive(Resource)]
pub struct HudVisible(pub bool);

impl Default for HudVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Plugin for the HUD overlay.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<HudVisible>()
            .add_systems(Update, toggle_hud_visible)
            .add_systems(
                EguiPrimaryContextPass,
                hud_system.run_if(|visible: Res<HudVisible>| visible.0),
            );
    }
}

/// Toggle HUD visibility with Q.
fn toggle_hud_visible(
    action_query: Query<&ActionState<RideAction>>,
    mut visible: ResMut<HudVisible>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&RideAction::ToggleHud) {
        visible.0 = !visible.0;
    }
}

fn arrows(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "<<<",
        Direction::Right => ">>>",
    }
}

fn status_line(mode: RideMode, direction: Option<Direction>) -> String {
    match (mode, direction) {
        (RideMode::CurveFollowing, Some(direction)) => {
            format!("{}  Sharp curve!  {}", arrows(direction), arrows(direction))
        }
        (RideMode::PendingCurve, Some(direction)) => format!("Turning {direction} at the next junction"),
        _ => "Pick a direction: left or right".to_owned(),
    }
}

/// Render the HUD overlay.
fn hud_system(mut contexts: EguiContexts, time: Res<Time>, mut ride: ResMut<RideState>) -> Result {
    let ctx = contexts.ctx_mut()?;
    let now = time.elapsed_secs_f64();
    let frame = ride.frame;

    let mut selection = None;
    let mut cancel = false;

    egui::Window::new("Ride")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
        .show(ctx, |ui| {
            let heading = egui::RichText::new(status_line(frame.mode, frame.direction)).size(20.0);
            let heading = if frame.mode == RideMode::CurveFollowing {
                heading.strong().color(egui::Color32::YELLOW)
            } else {
                heading.color(egui::Color32::WHITE)
            };
            ui.vertical_centered(|ui| ui.label(heading));

            if let Some(remaining) = ride.commit_in(now) {
                ui.vertical_centered(|ui| ui.label(format!("Committing in {remaining:.1}s")));
            }
            if let Some(fraction) = frame.fraction {
                ui.add(egui::ProgressBar::new(fraction).show_percentage());
            }
            if let Some(notice) = ride.notice.as_ref().filter(|n| n.is_visible(now)) {
                let color = if notice.warning {
                    egui::Color32::LIGHT_RED
                } else {
                    egui::Color32::LIGHT_GREEN
                };
                ui.vertical_centered(|ui| ui.colored_label(color, &notice.text));
            }

            ui.separator();
            let idle = frame.mode == RideMode::Straight;
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(idle, egui::Button::new("<- Left (A)"))
                    .clicked()
                {
                    selection = Some(Direction::Left);
                }
                if ui
                    .add_enabled(
                        frame.mode == RideMode::PendingCurve,
                        egui::Button::new("Cancel (Esc)"),
                    )
                    .clicked()
                {
                    cancel = true;
                }
                if ui
                    .add_enabled(idle, egui::Button::new("Right (D) ->"))
                    .clicked()
                {
                    selection = Some(Direction::Right);
                }
            });
            ui.small(format!(
                "z {:.1}  track rev {}  Q hides this panel",
                frame.pose.position.z, frame.track_revision
            ));
        });

    if cancel {
        ride.cancel(now);
    }
    if let Some(direction) = selection {
        ride.select(direction, now);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_mode() {
        assert_eq!(
            status_line(RideMode::Straight, None),
            "Pick a direction: left or right"
        );
        assert_eq!(
            status_line(RideMode::PendingCurve, Some(Direction::Right)),
            "Turning right at the next junction"
        );
        assert_eq!(
            status_line(RideMode::CurveFollowing, Some(Direction::Left)),
            "<<<  Sharp curve!  <<<"
        );
    }
}
