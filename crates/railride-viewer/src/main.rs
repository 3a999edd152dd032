//! First-person train ride through a wireframe city.
//!
//! The ride itself runs in the `railride` crate; this binary draws the track
//! and buildings with gizmos, binds rider input and shows an egui HUD.
//!
//! Run with: cargo run -p railride-viewer -- --seed 7 --config ride.json

mod hud;
mod input;
mod launch_params;
mod ride;
mod scenery;

use bevy::prelude::*;
use hud::HudPlugin;
use input::RideInputPlugin;
use railride::RideSession;
use ride::{RidePlugin, RideState};
use scenery::SceneryPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((RideInputPlugin, RidePlugin, SceneryPlugin, HudPlugin));
    }
}

fn main() -> AppExit {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let params = launch_params::parse();
    let session = match RideSession::new(params.config.clone()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Invalid ride configuration: {e}");
            return AppExit::error();
        }
    };

    let mut app = App::new();

    let window = Window {
        title: "railride".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params)
        .insert_resource(RideState::new(session))
        .add_plugins(AppPlugin)
        .run()
}
