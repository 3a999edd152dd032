//! Launch parameter parsing for the viewer.

use std::{fs, path::PathBuf};

use bevy::prelude::*;
use clap::Parser;
use railride::RideConfig;

/// Default scenery seed.
const DEFAULT_SEED: u64 = 0x7261_696c;
/// Default number of building rows along the line.
const DEFAULT_BUILDING_ROWS: u32 = 300;
/// Default distance to draw track and scenery, in world units.
const DEFAULT_DRAW_DISTANCE: f32 = 300.0;

/// Launch parameters for the viewer.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Ride configuration, already validated by the session on startup.
    pub config: RideConfig,
    /// Seed for the procedural buildings.
    pub seed: u64,
    /// Number of building rows generated along the line.
    pub building_rows: u32,
    /// How far ahead track and scenery are drawn.
    pub draw_distance: f32,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            config: RideConfig::default(),
            seed: DEFAULT_SEED,
            building_rows: DEFAULT_BUILDING_ROWS,
            draw_distance: DEFAULT_DRAW_DISTANCE,
        }
    }
}

#[derive(Parser)]
#[command(about = "First-person train ride through a wireframe city")]
struct CliArgs {
    /// JSON ride configuration; unspecified options keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the procedural buildings.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of building rows generated along the line.
    #[arg(long = "buildings", default_value_t = DEFAULT_BUILDING_ROWS)]
    building_rows: u32,

    /// How far ahead track and scenery are drawn.
    #[arg(long, default_value_t = DEFAULT_DRAW_DISTANCE)]
    draw_distance: f32,
}

fn load_config(path: &PathBuf) -> Result<RideConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Parse launch parameters from CLI args.
///
/// A config file that cannot be loaded is reported and replaced by the defaults.
pub fn parse() -> LaunchParams {
    let args = CliArgs::parse();
    let config = match args.config.as_ref().map(load_config) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::error!("{e}; using the default ride configuration");
            RideConfig::default()
        }
        None => RideConfig::default(),
    };

    LaunchParams {
        config,
        seed: args.seed,
        building_rows: args.building_rows,
        draw_distance: args.draw_distance.max(1.0),
    }
}
