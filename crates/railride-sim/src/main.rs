//! Headless train ride simulator.
//!
//! Drives a `RideSession` with a fixed timestep and a script of rider inputs,
//! writing per-frame telemetry as CSV and a summary to stderr.
//!
//! Run with: cargo run -p railride-sim -- --select left@2 --select right@9 --duration 15
//! Telemetry goes to stdout unless `--telemetry <path>` is given.

mod script;
mod telemetry;

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use railride::{RideConfig, RideEvent, RideSession, RideSummary};

use script::{Script, ScriptAction, ScriptedInput};
use telemetry::{
    FileTelemetryOutput, StdoutTelemetryOutput, TelemetryOutput, TelemetrySnapshot,
    emit_telemetry_to, reset_telemetry_to,
};

/// Command-line arguments for the simulator.
#[derive(Parser, Debug)]
#[command(name = "railride-sim", about = "Replay a scripted train ride")]
struct Args {
    /// JSON ride configuration; unspecified options keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timed input, `left@SECONDS`, `right@SECONDS` or `cancel@SECONDS`.
    #[arg(long = "select", value_name = "ACTION@SECONDS")]
    inputs: Vec<ScriptedInput>,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 12.0)]
    duration: f64,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Write telemetry CSV to this file instead of stdout.
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Skip telemetry entirely and only print the summary.
    #[arg(long)]
    quiet: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<RideConfig, String> {
    let Some(path) = path else {
        return Ok(RideConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Run the ride to completion, emitting telemetry for each frame.
fn simulate(
    mut session: RideSession,
    mut script: Script,
    frames: u32,
    fps: u32,
    mut output: Option<&mut dyn TelemetryOutput>,
) -> RideSummary {
    if let Some(out) = output.as_deref_mut() {
        reset_telemetry_to(out);
    }

    for i in 1..=frames {
        let now = f64::from(i) / f64::from(fps);

        for input in script.due(now) {
            match input.action {
                ScriptAction::Select(direction) => {
                    session.select(direction, input.at);
                }
                ScriptAction::Cancel => {
                    session.cancel(input.at);
                }
            }
        }

        let frame = session.tick(now);
        for event in session.drain_events() {
            log_event(now, &event);
        }

        if let Some(out) = output.as_deref_mut() {
            let snapshot = TelemetrySnapshot {
                elapsed: now,
                frame,
            };
            emit_telemetry_to(&snapshot, out);
        }
    }

    session.finish()
}

fn log_event(now: f64, event: &RideEvent) {
    match event {
        RideEvent::SpliceWindowMissed { direction, error } => {
            eprintln!("# t={now:.2}: {direction} curve missed its splice window ({error})");
        }
        RideEvent::CurveEntered {
            direction,
            position,
        } => {
            eprintln!("# t={now:.2}: entering {direction} curve at z={position}");
        }
        RideEvent::CurveCompleted { direction } => {
            eprintln!("# t={now:.2}: {direction} curve complete");
        }
        other => tracing::debug!("t={now:.2}: {other:?}"),
    }
}

fn print_summary(summary: &RideSummary) {
    eprintln!();
    eprintln!("# === Ride summary ===");
    eprintln!("# Frames: {}", summary.frames);
    eprintln!("# Distance: {:.1}", summary.distance);
    eprintln!("# Curves completed: {}", summary.curves_completed);
    eprintln!("# Windows missed: {}", summary.windows_missed);
    eprintln!("# Selections ignored: {}", summary.selections_ignored);
    eprintln!("# Selections cancelled: {}", summary.selections_cancelled);
}

fn main() -> ExitCode {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args = Args::parse();

    if args.fps == 0 || !(args.duration.is_finite() && args.duration > 0.0) {
        tracing::error!("--fps and --duration must be positive");
        return ExitCode::FAILURE;
    }

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let session = match RideSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Invalid ride configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(frames) = frame_count(args.duration, args.fps) else {
        tracing::error!(
            "{}s at {} fps is more frames than can be simulated",
            args.duration,
            args.fps
        );
        return ExitCode::FAILURE;
    };
    let script = Script::new(args.inputs);

    let (summary, written) = if args.quiet {
        (simulate(session, script, frames, args.fps, None), Ok(()))
    } else if let Some(path) = &args.telemetry {
        let mut file = match FileTelemetryOutput::create(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to create {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        let summary = simulate(session, script, frames, args.fps, Some(&mut file));
        (summary, file.finish())
    } else {
        let mut stdout = StdoutTelemetryOutput::stdout();
        let summary = simulate(session, script, frames, args.fps, Some(&mut stdout));
        (summary, stdout.finish())
    };

    print_summary(&summary);
    if let Err(e) = written {
        tracing::error!("Failed to write telemetry: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Number of frames covering `duration` seconds, if it fits in a `u32`.
fn frame_count(duration: f64, fps: u32) -> Option<u32> {
    let frames = (duration * f64::from(fps)).ceil();
    if !(0.0..=f64::from(u32::MAX)).contains(&frames) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "range checked above"
    )]
    let frames = frames as u32;
    Some(frames)
}

#[cfg(test)]
mod tests {
    use railride::Direction;

    use super::*;
    use crate::telemetry::{MemoryTelemetryOutput, WriterTelemetryOutput};

    #[test]
    fn test_scripted_ride() {
        let session = RideSession::new(RideConfig::default()).unwrap();
        let script = Script::new(vec![
            ScriptedInput {
                at: 1.0,
                action: ScriptAction::Select(Direction::Left),
            },
            // Ignored: the first choice is still pending.
            ScriptedInput {
                at: 1.5,
                action: ScriptAction::Select(Direction::Right),
            },
        ]);

        let mut output = MemoryTelemetryOutput::default();
        let summary = simulate(session, script, 600, 60, Some(&mut output));

        assert_eq!(summary.frames, 600);
        assert_eq!(summary.curves_completed, 1);
        assert_eq!(summary.selections_ignored, 1);
        assert_eq!(summary.windows_missed, 0);
        // Header plus one row per frame.
        assert_eq!(output.lines.len(), 601);
        assert!(output.lines.iter().any(|l| l.contains(",curve,left,")));
    }

    #[test]
    fn test_frame_count_bounds() {
        assert_eq!(frame_count(12.0, 60), Some(720));
        assert_eq!(frame_count(0.01, 60), Some(1));
        assert_eq!(frame_count(1e12, 240), None);
        assert_eq!(frame_count(f64::NAN, 60), None);
    }

    #[test]
    fn test_unwritable_telemetry_is_reported() {
        struct Rejecting;

        impl std::io::Write for Rejecting {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let session = RideSession::new(RideConfig::default()).unwrap();
        let mut output = WriterTelemetryOutput::new(Rejecting);
        let summary = simulate(session, Script::new(Vec::new()), 120, 60, Some(&mut output));

        // The ride itself still completes.
        assert_eq!(summary.frames, 120);
        assert!(output.finish().is_err());
    }

    #[test]
    fn test_cancelled_ride_stays_straight() {
        let session = RideSession::new(RideConfig::default()).unwrap();
        let script = Script::new(vec![
            "right@1".parse().unwrap(),
            "cancel@1.5".parse().unwrap(),
        ]);

        let summary = simulate(session, script, 300, 60, None);
        assert_eq!(summary.curves_completed, 0);
        assert_eq!(summary.selections_cancelled, 1);
    }
}
