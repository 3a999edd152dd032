//! Ride telemetry logging.
//!
//! Outputs one CSV row per simulated frame. Supports multiple output
//! destinations via the `TelemetryOutput` trait.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use glam::EulerRot;
use railride::{Frame, RideMode};

/// Snapshot of viewpoint state for telemetry logging.
pub struct TelemetrySnapshot {
    pub elapsed: f64,
    pub frame: Frame,
}

/// Trait for telemetry output destinations.
pub trait TelemetryOutput {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str);
    /// Write a data row.
    fn write_row(&mut self, row: &str);
    /// Flush buffered output, reporting the first write error if any.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Buffered output to any writer.
///
/// The first write error is kept and returned from `finish`; later lines are
/// dropped.
pub struct WriterTelemetryOutput<W: Write> {
    writer: BufWriter<W>,
    error: Option<io::Error>,
}

/// Stdout output (default for the simulator).
pub type StdoutTelemetryOutput = WriterTelemetryOutput<io::Stdout>;

/// File output, truncated when created.
pub type FileTelemetryOutput = WriterTelemetryOutput<File>;

impl<W: Write> WriterTelemetryOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            error: None,
        }
    }

    fn write_line(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{line}") {
            tracing::debug!("Telemetry write failed: {e}");
            self.error = Some(e);
        }
    }
}

impl StdoutTelemetryOutput {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl FileTelemetryOutput {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> TelemetryOutput for WriterTelemetryOutput<W> {
    fn write_header(&mut self, header: &str) {
        self.write_line(header);
    }

    fn write_row(&mut self, row: &str) {
        self.write_line(row);
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()
    }
}

/// In-memory output, used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTelemetryOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl TelemetryOutput for MemoryTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        self.lines.push(header.to_string());
    }

    fn write_row(&mut self, row: &str) {
        self.lines.push(row.to_string());
    }
}

fn mode_label(mode: RideMode) -> &'static str {
    match mode {
        RideMode::Straight => "straight",
        RideMode::PendingCurve => "pending",
        RideMode::CurveFollowing => "curve",
    }
}

/// Macro to define CSV schema and generate telemetry functions.
///
/// This generates both `reset_telemetry_to()` and `emit_telemetry_to()`
/// from a single schema definition, keeping column names and formats in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// Write the CSV header to an output.
        pub fn reset_telemetry_to(output: &mut dyn TelemetryOutput) {
            const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );
            output.write_header(CSV_HEADER.trim_end_matches(','));
        }

        /// Write one telemetry row to an output.
        pub fn emit_telemetry_to($snapshot: &TelemetrySnapshot, output: &mut dyn TelemetryOutput) {
            // Execute prelude to compute derived values.
            $( $prelude )*

            // Generate row from schema, then trim trailing comma.
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            output.write_row(line.trim_end_matches(','));
        }
    };
}

define_telemetry! {
    columns: {
        t: "{:.4}",
        mode: "{}",
        dir: "{}",
        fraction: "{:.3}",
        pos_x: "{:.3}",
        pos_y: "{:.3}",
        pos_z: "{:.3}",
        yaw_deg: "{:.2}",
        pitch_deg: "{:.2}",
        tilt_deg: "{:.2}",
        missed: "{}",
        revision: "{}",
    },
    prelude: |s| {
        let f = &s.frame;
        let (yaw, pitch, _) = f.pose.rotation().to_euler(EulerRot::YXZ);
        let direction = f.direction.map_or_else(|| "-".to_string(), |d| d.to_string());
    },
    row_values: {
        s.elapsed,
        mode_label(f.mode),
        direction,
        f.fraction.unwrap_or(0.0),
        f.pose.position.x,
        f.pose.position.y,
        f.pose.position.z,
        yaw.to_degrees(),
        pitch.to_degrees(),
        f.pose.tilt.to_degrees(),
        u8::from(f.splice_missed),
        f.track_revision,
    }
}

#[cfg(test)]
mod tests {
    use railride::{Pose, RideMode};

    use super::*;

    #[test]
    fn test_header_and_row_agree() {
        let mut output = MemoryTelemetryOutput::default();
        reset_telemetry_to(&mut output);

        let snapshot = TelemetrySnapshot {
            elapsed: 1.5,
            frame: Frame {
                pose: Pose::new(glam::Vec3::new(0.0, 1.0, -3.0)),
                mode: RideMode::PendingCurve,
                direction: Some(railride::Direction::Left),
                fraction: None,
                splice_missed: false,
                track_revision: 2,
            },
        };
        emit_telemetry_to(&snapshot, &mut output);

        assert_eq!(output.lines.len(), 2);
        let header: Vec<_> = output.lines[0].split(',').collect();
        let row: Vec<_> = output.lines[1].split(',').collect();
        assert_eq!(header.len(), row.len());
        assert_eq!(header[0], "t");
        assert_eq!(row[0], "1.5000");
        assert_eq!(row[1], "pending");
        assert_eq!(row[2], "left");
        assert_eq!(row[6], "-3.000");
        assert_eq!(row[11], "2");
    }

    /// A writer with no space left.
    struct FullWriter;

    impl Write for FullWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_surfaces_on_finish() {
        let mut output = WriterTelemetryOutput::new(FullWriter);
        reset_telemetry_to(&mut output);
        // Enough rows to overflow the buffer and hit the writer mid-run.
        let row = "x".repeat(100);
        for _ in 0..200 {
            output.write_row(&row);
        }

        let err = output.finish().unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
    }

    #[test]
    fn test_buffered_error_surfaces_on_finish() {
        // A short run stays in the buffer until the final flush.
        let mut output = WriterTelemetryOutput::new(FullWriter);
        reset_telemetry_to(&mut output);
        assert!(output.finish().is_err());
    }

    #[test]
    fn test_finish_flushes_rows() {
        let mut sink = Vec::new();
        {
            let mut output = WriterTelemetryOutput::new(&mut sink);
            output.write_header("a,b");
            output.write_row("1,2");
            output.finish().unwrap();
        }
        assert_eq!(String::from_utf8(sink).unwrap(), "a,b\n1,2\n");
    }
}
