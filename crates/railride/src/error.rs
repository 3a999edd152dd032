//! Error types for the ride core.

use std::fmt;

/// Result type for ride operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or driving a ride.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Curve radius too small for the track gauge; the inner rail would
    /// collapse through the curve centre.
    InvalidGeometry {
        /// Requested curve radius.
        radius: f32,
        /// Track gauge.
        gauge: f32,
    },
    /// A configuration option is out of range.
    InvalidConfig {
        /// Name of the offending option.
        field: &'static str,
        /// Description of what was wrong.
        detail: String,
    },
    /// No track segment lay inside the lookahead window when a curve was
    /// committed.
    SpliceWindowMissed {
        /// Viewpoint position along the travel axis at commit time.
        viewpoint_z: f32,
        /// Near edge of the window (inclusive).
        near: f32,
        /// Far edge of the window (exclusive).
        far: f32,
    },
    /// A previously spliced curve has not been traversed yet.
    SplicePending {
        /// Position of the pending curve segment.
        position: f32,
    },
}

impl Error {
    /// Whether the error invalidates the whole session.
    ///
    /// Configuration errors are fatal at setup; splice errors only discard the
    /// current direction choice.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidGeometry { .. } | Self::InvalidConfig { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { radius, gauge } => {
                write!(
                    f,
                    "curve radius {radius} must exceed half the track gauge ({})",
                    gauge / 2.0
                )
            }
            Self::InvalidConfig { field, detail } => {
                write!(f, "invalid {field}: {detail}")
            }
            Self::SpliceWindowMissed {
                viewpoint_z,
                near,
                far,
            } => {
                write!(
                    f,
                    "no track segment in splice window ({far}, {near}] ahead of z={viewpoint_z}"
                )
            }
            Self::SplicePending { position } => {
                write!(f, "curve at z={position} has not been traversed yet")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(
            Error::InvalidGeometry {
                radius: 0.5,
                gauge: 2.0
            }
            .is_fatal()
        );
        assert!(!Error::SplicePending { position: -45.0 }.is_fatal());
        assert!(
            !Error::SpliceWindowMissed {
                viewpoint_z: 0.0,
                near: -30.0,
                far: -50.0
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidGeometry {
            radius: 0.5,
            gauge: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "curve radius 0.5 must exceed half the track gauge (1)"
        );
    }
}
