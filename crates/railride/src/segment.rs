//! Track segment geometry generation.
//!
//! Segments are described as lists of placements (a position plus a yaw) for
//! rail pieces and ties. How a placement is drawn is up to the renderer.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::{Direction, Error, RideConfig, Result};

/// Height of rail pieces above the ground plane.
pub const RAIL_HEIGHT: f32 = 0.05;

/// A single rail piece or tie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Centre of the piece in world space.
    pub position: Vec3,
    /// Rotation about +Y (radians). A rail piece runs along the rotated +Z
    /// axis and a tie along the rotated +X axis.
    pub heading: f32,
}

/// Geometry of one segment.
///
/// For straight segments `rails[0]` is the left rail and `rails[1]` the right.
/// For curves `rails[0]` is the inner rail and `rails[1]` the outer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentGeometry {
    pub rails: [Vec<Placement>; 2],
    pub ties: Vec<Placement>,
}

/// Shape of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    /// Straight run; `length` is measured in ties.
    Straight { length: f32 },
    /// Quarter-circle curve.
    Curve {
        direction: Direction,
        radius: f32,
        arc_length: f32,
    },
}

impl SegmentKind {
    #[must_use]
    pub fn is_curve(&self) -> bool {
        matches!(self, Self::Curve { .. })
    }

    /// Curve direction, if this is a curve.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Curve { direction, .. } => Some(*direction),
            Self::Straight { .. } => None,
        }
    }
}

/// One unit of track at a fixed position along the travel axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start of the segment along Z. Segments extend towards negative Z.
    pub position: f32,
    pub kind: SegmentKind,
    pub geometry: SegmentGeometry,
}

/// Produces straight and curved segments for a fixed gauge and tie spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentGenerator {
    gauge: f32,
    tie_spacing: f32,
    curve_steps: usize,
}

impl SegmentGenerator {
    /// Create a generator; fails if gauge, spacing or step count are unusable.
    pub fn new(gauge: f32, tie_spacing: f32, curve_steps: usize) -> Result<Self> {
        if !(gauge.is_finite() && gauge > 0.0) {
            return Err(Error::InvalidConfig {
                field: "gauge",
                detail: format!("must be positive, got {gauge}"),
            });
        }
        if !(tie_spacing.is_finite() && tie_spacing > 0.0) {
            return Err(Error::InvalidConfig {
                field: "tie_spacing",
                detail: format!("must be positive, got {tie_spacing}"),
            });
        }
        if curve_steps == 0 {
            return Err(Error::InvalidConfig {
                field: "curve_steps",
                detail: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            gauge,
            tie_spacing,
            curve_steps,
        })
    }

    /// Create a generator from a ride configuration.
    pub fn from_config(config: &RideConfig) -> Result<Self> {
        Self::new(config.gauge, config.tie_spacing, config.curve_steps)
    }

    #[must_use]
    pub fn gauge(&self) -> f32 {
        self.gauge
    }

    /// Generate a straight segment starting at `start` and running `length`
    /// ties towards negative Z.
    ///
    /// Rail pieces are laid every half tie spacing and a tie goes on every
    /// other rail step, giving `floor(length)` ties.
    #[must_use]
    pub fn generate_straight(&self, start: f32, length: f32) -> Segment {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "clamped to non-negative; oversized lengths saturate"
        )]
        let tie_count = length.max(0.0).floor() as usize;
        let rail_step = self.tie_spacing / 2.0;
        let half_gauge = self.gauge / 2.0;

        let mut geometry = SegmentGeometry::default();
        for i in 0..tie_count * 2 {
            let z = start - i as f32 * rail_step;
            geometry.rails[0].push(Placement {
                position: Vec3::new(-half_gauge, RAIL_HEIGHT, z),
                heading: 0.0,
            });
            geometry.rails[1].push(Placement {
                position: Vec3::new(half_gauge, RAIL_HEIGHT, z),
                heading: 0.0,
            });
            if i % 2 == 0 {
                geometry.ties.push(Placement {
                    position: Vec3::new(0.0, 0.0, z),
                    heading: 0.0,
                });
            }
        }

        Segment {
            position: start,
            kind: SegmentKind::Straight { length },
            geometry,
        }
    }

    /// Generate a quarter-circle curve starting at `start`.
    ///
    /// The arc centre sits at `(sign * radius, start)`. Each rail is traced at
    /// its own radius about that centre, so the outer rail is always exactly
    /// one gauge further out than the inner rail.
    pub fn generate_curve(&self, start: f32, direction: Direction, radius: f32) -> Result<Segment> {
        if !radius.is_finite() || radius <= self.gauge / 2.0 {
            return Err(Error::InvalidGeometry {
                radius,
                gauge: self.gauge,
            });
        }

        let sign = direction.sign();
        let center_x = sign * radius;
        let angle_step = FRAC_PI_2 / self.curve_steps as f32;
        let radii = [radius - self.gauge / 2.0, radius + self.gauge / 2.0];

        let arc_point = |r: f32, angle: f32, height: f32| {
            Vec3::new(
                center_x - sign * r * angle.cos(),
                height,
                start - r * angle.sin(),
            )
        };

        let mut geometry = SegmentGeometry::default();
        for i in 0..self.curve_steps {
            let angle = angle_step * i as f32;
            // Rotating +Z by this heading gives the arc tangent.
            let heading = -sign * angle;

            for (rail, r) in geometry.rails.iter_mut().zip(radii) {
                rail.push(Placement {
                    position: arc_point(r, angle, RAIL_HEIGHT),
                    heading,
                });
            }
            if i % 2 == 0 {
                geometry.ties.push(Placement {
                    position: arc_point(radius, angle, 0.0),
                    heading,
                });
            }
        }

        Ok(Segment {
            position: start,
            kind: SegmentKind::Curve {
                direction,
                radius,
                arc_length: radius * FRAC_PI_2,
            },
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn generator() -> SegmentGenerator {
        SegmentGenerator::new(2.0, 1.5, 30).unwrap()
    }

    #[test]
    fn test_straight_layout() {
        let segment = generator().generate_straight(-15.0, 10.0);

        assert_eq!(segment.position, -15.0);
        assert_eq!(segment.geometry.ties.len(), 10);
        assert_eq!(segment.geometry.rails[0].len(), 20);
        assert_eq!(segment.geometry.rails[1].len(), 20);

        // Rails sit one half-gauge either side of the centreline.
        for (left, right) in segment.geometry.rails[0]
            .iter()
            .zip(&segment.geometry.rails[1])
        {
            assert_eq!(left.position.x, -1.0);
            assert_eq!(right.position.x, 1.0);
            assert_eq!(left.position.z, right.position.z);
        }

        // Ties are one tie spacing apart, starting at the segment start.
        assert_eq!(segment.geometry.ties[0].position.z, -15.0);
        assert!((segment.geometry.ties[1].position.z - -16.5).abs() < 1e-5);
    }

    #[test]
    fn test_straight_fractional_length() {
        let segment = generator().generate_straight(0.0, 3.7);
        assert_eq!(segment.geometry.ties.len(), 3);
        assert_eq!(segment.kind, SegmentKind::Straight { length: 3.7 });
    }

    #[test]
    fn test_curve_starts_on_centreline() {
        for direction in [Direction::Left, Direction::Right] {
            let segment = generator().generate_curve(-45.0, direction, 20.0).unwrap();
            let first_tie = segment.geometry.ties[0].position;
            assert!(first_tie.x.abs() < 1e-5);
            assert!((first_tie.z - -45.0).abs() < 1e-5);
            assert_eq!(segment.geometry.rails[0].len(), 30);
            assert_eq!(segment.geometry.ties.len(), 15);
        }
    }

    #[test]
    fn test_curve_direction_flips_lateral_only() {
        let left = generator().generate_curve(0.0, Direction::Left, 20.0).unwrap();
        let right = generator().generate_curve(0.0, Direction::Right, 20.0).unwrap();

        for (l, r) in left.geometry.ties.iter().zip(&right.geometry.ties) {
            assert!((l.position.x + r.position.x).abs() < 1e-4);
            assert!((l.position.z - r.position.z).abs() < 1e-6);
            assert!((l.heading + r.heading).abs() < 1e-6);
        }

        // Later ties bend away from the centreline in the chosen direction.
        let last = left.geometry.ties.last().unwrap();
        assert!(last.position.x < 0.0);
        assert!(right.geometry.ties.last().unwrap().position.x > 0.0);
    }

    #[test]
    fn test_curve_kind() {
        let segment = generator().generate_curve(0.0, Direction::Right, 20.0).unwrap();
        let SegmentKind::Curve {
            direction,
            radius,
            arc_length,
        } = segment.kind
        else {
            panic!("expected curve");
        };
        assert_eq!(direction, Direction::Right);
        assert_eq!(radius, 20.0);
        assert!((arc_length - 20.0 * FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_radius_rejected() {
        let result = generator().generate_curve(0.0, Direction::Left, 1.0);
        assert_eq!(
            result,
            Err(Error::InvalidGeometry {
                radius: 1.0,
                gauge: 2.0
            })
        );
    }

    #[test]
    fn test_curve_heading_follows_rails() {
        use glam::Quat;

        for direction in [Direction::Left, Direction::Right] {
            let segment = generator().generate_curve(0.0, direction, 20.0).unwrap();
            for rail in &segment.geometry.rails {
                for pair in rail.windows(2) {
                    let tangent = (pair[1].position - pair[0].position).normalize();
                    let mid_heading = (pair[0].heading + pair[1].heading) / 2.0;
                    let along = Quat::from_rotation_y(mid_heading) * Vec3::Z;
                    assert!(
                        along.dot(tangent).abs() > 0.999,
                        "{direction}: along {along} tangent {tangent}"
                    );
                }
            }

            // Ties lie across the rails.
            let tie = segment.geometry.ties[7];
            let across = Quat::from_rotation_y(tie.heading) * Vec3::X;
            let rail = &segment.geometry.rails[1];
            let tangent = (rail[15].position - rail[14].position).normalize();
            assert!(across.dot(tangent).abs() < 0.06, "{direction}: across {across}");
        }
    }

    proptest! {
        #[test]
        fn prop_straight_tie_count(start in -1000.0f32..0.0, length in 0.0f32..40.0) {
            let segment = generator().generate_straight(start, length);
            prop_assert_eq!(segment.geometry.ties.len(), length.floor() as usize);
            prop_assert_eq!(segment.geometry.rails[0].len(), 2 * length.floor() as usize);
        }

        #[test]
        fn prop_curve_rail_separation_is_gauge(
            start in -1000.0f32..0.0,
            radius in 1.5f32..200.0,
            gauge in 0.5f32..3.0,
            right in any::<bool>(),
        ) {
            prop_assume!(radius > gauge / 2.0);
            let direction = if right { Direction::Right } else { Direction::Left };
            let generator = SegmentGenerator::new(gauge, 1.5, 30).unwrap();
            let segment = generator.generate_curve(start, direction, radius).unwrap();
            let centre = Vec3::new(direction.sign() * radius, RAIL_HEIGHT, start);

            for (inner, outer) in segment.geometry.rails[0].iter().zip(&segment.geometry.rails[1]) {
                let inner_r = inner.position.distance(centre);
                let outer_r = outer.position.distance(centre);
                prop_assert!((outer_r - inner_r - gauge).abs() < 1e-2 * (1.0 + radius / 50.0));
            }
        }
    }
}
