//! Procedural wireframe city along the line.
//!
//! Buildings are laid out in rows every [`ROW_SPACING`] units ahead of the
//! start. Each row is seeded from the scenery seed and its index, so the
//! layout does not depend on how many rows are generated.

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{launch_params::LaunchParams, ride::RideSet};

/// Distance between building rows along the travel axis.
pub const ROW_SPACING: f32 = 6.0;
/// Z of the first row.
const FIRST_ROW_Z: f32 = -10.0;
/// Buildings behind the viewpoint stay visible for this far.
const DRAW_BEHIND: f32 = 30.0;

/// An axis-aligned box standing on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    /// Centre of the footprint on the ground.
    pub base: Vec3,
    /// Width (X), height (Y) and depth (Z).
    pub size: Vec3,
}

impl Building {
    fn new(x: f32, z: f32, width: f32, height: f32, depth: f32) -> Self {
        Self {
            base: Vec3::new(x, 0.0, z),
            size: Vec3::new(width, height, depth),
        }
    }

    /// The twelve edges of the box.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let half = Vec3::new(self.size.x / 2.0, 0.0, self.size.z / 2.0);
        let min = self.base - half;
        let max = self.base + half + Vec3::Y * self.size.y;
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };

        let mut edges = [(Vec3::ZERO, Vec3::ZERO); 12];
        let mut i = 0;
        for a in [false, true] {
            for b in [false, true] {
                edges[i] = (corner(false, a, b), corner(true, a, b));
                edges[i + 1] = (corner(a, false, b), corner(a, true, b));
                edges[i + 2] = (corner(a, b, false), corner(a, b, true));
                i += 3;
            }
        }
        edges
    }
}

/// Z of a row.
pub fn row_z(row: u32) -> f32 {
    FIRST_ROW_Z - row as f32 * ROW_SPACING
}

/// Generate one row: a building either side of the line, sometimes one far
/// back and sometimes one close to the track.
pub fn generate_row(seed: u64, row: u32) -> Vec<Building> {
    let mut rng = StdRng::seed_from_u64(seed ^ u64::from(row).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    let z = row_z(row);
    let mut buildings = Vec::with_capacity(4);

    let height = rng.random_range(4.0..16.0);
    let width = rng.random_range(2.0..6.0);
    let depth = rng.random_range(3.0..6.0);
    let x = -10.0 - rng.random_range(0.0..5.0);
    buildings.push(Building::new(x, z, width, height, depth));

    let height = rng.random_range(5.0..20.0);
    let width = rng.random_range(2.0..7.0);
    let depth = rng.random_range(3.0..7.0);
    let x = 10.0 + rng.random_range(0.0..5.0);
    buildings.push(Building::new(x, z, width, height, depth));

    if rng.random_bool(0.5) {
        let height = rng.random_range(3.0..11.0);
        let width = rng.random_range(3.0..9.0);
        let depth = rng.random_range(4.0..9.0);
        let x = rng.random_range(-15.0..15.0);
        let back = rng.random_range(8.0..23.0);
        buildings.push(Building::new(x, z - back, width, height, depth));
    }

    if rng.random_bool(0.4) {
        let height = rng.random_range(2.0..12.0);
        let width = rng.random_range(2.0..5.0);
        let depth = rng.random_range(2.0..5.0);
        let side = if rng.random_bool(0.5) { -6.0 } else { 6.0 };
        let x = rng.random_range(-4.0..4.0) + side;
        buildings.push(Building::new(x, z - 3.0, width, height, depth));
    }

    buildings
}

/// All generated buildings, grouped by row in order of increasing distance.
#[derive(Resource, Debug, Default)]
pub struct Scenery {
    rows: Vec<Vec<Building>>,
}

impl Scenery {
    pub fn generate(seed: u64, rows: u32) -> Self {
        Self {
            rows: (0..rows).map(|row| generate_row(seed, row)).collect(),
        }
    }

    /// Buildings whose row lies between `near` and `far` along Z (`near > far`).
    pub fn visible(&self, near: f32, far: f32) -> impl Iterator<Item = &Building> {
        (0u32..)
            .zip(&self.rows)
            .skip_while(move |(row, _)| row_z(*row) > near)
            .take_while(move |(row, _)| row_z(*row) >= far)
            .flat_map(|(_, buildings)| buildings)
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Plugin that generates and draws the city.
pub struct SceneryPlugin;

impl Plugin for SceneryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, generate_scenery)
            .add_systems(Update, draw_scenery.in_set(RideSet::Draw));
    }
}

fn generate_scenery(mut commands: Commands, params: Res<LaunchParams>) {
    let scenery = Scenery::generate(params.seed, params.building_rows);
    tracing::info!(
        "Generated {} buildings in {} rows (seed {:#x})",
        scenery.len(),
        params.building_rows,
        params.seed
    );
    commands.insert_resource(scenery);
}

fn draw_scenery(
    mut gizmos: Gizmos,
    scenery: Option<Res<Scenery>>,
    params: Res<LaunchParams>,
    camera: Single<&Transform, With<Camera3d>>,
) {
    let Some(scenery) = scenery else {
        return;
    };
    let z = camera.translation.z;

    for building in scenery.visible(z + DRAW_BEHIND, z - params.draw_distance) {
        for (a, b) in building.edges() {
            gizmos.line(a, b, Color::WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_deterministic_per_seed() {
        assert_eq!(generate_row(7, 12), generate_row(7, 12));
        assert_ne!(generate_row(7, 12), generate_row(8, 12));
    }

    #[test]
    fn row_layout_does_not_depend_on_row_count() {
        let short = Scenery::generate(3, 5);
        let long = Scenery::generate(3, 50);
        assert_eq!(short.rows[..], long.rows[..5]);
    }

    #[test]
    fn every_row_has_a_building_either_side() {
        for row in 0..100 {
            let buildings = generate_row(42, row);
            assert!((2..=4).contains(&buildings.len()));

            let left = buildings[0];
            assert!((-15.0..=-10.0).contains(&left.base.x));
            assert!((4.0..16.0).contains(&left.size.y));

            let right = buildings[1];
            assert!((10.0..=15.0).contains(&right.base.x));
            assert_eq!(right.base.z, row_z(row));
        }
    }

    #[test]
    fn edges_span_the_box() {
        let building = Building::new(1.0, -20.0, 2.0, 10.0, 4.0);
        let edges = building.edges();

        for (a, b) in edges {
            let d = (b - a).abs();
            let len = d.x + d.y + d.z;
            assert!([2.0, 10.0, 4.0].contains(&len), "edge {a} -> {b}");
            assert!(a.y >= 0.0 && b.y <= 10.0);
        }
        let vertical = edges.iter().filter(|(a, b)| a.y != b.y).count();
        assert_eq!(vertical, 4);
    }

    #[test]
    fn visible_rows_are_windowed() {
        let scenery = Scenery::generate(1, 100);
        let near = row_z(10);
        let far = row_z(19);

        let count = scenery.visible(near, far).count();
        let expected: usize = scenery.rows[10..20].iter().map(Vec::len).sum();
        assert_eq!(count, expected);
    }
}
