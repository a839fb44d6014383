use bevy::prelude::*;
use rand::Rng;

use crate::config::PadPlacement;
use crate::constants::{
    FLAT_ZONE_HALF_WIDTH, PAD_HALF_WIDTH, TERRAIN_HALF_WIDTH, TERRAIN_SEGMENTS, TERRAIN_WIDTH,
};

const RIDGE_AMPLITUDE: f32 = 5.0; // Heights fall in [-5, 5)
const CRATER_CHANCE: f64 = 0.1;
const MAX_CRATER_DEPTH: f32 = 5.0;

/// The lunar surface as a polyline of sample points ordered by x.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TerrainProfile {
    points: Vec<Vec2>,
}

impl TerrainProfile {
    /// Builds a profile from points already sorted by x. Needs at least one point.
    pub fn from_points(points: Vec<Vec2>) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|w| w[0].x <= w[1].x));
        Self { points }
    }

    /// Rough surface with a flat zone centred on the landing pad.
    pub fn generate(rng: &mut impl Rng, pad_center: f32) -> Self {
        let segment_width = TERRAIN_WIDTH / TERRAIN_SEGMENTS as f32;
        let points = (0..=TERRAIN_SEGMENTS)
            .map(|i| {
                let x = i as f32 * segment_width - TERRAIN_HALF_WIDTH;
                let mut y = 0.0;
                if (x - pad_center).abs() > FLAT_ZONE_HALF_WIDTH {
                    y = rng.gen_range(-RIDGE_AMPLITUDE..RIDGE_AMPLITUDE);
                    if rng.gen_bool(CRATER_CHANCE) {
                        y -= rng.gen_range(0.0..MAX_CRATER_DEPTH);
                    }
                }
                Vec2::new(x, y)
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// The sample point closest to `x` along the horizontal axis. Ties go to the
    /// left-hand point; positions past either end snap to that end.
    pub fn nearest(&self, x: f32) -> Vec2 {
        let right = self.points.partition_point(|p| p.x < x);
        if right == 0 {
            return self.points[0];
        }
        if right == self.points.len() {
            return self.points[right - 1];
        }
        let (left, right) = (self.points[right - 1], self.points[right]);
        if x - left.x <= right.x - x {
            left
        } else {
            right
        }
    }

    pub fn height_at(&self, x: f32) -> f32 {
        self.nearest(x).y
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LandingPad {
    pub center_x: f32,
    pub half_width: f32,
}

impl Default for LandingPad {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            half_width: PAD_HALF_WIDTH,
        }
    }
}

impl LandingPad {
    pub fn place(rng: &mut impl Rng, placement: PadPlacement) -> Self {
        let center_x = match placement {
            PadPlacement::Centered => 0.0,
            PadPlacement::Random => {
                let limit = TERRAIN_HALF_WIDTH - FLAT_ZONE_HALF_WIDTH;
                rng.gen_range(-limit..=limit)
            }
        };
        Self {
            center_x,
            ..default()
        }
    }

    pub fn contains(&self, x: f32) -> bool {
        (x - self.center_x).abs() < self.half_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ramp() -> TerrainProfile {
        TerrainProfile::from_points(vec![
            Vec2::new(-10.0, 1.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(10.0, 3.0),
        ])
    }

    #[test]
    fn nearest_picks_closest_sample() {
        let terrain = ramp();
        assert_eq!(terrain.height_at(-9.0), 1.0);
        assert_eq!(terrain.height_at(-4.0), 2.0);
        assert_eq!(terrain.height_at(0.0), 2.0);
        assert_eq!(terrain.height_at(6.0), 3.0);
    }

    #[test]
    fn nearest_breaks_ties_to_the_left() {
        let terrain = ramp();
        assert_eq!(terrain.nearest(5.0), Vec2::new(0.0, 2.0));
        assert_eq!(terrain.nearest(-5.0), Vec2::new(-10.0, 1.0));
    }

    #[test]
    fn nearest_snaps_outside_the_span() {
        let terrain = ramp();
        assert_eq!(terrain.height_at(-1000.0), 1.0);
        assert_eq!(terrain.height_at(1000.0), 3.0);
    }

    #[test]
    fn generated_profile_spans_the_arena() {
        let mut rng = StdRng::seed_from_u64(1);
        let terrain = TerrainProfile::generate(&mut rng, 0.0);
        let points = terrain.points();
        assert_eq!(points.len(), TERRAIN_SEGMENTS + 1);
        assert_eq!(points[0].x, -TERRAIN_HALF_WIDTH);
        assert!((points[TERRAIN_SEGMENTS].x - TERRAIN_HALF_WIDTH).abs() < 1e-3);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn generated_heights_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let terrain = TerrainProfile::generate(&mut rng, 0.0);
        for p in terrain.points() {
            assert!(p.y < RIDGE_AMPLITUDE);
            assert!(p.y >= -RIDGE_AMPLITUDE - MAX_CRATER_DEPTH);
        }
    }

    #[test]
    fn flat_zone_follows_the_pad() {
        let mut rng = StdRng::seed_from_u64(3);
        let pad_center = 120.0;
        let terrain = TerrainProfile::generate(&mut rng, pad_center);
        for p in terrain.points() {
            if (p.x - pad_center).abs() <= FLAT_ZONE_HALF_WIDTH {
                assert_eq!(p.y, 0.0, "point at x={} should be flat", p.x);
            }
        }
        assert_eq!(terrain.height_at(pad_center), 0.0);
    }

    #[test]
    fn same_seed_same_terrain() {
        let a = TerrainProfile::generate(&mut StdRng::seed_from_u64(42), 0.0);
        let b = TerrainProfile::generate(&mut StdRng::seed_from_u64(42), 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn pad_contains_is_strict() {
        let pad = LandingPad::default();
        assert!(pad.contains(0.0));
        assert!(pad.contains(9.99));
        assert!(!pad.contains(10.0));
        assert!(!pad.contains(-10.0));
    }

    #[test]
    fn random_pad_keeps_its_flat_zone_on_the_map() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let pad = LandingPad::place(&mut rng, PadPlacement::Random);
            assert!(pad.center_x.abs() <= TERRAIN_HALF_WIDTH - FLAT_ZONE_HALF_WIDTH);
        }
        let centered = LandingPad::place(&mut rng, PadPlacement::Centered);
        assert_eq!(centered.center_x, 0.0);
    }
}
