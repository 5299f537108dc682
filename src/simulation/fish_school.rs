// --- File: simulation/fish_school.rs ---
use crate::config::FishParams;
use crate::constants::{FISH_MIN_VERTICAL_RADIUS, TAIL_DIRECTION_DELTA, TARGET_HEIGHT_DELTA};
use crate::species::{SizeTier, Species};
use crate::utils::{random_angle, random_span, wrap_tau};
use glam::Vec3;
use rand::Rng;
use rayon::prelude::*;

use super::SimRng;

/// One live fish. The jitter fields are drawn once at spawn and never change.
#[derive(Debug, Clone, PartialEq)]
pub struct FishInstance {
    pub position: Vec3,
    /// Look-ahead point the fish is oriented towards.
    pub target: Vec3,
    pub scale: f32,
    pub tail_time: f32,
    pub speed_factor: f32,
    pub radius_jitter: Vec3,
    pub scale_jitter: f32,
    pub tail_phase: f32,
}

impl FishInstance {
    fn spawn(species: &Species, rng: &mut SimRng) -> Self {
        Self {
            position: Vec3::new(0.0, species.height_offset, 0.0),
            target: Vec3::new(0.0, species.height_offset, 1.0),
            scale: 1.0,
            tail_time: 0.0,
            speed_factor: random_span(rng, species.speed, species.speed_range),
            radius_jitter: Vec3::new(rng.r#gen(), rng.r#gen(), rng.r#gen()),
            scale_jitter: rng.r#gen(),
            tail_phase: random_angle(rng),
        }
    }

    /// Unit direction the fish is swimming in.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// All fish of one species.
#[derive(Debug, Clone, Default)]
pub struct SpeciesBucket {
    pub fish: Vec<FishInstance>,
}

impl SpeciesBucket {
    #[inline]
    pub fn len(&self) -> usize {
        self.fish.len()
    }
}

pub struct FishSchool {
    species: Vec<Species>,
    buckets: Vec<SpeciesBucket>,
    rng: SimRng,
}

impl FishSchool {
    pub fn new(species: Vec<Species>, rng: SimRng) -> Self {
        let buckets = vec![SpeciesBucket::default(); species.len()];
        Self {
            species,
            buckets,
            rng,
        }
    }

    #[inline]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    #[inline]
    pub fn buckets(&self) -> &[SpeciesBucket] {
        &self.buckets
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(SpeciesBucket::len).sum()
    }

    /// Splits `total` fish across the species, Big tier first, then Medium,
    /// then Small. Each species takes `min(remaining, tier cap)`.
    pub fn set_population(&mut self, total: usize) {
        let mut remaining = total;
        for tier in SizeTier::ALLOCATION_ORDER {
            let cap = tier.capacity(total);
            for index in 0..self.species.len() {
                if self.species[index].tier != tier {
                    continue;
                }
                let desired = remaining.min(cap);
                self.resize_bucket(index, desired);
                remaining -= desired;
            }
        }
    }

    fn resize_bucket(&mut self, index: usize, desired: usize) {
        let species = &self.species[index];
        let bucket = &mut self.buckets[index];
        let current = bucket.fish.len();
        if current > desired {
            bucket.fish.truncate(desired);
            return;
        }
        bucket.fish.reserve(desired - current);
        for _ in current..desired {
            bucket.fish.push(FishInstance::spawn(species, &mut self.rng));
        }
    }

    /// Recomputes every fish from the clock and its own seeds.
    ///
    /// The result depends only on `(clock, params, seeds)`; fish never
    /// interact with each other.
    pub fn advance(&mut self, clock: f32, params: &FishParams) {
        let base_clock = clock * params.fish_speed;
        for (species, bucket) in self.species.iter().zip(self.buckets.iter_mut()) {
            let height_base = params.fish_height + species.height_offset;
            let height_range = params.fish_height_range * species.height_range;

            bucket
                .fish
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, fish)| {
                    let speed = fish.speed_factor;
                    let local = (base_clock + i as f32 * params.fish_offset) * speed;

                    let x_radius = species.radius + fish.radius_jitter.x * species.radius_range;
                    let y_radius = FISH_MIN_VERTICAL_RADIUS + fish.radius_jitter.y * height_range;
                    let z_radius = species.radius + fish.radius_jitter.z * species.radius_range;

                    let x_clock = local * params.fish_x_clock;
                    let y_clock = local * params.fish_y_clock;
                    let z_clock = local * params.fish_z_clock;

                    fish.position = Vec3::new(
                        x_clock.sin() * x_radius,
                        y_clock.sin() * y_radius + height_base,
                        z_clock.cos() * z_radius,
                    );
                    fish.target = Vec3::new(
                        (x_clock - TAIL_DIRECTION_DELTA).sin() * x_radius,
                        (y_clock - TARGET_HEIGHT_DELTA).sin() * y_radius + height_base,
                        (z_clock - TAIL_DIRECTION_DELTA).cos() * z_radius,
                    );
                    fish.scale = 1.0 + fish.scale_jitter;

                    let tail = (clock + i as f32) * params.fish_tail_speed * species.tail_speed * speed
                        + fish.tail_phase;
                    fish.tail_time = wrap_tau(tail);
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::default_species;
    use rand::SeedableRng;
    use std::f32::consts::TAU;

    fn school() -> FishSchool {
        FishSchool::new(default_species(), SimRng::seed_from_u64(42))
    }

    fn sizes(school: &FishSchool) -> Vec<(&'static str, SizeTier, usize)> {
        school
            .species()
            .iter()
            .zip(school.buckets())
            .map(|(s, b)| (s.name, s.tier, b.len()))
            .collect()
    }

    fn size_of(school: &FishSchool, name: &str) -> usize {
        sizes(school)
            .into_iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, len)| len)
            .unwrap()
    }

    #[test]
    fn population_of_500_follows_tier_formula() {
        let mut school = school();
        school.set_population(500);
        assert_eq!(size_of(&school, "BigFishA"), 2);
        assert_eq!(size_of(&school, "BigFishB"), 2);
        assert_eq!(size_of(&school, "MediumFishA"), 50);
        assert_eq!(size_of(&school, "MediumFishB"), 50);
        assert_eq!(size_of(&school, "SmallFishA"), 500 - 4 - 100);
        assert_eq!(school.total(), 500);
    }

    #[test]
    fn population_never_exceeds_target_or_caps() {
        let mut school = school();
        for total in [0, 1, 3, 7, 50, 99, 100, 101, 999, 1_000, 4_321, 10_000, 30_000] {
            school.set_population(total);
            assert!(school.total() <= total, "total {total}");
            for (name, tier, len) in sizes(&school) {
                assert!(len <= tier.capacity(total), "{name} over cap at {total}");
            }
        }
    }

    #[test]
    fn earlier_tiers_claim_fish_first() {
        let mut school = school();
        school.set_population(3);
        assert_eq!(size_of(&school, "BigFishA"), 1);
        assert_eq!(size_of(&school, "BigFishB"), 1);
        // floor(3 / 10) == 0 for the medium tier
        assert_eq!(size_of(&school, "MediumFishA"), 0);
        assert_eq!(size_of(&school, "SmallFishA"), 1);

        school.set_population(1);
        assert_eq!(size_of(&school, "BigFishA"), 1);
        assert_eq!(size_of(&school, "BigFishB"), 0);
        assert_eq!(size_of(&school, "SmallFishA"), 0);
    }

    #[test]
    fn zero_population_empties_every_bucket() {
        let mut school = school();
        school.set_population(1_000);
        school.set_population(0);
        assert!(school.buckets().iter().all(|b| b.fish.is_empty()));
    }

    #[test]
    fn small_tier_grows_monotonically_once_caps_saturate() {
        let mut school = school();
        let mut previous = 0;
        for total in (10_000..=30_000).step_by(2_500) {
            school.set_population(total);
            let small = size_of(&school, "SmallFishA");
            assert!(small >= previous, "{small} < {previous} at {total}");
            previous = small;
        }
    }

    #[test]
    fn growing_keeps_existing_instances() {
        let mut school = school();
        school.set_population(200);
        let before = school.buckets()[0].fish.clone();
        school.set_population(400);
        let after = &school.buckets()[0].fish;
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn advance_is_deterministic_for_same_inputs() {
        let mut school = school();
        school.set_population(300);
        let params = FishParams::default();
        school.advance(12.5, &params);
        let first: Vec<_> = school.buckets().iter().map(|b| b.fish.clone()).collect();
        school.advance(12.5, &params);
        let second: Vec<_> = school.buckets().iter().map(|b| b.fish.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn advance_produces_wrapped_tail_and_jittered_scale() {
        let mut school = school();
        school.set_population(1_000);
        school.advance(987.0, &FishParams::default());
        for bucket in school.buckets() {
            for fish in &bucket.fish {
                assert!((0.0..TAU).contains(&fish.tail_time));
                assert!((1.0..2.0).contains(&fish.scale));
                assert!(fish.position.is_finite());
                assert_ne!(fish.position, fish.target);
            }
        }
    }

    #[test]
    fn fish_orbit_within_species_radius() {
        let mut school = school();
        school.set_population(100);
        school.advance(3.0, &FishParams::default());
        for (species, bucket) in school.species().iter().zip(school.buckets()) {
            let max = species.radius + species.radius_range;
            for fish in &bucket.fish {
                assert!(fish.position.x.abs() <= max + 1e-3);
                assert!(fish.position.z.abs() <= max + 1e-3);
            }
        }
    }
}
// --- End of File: simulation/fish_school.rs ---
