// --- File: simulation/lasers.rs ---
use crate::constants::{LASER_LENGTH, LASER_WIDTH, LASERS_PER_FISH};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;

use super::fish_school::FishSchool;

/// World transform of one beam. Recomputed every frame, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserInstance {
    pub world: Mat4,
}

/// Beam transforms for a fish at `position` heading along `forward`.
pub fn beams_for(position: Vec3, forward: Vec3) -> [LaserInstance; LASERS_PER_FISH] {
    let heading = forward.z.atan2(forward.x);
    let step = TAU / LASERS_PER_FISH as f32;
    std::array::from_fn(|k| {
        let angle = heading + step * k as f32;
        let world = Mat4::from_translation(position)
            * Mat4::from_quat(Quat::from_rotation_y(-angle))
            * Mat4::from_scale(Vec3::new(LASER_WIDTH, LASER_LENGTH, LASER_WIDTH));
        LaserInstance { world }
    })
}

/// Collects beams for every live fish of the laser-carrying species into `out`.
pub fn compute_lasers(school: &FishSchool, out: &mut Vec<LaserInstance>) {
    out.clear();
    for (species, bucket) in school.species().iter().zip(school.buckets()) {
        if !species.lasers {
            continue;
        }
        for fish in &bucket.fish {
            out.extend(beams_for(fish.position, fish.forward()));
        }
    }
}

// --- End of File: simulation/lasers.rs ---
