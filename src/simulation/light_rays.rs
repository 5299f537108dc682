// --- File: simulation/light_rays.rs ---
use crate::constants::{
    LIGHT_RAY_COUNT, LIGHT_RAY_DURATION_MIN, LIGHT_RAY_DURATION_RANGE, LIGHT_RAY_HEIGHT,
    LIGHT_RAY_MAX_Y, LIGHT_RAY_MIN_Y, LIGHT_RAY_POS_RANGE, LIGHT_RAY_ROT_LERP,
    LIGHT_RAY_ROT_RANGE, LIGHT_RAY_SCALE, LIGHT_RAY_SPEED,
};
use crate::config::FeatureToggles;
use crate::utils::{random_centered, random_span};
use glam::{Mat4, Vec3};
use rand::Rng;
use std::f32::consts::PI;

use super::SimRng;

/// A shaft of light that fades in and out, then respawns somewhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRay {
    pub timer: f32,
    pub duration: f32,
    pub rotation: f32,
    pub x: f32,
    pub z: f32,
}

impl LightRay {
    fn spawn(rng: &mut SimRng, timer: f32) -> Self {
        Self {
            timer,
            duration: random_span(rng, LIGHT_RAY_DURATION_MIN, LIGHT_RAY_DURATION_RANGE),
            rotation: random_centered(rng, LIGHT_RAY_ROT_RANGE * 2.0),
            x: random_centered(rng, LIGHT_RAY_POS_RANGE),
            z: random_centered(rng, LIGHT_RAY_POS_RANGE),
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.timer / self.duration
    }

    /// `sin(pi * timer / duration)`: zero at both ends of the life, one halfway.
    pub fn alpha(&self) -> f32 {
        (PI * self.progress()).sin()
    }

    pub fn transform(&self, eye_height: f32) -> Mat4 {
        let y = (LIGHT_RAY_HEIGHT + eye_height).clamp(LIGHT_RAY_MIN_Y, LIGHT_RAY_MAX_Y);
        Mat4::from_translation(Vec3::new(self.x, y, self.z))
            * Mat4::from_rotation_z(self.rotation + LIGHT_RAY_ROT_LERP * self.progress())
            * Mat4::from_scale(Vec3::from_array(LIGHT_RAY_SCALE))
    }
}

pub struct LightRayController {
    rays: Vec<LightRay>,
    rng: SimRng,
}

impl LightRayController {
    pub fn new(mut rng: SimRng) -> Self {
        let rays = (0..LIGHT_RAY_COUNT)
            .map(|_| {
                let timer = rng.r#gen::<f32>() * 2.0;
                LightRay::spawn(&mut rng, timer)
            })
            .collect();
        Self { rays, rng }
    }

    #[inline]
    pub fn rays(&self) -> &[LightRay] {
        &self.rays
    }

    /// Rays only move while they are shown; hidden rays keep their phase.
    pub fn update(&mut self, delta: f32, speed: f32, options: &FeatureToggles) {
        if options.light_rays {
            self.advance(delta, speed);
        }
    }

    pub fn advance(&mut self, delta: f32, speed: f32) {
        let step = delta * speed * LIGHT_RAY_SPEED;
        for ray in &mut self.rays {
            ray.timer += step;
            if ray.timer > ray.duration {
                *ray = LightRay::spawn(&mut self.rng, 0.0);
            }
        }
    }
}

// --- End of File: simulation/light_rays.rs ---
