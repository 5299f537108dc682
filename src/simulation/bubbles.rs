// --- File: simulation/bubbles.rs ---
use crate::constants::{
    BUBBLE_EMIT_RADIUS, BUBBLE_EMITTER_COUNT, BUBBLE_INACTIVE_START_TIME, BUBBLE_LIFETIME,
    BUBBLE_TINT, BUBBLE_TRIGGER_INTERVAL, BUBBLES_PER_BURST, MAX_BUBBLE_PARTICLES,
};
use crate::uniforms::BubbleParticle;
use crate::utils::{random_angle, random_centered, random_span};
use glam::Vec3;

use super::SimRng;

// --- Emitter ---

/// Independent countdown timers that each fire a burst somewhere on the floor.
pub struct BubbleEmitter {
    timers: Vec<f32>,
    rng: SimRng,
}

impl BubbleEmitter {
    pub fn new(mut rng: SimRng) -> Self {
        let timers = (0..BUBBLE_EMITTER_COUNT)
            .map(|_| Self::next_interval(&mut rng))
            .collect();
        Self { timers, rng }
    }

    fn next_interval(rng: &mut SimRng) -> f32 {
        let (min, max) = BUBBLE_TRIGGER_INTERVAL;
        random_span(rng, min, max - min)
    }

    #[cfg(test)]
    pub fn timers(&self) -> &[f32] {
        &self.timers
    }

    /// Counts every timer down by `delta * speed` and calls `on_trigger` with
    /// a point on the emission circle for each one that expires.
    pub fn update<F: FnMut(Vec3)>(&mut self, delta: f32, speed: f32, mut on_trigger: F) {
        let step = delta * speed;
        for timer in &mut self.timers {
            *timer -= step;
            if *timer > 0.0 {
                continue;
            }
            *timer = Self::next_interval(&mut self.rng);
            let (min_radius, max_radius) = BUBBLE_EMIT_RADIUS;
            let radius = random_span(&mut self.rng, min_radius, max_radius - min_radius);
            let angle = random_angle(&mut self.rng);
            on_trigger(Vec3::new(angle.sin() * radius, 0.0, angle.cos() * radius));
        }
    }
}

// --- Particle Pool ---

/// Fixed-capacity ring of bubble particles uploaded wholesale to the GPU.
///
/// Slots are overwritten in order and wrap unconditionally. A particle is dead
/// once `now - spawn >= lifetime`; nothing ever retires slots explicitly.
pub struct ParticlePool {
    particles: Vec<BubbleParticle>,
    burst: usize,
    next_slot: usize,
    active: usize,
    rng: SimRng,
}

impl ParticlePool {
    pub fn new(rng: SimRng) -> Self {
        Self::with_capacity(MAX_BUBBLE_PARTICLES, BUBBLES_PER_BURST, rng)
    }

    pub fn with_capacity(capacity: usize, burst: usize, rng: SimRng) -> Self {
        let idle = BubbleParticle {
            position_start_time: [0.0, 0.0, 0.0, BUBBLE_INACTIVE_START_TIME],
            velocity_start_size: [0.0; 4],
            acceleration_end_size: [0.0; 4],
            color_mult: [0.0; 4],
            lifetime_frame_spin: [1.0, 0.0, 0.0, 0.0],
        };
        Self {
            particles: vec![idle; capacity],
            burst,
            next_slot: 0,
            active: 0,
            rng,
        }
    }

    #[inline]
    pub fn particles(&self) -> &[BubbleParticle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Number of slots that have ever been written, saturating at capacity.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Writes one burst of particles around `origin`, all spawned at `now`.
    pub fn emit_burst(&mut self, origin: Vec3, now: f32) {
        let capacity = self.particles.len();
        if capacity == 0 {
            return;
        }
        for _ in 0..self.burst {
            let particle = self.spawn(origin, now);
            self.particles[self.next_slot] = particle;
            self.next_slot = (self.next_slot + 1) % capacity;
        }
        self.active = (self.active + self.burst).min(capacity);
    }

    fn spawn(&mut self, origin: Vec3, now: f32) -> BubbleParticle {
        let rng = &mut self.rng;
        let position = origin
            + Vec3::new(
                random_centered(rng, 0.2),
                random_centered(rng, 4.0),
                random_centered(rng, 0.2),
            );
        BubbleParticle {
            position_start_time: [position.x, position.y, position.z, now],
            velocity_start_size: [
                random_centered(rng, 0.1),
                0.0,
                random_centered(rng, 0.1),
                random_span(rng, 0.01, 0.01),
            ],
            acceleration_end_size: [0.0, random_span(rng, 0.05, 0.02), 0.0, random_span(rng, 0.4, 0.2)],
            color_mult: BUBBLE_TINT,
            lifetime_frame_spin: [
                BUBBLE_LIFETIME,
                0.0,
                random_angle(rng),
                random_centered(rng, 0.2),
            ],
        }
    }
}

/// Runs the emitter for one frame, writing a burst into `pool` for every
/// timer that fires. Returns the number of bursts written.
pub fn step_bubbles(
    emitter: &mut BubbleEmitter,
    pool: &mut ParticlePool,
    delta: f32,
    speed: f32,
    now: f32,
) -> usize {
    let mut bursts = 0;
    emitter.update(delta, speed, |origin| {
        pool.emit_burst(origin, now);
        bursts += 1;
    });
    bursts
}

// --- End of File: simulation/bubbles.rs ---
