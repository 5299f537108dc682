// --- File: simulation/clock.rs ---
use crate::config::GlobalParams;

/// Scene time plus the camera's orbit clock. Both only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    clock: f32,
    eye_clock: f32,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances both clocks by wall-clock `delta_seconds` scaled by the
    /// current speed factors. Negative inputs are treated as zero.
    pub fn advance(&mut self, delta_seconds: f32, globals: &GlobalParams) {
        let dt = delta_seconds.max(0.0);
        self.clock += dt * globals.speed.max(0.0);
        self.eye_clock += dt * globals.eye_speed.max(0.0);
    }

    #[inline]
    pub fn now(&self) -> f32 {
        self.clock
    }

    #[inline]
    pub fn eye(&self) -> f32 {
        self.eye_clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clocks_scale_independently() {
        let globals = GlobalParams {
            speed: 2.0,
            eye_speed: 0.5,
            ..GlobalParams::default()
        };
        let mut clock = SimulationClock::new();
        clock.advance(1.5, &globals);
        assert!((clock.now() - 3.0).abs() < 1e-6);
        assert!((clock.eye() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn clock_never_rewinds() {
        let globals = GlobalParams {
            speed: -1.0,
            ..GlobalParams::default()
        };
        let mut clock = SimulationClock::new();
        clock.advance(1.0, &GlobalParams::default());
        let before = clock.now();
        clock.advance(1.0, &globals);
        clock.advance(-5.0, &GlobalParams::default());
        assert_eq!(clock.now(), before);
    }
}
// --- End of File: simulation/clock.rs ---
