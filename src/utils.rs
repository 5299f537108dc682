use rand::Rng;
use std::f32::consts::TAU;

// --- Helper Functions ---

/// Uniform sample in `[min, min + range)`.
pub fn random_span<R: Rng + ?Sized>(rng: &mut R, min: f32, range: f32) -> f32 {
    min + rng.r#gen::<f32>() * range
}

/// Uniform sample in `[-range / 2, range / 2)`.
pub fn random_centered<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    (rng.r#gen::<f32>() - 0.5) * range
}

pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.r#gen::<f32>() * TAU
}

/// Wraps an angle into `[0, TAU)`.
pub fn wrap_tau(angle: f32) -> f32 {
    let wrapped = angle % TAU;
    if wrapped < 0.0 { wrapped + TAU } else { wrapped }
}

/// Smallest doubling of `current` (at least 1) that holds `desired` items.
pub fn grow_capacity(current: usize, desired: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < desired {
        capacity *= 2;
    }
    capacity
}

/// Element capacity of a GPU buffer that grows by doubling and never shrinks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GrowOnlyCapacity {
    current: usize,
}

impl GrowOnlyCapacity {
    pub fn new(initial: usize) -> Self {
        Self { current: initial }
    }

    #[inline]
    pub fn get(self) -> usize {
        self.current
    }

    /// Makes room for `needed` elements. Returns `true` when the buffer has to
    /// be reallocated at the new capacity and its bind group recreated.
    pub fn fit(&mut self, needed: usize) -> bool {
        if needed <= self.current {
            return false;
        }
        self.current = grow_capacity(self.current, needed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wrap_tau_stays_in_range() {
        for angle in [-20.0_f32, -TAU, -0.1, 0.0, 1.0, TAU + 0.5, 100.0] {
            let wrapped = wrap_tau(angle);
            assert!((0.0..TAU).contains(&wrapped), "{angle} -> {wrapped}");
        }
        assert!((wrap_tau(-0.5) - (TAU - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn capacity_doubles_until_it_fits() {
        assert_eq!(grow_capacity(1, 1), 1);
        assert_eq!(grow_capacity(1, 5), 8);
        assert_eq!(grow_capacity(8, 3), 8);
        assert_eq!(grow_capacity(0, 0), 1);
        assert_eq!(grow_capacity(16, 17), 32);
    }

    #[test]
    fn buffers_grow_only_past_capacity_and_never_shrink() {
        let mut capacity = GrowOnlyCapacity::new(4);
        assert!(!capacity.fit(0));
        assert!(!capacity.fit(4));
        assert_eq!(capacity.get(), 4);

        assert!(capacity.fit(5));
        assert_eq!(capacity.get(), 8);

        assert!(!capacity.fit(3));
        assert!(!capacity.fit(8));
        assert_eq!(capacity.get(), 8);

        assert!(capacity.fit(100));
        assert_eq!(capacity.get(), 128);
    }

    #[test]
    fn empty_buffer_grows_from_one() {
        let mut capacity = GrowOnlyCapacity::new(0);
        assert!(!capacity.fit(0));
        assert!(capacity.fit(3));
        assert_eq!(capacity.get(), 4);
    }

    #[test]
    fn random_helpers_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let span = random_span(&mut rng, 2.0, 8.0);
            assert!((2.0..10.0).contains(&span));
            let centered = random_centered(&mut rng, 40.0);
            assert!((-20.0..20.0).contains(&centered));
        }
    }
}
