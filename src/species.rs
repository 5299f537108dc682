// --- File: species.rs ---
/// Allocation priority group. Big claims fish first, Small takes the rest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SizeTier {
    Big,
    Medium,
    Small,
}

impl SizeTier {
    pub const ALLOCATION_ORDER: [SizeTier; 3] = [SizeTier::Big, SizeTier::Medium, SizeTier::Small];

    /// Largest bucket a species of this tier may hold for a requested total.
    ///
    /// Small species are only limited by what the earlier tiers left over.
    pub fn capacity(self, total: usize) -> usize {
        match self {
            SizeTier::Big => {
                if total < 100 {
                    1
                } else if total < 1_000 {
                    2
                } else {
                    4
                }
            }
            SizeTier::Medium => {
                if total < 1_000 {
                    total / 10
                } else if total < 10_000 {
                    80
                } else {
                    160
                }
            }
            SizeTier::Small => total,
        }
    }
}

/// Body constants forwarded to the fish vertex shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyConstants {
    pub fish_length: f32,
    pub fish_wave_length: f32,
    pub fish_bend_amount: f32,
}

/// Static description of one kind of fish.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    /// Scene name of the model used to draw this species.
    pub name: &'static str,
    pub tier: SizeTier,
    pub speed: f32,
    pub speed_range: f32,
    pub radius: f32,
    pub radius_range: f32,
    pub tail_speed: f32,
    pub height_offset: f32,
    pub height_range: f32,
    pub body: BodyConstants,
    pub lasers: bool,
}

/// Species roster in declaration order.
pub fn default_species() -> Vec<Species> {
    vec![
        Species {
            name: "SmallFishA",
            tier: SizeTier::Small,
            speed: 1.0,
            speed_range: 1.5,
            radius: 30.0,
            radius_range: 25.0,
            tail_speed: 10.0,
            height_offset: 0.0,
            height_range: 16.0,
            body: BodyConstants {
                fish_length: 10.0,
                fish_wave_length: 1.0,
                fish_bend_amount: 2.0,
            },
            lasers: false,
        },
        Species {
            name: "MediumFishA",
            tier: SizeTier::Medium,
            speed: 1.0,
            speed_range: 2.0,
            radius: 10.0,
            radius_range: 20.0,
            tail_speed: 1.0,
            height_offset: 0.0,
            height_range: 16.0,
            body: BodyConstants {
                fish_length: 10.0,
                fish_wave_length: -2.0,
                fish_bend_amount: 2.0,
            },
            lasers: false,
        },
        Species {
            name: "MediumFishB",
            tier: SizeTier::Medium,
            speed: 0.5,
            speed_range: 4.0,
            radius: 10.0,
            radius_range: 20.0,
            tail_speed: 3.0,
            height_offset: -8.0,
            height_range: 5.0,
            body: BodyConstants {
                fish_length: 10.0,
                fish_wave_length: -2.0,
                fish_bend_amount: 2.0,
            },
            lasers: false,
        },
        Species {
            name: "BigFishA",
            tier: SizeTier::Big,
            speed: 0.5,
            speed_range: 0.5,
            radius: 50.0,
            radius_range: 3.0,
            tail_speed: 1.5,
            height_offset: 0.0,
            height_range: 16.0,
            body: BodyConstants {
                fish_length: 10.0,
                fish_wave_length: -1.0,
                fish_bend_amount: 0.5,
            },
            lasers: true,
        },
        Species {
            name: "BigFishB",
            tier: SizeTier::Big,
            speed: 0.5,
            speed_range: 0.5,
            radius: 45.0,
            radius_range: 3.0,
            tail_speed: 1.0,
            height_offset: 0.0,
            height_range: 16.0,
            body: BodyConstants {
                fish_length: 10.0,
                fish_wave_length: -0.7,
                fish_bend_amount: 0.3,
            },
            lasers: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_tier_breakpoints() {
        assert_eq!(SizeTier::Big.capacity(0), 1);
        assert_eq!(SizeTier::Big.capacity(99), 1);
        assert_eq!(SizeTier::Big.capacity(100), 2);
        assert_eq!(SizeTier::Big.capacity(999), 2);
        assert_eq!(SizeTier::Big.capacity(1_000), 4);
    }

    #[test]
    fn medium_tier_breakpoints() {
        assert_eq!(SizeTier::Medium.capacity(9), 0);
        assert_eq!(SizeTier::Medium.capacity(500), 50);
        assert_eq!(SizeTier::Medium.capacity(999), 99);
        assert_eq!(SizeTier::Medium.capacity(1_000), 80);
        assert_eq!(SizeTier::Medium.capacity(9_999), 80);
        assert_eq!(SizeTier::Medium.capacity(10_000), 160);
    }

    #[test]
    fn only_big_species_carry_lasers() {
        for species in default_species() {
            assert_eq!(species.lasers, species.tier == SizeTier::Big, "{}", species.name);
        }
    }
}
// --- End of File: species.rs ---
