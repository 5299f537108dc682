// --- File: config.rs ---
use crate::constants::{
    DEFAULT_FISH_PRESET, FISH_COUNT_PRESETS, MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER,
    SPEED_ADJUST_FACTOR,
};

/// Camera, lighting and global animation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalParams {
    pub speed: f32,
    pub target_height: f32,
    pub target_radius: f32,
    pub eye_height: f32,
    pub eye_radius: f32,
    pub eye_speed: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub ambient_red: f32,
    pub ambient_green: f32,
    pub ambient_blue: f32,
    pub fog_power: f32,
    pub fog_mult: f32,
    pub fog_offset: f32,
    pub fog_red: f32,
    pub fog_green: f32,
    pub fog_blue: f32,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            target_height: 63.3,
            target_radius: 91.6,
            eye_height: 7.5,
            eye_radius: 13.2,
            eye_speed: 0.0258,
            field_of_view: 82.699,
            ambient_red: 0.218,
            ambient_green: 0.502,
            ambient_blue: 0.706,
            fog_power: 16.5,
            fog_mult: 1.5,
            fog_offset: 0.738,
            fog_red: 0.338,
            fog_green: 0.81,
            fog_blue: 1.0,
        }
    }
}

/// Shared orbit parameters applied to every fish.
#[derive(Debug, Clone, PartialEq)]
pub struct FishParams {
    pub fish_height_range: f32,
    pub fish_height: f32,
    pub fish_speed: f32,
    pub fish_offset: f32,
    pub fish_x_clock: f32,
    pub fish_y_clock: f32,
    pub fish_z_clock: f32,
    pub fish_tail_speed: f32,
}

impl Default for FishParams {
    fn default() -> Self {
        Self {
            fish_height_range: 1.0,
            fish_height: 25.0,
            fish_speed: 0.124,
            fish_offset: 0.52,
            fish_x_clock: 1.0,
            fish_y_clock: 0.556,
            fish_z_clock: 1.0,
            fish_tail_speed: 1.0,
        }
    }
}

/// Refraction constants for the tank glass.
#[derive(Debug, Clone, PartialEq)]
pub struct TankConstants {
    pub refraction_fudge: f32,
    pub eta: f32,
    pub tank_color_fudge: f32,
}

impl Default for TankConstants {
    fn default() -> Self {
        Self {
            refraction_fudge: 3.0,
            eta: 1.0,
            tank_color_fudge: 0.796,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureToggles {
    pub normal_maps: bool,
    pub reflection: bool,
    pub tank: bool,
    pub fog: bool,
    pub bubbles: bool,
    pub lasers: bool,
    pub light_rays: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            normal_maps: true,
            reflection: true,
            tank: true,
            fog: true,
            bubbles: true,
            lasers: false,
            light_rays: true,
        }
    }
}

/// Named view preset; overrides the camera, ambient and fog globals.
#[derive(Debug, Clone, Copy)]
pub struct ViewPreset {
    pub target_height: f32,
    pub target_radius: f32,
    pub eye_height: f32,
    pub eye_radius: f32,
    pub eye_speed: f32,
    pub field_of_view: f32,
    pub ambient: [f32; 3],
    pub fog_power: f32,
    pub fog_mult: f32,
    pub fog_offset: f32,
    pub fog_color: [f32; 3],
}

pub const VIEW_PRESETS: [ViewPreset; 3] = [
    ViewPreset {
        target_height: 63.3,
        target_radius: 91.6,
        eye_height: 7.5,
        eye_radius: 13.2,
        eye_speed: 0.0258,
        field_of_view: 82.699,
        ambient: [0.218, 0.502, 0.706],
        fog_power: 16.5,
        fog_mult: 1.5,
        fog_offset: 0.738,
        fog_color: [0.338, 0.81, 1.0],
    },
    ViewPreset {
        target_height: 0.0,
        target_radius: 88.0,
        eye_height: 38.0,
        eye_radius: 69.0,
        eye_speed: 0.0258,
        field_of_view: 64.0,
        ambient: [0.171, 0.447, 0.51],
        fog_power: 27.1,
        fog_mult: 1.2,
        fog_offset: 0.76,
        fog_color: [0.2, 0.3, 0.4],
    },
    ViewPreset {
        target_height: 0.0,
        target_radius: 88.0,
        eye_height: 19.0,
        eye_radius: 60.0,
        eye_speed: 0.06,
        field_of_view: 85.0,
        ambient: [0.22, 0.25, 0.39],
        fog_power: 14.5,
        fog_mult: 1.66,
        fog_offset: 0.53,
        fog_color: [0.54, 0.86, 1.0],
    },
];

/// Snapshot read by the renderer every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AquariumConfig {
    pub globals: GlobalParams,
    pub fish: FishParams,
    pub tank: TankConstants,
    pub options: FeatureToggles,
    pub fish_count: usize,
    pub view_index: usize,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        Self {
            globals: GlobalParams::default(),
            fish: FishParams::default(),
            tank: TankConstants::default(),
            options: FeatureToggles::default(),
            fish_count: FISH_COUNT_PRESETS[DEFAULT_FISH_PRESET],
            view_index: 0,
        }
    }
}

impl AquariumConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjust_speed(&mut self, increase: bool) {
        self.globals.speed = if increase {
            (self.globals.speed + SPEED_ADJUST_FACTOR).min(MAX_SPEED_MULTIPLIER)
        } else {
            (self.globals.speed - SPEED_ADJUST_FACTOR).max(MIN_SPEED_MULTIPLIER)
        };
        log::info!("Speed multiplier: {:.2}", self.globals.speed);
    }

    /// Selects a fish count preset; out-of-range indices are ignored.
    pub fn select_fish_preset(&mut self, index: usize) {
        if let Some(&count) = FISH_COUNT_PRESETS.get(index) {
            self.fish_count = count;
            log::info!("Fish count set to {count}");
        }
    }

    pub fn cycle_view(&mut self) {
        self.view_index = (self.view_index + 1) % VIEW_PRESETS.len();
        self.apply_view_preset(&VIEW_PRESETS[self.view_index]);
        log::info!("Switched to view preset {}", self.view_index);
    }

    pub fn apply_view_preset(&mut self, preset: &ViewPreset) {
        let g = &mut self.globals;
        g.target_height = preset.target_height;
        g.target_radius = preset.target_radius;
        g.eye_height = preset.eye_height;
        g.eye_radius = preset.eye_radius;
        g.eye_speed = preset.eye_speed;
        g.field_of_view = preset.field_of_view;
        [g.ambient_red, g.ambient_green, g.ambient_blue] = preset.ambient;
        g.fog_power = preset.fog_power;
        g.fog_mult = preset.fog_mult;
        g.fog_offset = preset.fog_offset;
        [g.fog_red, g.fog_green, g.fog_blue] = preset.fog_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped() {
        let mut config = AquariumConfig::new();
        for _ in 0..100 {
            config.adjust_speed(true);
        }
        assert_eq!(config.globals.speed, MAX_SPEED_MULTIPLIER);
        for _ in 0..100 {
            config.adjust_speed(false);
        }
        assert_eq!(config.globals.speed, MIN_SPEED_MULTIPLIER);
    }

    #[test]
    fn fish_preset_out_of_range_is_ignored() {
        let mut config = AquariumConfig::new();
        config.select_fish_preset(4);
        assert_eq!(config.fish_count, 5_000);
        config.select_fish_preset(99);
        assert_eq!(config.fish_count, 5_000);
    }

    #[test]
    fn cycling_views_wraps_and_applies_preset() {
        let mut config = AquariumConfig::new();
        config.cycle_view();
        assert_eq!(config.view_index, 1);
        assert_eq!(config.globals.eye_radius, VIEW_PRESETS[1].eye_radius);
        assert_eq!(config.globals.fog_red, VIEW_PRESETS[1].fog_color[0]);
        for _ in 0..VIEW_PRESETS.len() - 1 {
            config.cycle_view();
        }
        assert_eq!(config.view_index, 0);
    }
}
// --- End of File: config.rs ---
