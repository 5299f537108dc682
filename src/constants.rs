// --- File: constants.rs ---
// --- Global Aquarium Constants ---
pub const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.1,
    b: 0.2,
    a: 1.0,
};
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.25;

// Longest frame step fed to the simulation; protects the clocks after a stall.
pub const MAX_FRAME_DELTA_SECS: f32 = 0.25;

pub const MIN_SPEED_MULTIPLIER: f32 = 0.0;
pub const MAX_SPEED_MULTIPLIER: f32 = 4.0;
pub const SPEED_ADJUST_FACTOR: f32 = 0.25;

// --- Camera ---
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 25_000.0;
pub const LIGHT_HEIGHT_ABOVE_EYE: f32 = 20.0;

// --- Fish School ---
pub const FISH_COUNT_PRESETS: [usize; 10] = [
    1, 100, 500, 1_000, 5_000, 10_000, 15_000, 20_000, 25_000, 30_000,
];
pub const DEFAULT_FISH_PRESET: usize = 2;
pub const TAIL_DIRECTION_DELTA: f32 = 0.04;
pub const TARGET_HEIGHT_DELTA: f32 = 0.01;
pub const FISH_MIN_VERTICAL_RADIUS: f32 = 2.0;
pub const FISH_INITIAL_INSTANCE_CAPACITY: usize = 1;
pub const FISH_SHININESS: f32 = 5.0;
pub const FISH_SPECULAR_FACTOR: f32 = 0.3;

// --- Bubbles ---
pub const BUBBLE_EMITTER_COUNT: usize = 10;
pub const BUBBLE_TRIGGER_INTERVAL: (f32, f32) = (2.0, 10.0);
pub const BUBBLE_EMIT_RADIUS: (f32, f32) = (0.0, 50.0);
pub const MAX_BUBBLE_PARTICLES: usize = 1_000;
pub const BUBBLES_PER_BURST: usize = 100;
pub const BUBBLE_LIFETIME: f32 = 40.0;
pub const BUBBLE_TINT: [f32; 4] = [0.7, 0.8, 1.0, 1.0];
// Unused slots sit far in the past so the shader treats them as expired.
pub const BUBBLE_INACTIVE_START_TIME: f32 = -1_000.0;

// --- Lasers ---
pub const LASERS_PER_FISH: usize = 3;
pub const LASER_LENGTH: f32 = 200.0;
pub const LASER_WIDTH: f32 = 0.5;
pub const LASER_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];

// --- Light Rays ---
pub const LIGHT_RAY_COUNT: usize = 5;
pub const LIGHT_RAY_SPEED: f32 = 4.0;
pub const LIGHT_RAY_DURATION_MIN: f32 = 1.0;
pub const LIGHT_RAY_DURATION_RANGE: f32 = 1.0;
pub const LIGHT_RAY_POS_RANGE: f32 = 40.0;
pub const LIGHT_RAY_ROT_RANGE: f32 = 1.0;
pub const LIGHT_RAY_ROT_LERP: f32 = 0.2;
pub const LIGHT_RAY_HEIGHT: f32 = 50.0;
pub const LIGHT_RAY_MIN_Y: f32 = 70.0;
pub const LIGHT_RAY_MAX_Y: f32 = 120.0;
pub const LIGHT_RAY_SCALE: [f32; 3] = [10.0, -100.0, 10.0];

// --- Materials ---
pub const DIFFUSE_SHININESS: f32 = 5.0;
pub const DIFFUSE_SPECULAR_FACTOR: f32 = 0.3;
pub const TANK_SHININESS: f32 = 50.0;
pub const TANK_SPECULAR_FACTOR: f32 = 1.0;
pub const OUTER_TANK_FUDGE: f32 = 0.2;

// --- Static texture paths, relative to the asset root ---
pub const BUBBLE_TEXTURE: &str = "static_assets/bubble.png";
pub const LASER_TEXTURE: &str = "static_assets/beam.png";
pub const LIGHT_RAY_TEXTURE: &str = "static_assets/LightRay.png";
pub const SKYBOX_FACES: [&str; 6] = [
    "assets/GlobeOuter_EM_positive_x.jpg",
    "assets/GlobeOuter_EM_negative_x.jpg",
    "assets/GlobeOuter_EM_positive_y.jpg",
    "assets/GlobeOuter_EM_negative_y.jpg",
    "assets/GlobeOuter_EM_positive_z.jpg",
    "assets/GlobeOuter_EM_negative_z.jpg",
];
// --- End of File: constants.rs ---
