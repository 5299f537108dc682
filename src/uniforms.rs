// --- File: uniforms.rs ---
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

// --- GPU Data Structures ---
// Every record here mirrors a WGSL struct in src/shaders/. Sizes are checked at
// compile time so a field change cannot silently shift the shader layout.

/// Dynamic offsets must be multiples of this on every backend wgpu targets.
pub const UNIFORM_SLOT_ALIGNMENT: u64 = 256;

/// Serialises any GPU record for `queue.write_buffer`.
#[inline]
pub fn as_bytes<T: Pod>(record: &T) -> &[u8] {
    bytemuck::bytes_of(record)
}

/// Per-frame block shared by every pass (group 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_projection: [[f32; 4]; 4],
    pub view_inverse: [[f32; 4]; 4],
    pub light_world_pos: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    pub fog_color: [f32; 4],
    /// power, mult, offset, enabled (0 or 1)
    pub fog_params: [f32; 4],
    pub _padding: [[f32; 4]; 3],
}

/// Per-object block written into one slot of the object arena.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub world: [[f32; 4]; 4],
    pub world_inverse: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
    /// Technique specific: seaweed time in `x`, light-ray alpha in `x`.
    pub aux: [f32; 4],
    pub _padding: [[f32; 4]; 3],
}

impl ObjectUniform {
    pub fn new(world: Mat4, aux: [f32; 4]) -> Self {
        let inverse = world.inverse();
        Self {
            world: world.to_cols_array_2d(),
            world_inverse: inverse.to_cols_array_2d(),
            world_inverse_transpose: inverse.transpose().to_cols_array_2d(),
            aux,
            _padding: [[0.0; 4]; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DiffuseMaterialUniform {
    pub specular: [f32; 4],
    pub shininess: f32,
    pub specular_factor: f32,
    pub _padding: [f32; 2],
}

/// Body constants and map switches for one fish species.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FishSpeciesUniform {
    pub fish_length: f32,
    pub fish_wave_length: f32,
    pub fish_bend_amount: f32,
    pub use_normal_map: f32,
    pub use_reflection_map: f32,
    pub shininess: f32,
    pub specular_factor: f32,
    pub _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TankMaterialUniform {
    pub specular: [f32; 4],
    pub shininess: f32,
    pub specular_factor: f32,
    pub refraction_fudge: f32,
    pub eta: f32,
    pub tank_color_fudge: f32,
    pub use_normal_map: f32,
    pub use_reflection_map: f32,
    /// Extra alpha lift applied by the outer shell; 0 for the inner one.
    pub outer_fudge: f32,
    pub _padding: [f32; 4],
}

/// One element of a species' instance storage buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FishInstanceRaw {
    pub world_position: [f32; 3],
    pub scale: f32,
    pub next_position: [f32; 3],
    pub tail_time: f32,
}

/// One ring slot of the bubble particle buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BubbleParticle {
    /// xyz position, w spawn time
    pub position_start_time: [f32; 4],
    /// xyz velocity, w start size
    pub velocity_start_size: [f32; 4],
    /// xyz acceleration, w end size
    pub acceleration_end_size: [f32; 4],
    pub color_mult: [f32; 4],
    /// lifetime, frame start, spin start, spin speed
    pub lifetime_frame_spin: [f32; 4],
}

/// Camera block used by the bubble billboards; `time.x` is the simulation clock.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BubbleFrameUniform {
    pub view_projection: [[f32; 4]; 4],
    pub view_inverse: [[f32; 4]; 4],
    pub time: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LaserColorUniform {
    pub color: [f32; 4],
}

// --- Layout checks ---
const _: () = assert!(std::mem::size_of::<FrameUniform>() == 256);
const _: () = assert!(std::mem::size_of::<ObjectUniform>() == UNIFORM_SLOT_ALIGNMENT as usize);
const _: () = assert!(std::mem::size_of::<DiffuseMaterialUniform>() == 32);
const _: () = assert!(std::mem::size_of::<FishSpeciesUniform>() == 32);
const _: () = assert!(std::mem::size_of::<TankMaterialUniform>() == 64);
const _: () = assert!(std::mem::size_of::<FishInstanceRaw>() == 32);
const _: () = assert!(std::mem::size_of::<BubbleParticle>() == 80);
const _: () = assert!(std::mem::size_of::<BubbleFrameUniform>() == 144);
const _: () = assert!(std::mem::size_of::<LaserColorUniform>() == 16);

#[inline]
pub fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

// --- End of File: uniforms.rs ---
