// --- File: pipelines.rs ---
use crate::assets::AttributeSemantic;
use crate::constants::DEPTH_FORMAT;
use crate::uniforms::{
    BubbleFrameUniform, BubbleParticle, DiffuseMaterialUniform, FishSpeciesUniform,
    FrameUniform, LaserColorUniform, ObjectUniform, TankMaterialUniform,
};
use std::collections::HashMap;
use std::mem::size_of;

/// Every visual technique the frame composer can draw with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Technique {
    Diffuse,
    Fish,
    Seaweed,
    InnerTank,
    OuterTank,
    Bubble,
    Laser,
    LightRay,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// one, one-minus-src-alpha
    PremultipliedAlpha,
    /// src-alpha, one-minus-src-alpha
    AlphaBlend,
    /// src-alpha, one
    AdditiveAlpha,
    /// one, one
    Additive,
}

impl BlendMode {
    pub fn state(self) -> Option<wgpu::BlendState> {
        use wgpu::{BlendComponent, BlendFactor, BlendOperation};
        let component = |src, dst| BlendComponent {
            src_factor: src,
            dst_factor: dst,
            operation: BlendOperation::Add,
        };
        match self {
            BlendMode::Opaque => None,
            BlendMode::PremultipliedAlpha => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            BlendMode::AlphaBlend => Some(wgpu::BlendState {
                color: component(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
                alpha: component(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            }),
            BlendMode::AdditiveAlpha => Some(wgpu::BlendState {
                color: component(BlendFactor::SrcAlpha, BlendFactor::One),
                alpha: component(BlendFactor::One, BlendFactor::One),
            }),
            BlendMode::Additive => Some(wgpu::BlendState {
                color: component(BlendFactor::One, BlendFactor::One),
                alpha: component(BlendFactor::One, BlendFactor::One),
            }),
        }
    }
}

/// Bind group layouts in set order for a technique's pipeline layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum GroupSet {
    /// frame, model, material
    Model(MaterialLayout),
    /// frame, fish instances, fish material
    Fish,
    /// bubble frame, bubble material
    Bubble,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MaterialLayout {
    Diffuse,
    Tank,
    Laser,
    LightRay,
}

/// Fixed render state for one technique.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    pub label: &'static str,
    pub shader: &'static str,
    pub blend: BlendMode,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
    groups: GroupSet,
}

pub fn pipeline_state(technique: Technique) -> PipelineState {
    use wgpu::CompareFunction::{Always, Less};
    let (label, shader, blend, cull_mode, depth_write, depth_compare, groups) = match technique {
        Technique::Diffuse => (
            "Diffuse Pipeline",
            include_str!("shaders/diffuse.wgsl"),
            BlendMode::PremultipliedAlpha,
            Some(wgpu::Face::Back),
            true,
            Less,
            GroupSet::Model(MaterialLayout::Diffuse),
        ),
        Technique::Fish => (
            "Fish Pipeline",
            include_str!("shaders/fish.wgsl"),
            BlendMode::PremultipliedAlpha,
            Some(wgpu::Face::Back),
            true,
            Less,
            GroupSet::Fish,
        ),
        Technique::Seaweed => (
            "Seaweed Pipeline",
            include_str!("shaders/seaweed.wgsl"),
            BlendMode::PremultipliedAlpha,
            None,
            false,
            Less,
            GroupSet::Model(MaterialLayout::Diffuse),
        ),
        Technique::InnerTank => (
            "Inner Tank Pipeline",
            include_str!("shaders/inner.wgsl"),
            BlendMode::Opaque,
            None,
            true,
            Less,
            GroupSet::Model(MaterialLayout::Tank),
        ),
        Technique::OuterTank => (
            "Outer Tank Pipeline",
            include_str!("shaders/outer.wgsl"),
            BlendMode::AlphaBlend,
            None,
            true,
            Less,
            GroupSet::Model(MaterialLayout::Tank),
        ),
        Technique::Bubble => (
            "Bubble Pipeline",
            include_str!("shaders/bubble.wgsl"),
            BlendMode::AdditiveAlpha,
            None,
            false,
            Less,
            GroupSet::Bubble,
        ),
        Technique::Laser => (
            "Laser Pipeline",
            include_str!("shaders/laser.wgsl"),
            BlendMode::Additive,
            None,
            false,
            Less,
            GroupSet::Model(MaterialLayout::Laser),
        ),
        Technique::LightRay => (
            "Light Ray Pipeline",
            include_str!("shaders/light_ray.wgsl"),
            BlendMode::AlphaBlend,
            None,
            false,
            Always,
            GroupSet::Model(MaterialLayout::LightRay),
        ),
    };
    PipelineState {
        label,
        shader,
        blend,
        cull_mode,
        depth_write,
        depth_compare,
        groups,
    }
}

// --- Vertex layouts ---

/// Streams every model shader reads, in vertex buffer slot order. The slot
/// doubles as the `@location` of the attribute.
pub const MESH_STREAMS: [(AttributeSemantic, wgpu::VertexFormat); 3] = [
    (AttributeSemantic::Position, wgpu::VertexFormat::Float32x3),
    (AttributeSemantic::Normal, wgpu::VertexFormat::Float32x3),
    (AttributeSemantic::Texcoord, wgpu::VertexFormat::Float32x2),
];

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const TEXCOORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

const CORNER_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const PARTICLE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    1 => Float32x4,
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4
];
const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

static BUBBLE_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 2] = [
    wgpu::VertexBufferLayout {
        array_stride: (2 * size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CORNER_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: size_of::<BubbleParticle>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &PARTICLE_ATTRIBUTES,
    },
];

static MESH_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 3] = [
    wgpu::VertexBufferLayout {
        array_stride: (3 * size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: (3 * size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &NORMAL_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: (2 * size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEXCOORD_ATTRIBUTES,
    },
];

static QUAD_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 1] = [wgpu::VertexBufferLayout {
    array_stride: (4 * size_of::<f32>()) as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &QUAD_ATTRIBUTES,
}];

pub fn vertex_layouts(technique: Technique) -> &'static [wgpu::VertexBufferLayout<'static>] {
    match technique {
        Technique::Diffuse
        | Technique::Fish
        | Technique::Seaweed
        | Technique::InnerTank
        | Technique::OuterTank => &MESH_LAYOUTS,
        Technique::Bubble => &BUBBLE_LAYOUTS,
        Technique::Laser | Technique::LightRay => &QUAD_LAYOUTS,
    }
}

// --- Bind Group Layouts ---

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: wgpu::BufferSize::new(size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub struct BindGroupLayouts {
    pub frame: wgpu::BindGroupLayout,
    /// Per-object block, addressed with a dynamic offset.
    pub model: wgpu::BindGroupLayout,
    pub diffuse_material: wgpu::BindGroupLayout,
    pub fish_instance: wgpu::BindGroupLayout,
    pub fish_material: wgpu::BindGroupLayout,
    pub tank_material: wgpu::BindGroupLayout,
    pub bubble_frame: wgpu::BindGroupLayout,
    pub bubble_material: wgpu::BindGroupLayout,
    pub laser_material: wgpu::BindGroupLayout,
    pub light_ray_material: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        use wgpu::ShaderStages as S;
        use wgpu::TextureViewDimension::{Cube, D2};
        let make = |label: &str, entries: &[wgpu::BindGroupLayoutEntry]| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
        };
        Self {
            frame: make(
                "Frame Bind Group Layout",
                &[uniform_entry::<FrameUniform>(0, S::VERTEX_FRAGMENT, false)],
            ),
            model: make(
                "Model Bind Group Layout",
                &[uniform_entry::<ObjectUniform>(0, S::VERTEX_FRAGMENT, true)],
            ),
            diffuse_material: make(
                "Diffuse Material Bind Group Layout",
                &[
                    texture_entry(0, D2),
                    sampler_entry(1),
                    uniform_entry::<DiffuseMaterialUniform>(2, S::FRAGMENT, false),
                ],
            ),
            fish_instance: make(
                "Fish Instance Bind Group Layout",
                &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: S::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    uniform_entry::<FishSpeciesUniform>(1, S::VERTEX_FRAGMENT, false),
                ],
            ),
            fish_material: make(
                "Fish Material Bind Group Layout",
                &[
                    texture_entry(0, D2),
                    texture_entry(1, D2),
                    texture_entry(2, D2),
                    sampler_entry(3),
                ],
            ),
            tank_material: make(
                "Tank Material Bind Group Layout",
                &[
                    texture_entry(0, D2),
                    texture_entry(1, D2),
                    texture_entry(2, D2),
                    texture_entry(3, Cube),
                    sampler_entry(4),
                    uniform_entry::<TankMaterialUniform>(5, S::FRAGMENT, false),
                ],
            ),
            bubble_frame: make(
                "Bubble Frame Bind Group Layout",
                &[uniform_entry::<BubbleFrameUniform>(0, S::VERTEX, false)],
            ),
            bubble_material: make(
                "Bubble Material Bind Group Layout",
                &[texture_entry(0, D2), sampler_entry(1)],
            ),
            laser_material: make(
                "Laser Material Bind Group Layout",
                &[
                    texture_entry(0, D2),
                    sampler_entry(1),
                    uniform_entry::<LaserColorUniform>(2, S::FRAGMENT, false),
                ],
            ),
            light_ray_material: make(
                "Light Ray Material Bind Group Layout",
                &[texture_entry(0, D2), sampler_entry(1)],
            ),
        }
    }

    fn groups(&self, set: GroupSet) -> Vec<&wgpu::BindGroupLayout> {
        match set {
            GroupSet::Model(material) => {
                let material = match material {
                    MaterialLayout::Diffuse => &self.diffuse_material,
                    MaterialLayout::Tank => &self.tank_material,
                    MaterialLayout::Laser => &self.laser_material,
                    MaterialLayout::LightRay => &self.light_ray_material,
                };
                vec![&self.frame, &self.model, material]
            }
            GroupSet::Fish => vec![&self.frame, &self.fish_instance, &self.fish_material],
            GroupSet::Bubble => vec![&self.bubble_frame, &self.bubble_material],
        }
    }
}

// --- Registry ---

/// Builds each technique's pipeline once and keeps it for the renderer's lifetime.
pub struct PipelineRegistry {
    pub layouts: BindGroupLayouts,
    color_format: wgpu::TextureFormat,
    pipelines: HashMap<Technique, wgpu::RenderPipeline>,
}

impl PipelineRegistry {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        Self {
            layouts: BindGroupLayouts::new(device),
            color_format,
            pipelines: HashMap::new(),
        }
    }

    pub fn get(&self, technique: Technique) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&technique)
    }

    /// Returns the pipeline for `technique`, building it on first request.
    pub fn get_or_build(&mut self, device: &wgpu::Device, technique: Technique) -> &wgpu::RenderPipeline {
        let layouts = &self.layouts;
        let color_format = self.color_format;
        self.pipelines.entry(technique).or_insert_with(|| {
            log::debug!("Building {technique:?} pipeline");
            build_pipeline(device, layouts, color_format, technique)
        })
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    color_format: wgpu::TextureFormat,
    technique: Technique,
) -> wgpu::RenderPipeline {
    let state = pipeline_state(technique);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(state.label),
        source: wgpu::ShaderSource::Wgsl(state.shader.into()),
    });
    let groups = layouts.groups(state.groups);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(state.label),
        bind_group_layouts: &groups,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(state.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts(technique),
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: state.blend.state(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write,
            depth_compare: state.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{BlendFactor, CompareFunction};

    const ALL: [Technique; 8] = [
        Technique::Diffuse,
        Technique::Fish,
        Technique::Seaweed,
        Technique::InnerTank,
        Technique::OuterTank,
        Technique::Bubble,
        Technique::Laser,
        Technique::LightRay,
    ];

    #[test]
    fn opaque_geometry_writes_depth_and_culls() {
        for technique in [Technique::Diffuse, Technique::Fish] {
            let s = pipeline_state(technique);
            assert!(s.depth_write);
            assert_eq!(s.cull_mode, Some(wgpu::Face::Back));
            assert_eq!(s.blend, BlendMode::PremultipliedAlpha);
        }
    }

    #[test]
    fn effects_never_write_depth() {
        for technique in [Technique::Seaweed, Technique::Bubble, Technique::Laser, Technique::LightRay] {
            assert!(!pipeline_state(technique).depth_write, "{technique:?}");
            assert_eq!(pipeline_state(technique).cull_mode, None);
        }
    }

    #[test]
    fn additive_passes_add_into_the_target() {
        let bubble = pipeline_state(Technique::Bubble).blend.state().unwrap();
        assert_eq!(bubble.color.src_factor, BlendFactor::SrcAlpha);
        assert_eq!(bubble.color.dst_factor, BlendFactor::One);
        let laser = pipeline_state(Technique::Laser).blend.state().unwrap();
        assert_eq!(laser.color.src_factor, BlendFactor::One);
        assert_eq!(laser.color.dst_factor, BlendFactor::One);
    }

    #[test]
    fn light_rays_ignore_depth() {
        let s = pipeline_state(Technique::LightRay);
        assert_eq!(s.depth_compare, CompareFunction::Always);
        assert_eq!(s.blend, BlendMode::AlphaBlend);
    }

    #[test]
    fn tank_shells_differ_only_in_blending() {
        let inner = pipeline_state(Technique::InnerTank);
        let outer = pipeline_state(Technique::OuterTank);
        assert_eq!(inner.blend.state(), None);
        assert_eq!(outer.blend, BlendMode::AlphaBlend);
        assert_eq!(inner.cull_mode, outer.cull_mode);
        assert_eq!(inner.depth_write, outer.depth_write);
    }

    #[test]
    fn every_shader_has_both_entry_points() {
        for technique in ALL {
            let source = pipeline_state(technique).shader;
            assert!(source.contains("fn vs_main"), "{technique:?}");
            assert!(source.contains("fn fs_main"), "{technique:?}");
        }
    }

    #[test]
    fn model_techniques_share_one_stream_per_semantic() {
        for technique in [
            Technique::Diffuse,
            Technique::Fish,
            Technique::Seaweed,
            Technique::InnerTank,
            Technique::OuterTank,
        ] {
            let layouts = vertex_layouts(technique);
            assert_eq!(layouts.len(), MESH_STREAMS.len(), "{technique:?}");
            for (slot, (layout, (semantic, format))) in layouts.iter().zip(MESH_STREAMS).enumerate() {
                assert_eq!(layout.attributes.len(), 1);
                assert_eq!(layout.attributes[0].shader_location, slot as u32);
                assert_eq!(layout.attributes[0].shader_location, semantic.shader_location());
                assert_eq!(layout.attributes[0].format, format);
                assert_eq!(layout.array_stride, format.size());
            }
        }
    }

    #[test]
    fn effects_use_their_own_layouts() {
        let bubble = vertex_layouts(Technique::Bubble);
        assert_eq!(bubble[1].array_stride, 80);
        assert_eq!(bubble[1].step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(vertex_layouts(Technique::Laser).len(), 1);
        assert_eq!(vertex_layouts(Technique::LightRay)[0].array_stride, 16);
    }
}
// --- End of File: pipelines.rs ---
