// --- File: scene.rs ---
use crate::assets::{AquariumAssets, AssetSource, SceneData};
use crate::config::AquariumConfig;
use crate::constants::FISH_INITIAL_INSTANCE_CAPACITY;
use crate::error::{AquariumError, Result};
use crate::materials::{
    Material, MaterialContext, MaterialLibrary, TankKind, fish_species_uniform, tank_uniform,
};
use crate::model::GpuModel;
use crate::pipelines::{BindGroupLayouts, PipelineRegistry, Technique};
use crate::simulation::fish_school::FishInstance;
use crate::species::Species;
use crate::uniforms::{FishInstanceRaw, as_bytes};
use crate::utils::GrowOnlyCapacity;
use glam::Mat4;
use std::mem::size_of;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Technique a scene is drawn with, resolved once from its program tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneTechnique {
    Diffuse,
    Fish,
    Seaweed,
    InnerTank,
    OuterTank,
}

impl SceneTechnique {
    pub fn from_program(program: &str) -> Option<Self> {
        match program {
            "diffuse" => Some(SceneTechnique::Diffuse),
            "seaweed" => Some(SceneTechnique::Seaweed),
            "inner" => Some(SceneTechnique::InnerTank),
            "outer" => Some(SceneTechnique::OuterTank),
            p if p.starts_with("fish") => Some(SceneTechnique::Fish),
            _ => None,
        }
    }

    pub fn pipeline(self) -> Technique {
        match self {
            SceneTechnique::Diffuse => Technique::Diffuse,
            SceneTechnique::Fish => Technique::Fish,
            SceneTechnique::Seaweed => Technique::Seaweed,
            SceneTechnique::InnerTank => Technique::InnerTank,
            SceneTechnique::OuterTank => Technique::OuterTank,
        }
    }
}

/// Variant data carried by a placed item.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ItemKind {
    Diffuse,
    Seaweed { time_offset: f32 },
    InnerTank,
    OuterTank,
}

impl ItemKind {
    pub fn technique(self) -> Technique {
        match self {
            ItemKind::Diffuse => Technique::Diffuse,
            ItemKind::Seaweed { .. } => Technique::Seaweed,
            ItemKind::InnerTank => Technique::InnerTank,
            ItemKind::OuterTank => Technique::OuterTank,
        }
    }

    pub fn tank(self) -> Option<TankKind> {
        match self {
            ItemKind::InnerTank => Some(TankKind::Inner),
            ItemKind::OuterTank => Some(TankKind::Outer),
            _ => None,
        }
    }
}

/// One model of one placement, by index into [`AquariumAssets::scenes`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ItemPlacement {
    pub scene: usize,
    pub model: usize,
    pub world: Mat4,
    pub kind: ItemKind,
}

/// Anything the draw planner can read a placement from.
pub trait Placed {
    fn placement(&self) -> &ItemPlacement;
}

impl Placed for ItemPlacement {
    fn placement(&self) -> &ItemPlacement {
        self
    }
}

pub struct RenderableItem {
    pub model: Arc<GpuModel>,
    pub material: Arc<Material>,
    pub placement: ItemPlacement,
}

impl Placed for RenderableItem {
    fn placement(&self) -> &ItemPlacement {
        &self.placement
    }
}

// --- Planning ---

/// Expands the placement list into per-model items.
///
/// Unknown scenes and fish scenes are skipped; fish come from the school.
/// Diffuse and seaweed models without a diffuse texture are skipped. Each
/// seaweed placement gets the next time offset.
pub fn plan_items(assets: &AquariumAssets) -> Vec<ItemPlacement> {
    let mut items = Vec::new();
    let mut seaweed_index = 0u32;

    for placement in &assets.placements {
        let Some(scene) = assets
            .scenes
            .iter()
            .position(|s| s.definition.name == placement.scene)
        else {
            log::debug!("Placement {} has no registered scene", placement.scene);
            continue;
        };
        let data = &assets.scenes[scene];
        let Some(technique) = SceneTechnique::from_program(data.definition.program) else {
            log::warn!(
                "Scene {} has unknown program {}",
                data.definition.name,
                data.definition.program
            );
            continue;
        };

        let kind = match technique {
            SceneTechnique::Fish => continue,
            SceneTechnique::Diffuse => ItemKind::Diffuse,
            SceneTechnique::Seaweed => {
                let time_offset = seaweed_index as f32;
                seaweed_index += 1;
                ItemKind::Seaweed { time_offset }
            }
            SceneTechnique::InnerTank => ItemKind::InnerTank,
            SceneTechnique::OuterTank => ItemKind::OuterTank,
        };
        let needs_diffuse = matches!(kind, ItemKind::Diffuse | ItemKind::Seaweed { .. });

        for (model, model_data) in data.models.iter().enumerate() {
            if needs_diffuse && model_data.textures.diffuse.is_none() {
                log::debug!("{} model {model} has no diffuse texture", data.definition.name);
                continue;
            }
            items.push(ItemPlacement {
                scene,
                model,
                world: placement.world,
                kind,
            });
        }
    }
    items
}

/// First model of the first scene using `technique`. Without one the
/// technique's pipeline is never built.
pub fn base_model(scenes: &[SceneData], technique: SceneTechnique) -> Option<(usize, usize)> {
    scenes
        .iter()
        .enumerate()
        .filter(|(_, s)| SceneTechnique::from_program(s.definition.program) == Some(technique))
        .find_map(|(i, s)| (!s.models.is_empty()).then_some((i, 0)))
}

// --- Fish Render Groups ---

fn fish_raw(fish: &FishInstance) -> FishInstanceRaw {
    FishInstanceRaw {
        world_position: fish.position.to_array(),
        scale: fish.scale,
        next_position: fish.target.to_array(),
        tail_time: fish.tail_time,
    }
}

/// GPU resources for one species: its model, material, species uniform and
/// a storage buffer of instances that only ever grows.
pub struct FishRenderGroup {
    pub species: usize,
    pub model: Arc<GpuModel>,
    pub material: Arc<Material>,
    species_uniform: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    capacity: GrowOnlyCapacity,
    instance_count: u32,
    pub instance_bind_group: wgpu::BindGroup,
    staging: Vec<FishInstanceRaw>,
}

impl FishRenderGroup {
    fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        species: usize,
        model: Arc<GpuModel>,
        material: Arc<Material>,
        uniform_bytes: &[u8],
    ) -> Self {
        let species_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fish Species Uniform Buffer"),
            contents: uniform_bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let capacity = FISH_INITIAL_INSTANCE_CAPACITY;
        let instance_buffer = create_instance_buffer(device, capacity);
        let instance_bind_group =
            create_instance_bind_group(device, layouts, &instance_buffer, &species_uniform);
        Self {
            species,
            model,
            material,
            species_uniform,
            instance_buffer,
            capacity: GrowOnlyCapacity::new(capacity),
            instance_count: 0,
            instance_bind_group,
            staging: Vec::new(),
        }
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Writes this frame's instances and species constants, growing the
    /// storage buffer by doubling when the bucket outgrew it.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        fish: &[FishInstance],
        species: &Species,
        config: &AquariumConfig,
    ) {
        self.instance_count = fish.len() as u32;
        let uniform = fish_species_uniform(
            species,
            &config.options,
            self.material.has_normal_map,
            self.material.has_reflection_map,
        );
        queue.write_buffer(&self.species_uniform, 0, as_bytes(&uniform));
        if fish.is_empty() {
            return;
        }

        let previous = self.capacity.get();
        if self.capacity.fit(fish.len()) {
            let capacity = self.capacity.get();
            log::debug!(
                "Growing {} instance buffer from {previous} to {capacity}",
                species.name
            );
            self.instance_buffer = create_instance_buffer(device, capacity);
            self.instance_bind_group = create_instance_bind_group(
                device,
                layouts,
                &self.instance_buffer,
                &self.species_uniform,
            );
        }

        self.staging.clear();
        self.staging.extend(fish.iter().map(fish_raw));
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.staging));
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Fish Instance Storage Buffer"),
        size: (capacity * size_of::<FishInstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_instance_bind_group(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    instances: &wgpu::Buffer,
    species_uniform: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Fish Instance Bind Group"),
        layout: &layouts.fish_instance,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: instances.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: species_uniform.as_entire_binding(),
            },
        ],
    })
}

// --- Composition ---

pub struct ComposedScene {
    pub items: Vec<RenderableItem>,
    pub fish_groups: Vec<FishRenderGroup>,
}

impl ComposedScene {
    /// Rewrites every tank material block from the current snapshot.
    pub fn refresh_tank_uniforms(&self, queue: &wgpu::Queue, config: &AquariumConfig) {
        for item in &self.items {
            let Some(kind) = item.placement.kind.tank() else {
                continue;
            };
            let material = &item.material;
            if let Some(buffer) = &material.uniform_buffer {
                let uniform = tank_uniform(
                    kind,
                    &config.tank,
                    &config.options,
                    material.has_normal_map,
                    material.has_reflection_map,
                );
                queue.write_buffer(buffer, 0, as_bytes(&uniform));
            }
        }
    }
}

/// Uploads every scene model, builds the model-driven pipelines and
/// resolves a material for each planned item and fish species.
///
/// The diffuse base model is required; fish, seaweed and tank pipelines are
/// built only when a scene for them exists.
#[allow(clippy::too_many_arguments)]
pub fn compose(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &dyn AssetSource,
    registry: &mut PipelineRegistry,
    library: &mut MaterialLibrary,
    assets: &AquariumAssets,
    species: &[Species],
    config: &AquariumConfig,
) -> Result<ComposedScene> {
    let models: Vec<Vec<Arc<GpuModel>>> = assets
        .scenes
        .iter()
        .map(|scene| {
            scene
                .models
                .iter()
                .map(|data| GpuModel::upload(device, scene.definition.name, data).map(Arc::new))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<_>>()?;

    base_model(&assets.scenes, SceneTechnique::Diffuse)
        .ok_or(AquariumError::MissingBaseModel("diffuse"))?;
    registry.get_or_build(device, Technique::Diffuse);
    for technique in [
        SceneTechnique::Fish,
        SceneTechnique::Seaweed,
        SceneTechnique::InnerTank,
        SceneTechnique::OuterTank,
    ] {
        if base_model(&assets.scenes, technique).is_some() {
            registry.get_or_build(device, technique.pipeline());
        } else {
            log::warn!("No {technique:?} scene; its pass will be skipped");
        }
    }

    let ctx = MaterialContext {
        device,
        queue,
        source,
        layouts: &registry.layouts,
    };

    let mut items = Vec::new();
    for placement in plan_items(assets) {
        let scene = &assets.scenes[placement.scene];
        let gpu_model = Arc::clone(&models[placement.scene][placement.model]);
        let names = &gpu_model.textures;
        let material = match placement.kind {
            ItemKind::Diffuse | ItemKind::Seaweed { .. } => match &names.diffuse {
                Some(texture) => library.diffuse(&ctx, texture)?,
                None => continue,
            },
            ItemKind::InnerTank | ItemKind::OuterTank => {
                let Some(kind) = placement.kind.tank() else {
                    continue;
                };
                library.tank(
                    &ctx,
                    scene.definition.name,
                    kind,
                    names,
                    &config.tank,
                    &config.options,
                )?
            }
        };
        log::debug!("{} uses {}", scene.definition.name, material.key);
        items.push(RenderableItem {
            model: gpu_model,
            material,
            placement,
        });
    }

    let mut fish_groups = Vec::new();
    for (index, kind) in species.iter().enumerate() {
        let Some(scene) = assets.scenes.iter().position(|s| s.definition.name == kind.name) else {
            log::warn!("Species {} has no scene", kind.name);
            continue;
        };
        let Some(gpu_model) = models[scene].first() else {
            continue;
        };
        let material = library.fish(&ctx, kind.name, &gpu_model.textures)?;
        log::debug!("{} uses {}", kind.name, material.key);
        let uniform = fish_species_uniform(
            kind,
            &config.options,
            material.has_normal_map,
            material.has_reflection_map,
        );
        fish_groups.push(FishRenderGroup::new(
            device,
            &registry.layouts,
            index,
            Arc::clone(gpu_model),
            material,
            as_bytes(&uniform),
        ));
    }

    log::info!(
        "Composed {} items, {} fish groups, {} materials, {} textures",
        items.len(),
        fish_groups.len(),
        library.len(),
        library.textures.len()
    );
    Ok(ComposedScene { items, fish_groups })
}

// --- End of File: scene.rs ---
