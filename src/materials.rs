// --- File: materials.rs ---
use crate::assets::{AssetSource, TextureNames};
use crate::cache::ResourceCache;
use crate::config::{FeatureToggles, TankConstants};
use crate::constants::{
    DIFFUSE_SHININESS, DIFFUSE_SPECULAR_FACTOR, FISH_SHININESS, FISH_SPECULAR_FACTOR,
    OUTER_TANK_FUDGE, SKYBOX_FACES, TANK_SHININESS, TANK_SPECULAR_FACTOR,
};
use crate::error::{AquariumError, Result};
use crate::pipelines::BindGroupLayouts;
use crate::species::Species;
use crate::textures::{TextureCache, TextureRecord};
use crate::uniforms::{DiffuseMaterialUniform, FishSpeciesUniform, TankMaterialUniform, as_bytes};
use std::fmt;
use std::sync::Arc;
use wgpu::util::DeviceExt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TankKind {
    Inner,
    Outer,
}

impl TankKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TankKind::Inner => "inner",
            TankKind::Outer => "outer",
        }
    }
}

/// Composite cache key; two models with the same textures share a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Diffuse(String),
    Fish {
        diffuse: String,
        normal: Option<String>,
        reflection: Option<String>,
    },
    Tank {
        kind: TankKind,
        diffuse: String,
        normal: Option<String>,
        reflection: Option<String>,
    },
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_none = |name: &Option<String>| name.clone().unwrap_or_else(|| "none".to_string());
        match self {
            MaterialKey::Diffuse(texture) => write!(f, "diffuse:{texture}"),
            MaterialKey::Fish {
                diffuse,
                normal,
                reflection,
            } => write!(f, "fish:{diffuse}:{}:{}", or_none(normal), or_none(reflection)),
            MaterialKey::Tank {
                kind,
                diffuse,
                normal,
                reflection,
            } => write!(
                f,
                "tank:{}:{diffuse}:{}:{}",
                kind.as_str(),
                or_none(normal),
                or_none(reflection)
            ),
        }
    }
}

pub struct Material {
    pub key: String,
    pub bind_group: wgpu::BindGroup,
    /// Present for diffuse and tank materials.
    pub uniform_buffer: Option<wgpu::Buffer>,
    pub has_normal_map: bool,
    pub has_reflection_map: bool,
}

// --- Uniform builders ---

pub fn diffuse_uniform() -> DiffuseMaterialUniform {
    DiffuseMaterialUniform {
        specular: [1.0; 4],
        shininess: DIFFUSE_SHININESS,
        specular_factor: DIFFUSE_SPECULAR_FACTOR,
        _padding: [0.0; 2],
    }
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

pub fn fish_species_uniform(
    species: &Species,
    options: &FeatureToggles,
    has_normal_map: bool,
    has_reflection_map: bool,
) -> FishSpeciesUniform {
    FishSpeciesUniform {
        fish_length: species.body.fish_length,
        fish_wave_length: species.body.fish_wave_length,
        fish_bend_amount: species.body.fish_bend_amount,
        use_normal_map: flag(options.normal_maps && has_normal_map),
        use_reflection_map: flag(options.reflection && has_reflection_map),
        shininess: FISH_SHININESS,
        specular_factor: FISH_SPECULAR_FACTOR,
        _padding: 0.0,
    }
}

pub fn tank_uniform(
    kind: TankKind,
    tank: &TankConstants,
    options: &FeatureToggles,
    has_normal_map: bool,
    has_reflection_map: bool,
) -> TankMaterialUniform {
    TankMaterialUniform {
        specular: [1.0; 4],
        shininess: TANK_SHININESS,
        specular_factor: TANK_SPECULAR_FACTOR,
        refraction_fudge: tank.refraction_fudge,
        eta: tank.eta,
        tank_color_fudge: tank.tank_color_fudge,
        use_normal_map: flag(options.normal_maps && has_normal_map),
        use_reflection_map: flag(options.reflection && has_reflection_map),
        outer_fudge: match kind {
            TankKind::Inner => 0.0,
            TankKind::Outer => OUTER_TANK_FUDGE,
        },
        _padding: [0.0; 4],
    }
}

/// Texture names are relative to the `assets/` folder.
pub fn texture_path(name: &str) -> String {
    format!("assets/{name}")
}

// --- Library ---

/// Everything a material factory needs from the GPU side.
pub struct MaterialContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub source: &'a dyn AssetSource,
    pub layouts: &'a BindGroupLayouts,
}

impl MaterialContext<'_> {
    fn uniform_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn texture(&self, textures: &mut TextureCache, name: &str) -> Result<Arc<TextureRecord>> {
        textures.load(self.device, self.queue, self.source, &texture_path(name), false)
    }

    /// Optional map, falling back to `fallback` when absent.
    fn texture_or(
        &self,
        textures: &mut TextureCache,
        name: Option<&str>,
        fallback: &Arc<TextureRecord>,
    ) -> Result<Arc<TextureRecord>> {
        match name {
            Some(name) => self.texture(textures, name),
            None => Ok(Arc::clone(fallback)),
        }
    }
}

fn log_build(label: &str, diffuse: &TextureRecord) {
    let (width, height) = diffuse.dimensions();
    log::debug!("Building material {label} over a {width}x{height} diffuse map");
}

fn texture_entry(binding: u32, record: &TextureRecord) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(&record.view),
    }
}

/// Material and texture caches shared by every renderable item.
pub struct MaterialLibrary {
    pub textures: TextureCache,
    materials: ResourceCache<MaterialKey, Material>,
}

impl MaterialLibrary {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            textures: TextureCache::new(device),
            materials: ResourceCache::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn diffuse(&mut self, ctx: &MaterialContext<'_>, texture: &str) -> Result<Arc<Material>> {
        let textures = &mut self.textures;
        self.materials
            .get_or_create(MaterialKey::Diffuse(texture.to_string()), |key| {
                let record = ctx.texture(textures, texture)?;
                let label = key.to_string();
                log_build(&label, &record);
                let uniform = ctx.uniform_buffer(&label, as_bytes(&diffuse_uniform()));
                let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout: &ctx.layouts.diffuse_material,
                    entries: &[
                        texture_entry(0, &record),
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(textures.sampler(record.sampler)),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: uniform.as_entire_binding(),
                        },
                    ],
                });
                Ok(Material {
                    key: label,
                    bind_group,
                    uniform_buffer: Some(uniform),
                    has_normal_map: false,
                    has_reflection_map: false,
                })
            })
    }

    pub fn fish(
        &mut self,
        ctx: &MaterialContext<'_>,
        model_name: &str,
        names: &TextureNames,
    ) -> Result<Arc<Material>> {
        let diffuse_name = names
            .diffuse
            .clone()
            .ok_or_else(|| AquariumError::MissingDiffuseTexture(model_name.to_string()))?;
        let key = MaterialKey::Fish {
            diffuse: diffuse_name.clone(),
            normal: names.normal_map.clone(),
            reflection: names.reflection_map.clone(),
        };
        let textures = &mut self.textures;
        self.materials.get_or_create(key, |key| {
            let diffuse = ctx.texture(textures, &diffuse_name)?;
            let normal = ctx.texture_or(textures, names.normal_map.as_deref(), &diffuse)?;
            let reflection = ctx.texture_or(textures, names.reflection_map.as_deref(), &diffuse)?;
            let label = key.to_string();
            log_build(&label, &diffuse);
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&label),
                layout: &ctx.layouts.fish_material,
                entries: &[
                    texture_entry(0, &diffuse),
                    texture_entry(1, &normal),
                    texture_entry(2, &reflection),
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(textures.sampler(diffuse.sampler)),
                    },
                ],
            });
            Ok(Material {
                key: label,
                bind_group,
                uniform_buffer: None,
                has_normal_map: names.normal_map.is_some(),
                has_reflection_map: names.reflection_map.is_some(),
            })
        })
    }

    pub fn tank(
        &mut self,
        ctx: &MaterialContext<'_>,
        model_name: &str,
        kind: TankKind,
        names: &TextureNames,
        tank: &TankConstants,
        options: &FeatureToggles,
    ) -> Result<Arc<Material>> {
        let diffuse_name = names
            .diffuse
            .clone()
            .ok_or_else(|| AquariumError::MissingDiffuseTexture(model_name.to_string()))?;
        let key = MaterialKey::Tank {
            kind,
            diffuse: diffuse_name.clone(),
            normal: names.normal_map.clone(),
            reflection: names.reflection_map.clone(),
        };
        let textures = &mut self.textures;
        self.materials.get_or_create(key, |key| {
            let diffuse = ctx.texture(textures, &diffuse_name)?;
            let normal = ctx.texture_or(textures, names.normal_map.as_deref(), &diffuse)?;
            let reflection = ctx.texture_or(textures, names.reflection_map.as_deref(), &diffuse)?;
            let skybox = textures.load_cube(ctx.device, ctx.queue, ctx.source, &SKYBOX_FACES)?;

            let has_normal_map = names.normal_map.is_some();
            let has_reflection_map = names.reflection_map.is_some();
            let label = key.to_string();
            log_build(&label, &diffuse);
            let uniform = ctx.uniform_buffer(
                &label,
                as_bytes(&tank_uniform(kind, tank, options, has_normal_map, has_reflection_map)),
            );
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&label),
                layout: &ctx.layouts.tank_material,
                entries: &[
                    texture_entry(0, &diffuse),
                    texture_entry(1, &normal),
                    texture_entry(2, &reflection),
                    texture_entry(3, &skybox),
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(textures.sampler(diffuse.sampler)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: uniform.as_entire_binding(),
                    },
                ],
            });
            Ok(Material {
                key: label,
                bind_group,
                uniform_buffer: Some(uniform),
                has_normal_map,
                has_reflection_map,
            })
        })
    }
}

// --- End of File: materials.rs ---
