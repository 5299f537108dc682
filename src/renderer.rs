use crate::assets::{AquariumAssets, AssetSource};
use crate::camera::Camera;
use crate::config::AquariumConfig;
use crate::constants::{
    BACKGROUND_COLOR, BUBBLE_TEXTURE, DEPTH_FORMAT, LASER_COLOR, LASER_TEXTURE,
    LIGHT_RAY_TEXTURE, MAX_FRAME_DELTA_SECS,
};
use crate::draw_list::{DrawCommand, FrameDrawList, FrameInputs};
use crate::error::{AquariumError, Result};
use crate::materials::MaterialLibrary;
use crate::pipelines::{BindGroupLayouts, PipelineRegistry, Technique};
use crate::scene::{self, ComposedScene};
use crate::simulation::bubbles::{BubbleEmitter, ParticlePool, step_bubbles};
use crate::simulation::clock::SimulationClock;
use crate::simulation::fish_school::FishSchool;
use crate::simulation::lasers::{LaserInstance, compute_lasers};
use crate::simulation::light_rays::LightRayController;
use crate::species::{Species, default_species};
use crate::textures::{TextureCache, TextureRecord};
use crate::uniforms::{
    BubbleFrameUniform, BubbleParticle, FrameUniform, LaserColorUniform, ObjectUniform,
    UNIFORM_SLOT_ALIGNMENT, as_bytes,
};
use crate::utils::GrowOnlyCapacity;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::mem::size_of;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

// --- Quad Geometry ---

// Two triangles of vec2 corners, expanded into camera-facing sprites.
const BUBBLE_CORNERS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];

// position xy, uv
const LASER_QUAD: [[f32; 4]; 6] = [
    [-0.5, -0.5, 0.0, 1.0],
    [0.5, -0.5, 1.0, 1.0],
    [0.5, 0.5, 1.0, 0.0],
    [-0.5, -0.5, 0.0, 1.0],
    [0.5, 0.5, 1.0, 0.0],
    [-0.5, 0.5, 0.0, 0.0],
];

const LIGHT_RAY_QUAD: [[f32; 4]; 6] = [
    [-10.0, 0.0, 0.0, 1.0],
    [10.0, 0.0, 1.0, 1.0],
    [10.0, 100.0, 1.0, 0.0],
    [-10.0, 0.0, 0.0, 1.0],
    [10.0, 100.0, 1.0, 0.0],
    [-10.0, 100.0, 0.0, 0.0],
];

const INITIAL_OBJECT_SLOTS: usize = 64;

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    record: &TextureRecord,
    sampler: &wgpu::Sampler,
    uniform: Option<&wgpu::Buffer>,
) -> wgpu::BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&record.view),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        },
    ];
    if let Some(buffer) = uniform {
        entries.push(wgpu::BindGroupEntry {
            binding: 2,
            resource: buffer.as_entire_binding(),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

// --- Object Arena ---

/// One uniform buffer of 256-byte slots addressed with dynamic offsets.
/// Slot `n` of a frame holds that frame's `n`-th object block.
struct ObjectArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: GrowOnlyCapacity,
}

impl ObjectArena {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Arena"),
            size: capacity as u64 * UNIFORM_SLOT_ALIGNMENT,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Arena Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity: GrowOnlyCapacity::new(capacity),
        }
    }

    fn reserve(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, slots: usize) {
        let previous = self.capacity.get();
        if self.capacity.fit(slots) {
            let capacity = self.capacity.get();
            log::debug!("Growing object arena from {previous} to {capacity} slots");
            *self = Self::new(device, layout, capacity);
        }
    }

    #[inline]
    fn offset(slot: u32) -> u32 {
        slot * UNIFORM_SLOT_ALIGNMENT as u32
    }
}

// --- Effect Resources ---

/// Buffers and bind groups for the bubble, laser and light-ray passes.
struct EffectResources {
    corner_buffer: wgpu::Buffer,
    particle_buffer: wgpu::Buffer,
    bubble_frame_buffer: wgpu::Buffer,
    bubble_frame_bind_group: wgpu::BindGroup,
    bubble_material: wgpu::BindGroup,
    laser_quad: wgpu::Buffer,
    laser_material: wgpu::BindGroup,
    light_ray_quad: wgpu::Buffer,
    light_ray_material: wgpu::BindGroup,
}

impl EffectResources {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &dyn AssetSource,
        layouts: &BindGroupLayouts,
        textures: &mut TextureCache,
        particles: &[BubbleParticle],
    ) -> Result<Self> {
        let vertex_buffer = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let corner_buffer = vertex_buffer("Bubble Corner Buffer", bytemuck::cast_slice(&BUBBLE_CORNERS));
        let laser_quad = vertex_buffer("Laser Quad Buffer", bytemuck::cast_slice(&LASER_QUAD));
        let light_ray_quad = vertex_buffer("Light Ray Quad Buffer", bytemuck::cast_slice(&LIGHT_RAY_QUAD));

        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bubble Particle Buffer"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let bubble_frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bubble Frame Uniform Buffer"),
            size: size_of::<BubbleFrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bubble_frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bubble Frame Bind Group"),
            layout: &layouts.bubble_frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: bubble_frame_buffer.as_entire_binding(),
            }],
        });

        let bubble = textures.load(device, queue, source, BUBBLE_TEXTURE, true)?;
        let beam = textures.load(device, queue, source, LASER_TEXTURE, true)?;
        let light_ray = textures.load(device, queue, source, LIGHT_RAY_TEXTURE, true)?;

        let laser_color = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Laser Color Uniform Buffer"),
            contents: as_bytes(&LaserColorUniform { color: LASER_COLOR }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Ok(Self {
            corner_buffer,
            particle_buffer,
            bubble_frame_buffer,
            bubble_frame_bind_group,
            bubble_material: texture_bind_group(
                device,
                "Bubble Material Bind Group",
                &layouts.bubble_material,
                &bubble,
                textures.sampler(bubble.sampler),
                None,
            ),
            laser_quad,
            laser_material: texture_bind_group(
                device,
                "Laser Material Bind Group",
                &layouts.laser_material,
                &beam,
                textures.sampler(beam.sampler),
                Some(&laser_color),
            ),
            light_ray_quad,
            light_ray_material: texture_bind_group(
                device,
                "Light Ray Material Bind Group",
                &layouts.light_ray_material,
                &light_ray,
                textures.sampler(light_ray.sampler),
                None,
            ),
        })
    }
}

// --- Renderer ---

pub struct Renderer<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    registry: PipelineRegistry,
    scene: ComposedScene,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    objects: ObjectArena,
    effects: EffectResources,
    species: Vec<Species>,
    clock: SimulationClock,
    school: FishSchool,
    emitter: BubbleEmitter,
    particles: ParticlePool,
    lasers: Vec<LaserInstance>,
    light_rays: LightRayController,
    draw_list: FrameDrawList,
    fish_counts: Vec<u32>,
    running: bool,
}

impl<'a> Renderer<'a> {
    /// Brings up the device, loads every asset and composes the scene.
    /// Rendering stays paused until [`Renderer::start`].
    pub async fn new(
        window: Arc<Window>,
        source: &dyn AssetSource,
        config: &AquariumConfig,
    ) -> Result<Self> {
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(AquariumError::NoAdapter)?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Aquarium Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Textures are uploaded as linear premultiplied RGBA, so prefer a non-sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(AquariumError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, size);

        // --- Scene ---
        let assets = AquariumAssets::load(source)?;
        let species = default_species();
        let mut registry = PipelineRegistry::new(&device, surface_format);
        let mut library = MaterialLibrary::new(&device);
        let scene = scene::compose(
            &device,
            &queue,
            source,
            &mut registry,
            &mut library,
            &assets,
            &species,
            config,
        )?;
        for technique in [Technique::Bubble, Technique::Laser, Technique::LightRay] {
            registry.get_or_build(&device, technique);
        }

        // --- Buffers ---
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &registry.layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });
        let objects = ObjectArena::new(&device, &registry.layouts.model, INITIAL_OBJECT_SLOTS);

        let particles = ParticlePool::new(StdRng::from_entropy());
        let effects = EffectResources::new(
            &device,
            &queue,
            source,
            &registry.layouts,
            &mut library.textures,
            particles.particles(),
        )?;

        let school = FishSchool::new(species.clone(), StdRng::from_entropy());
        let fish_counts = vec![0; scene.fish_groups.len()];

        Ok(Self {
            surface,
            device,
            queue,
            config: surface_config,
            size,
            depth_view,
            registry,
            scene,
            frame_buffer,
            frame_bind_group,
            objects,
            effects,
            species,
            clock: SimulationClock::new(),
            school,
            emitter: BubbleEmitter::new(StdRng::from_entropy()),
            particles,
            lasers: Vec::new(),
            light_rays: LightRayController::new(StdRng::from_entropy()),
            draw_list: FrameDrawList::new(),
            fish_counts,
            running: false,
        })
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Pauses rendering; the simulation keeps its state.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn fish_total(&self) -> usize {
        self.school.total()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let new_size = PhysicalSize::new(new_size.width.max(1), new_size.height.max(1));
        if new_size == self.size {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, new_size);
        log::debug!("Renderer resized to {}x{}", new_size.width, new_size.height);
    }

    /// Reconfigures the surface at its current size after it was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    // --- Simulation Step ---

    fn update(&mut self, delta: f32, config: &AquariumConfig) {
        let options = &config.options;
        let speed = config.globals.speed;
        self.clock.advance(delta, &config.globals);
        let now = self.clock.now();

        // Fish
        self.school.set_population(config.fish_count);
        self.school.advance(now, &config.fish);
        let buckets = self.school.buckets();
        for (count, group) in self.fish_counts.iter_mut().zip(&mut self.scene.fish_groups) {
            group.upload(
                &self.device,
                &self.queue,
                &self.registry.layouts,
                &buckets[group.species].fish,
                &self.species[group.species],
                config,
            );
            *count = group.instance_count();
        }
        self.scene.refresh_tank_uniforms(&self.queue, config);

        // Bubbles
        if options.bubbles {
            step_bubbles(&mut self.emitter, &mut self.particles, delta, speed, now);
            self.queue.write_buffer(
                &self.effects.particle_buffer,
                0,
                bytemuck::cast_slice(self.particles.particles()),
            );
        }

        // Lasers
        if options.lasers {
            compute_lasers(&self.school, &mut self.lasers);
        } else {
            self.lasers.clear();
        }

        // Light rays
        self.light_rays.update(delta, speed, options);
    }

    // --- Frame ---

    pub fn render(&mut self, delta_seconds: f32, config: &AquariumConfig) -> std::result::Result<(), wgpu::SurfaceError> {
        if !self.running {
            return Ok(());
        }
        self.update(delta_seconds.clamp(0.0, MAX_FRAME_DELTA_SECS), config);

        let aspect = self.size.width as f32 / self.size.height as f32;
        let camera = Camera::orbit(&config.globals, self.clock.eye(), aspect);
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            as_bytes(&camera.frame_uniform(&config.globals, &config.options)),
        );

        self.draw_list.rebuild(&FrameInputs {
            items: &self.scene.items,
            fish_counts: &self.fish_counts,
            clock: self.clock.now(),
            options: &config.options,
            active_bubbles: self.particles.active_count(),
            lasers: &self.lasers,
            light_rays: self.light_rays.rays(),
            eye_height: config.globals.eye_height,
        });
        if self
            .draw_list
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Bubbles { .. }))
        {
            self.queue.write_buffer(
                &self.effects.bubble_frame_buffer,
                0,
                as_bytes(&camera.bubble_uniform(self.clock.now())),
            );
        }
        self.objects
            .reserve(&self.device, &self.registry.layouts.model, self.draw_list.objects.len());

        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Aquarium Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Aquarium Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.record(&mut pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();
        Ok(())
    }

    /// Writes each object block just before recording the draw that reads it.
    fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        let mut bound: Option<Technique> = None;
        let mut skipped: Option<Technique> = None;
        for command in &self.draw_list.commands {
            let technique = command.technique();
            let Some(pipeline) = self.registry.get(technique) else {
                if skipped != Some(technique) {
                    log::warn!("No {technique:?} pipeline; skipping its draws");
                    skipped = Some(technique);
                }
                continue;
            };
            if bound != Some(technique) {
                pass.set_pipeline(pipeline);
                bound = Some(technique);
            }

            match *command {
                DrawCommand::Item { item, slot, .. } => {
                    let item = &self.scene.items[item];
                    self.bind_object(pass, slot);
                    pass.set_bind_group(2, &item.material.bind_group, &[]);
                    item.model.bind(pass);
                    item.model.draw(pass, 1);
                }
                DrawCommand::Fish { group, instances } => {
                    let group = &self.scene.fish_groups[group];
                    pass.set_bind_group(0, &self.frame_bind_group, &[]);
                    pass.set_bind_group(1, &group.instance_bind_group, &[]);
                    pass.set_bind_group(2, &group.material.bind_group, &[]);
                    group.model.bind(pass);
                    group.model.draw(pass, instances);
                }
                DrawCommand::Bubbles { instances } => {
                    let effects = &self.effects;
                    pass.set_bind_group(0, &effects.bubble_frame_bind_group, &[]);
                    pass.set_bind_group(1, &effects.bubble_material, &[]);
                    pass.set_vertex_buffer(0, effects.corner_buffer.slice(..));
                    pass.set_vertex_buffer(1, effects.particle_buffer.slice(..));
                    pass.draw(0..BUBBLE_CORNERS.len() as u32, 0..instances);
                }
                DrawCommand::Laser { slot } => {
                    self.bind_object(pass, slot);
                    pass.set_bind_group(2, &self.effects.laser_material, &[]);
                    pass.set_vertex_buffer(0, self.effects.laser_quad.slice(..));
                    pass.draw(0..LASER_QUAD.len() as u32, 0..1);
                }
                DrawCommand::LightRay { slot } => {
                    self.bind_object(pass, slot);
                    pass.set_bind_group(2, &self.effects.light_ray_material, &[]);
                    pass.set_vertex_buffer(0, self.effects.light_ray_quad.slice(..));
                    pass.draw(0..LIGHT_RAY_QUAD.len() as u32, 0..1);
                }
            }
        }
    }

    fn bind_object(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        let offset = ObjectArena::offset(slot);
        self.queue.write_buffer(
            &self.objects.buffer,
            offset as u64,
            as_bytes(&self.draw_list.objects[slot as usize]),
        );
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.objects.bind_group, &[offset]);
    }
}
