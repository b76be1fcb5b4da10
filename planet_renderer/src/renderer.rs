//! Main pass: stars, sun, Earth with clouds, and the two moons
//!
//! Every sub-pass carries its own [`RenderState`], baked into its pipeline.
//! Depth writes, blending and culling therefore cannot leak from one
//! sub-pass into the next.

use std::collections::HashMap;

use common::{
    create_depth_texture, create_uniform_buffer, ColorSpace, EdgeMode, GraphicsContext, Mesh,
    MeshVertex, SampleMode, ShaderModule, ShaderStage, Texture, DEPTH_FORMAT,
};
use glam::{Mat3, Mat4};

use crate::config::AppConfig;
use crate::frame::FrameSnapshot;
use crate::scene::normal_matrix;
use crate::shadow::{ShadowPass, SHADOW_FRAGMENT_SHADER, SHADOW_VERTEX_SHADER};

/// Per-frame lighting data shared by every lit draw
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub light_view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub camera_pos: [f32; 4],
    pub light_color: [f32; 4],
}

impl FrameUniform {
    pub fn from_snapshot(frame: &FrameSnapshot) -> Self {
        Self {
            light_view_proj: frame.light_space.view_projection.to_cols_array_2d(),
            light_dir: frame.light.direction.extend(0.0).to_array(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            light_color: frame.light.color.extend(1.0).to_array(),
        }
    }
}

/// Per-draw transforms. The normal matrix is stored in the upper-left 3x3.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn lit(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self::with_normal(model, view, projection, normal_matrix(&model))
    }

    /// Unlit draws and the shadow pass skip the normal matrix
    pub fn position_only(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self::with_normal(model, view, projection, Mat3::IDENTITY)
    }

    fn with_normal(model: Mat4, view: Mat4, projection: Mat4, normal: Mat3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal: Mat4::from_mat3(normal).to_cols_array_2d(),
        }
    }
}

/// Uniform buffer and bind group for one draw call.
///
/// Queue writes land before the command buffer runs, so each draw in a frame
/// needs its own slot.
pub struct ObjectSlot {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ObjectSlot {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let identity = ObjectUniform::position_only(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let buffer = create_uniform_buffer(device, label, &identity);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &ObjectUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }
}

/// Fixed-function state of a sub-pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub depth_write: bool,
    pub cull_back_faces: bool,
    pub alpha_blend: bool,
}

impl RenderState {
    /// Depth test and write, back-face culling, no blending
    pub const OPAQUE: Self = Self {
        depth_write: true,
        cull_back_faces: true,
        alpha_blend: false,
    };

    /// Seen from inside, behind everything
    pub const BACKDROP: Self = Self {
        depth_write: false,
        cull_back_faces: false,
        alpha_blend: false,
    };

    pub const TRANSLUCENT: Self = Self {
        depth_write: false,
        cull_back_faces: true,
        alpha_blend: true,
    };

    pub fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_back_faces.then_some(wgpu::Face::Back),
            ..Default::default()
        }
    }

    pub fn blend(&self) -> Option<wgpu::BlendState> {
        self.alpha_blend.then_some(wgpu::BlendState::ALPHA_BLENDING)
    }
}

/// Main-pass draws, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPass {
    Background,
    Sun,
    Earth,
    EarthClouds,
    Moon,
    MoonsMoon,
}

impl SubPass {
    pub const ORDER: [SubPass; 6] = [
        SubPass::Background,
        SubPass::Sun,
        SubPass::Earth,
        SubPass::EarthClouds,
        SubPass::Moon,
        SubPass::MoonsMoon,
    ];

    pub fn index(self) -> usize {
        match self {
            SubPass::Background => 0,
            SubPass::Sun => 1,
            SubPass::Earth => 2,
            SubPass::EarthClouds => 3,
            SubPass::Moon => 4,
            SubPass::MoonsMoon => 5,
        }
    }

    pub fn state(self) -> RenderState {
        match self {
            SubPass::Background => RenderState::BACKDROP,
            SubPass::EarthClouds => RenderState::TRANSLUCENT,
            SubPass::Sun | SubPass::Earth | SubPass::Moon | SubPass::MoonsMoon => RenderState::OPAQUE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubPass::Background => "Background",
            SubPass::Sun => "Sun",
            SubPass::Earth => "Earth",
            SubPass::EarthClouds => "Earth Clouds",
            SubPass::Moon => "Moon",
            SubPass::MoonsMoon => "Moon's Moon",
        }
    }

    /// Transforms for this draw. The sun uses the orthographic projection so
    /// it and the star sphere land inside its depth range.
    pub fn object_uniform(self, frame: &FrameSnapshot) -> ObjectUniform {
        let t = &frame.transforms;
        match self {
            SubPass::Background => {
                ObjectUniform::position_only(frame.background_model, frame.view, frame.projection)
            }
            SubPass::Sun => {
                ObjectUniform::position_only(frame.sun_model, frame.view, frame.ortho_projection)
            }
            SubPass::Earth => ObjectUniform::lit(t.earth, frame.view, frame.projection),
            SubPass::EarthClouds => ObjectUniform::lit(t.clouds, frame.view, frame.projection),
            SubPass::Moon => ObjectUniform::lit(t.moon, frame.view, frame.projection),
            SubPass::MoonsMoon => ObjectUniform::lit(t.moons_moon, frame.view, frame.projection),
        }
    }

    /// Vertex and fragment shader files, relative to the shader directory
    pub fn shader_files(self) -> (&'static str, &'static str) {
        match self {
            SubPass::Background => ("background.vert.wgsl", "background.frag.wgsl"),
            SubPass::Sun => ("background.vert.wgsl", "sun.frag.wgsl"),
            SubPass::Earth => ("planet.vert.wgsl", "earth.frag.wgsl"),
            SubPass::EarthClouds => ("planet.vert.wgsl", "cloud.frag.wgsl"),
            SubPass::Moon | SubPass::MoonsMoon => ("planet.vert.wgsl", "planet.frag.wgsl"),
        }
    }
}

/// Texture/sampler pairs in the material bind group: albedo, specular, night
pub const MATERIAL_MAPS: u32 = 3;

/// Shader modules loaded from the shader directory, keyed by file name
struct Shaders {
    modules: HashMap<&'static str, ShaderModule>,
}

impl Shaders {
    fn load(device: &wgpu::Device, config: &AppConfig) -> anyhow::Result<Self> {
        let files = SubPass::ORDER
            .iter()
            .map(|sub_pass| sub_pass.shader_files())
            .chain(std::iter::once((SHADOW_VERTEX_SHADER, SHADOW_FRAGMENT_SHADER)));

        let mut modules = HashMap::new();
        for (vertex, fragment) in files {
            for (stage, name) in [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)] {
                if !modules.contains_key(name) {
                    modules.insert(name, ShaderModule::load(device, stage, config.assets.shader(name))?);
                }
            }
        }
        Ok(Self { modules })
    }

    fn pair(&self, (vertex, fragment): (&str, &str)) -> (&ShaderModule, &ShaderModule) {
        (&self.modules[vertex], &self.modules[fragment])
    }
}

pub struct Renderer {
    pipelines: Vec<wgpu::RenderPipeline>,
    slots: Vec<ObjectSlot>,
    materials: Vec<wgpu::BindGroup>,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    shadow: ShadowPass,
    mesh: Mesh,
    depth_texture: wgpu::TextureView,
}

impl Renderer {
    pub fn new(ctx: &GraphicsContext, config: &AppConfig) -> anyhow::Result<Self> {
        let device = &ctx.device;
        let queue = &ctx.queue;

        let shaders = Shaders::load(device, config)?;

        let mesh = match &config.assets.mesh {
            Some(path) => Mesh::load(device, path)?,
            None => {
                log::info!("No mesh configured, generating UV sphere");
                Mesh::uv_sphere(device, 96, 48)
            }
        };

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // Albedo, specular and night maps, each with its own sampler
        let material_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MATERIAL_MAPS)
            .flat_map(|i| {
                [
                    wgpu::BindGroupLayoutEntry {
                        binding: 2 * i,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2 * i + 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ]
            })
            .collect();

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &material_entries,
        });

        let (shadow_vs, shadow_fs) = shaders.pair((SHADOW_VERTEX_SHADER, SHADOW_FRAGMENT_SHADER));
        let shadow = ShadowPass::new(
            device,
            shadow_vs,
            shadow_fs,
            &object_layout,
            config.shadow.map_size,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow.target.color_view),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Main Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipelines = SubPass::ORDER
            .iter()
            .map(|&sub_pass| {
                let (vertex, fragment) = shaders.pair(sub_pass.shader_files());
                let state = sub_pass.state();
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(sub_pass.label()),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &vertex.module,
                        entry_point: vertex.entry_point(),
                        buffers: &[MeshVertex::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &fragment.module,
                        entry_point: fragment.entry_point(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: ctx.config.format,
                            blend: state.blend(),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: state.primitive(),
                    depth_stencil: Some(state.depth_stencil(DEPTH_FORMAT)),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                })
            })
            .collect();

        let slots = SubPass::ORDER
            .iter()
            .map(|sub_pass| ObjectSlot::new(device, &object_layout, sub_pass.label()))
            .collect();

        let assets = &config.assets;
        let load = |name: &str, color_space| {
            Texture::load(
                device,
                queue,
                assets.texture(name),
                color_space,
                SampleMode::Linear,
                EdgeMode::Repeat,
            )
        };
        let stars = load(&assets.stars, ColorSpace::Srgb)?;
        let earth_day = load(&assets.earth_day, ColorSpace::Srgb)?;
        let earth_specular = load(&assets.earth_specular, ColorSpace::Linear)?;
        let earth_night = load(&assets.earth_night, ColorSpace::Srgb)?;
        let earth_clouds = load(&assets.earth_clouds, ColorSpace::Linear)?;
        let moon = load(&assets.moon, ColorSpace::Srgb)?;
        let moons_moon = load(&assets.moons_moon, ColorSpace::Srgb)?;

        let material = |label: &str, maps: [&Texture; 3]| {
            let entries: Vec<wgpu::BindGroupEntry> = maps
                .iter()
                .enumerate()
                .flat_map(|(i, tex)| {
                    [
                        wgpu::BindGroupEntry {
                            binding: 2 * i as u32,
                            resource: wgpu::BindingResource::TextureView(&tex.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2 * i as u32 + 1,
                            resource: wgpu::BindingResource::Sampler(&tex.sampler),
                        },
                    ]
                })
                .collect();
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &material_layout,
                entries: &entries,
            })
        };

        // Single-map materials repeat their albedo in the unused slots
        let materials = SubPass::ORDER
            .iter()
            .map(|&sub_pass| match sub_pass {
                SubPass::Background | SubPass::Sun => material(sub_pass.label(), [&stars; 3]),
                SubPass::Earth => material("Earth", [&earth_day, &earth_specular, &earth_night]),
                SubPass::EarthClouds => material(sub_pass.label(), [&earth_clouds; 3]),
                SubPass::Moon => material(sub_pass.label(), [&moon; 3]),
                SubPass::MoonsMoon => material(sub_pass.label(), [&moons_moon; 3]),
            })
            .collect();

        let depth_texture = create_depth_texture(device, ctx.size.width, ctx.size.height);

        Ok(Self {
            pipelines,
            slots,
            materials,
            frame_buffer,
            frame_bind_group,
            shadow,
            mesh,
            depth_texture,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    /// Upload uniforms for this frame
    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameSnapshot) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[FrameUniform::from_snapshot(frame)]),
        );
        for sub_pass in SubPass::ORDER {
            self.slots[sub_pass.index()].write(queue, &sub_pass.object_uniform(frame));
        }
        self.shadow.prepare(queue, frame);
    }

    /// Encode the shadow pass followed by the main pass
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        self.shadow.encode(encoder, &self.mesh);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for sub_pass in SubPass::ORDER {
            let i = sub_pass.index();
            render_pass.set_pipeline(&self.pipelines[i]);
            render_pass.set_bind_group(1, &self.slots[i].bind_group, &[]);
            render_pass.set_bind_group(2, &self.materials[i], &[]);
            self.mesh.draw(&mut render_pass);
        }
    }
}
