//! Shadow pass: renders the bodies from the sun into the shadow target

use common::{look_at, Mesh, MeshVertex, ShaderModule, ShadowTarget, DEPTH_FORMAT, SHADOW_COLOR_FORMAT};
use glam::{Mat4, Vec3};

use crate::frame::FrameSnapshot;
use crate::renderer::{ObjectSlot, ObjectUniform, RenderState};
use crate::scene::Body;

/// Distance of the light camera from the origin, opposite the light direction
pub const LIGHT_DISTANCE: f32 = 20.0;
/// Half-extent of the light's orthographic volume
pub const SHADOW_EXTENT: f32 = 15.0;
pub const SHADOW_NEAR: f32 = 1.0;
pub const SHADOW_FAR: f32 = 50.0;

pub const SHADOW_VERTEX_SHADER: &str = "shadow.vert.wgsl";
pub const SHADOW_FRAGMENT_SHADER: &str = "shadow.frag.wgsl";

/// View and projection of the light camera
#[derive(Debug, Clone, Copy)]
pub struct LightSpace {
    pub eye: Vec3,
    pub up: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
}

impl LightSpace {
    /// `light_dir` must not be parallel to +Y
    pub fn new(light_dir: Vec3) -> Self {
        let right = Vec3::Y.cross(light_dir).normalize();
        let up = light_dir.cross(right);
        let eye = -light_dir * LIGHT_DISTANCE;

        let view = look_at(eye, Vec3::ZERO, up);
        let projection = Mat4::orthographic_rh(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        );

        Self {
            eye,
            up,
            view,
            projection,
            view_projection: projection * view,
        }
    }
}

/// Depth-only rendering of the three bodies into the shadow target
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    slots: [ObjectSlot; 3],
    pub target: ShadowTarget,
}

impl ShadowPass {
    pub fn new(
        device: &wgpu::Device,
        vertex: &ShaderModule,
        fragment: &ShaderModule,
        object_layout: &wgpu::BindGroupLayout,
        map_size: u32,
    ) -> Self {
        let target = ShadowTarget::new(device, map_size, map_size);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[object_layout],
            push_constant_ranges: &[],
        });

        let state = RenderState::OPAQUE;
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
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
                    format: SHADOW_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: state.primitive(),
            depth_stencil: Some(state.depth_stencil(DEPTH_FORMAT)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let slots = [
            ObjectSlot::new(device, object_layout, "Shadow Earth"),
            ObjectSlot::new(device, object_layout, "Shadow Moon"),
            ObjectSlot::new(device, object_layout, "Shadow Moon's Moon"),
        ];

        Self {
            pipeline,
            slots,
            target,
        }
    }

    /// Upload this frame's light-space transforms
    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameSnapshot) {
        for (slot, body) in self.slots.iter().zip(Body::ALL) {
            let uniform = ObjectUniform::position_only(
                frame.transforms.body(body),
                frame.light_space.view,
                frame.light_space.projection,
            );
            slot.write(queue, &uniform);
        }
    }

    /// Clear the target to "far" and draw every body into it
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, mesh: &Mesh) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        for slot in &self.slots {
            render_pass.set_bind_group(0, &slot.bind_group, &[]);
            mesh.draw(&mut render_pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Light;

    #[test]
    fn light_camera_sits_behind_scene() {
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let space = LightSpace::new(dir);
        assert!(space.eye.abs_diff_eq(Vec3::new(-20.0, 0.0, 0.0), 1e-6));
        assert!(space.view.transform_point3(space.eye).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn light_up_is_orthogonal_to_direction() {
        for t in [0.0, 3.0, 17.0, -42.0] {
            let light = Light::at(t);
            let space = LightSpace::new(light.direction);
            assert!(space.up.dot(light.direction).abs() < 1e-5);
            assert!((space.up.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn origin_projects_to_center_of_shadow_map() {
        let space = LightSpace::new(Light::at(5.0).direction);
        let ndc = space.view_projection.project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        // 20 units along the light, inside [1, 50]
        assert!((ndc.z - (20.0 - 1.0) / (50.0 - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn moon_orbit_fits_inside_shadow_volume() {
        let space = LightSpace::new(Light::at(0.0).direction);
        for i in 0..16 {
            let t = i as f32 * 0.8;
            let pos = crate::scene::moons_moon_transform(t).w_axis.truncate();
            let ndc = space.view_projection.project_point3(pos);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
            assert!((0.0..=1.0).contains(&ndc.z));
        }
    }
}
