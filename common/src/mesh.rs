//! Triangle meshes: OBJ loading, procedural spheres and GPU buffers

use anyhow::Context;
use std::path::Path;
use wgpu::util::DeviceExt;

/// Vertex with position, normal and texture coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// CPU-side mesh data
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Load every model in an OBJ file into one indexed mesh
    pub fn from_obj(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .with_context(|| format!("Failed to load mesh: {:?}", path))?;

        let mut data = MeshData::default();
        for model in &models {
            data.append_tobj(&model.mesh);
        }

        anyhow::ensure!(!data.indices.is_empty(), "mesh {:?} has no triangles", path);
        Ok(data)
    }

    fn append_tobj(&mut self, mesh: &tobj::Mesh) {
        let base = self.vertices.len() as u32;
        let count = mesh.positions.len() / 3;

        for i in 0..count {
            let position = [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ];
            // Missing normals fall back to the radial direction, which is exact for spheres
            let normal = if mesh.normals.len() >= 3 * (i + 1) {
                [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
            } else {
                glam::Vec3::from(position).normalize_or_zero().to_array()
            };
            // OBJ texture space has V pointing up
            let uv = if mesh.texcoords.len() >= 2 * (i + 1) {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            };
            self.vertices.push(MeshVertex { position, normal, uv });
        }

        self.indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    /// Unit UV sphere with counter-clockwise winding seen from outside
    pub fn uv_sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let position = glam::Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());

                vertices.push(MeshVertex {
                    position: position.to_array(),
                    normal: position.normalize_or_zero().to_array(),
                    uv: [seg as f32 / segments as f32, ring as f32 / rings as f32],
                });
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Self { vertices, indices }
    }
}

/// Mesh uploaded to GPU vertex and index buffers
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    /// Load an OBJ file and upload it
    pub fn load(device: &wgpu::Device, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading mesh: {:?}", path);
        let data = MeshData::from_obj(path)?;
        Ok(Self::from_data(device, &data))
    }

    pub fn uv_sphere(device: &wgpu::Device, segments: u32, rings: u32) -> Self {
        Self::from_data(device, &MeshData::uv_sphere(segments, rings))
    }

    pub fn from_data(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded mesh: {} vertices, {} triangles",
            data.vertices.len(),
            data.indices.len() / 3
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    /// Bind buffers and issue one indexed draw
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let data = MeshData::uv_sphere(16, 8);
        assert_eq!(data.vertices.len(), 17 * 9);
        assert_eq!(data.indices.len(), 16 * 8 * 6);
        for v in &data.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let data = MeshData::uv_sphere(24, 12);
        for tri in data.indices.chunks(3) {
            let a = Vec3::from(data.vertices[tri[0] as usize].position);
            let b = Vec3::from(data.vertices[tri[1] as usize].position);
            let c = Vec3::from(data.vertices[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            // Degenerate pole triangles have no orientation
            if normal.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_indices_in_range() {
        let data = MeshData::uv_sphere(8, 4);
        let max = data.vertices.len() as u32;
        assert!(data.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn missing_obj_reports_path() {
        let err = MeshData::from_obj("does/not/exist.obj").unwrap_err();
        assert!(format!("{:#}", err).contains("exist.obj"));
    }
}
