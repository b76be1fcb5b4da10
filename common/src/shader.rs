//! WGSL shader loading
//!
//! Each file holds a single stage. Vertex files expose `vs_main`, fragment
//! files expose `fs_main`, so any vertex module can be paired with any
//! fragment module whose inputs it satisfies.

use anyhow::Context;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

/// A compiled single-stage shader
pub struct ShaderModule {
    pub module: wgpu::ShaderModule,
    pub stage: ShaderStage,
}

impl ShaderModule {
    /// Read and compile a WGSL file
    pub fn load(
        device: &wgpu::Device,
        stage: ShaderStage,
        path: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read shader: {:?}", path))?;
        log::debug!("Compiling {:?} shader {:?}", stage, path);

        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("shader");
        Ok(Self::from_source(device, stage, label, &source))
    }

    pub fn from_source(device: &wgpu::Device, stage: ShaderStage, label: &str, source: &str) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        Self { module, stage }
    }

    pub fn entry_point(&self) -> &'static str {
        self.stage.entry_point()
    }
}
