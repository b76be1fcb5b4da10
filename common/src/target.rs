//! Off-screen render target holding depth plus a single-channel color attachment

use crate::graphics::DEPTH_FORMAT;

/// Format of the single-channel color attachment
pub const SHADOW_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// Off-screen target with a depth attachment and an `R32Float` color attachment.
///
/// The color attachment is sampled with `textureLoad` by later passes, since
/// 32-bit float formats are not filterable.
pub struct ShadowTarget {
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
}

/// Check that a target of the given size can exist on a device with `limits`
pub fn check_target_size(limits: &wgpu::Limits, width: u32, height: u32) -> anyhow::Result<()> {
    anyhow::ensure!(
        width > 0 && height > 0,
        "render target size {}x{} has a zero dimension",
        width,
        height
    );
    let max = limits.max_texture_dimension_2d;
    if width > max || height > max {
        anyhow::bail!("render target size {}x{} exceeds device limit {}", width, height, max);
    }
    Ok(())
}

impl ShadowTarget {
    /// Create the target and validate it. Rendering cannot proceed without it,
    /// so an incomplete target terminates the process.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        match Self::try_new(device, width, height) {
            Ok(target) => target,
            Err(e) => {
                log::error!("Shadow framebuffer is not complete: {:#}", e);
                eprintln!("Shadow framebuffer is not complete: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    pub fn try_new(device: &wgpu::Device, width: u32, height: u32) -> anyhow::Result<Self> {
        check_target_size(&device.limits(), width, height)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            // wgpu::Error is not Sync, so it is carried by its message
            anyhow::bail!("shadow target failed validation: {}", error);
        }

        log::info!("Created shadow target {}x{}", width, height);

        Ok(Self {
            color_view,
            depth_view,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_accept_2048() {
        assert!(check_target_size(&wgpu::Limits::default(), 2048, 2048).is_ok());
    }

    #[test]
    fn oversized_target_is_rejected() {
        let limits = wgpu::Limits::downlevel_webgl2_defaults();
        let err = check_target_size(&limits, 1 << 15, 16).unwrap_err();
        assert!(err.to_string().contains("exceeds device limit"));
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let err = check_target_size(&wgpu::Limits::default(), 0, 2048).unwrap_err();
        assert_eq!(err.to_string(), "render target size 0x2048 has a zero dimension");
    }
}
