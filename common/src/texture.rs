//! Texture loading with CPU-generated mip chains

use anyhow::Context;
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;

/// Minification/magnification filter. Both modes sample a full mip chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Nearest,
    Linear,
}

/// Behaviour outside the [0, 1] texture coordinate range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    Clamp,
    Repeat,
    Mirror,
}

/// How texel values are interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color maps, decoded to linear on sampling
    Srgb,
    /// Masks and densities, sampled as stored
    Linear,
}

impl ColorSpace {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

impl SampleMode {
    fn filter(self) -> wgpu::FilterMode {
        match self {
            SampleMode::Nearest => wgpu::FilterMode::Nearest,
            SampleMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl EdgeMode {
    fn address_mode(self) -> wgpu::AddressMode {
        match self {
            EdgeMode::Clamp => wgpu::AddressMode::ClampToEdge,
            EdgeMode::Repeat => wgpu::AddressMode::Repeat,
            EdgeMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// Number of mip levels down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Build the full mip chain for an image, level 0 first
pub fn build_mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);

    for _ in 1..levels {
        let prev = &chain[chain.len() - 1];
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, width, height, FilterType::Triangle);
        chain.push(next);
    }

    chain
}

/// A sampled 2D texture with its own sampler
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub channel_count: u8,
}

impl Texture {
    /// Decode an image file and upload it with mipmaps
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        color_space: ColorSpace,
        sample: SampleMode,
        edge: EdgeMode,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to load texture: {:?}", path))?;
        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("texture");

        Ok(Self::from_image(device, queue, label, img, color_space, sample, edge))
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        img: DynamicImage,
        color_space: ColorSpace,
        sample: SampleMode,
        edge: EdgeMode,
    ) -> Self {
        let (width, height) = img.dimensions();
        let channel_count = img.color().channel_count();
        let chain = build_mip_chain(img.to_rgba8());

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: chain.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in chain.iter().enumerate() {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                mip.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * mip.width()),
                    rows_per_image: Some(mip.height()),
                },
                wgpu::Extent3d {
                    width: mip.width(),
                    height: mip.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: edge.address_mode(),
            address_mode_v: edge.address_mode(),
            address_mode_w: edge.address_mode(),
            mag_filter: sample.filter(),
            min_filter: sample.filter(),
            mipmap_filter: sample.filter(),
            ..Default::default()
        });

        log::debug!(
            "Texture {}: {}x{}, {} channels, {} mip levels",
            label,
            width,
            height,
            channel_count,
            chain.len()
        );

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            channel_count,
        }
    }
}
