//! Texture abstractions
//!
//! CPU-side depth images and comparison textures, with the wgpu descriptors
//! needed to realize them on the GPU.

use glam::UVec2;

/// A single-channel 32-bit float depth image.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    size: UVec2,
    texels: Vec<f32>,
}

impl DepthImage {
    /// The texel format of depth images.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create an image with every texel set to `depth`.
    pub fn filled(width: u32, height: u32, depth: f32) -> Self {
        Self {
            size: UVec2::new(width, height),
            texels: vec![depth; (width as usize) * (height as usize)],
        }
    }

    /// Get the image size.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Get the depth at `(x, y)`, if inside the image.
    pub fn texel(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.texels
            .get((y as usize) * (self.size.x as usize) + x as usize)
            .copied()
    }

    /// Raw texel bytes, row-major and tightly packed.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Bytes per row of the packed texel data.
    pub fn bytes_per_row(&self) -> u32 {
        self.size.x * std::mem::size_of::<f32>() as u32
    }
}

/// A depth texture that can be sampled with depth comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowTexture {
    image: DepthImage,
    label: Option<String>,
    shadow_comparison: bool,
    compare: wgpu::CompareFunction,
}

impl ShadowTexture {
    /// Wrap a depth image. Comparison is disabled until enabled.
    pub fn new(image: DepthImage, label: Option<&str>) -> Self {
        Self {
            image,
            label: label.map(str::to_string),
            shadow_comparison: false,
            compare: wgpu::CompareFunction::LessEqual,
        }
    }

    /// Enable or disable depth comparison when sampling.
    pub fn set_shadow_comparison(&mut self, enabled: bool) {
        self.shadow_comparison = enabled;
    }

    /// Set the depth comparison function.
    pub fn set_shadow_compare_func(&mut self, compare: wgpu::CompareFunction) {
        self.compare = compare;
    }

    /// Whether sampling compares against depth.
    pub fn shadow_comparison(&self) -> bool {
        self.shadow_comparison
    }

    /// The depth comparison function.
    pub fn shadow_compare_func(&self) -> wgpu::CompareFunction {
        self.compare
    }

    /// Get the source image.
    pub fn image(&self) -> &DepthImage {
        &self.image
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Texture descriptor matching the image.
    pub fn texture_descriptor(&self) -> wgpu::TextureDescriptor<'_> {
        let size = self.image.size();
        wgpu::TextureDescriptor {
            label: self.label(),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DepthImage::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        }
    }

    /// Sampler descriptor. Comparison samplers carry the compare function.
    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'_> {
        wgpu::SamplerDescriptor {
            label: self.label(),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: self.shadow_comparison.then_some(self.compare),
            ..Default::default()
        }
    }

    /// Create the GPU texture, upload the image and build a view and sampler.
    ///
    /// This is where a renderer takes over: the crate only decides which
    /// texture goes on which unit, and the renderer calls `upload` on each
    /// bound [`ShadowTexture`] once it has a device and queue.
    pub fn upload(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> GpuShadowTexture {
        let descriptor = self.texture_descriptor();
        let texture = device.create_texture(&descriptor);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            self.image.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.image.bytes_per_row()),
                rows_per_image: Some(self.image.size().y),
            },
            descriptor.size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&self.sampler_descriptor());

        GpuShadowTexture {
            texture,
            view,
            sampler,
        }
    }
}

/// GPU resources of an uploaded [`ShadowTexture`].
pub struct GpuShadowTexture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl GpuShadowTexture {
    /// Get the texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the texture view.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the sampler.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_image_texels() {
        let image = DepthImage::filled(2, 3, 0.5);

        assert_eq!(image.size(), UVec2::new(2, 3));
        assert_eq!(image.texel(1, 2), Some(0.5));
        assert_eq!(image.texel(2, 0), None);
        assert_eq!(image.bytes().len(), 2 * 3 * 4);
        assert_eq!(image.bytes_per_row(), 8);
    }

    #[test]
    fn test_bytes_are_native_f32() {
        let image = DepthImage::filled(1, 1, f32::INFINITY);
        let bytes: [u8; 4] = image.bytes().try_into().unwrap();
        assert_eq!(f32::from_ne_bytes(bytes), f32::INFINITY);
    }

    #[test]
    fn test_sampler_compare_follows_comparison_flag() {
        let mut texture = ShadowTexture::new(DepthImage::filled(1, 1, 1.0), Some("test"));
        assert_eq!(texture.sampler_descriptor().compare, None);

        texture.set_shadow_comparison(true);
        texture.set_shadow_compare_func(wgpu::CompareFunction::Always);
        assert_eq!(
            texture.sampler_descriptor().compare,
            Some(wgpu::CompareFunction::Always)
        );
    }

    #[test]
    fn test_texture_descriptor_matches_image() {
        let texture = ShadowTexture::new(DepthImage::filled(4, 2, 1.0), Some("depth"));
        let descriptor = texture.texture_descriptor();

        assert_eq!(descriptor.size.width, 4);
        assert_eq!(descriptor.size.height, 2);
        assert_eq!(descriptor.format, wgpu::TextureFormat::Depth32Float);
        assert_eq!(descriptor.label, Some("depth"));
        assert!(descriptor.usage.contains(wgpu::TextureUsages::COPY_DST));
    }
}
