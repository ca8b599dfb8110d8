//! Texture types and create infos.

use bitflags::bitflags;

use super::{Extent3d, PixelFormat};

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in shaders.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// Texture can be used as a color attachment.
        const RENDER_ATTACHMENT = 1 << 4;
        /// Texture can be used as a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 5;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Access state of a texture, used by barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureState {
    #[default]
    Undefined,
    CopySrc,
    CopyDst,
    ShaderReadOnly,
    RenderTarget,
    Storage,
    DepthStencilReadOnly,
    DepthStencilWrite,
    Present,
}

/// Texture dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// 1D texture.
    D1,
    /// 2D texture (or 2D array).
    #[default]
    D2,
    /// 3D texture.
    D3,
}

/// Dimension a texture view exposes to shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureViewDimension {
    D1,
    #[default]
    D2,
    D2Array,
    Cube,
    CubeArray,
    D3,
}

/// Which planes of a texture a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAspect {
    #[default]
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

impl TextureAspect {
    /// Whether a texture of `format` has this aspect.
    pub fn is_present_in(&self, format: PixelFormat) -> bool {
        match self {
            Self::Color => format.is_color(),
            Self::Depth => format.is_depth(),
            Self::Stencil => format.has_stencil(),
            Self::DepthStencil => format.is_depth() && format.has_stencil(),
        }
    }
}

/// How a texture view is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureViewType {
    /// Sampled texture binding.
    #[default]
    TextureBinding,
    /// Storage texture binding.
    StorageBinding,
    /// Color attachment of a raster pass.
    ColorAttachment,
    /// Depth/stencil attachment of a raster pass.
    DepthStencil,
}

impl TextureViewType {
    /// The texture usage the parent texture needs for this view type.
    pub fn required_usage(&self) -> TextureUsage {
        match self {
            Self::TextureBinding => TextureUsage::TEXTURE_BINDING,
            Self::StorageBinding => TextureUsage::STORAGE_BINDING,
            Self::ColorAttachment => TextureUsage::RENDER_ATTACHMENT,
            Self::DepthStencil => TextureUsage::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

/// Create info for a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureCreateInfo {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Texture dimension.
    pub dimension: TextureDimension,
    /// Size; `depth` is the array layer count for 1D/2D textures.
    pub extent: Extent3d,
    /// Texel format.
    pub format: PixelFormat,
    /// Usage flags.
    pub usages: TextureUsage,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Samples per texel.
    pub samples: u32,
    /// State the texture is in right after creation.
    pub initial_state: TextureState,
}

impl TextureCreateInfo {
    /// Create a 2D texture create info.
    pub fn new_2d(width: u32, height: u32, format: PixelFormat, usages: TextureUsage) -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2,
            extent: Extent3d::new_2d(width, height),
            format,
            usages,
            mip_levels: 1,
            samples: 1,
            initial_state: TextureState::Undefined,
        }
    }

    /// Create a cube texture create info (a square 2D texture with 6 layers).
    pub fn new_cube(size: u32, format: PixelFormat, usages: TextureUsage) -> Self {
        Self::new_2d(size, size, format, usages).with_array_layers(6)
    }

    /// Create a 3D texture create info.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        format: PixelFormat,
        usages: TextureUsage,
    ) -> Self {
        Self {
            dimension: TextureDimension::D3,
            extent: Extent3d::new(width, height, depth),
            ..Self::new_2d(width, height, format, usages)
        }
    }

    /// Create a 1D texture create info.
    pub fn new_1d(width: u32, format: PixelFormat, usages: TextureUsage) -> Self {
        Self {
            dimension: TextureDimension::D1,
            ..Self::new_2d(width, 1, format, usages)
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Set the sample count.
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Set the array layer count of a 1D/2D texture.
    pub fn with_array_layers(mut self, layers: u32) -> Self {
        self.extent.depth = layers;
        self
    }

    /// Set the initial state.
    pub fn with_initial_state(mut self, state: TextureState) -> Self {
        self.initial_state = state;
        self
    }

    /// Number of array layers.
    pub fn array_layer_count(&self) -> u32 {
        match self.dimension {
            TextureDimension::D1 | TextureDimension::D2 => self.extent.depth,
            TextureDimension::D3 => 1,
        }
    }

    /// Longest possible mip chain for the extent.
    pub fn max_mip_levels(&self) -> u32 {
        let largest = match self.dimension {
            TextureDimension::D1 => self.extent.width,
            TextureDimension::D2 => self.extent.width.max(self.extent.height),
            TextureDimension::D3 => self
                .extent
                .width
                .max(self.extent.height)
                .max(self.extent.depth),
        };
        32 - largest.max(1).leading_zeros()
    }
}

/// Create info for a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewCreateInfo {
    /// How the view is used.
    pub view_type: TextureViewType,
    /// Dimension exposed to shaders.
    pub dimension: TextureViewDimension,
    /// Covered planes.
    pub aspect: TextureAspect,
    /// First mip level.
    pub base_mip_level: u32,
    /// Number of mip levels.
    pub mip_level_count: u32,
    /// First array layer.
    pub base_array_layer: u32,
    /// Number of array layers.
    pub array_layer_count: u32,
}

impl TextureViewCreateInfo {
    /// Create a view of mip 0 and layer 0 with the color aspect.
    pub fn new(view_type: TextureViewType, dimension: TextureViewDimension) -> Self {
        Self {
            view_type,
            dimension,
            aspect: TextureAspect::Color,
            base_mip_level: 0,
            mip_level_count: 1,
            base_array_layer: 0,
            array_layer_count: 1,
        }
    }

    /// Set the aspect.
    pub fn with_aspect(mut self, aspect: TextureAspect) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set the mip range.
    pub fn with_mip_range(mut self, base: u32, count: u32) -> Self {
        self.base_mip_level = base;
        self.mip_level_count = count;
        self
    }

    /// Set the array layer range.
    pub fn with_array_range(mut self, base: u32, count: u32) -> Self {
        self.base_array_layer = base;
        self.array_layer_count = count;
        self
    }
}

/// One sub-resource (mip level + array layer + aspect) of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSubResourceInfo {
    pub mip_level: u32,
    pub array_layer: u32,
    pub aspect: TextureAspect,
}

impl TextureSubResourceInfo {
    /// Create a sub-resource info.
    pub fn new(mip_level: u32, array_layer: u32, aspect: TextureAspect) -> Self {
        Self {
            mip_level,
            array_layer,
            aspect,
        }
    }
}

/// Memory layout of one texture sub-resource inside a linear buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSubResourceCopyFootprint {
    /// Extent of the sub-resource.
    pub extent: Extent3d,
    /// Size of one texel.
    pub bytes_per_pixel: u32,
    /// Bytes between rows, aligned to [`Self::ROW_PITCH_ALIGNMENT`].
    pub row_pitch: u64,
    /// Bytes between depth slices.
    pub slice_pitch: u64,
    /// Total size in bytes.
    pub total_bytes: u64,
}

impl TextureSubResourceCopyFootprint {
    /// Alignment of buffer rows in buffer/texture copies.
    pub const ROW_PITCH_ALIGNMENT: u64 = 256;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_mip_levels() {
        let info =
            TextureCreateInfo::new_2d(256, 128, PixelFormat::Rgba8Unorm, TextureUsage::empty());
        assert_eq!(info.max_mip_levels(), 9);
        let info = TextureCreateInfo::new_2d(1, 1, PixelFormat::Rgba8Unorm, TextureUsage::empty());
        assert_eq!(info.max_mip_levels(), 1);
        let info = TextureCreateInfo::new_3d(4, 4, 32, PixelFormat::R8Unorm, TextureUsage::empty());
        assert_eq!(info.max_mip_levels(), 6);
    }

    #[test]
    fn test_array_layer_count() {
        let sampled = TextureUsage::TEXTURE_BINDING;
        let cube = TextureCreateInfo::new_cube(64, PixelFormat::Rgba16Float, sampled);
        assert_eq!(cube.array_layer_count(), 6);
        let volume =
            TextureCreateInfo::new_3d(8, 8, 8, PixelFormat::R8Unorm, TextureUsage::empty());
        assert_eq!(volume.array_layer_count(), 1);
    }

    #[test]
    fn test_aspect_presence() {
        assert!(TextureAspect::Color.is_present_in(PixelFormat::Rgba8Unorm));
        assert!(!TextureAspect::Depth.is_present_in(PixelFormat::Rgba8Unorm));
        assert!(TextureAspect::Stencil.is_present_in(PixelFormat::D24UnormS8Uint));
        assert!(!TextureAspect::DepthStencil.is_present_in(PixelFormat::D32Float));
    }
}
