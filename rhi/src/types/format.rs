//! Pixel, vertex and index formats.

/// Texel format of textures, views and render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum PixelFormat {
    // 8-bit formats
    R8Unorm,
    R8Snorm,
    R8Uint,
    R8Sint,

    // 16-bit formats
    R16Uint,
    R16Sint,
    R16Float,
    Rg8Unorm,
    Rg8Snorm,
    Rg8Uint,
    Rg8Sint,
    D16Unorm,

    // 32-bit formats
    R32Uint,
    R32Sint,
    R32Float,
    Rg16Uint,
    Rg16Sint,
    Rg16Float,
    #[default]
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba8Sint,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgb9E5Float,
    Rgb10A2Unorm,
    Rg11B10Float,
    D24UnormS8Uint,
    D32Float,

    // 64-bit formats
    Rg32Uint,
    Rg32Sint,
    Rg32Float,
    Rgba16Uint,
    Rgba16Sint,
    Rgba16Float,
    D32FloatS8Uint,

    // 128-bit formats
    Rgba32Uint,
    Rgba32Sint,
    Rgba32Float,
}

impl PixelFormat {
    /// Size of one texel in bytes.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::R8Unorm | Self::R8Snorm | Self::R8Uint | Self::R8Sint => 1,

            Self::R16Uint
            | Self::R16Sint
            | Self::R16Float
            | Self::Rg8Unorm
            | Self::Rg8Snorm
            | Self::Rg8Uint
            | Self::Rg8Sint
            | Self::D16Unorm => 2,

            Self::R32Uint
            | Self::R32Sint
            | Self::R32Float
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Float
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Rgba8Snorm
            | Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgb9E5Float
            | Self::Rgb10A2Unorm
            | Self::Rg11B10Float
            | Self::D24UnormS8Uint
            | Self::D32Float => 4,

            Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float
            | Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Float
            | Self::D32FloatS8Uint => 8,

            Self::Rgba32Uint | Self::Rgba32Sint | Self::Rgba32Float => 16,
        }
    }

    /// Returns true if this format has a depth component.
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            Self::D16Unorm | Self::D24UnormS8Uint | Self::D32Float | Self::D32FloatS8Uint
        )
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::D24UnormS8Uint | Self::D32FloatS8Uint)
    }

    /// Returns true if this is a color format.
    pub fn is_color(&self) -> bool {
        !self.is_depth()
    }

    /// Returns true if this is an sRGB format.
    pub fn is_srgb(&self) -> bool {
        matches!(self, Self::Rgba8UnormSrgb | Self::Bgra8UnormSrgb)
    }
}

/// Format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Uint8X2,
    Uint8X4,
    Sint8X2,
    Sint8X4,
    Unorm8X2,
    Unorm8X4,
    Snorm8X2,
    Snorm8X4,
    Uint16X2,
    Uint16X4,
    Sint16X2,
    Sint16X4,
    Unorm16X2,
    Unorm16X4,
    Snorm16X2,
    Snorm16X4,
    Float16X2,
    Float16X4,
    Float32X1,
    Float32X2,
    Float32X3,
    Float32X4,
    Uint32X1,
    Uint32X2,
    Uint32X3,
    Uint32X4,
    Sint32X1,
    Sint32X2,
    Sint32X3,
    Sint32X4,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Uint8X2 | Self::Sint8X2 | Self::Unorm8X2 | Self::Snorm8X2 => 2,
            Self::Uint8X4
            | Self::Sint8X4
            | Self::Unorm8X4
            | Self::Snorm8X4
            | Self::Uint16X2
            | Self::Sint16X2
            | Self::Unorm16X2
            | Self::Snorm16X2
            | Self::Float16X2
            | Self::Float32X1
            | Self::Uint32X1
            | Self::Sint32X1 => 4,
            Self::Uint16X4
            | Self::Sint16X4
            | Self::Unorm16X4
            | Self::Snorm16X4
            | Self::Float16X4
            | Self::Float32X2
            | Self::Uint32X2
            | Self::Sint32X2 => 8,
            Self::Float32X3 | Self::Uint32X3 | Self::Sint32X3 => 12,
            Self::Float32X4 | Self::Uint32X4 | Self::Sint32X4 => 16,
        }
    }
}

/// Format of index buffer elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    Uint16,
    #[default]
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::R8Unorm.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::D16Unorm.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Bgra8UnormSrgb.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::D32FloatS8Uint.bytes_per_pixel(), 8);
        assert_eq!(PixelFormat::Rgba32Float.bytes_per_pixel(), 16);
    }

    #[test]
    fn test_depth_stencil_classification() {
        assert!(PixelFormat::D32Float.is_depth());
        assert!(!PixelFormat::D32Float.has_stencil());
        assert!(PixelFormat::D24UnormS8Uint.has_stencil());
        assert!(PixelFormat::Rgba8Unorm.is_color());
        assert!(!PixelFormat::R32Float.is_depth());
    }

    #[test]
    fn test_vertex_format_size() {
        assert_eq!(VertexFormat::Float32X3.size(), 12);
        assert_eq!(VertexFormat::Unorm8X4.size(), 4);
        assert_eq!(IndexFormat::Uint16.size(), 2);
    }
}
