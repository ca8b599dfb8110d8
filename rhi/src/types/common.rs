//! Common value types shared by every RHI object.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::RhiError;
use crate::types::TextureDimension;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of an RHI object.
///
/// Every object returned by a [`Device`](crate::Device) factory carries one.
/// Identities are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native graphics API family a backend module implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RhiType {
    /// Direct3D 12.
    DirectX12,
    /// Vulkan.
    Vulkan,
    /// Metal.
    Metal,
    /// Headless software backend.
    Dummy,
}

impl RhiType {
    /// Every known backend kind.
    pub const ALL: [RhiType; 4] = [Self::DirectX12, Self::Vulkan, Self::Metal, Self::Dummy];

    /// The default backend kind of the compilation target.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "windows") {
            Self::DirectX12
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Metal
        } else {
            Self::Vulkan
        }
    }

    /// Get a short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DirectX12 => "DirectX12",
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
            Self::Dummy => "Dummy",
        }
    }
}

impl fmt::Display for RhiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RhiType {
    type Err = RhiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dx12" | "directx12" | "d3d12" => Ok(Self::DirectX12),
            "vulkan" | "vk" => Ok(Self::Vulkan),
            "metal" | "mtl" => Ok(Self::Metal),
            "dummy" | "headless" => Ok(Self::Dummy),
            other => Err(RhiError::InvalidParameter(format!(
                "unknown RHI type '{other}'"
            ))),
        }
    }
}

/// Kind of a physical GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuType {
    /// Physical hardware adapter.
    Hardware,
    /// Software rasterizer or emulated adapter.
    Software,
}

/// Type of a submission queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueueType {
    /// Graphics queue, also capable of compute and transfer work.
    Graphics,
    /// Compute queue, also capable of transfer work.
    Compute,
    /// Transfer-only queue.
    Transfer,
}

impl QueueType {
    /// Every queue type.
    pub const ALL: [QueueType; 3] = [Self::Graphics, Self::Compute, Self::Transfer];

    /// Whether work submitted on this queue may contain raster passes.
    pub fn supports_graphics(&self) -> bool {
        matches!(self, Self::Graphics)
    }

    /// Whether work submitted on this queue may contain compute passes.
    pub fn supports_compute(&self) -> bool {
        matches!(self, Self::Graphics | Self::Compute)
    }
}

/// Host access mode of a buffer mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// The host reads data written by the GPU.
    Read,
    /// The host writes data consumed by the GPU.
    Write,
}

/// 2D extent in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2d {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Extent2d {
    /// Create a new 2D extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 3D extent in texels.
///
/// For 2D textures `depth` is the number of array layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent3d {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Depth or array layers.
    pub depth: u32,
}

impl Extent3d {
    /// Create a new 3D extent.
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Create a 2D extent (depth = 1).
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// Whether any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Extent of the given mip level, clamped to 1.
    ///
    /// Only 3D textures shrink in depth; for the other dimensions `depth`
    /// counts array layers and is kept.
    pub fn mip_level_size(&self, level: u32, dimension: TextureDimension) -> Self {
        let shrink = |size: u32| size.checked_shr(level).unwrap_or(0).max(1);
        let depth = match dimension {
            TextureDimension::D3 => shrink(self.depth),
            TextureDimension::D1 | TextureDimension::D2 => self.depth,
        };
        Self {
            width: shrink(self.width),
            height: shrink(self.height),
            depth,
        }
    }
}

impl Default for Extent3d {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl From<Extent2d> for Extent3d {
    fn from(extent: Extent2d) -> Self {
        Self::new_2d(extent.width, extent.height)
    }
}

/// 3D texel origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Origin3d {
    /// X.
    pub x: u32,
    /// Y.
    pub y: u32,
    /// Z or array layer.
    pub z: u32,
}

impl Origin3d {
    /// The zero origin.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new origin.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Viewport transform of a raster pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Create a viewport covering `width` x `height` with the full depth range.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle of a raster pass, in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ScissorRect {
    /// Create a scissor rectangle.
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_bits(self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }
}

/// Comparison function for depth tests, stencil tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_unique() {
        let a = ObjectId::next();
        let b = ObjectId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_rhi_type_from_str() {
        assert_eq!("dummy".parse::<RhiType>().ok(), Some(RhiType::Dummy));
        assert_eq!("DX12".parse::<RhiType>().ok(), Some(RhiType::DirectX12));
        assert_eq!(" Vulkan ".parse::<RhiType>().ok(), Some(RhiType::Vulkan));
        assert!("opengl".parse::<RhiType>().is_err());
    }

    #[test]
    fn test_platform_default_is_native() {
        assert_ne!(RhiType::platform_default(), RhiType::Dummy);
    }

    #[test]
    fn test_mip_level_size() {
        let extent = Extent3d::new(256, 64, 6);
        assert_eq!(
            extent.mip_level_size(3, TextureDimension::D2),
            Extent3d::new(32, 8, 6)
        );
        assert_eq!(
            extent.mip_level_size(10, TextureDimension::D2),
            Extent3d::new(1, 1, 6)
        );
        assert_eq!(
            extent.mip_level_size(1, TextureDimension::D3),
            Extent3d::new(128, 32, 3)
        );
        assert_eq!(
            extent.mip_level_size(40, TextureDimension::D3),
            Extent3d::new(1, 1, 1)
        );
    }

    #[test]
    fn test_queue_capabilities() {
        assert!(QueueType::Graphics.supports_graphics());
        assert!(QueueType::Compute.supports_compute());
        assert!(!QueueType::Transfer.supports_compute());
    }
}
