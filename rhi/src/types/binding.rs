//! Binding model value types.

use bitflags::bitflags;

bitflags! {
    /// Shader stages a binding or constant range is visible to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStage: u32 {
        const VERTEX = 1 << 0;
        const PIXEL = 1 << 1;
        const COMPUTE = 1 << 2;
        const GEOMETRY = 1 << 3;
        const HULL = 1 << 4;
        const DOMAIN = 1 << 5;
        /// Every raster stage.
        const ALL_GRAPHICS = Self::VERTEX.bits()
            | Self::PIXEL.bits()
            | Self::GEOMETRY.bits()
            | Self::HULL.bits()
            | Self::DOMAIN.bits();
    }
}

impl Default for ShaderStage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Kind of resource a binding slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    UniformBuffer,
    StorageBuffer,
    RwStorageBuffer,
    Sampler,
    Texture,
    StorageTexture,
}

impl BindingType {
    /// Register class this binding type occupies in the HLSL numbering scheme.
    pub fn hlsl_range_type(&self) -> HlslBindingRangeType {
        match self {
            Self::UniformBuffer => HlslBindingRangeType::ConstantBuffer,
            Self::StorageBuffer | Self::Texture => HlslBindingRangeType::Texture,
            Self::RwStorageBuffer | Self::StorageTexture => HlslBindingRangeType::UnorderedAccess,
            Self::Sampler => HlslBindingRangeType::Sampler,
        }
    }
}

/// HLSL register classes (`b`, `t`, `s`, `u`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HlslBindingRangeType {
    ConstantBuffer,
    Texture,
    Sampler,
    UnorderedAccess,
}

/// Slot number of a binding.
///
/// Backends numbering bindings per register class read the `Hlsl` variant;
/// backends with one flat binding space read the `Glsl` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceBinding {
    /// Register-class numbering, e.g. `register(b0)`.
    Hlsl {
        range_type: HlslBindingRangeType,
        index: u8,
    },
    /// Flat numbering, e.g. `layout(binding = 0)`.
    Glsl { index: u8 },
}

impl ResourceBinding {
    /// Binding in the register-class scheme.
    pub fn hlsl(range_type: HlslBindingRangeType, index: u8) -> Self {
        Self::Hlsl { range_type, index }
    }

    /// Binding in the flat scheme.
    pub fn glsl(index: u8) -> Self {
        Self::Glsl { index }
    }

    /// Slot index within the scheme.
    pub fn index(&self) -> u8 {
        match self {
            Self::Hlsl { index, .. } | Self::Glsl { index } => *index,
        }
    }

    /// Whether both bindings use the same numbering scheme.
    pub fn same_scheme(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Hlsl { .. }, Self::Hlsl { .. }) | (Self::Glsl { .. }, Self::Glsl { .. })
        )
    }
}

/// One slot of a bind group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntry {
    /// Resource kind the slot accepts.
    pub binding_type: BindingType,
    /// Slot number.
    pub binding: ResourceBinding,
    /// Stages the slot is visible to.
    pub shader_visibility: ShaderStage,
}

impl BindGroupLayoutEntry {
    /// Create a layout entry.
    pub fn new(
        binding_type: BindingType,
        binding: ResourceBinding,
        shader_visibility: ShaderStage,
    ) -> Self {
        Self {
            binding_type,
            binding,
            shader_visibility,
        }
    }
}

/// Create info for a bind group layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BindGroupLayoutCreateInfo {
    /// Debug label for the layout.
    pub label: Option<String>,
    /// Group slot this layout occupies in a pipeline layout.
    pub layout_index: u8,
    /// Binding slots.
    pub entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutCreateInfo {
    /// Create an empty layout for the given group slot.
    pub fn new(layout_index: u8) -> Self {
        Self {
            label: None,
            layout_index,
            entries: Vec::new(),
        }
    }

    /// Add an entry.
    pub fn with_entry(mut self, entry: BindGroupLayoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Push-constant style range of a pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineConstantLayout {
    /// Stages that read the range.
    pub stage_flags: ShaderStage,
    /// Byte offset, 4-byte aligned.
    pub offset: u32,
    /// Byte size, 4-byte aligned and non-zero.
    pub size: u32,
}

impl PipelineConstantLayout {
    /// Create a constant range.
    pub fn new(stage_flags: ShaderStage, offset: u32, size: u32) -> Self {
        Self {
            stage_flags,
            offset,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hlsl_range_types() {
        assert_eq!(
            BindingType::UniformBuffer.hlsl_range_type(),
            HlslBindingRangeType::ConstantBuffer
        );
        assert_eq!(
            BindingType::StorageBuffer.hlsl_range_type(),
            HlslBindingRangeType::Texture
        );
        assert_eq!(
            BindingType::StorageTexture.hlsl_range_type(),
            HlslBindingRangeType::UnorderedAccess
        );
    }

    #[test]
    fn test_resource_binding_scheme() {
        let a = ResourceBinding::glsl(0);
        let b = ResourceBinding::hlsl(HlslBindingRangeType::Sampler, 0);
        assert!(!a.same_scheme(&b));
        assert!(a.same_scheme(&ResourceBinding::glsl(3)));
        assert_eq!(b.index(), 0);
    }
}
