//! Buffer types and create infos.

use bitflags::bitflags;

use super::IndexFormat;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer is mappable for host reads.
        const MAP_READ = 1 << 0;
        /// Buffer is mappable for host writes.
        const MAP_WRITE = 1 << 1;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 2;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 3;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 4;
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 5;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 6;
        /// Buffer can be used as a read-only storage buffer.
        const STORAGE = 1 << 7;
        /// Buffer can be used as a read-write storage buffer.
        const RW_STORAGE = 1 << 8;
        /// Buffer can hold indirect draw/dispatch arguments.
        const INDIRECT = 1 << 9;
        /// Buffer can receive query results.
        const QUERY_RESOLVE = 1 << 10;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

impl BufferUsage {
    /// Whether the usage requests host-visible memory.
    pub fn is_mappable(&self) -> bool {
        self.intersects(Self::MAP_READ | Self::MAP_WRITE)
    }
}

/// Access state of a buffer, used by barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferState {
    #[default]
    Undefined,
    Staging,
    CopySrc,
    CopyDst,
    ShaderReadOnly,
    Storage,
    RwStorage,
}

/// Create info for a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferCreateInfo {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usages: BufferUsage,
    /// State the buffer is in right after creation.
    pub initial_state: BufferState,
}

impl BufferCreateInfo {
    /// Create a new buffer create info.
    pub fn new(size: u64, usages: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usages,
            initial_state: BufferState::Undefined,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the initial state.
    pub fn with_initial_state(mut self, state: BufferState) -> Self {
        self.initial_state = state;
        self
    }
}

/// How a buffer view is interpreted, with the extra data each kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferViewType {
    /// Vertex stream with the given element stride in bytes.
    Vertex { stride: u32 },
    /// Index stream.
    Index { format: IndexFormat },
    /// Uniform (constant) buffer binding.
    UniformBinding,
    /// Read-only storage buffer binding.
    StorageBinding,
    /// Read-write storage buffer binding.
    RwStorageBinding,
}

impl BufferViewType {
    /// The buffer usage the parent buffer needs for this view type.
    pub fn required_usage(&self) -> BufferUsage {
        match self {
            Self::Vertex { .. } => BufferUsage::VERTEX,
            Self::Index { .. } => BufferUsage::INDEX,
            Self::UniformBinding => BufferUsage::UNIFORM,
            Self::StorageBinding => BufferUsage::STORAGE,
            Self::RwStorageBinding => BufferUsage::RW_STORAGE,
        }
    }
}

/// Create info for a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferViewCreateInfo {
    /// Interpretation of the viewed bytes.
    pub view_type: BufferViewType,
    /// Byte offset into the buffer.
    pub offset: u64,
    /// Byte size of the view.
    pub size: u64,
}

impl BufferViewCreateInfo {
    /// Create a view of `size` bytes starting at offset 0.
    pub fn new(view_type: BufferViewType, size: u64) -> Self {
        Self {
            view_type,
            offset: 0,
            size,
        }
    }

    /// Set the byte offset.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_create_info_builder() {
        let info = BufferCreateInfo::new(256, BufferUsage::STORAGE | BufferUsage::COPY_DST)
            .with_label("particles")
            .with_initial_state(BufferState::CopyDst);
        assert_eq!(info.size, 256);
        assert_eq!(info.label.as_deref(), Some("particles"));
        assert_eq!(info.initial_state, BufferState::CopyDst);
    }

    #[test]
    fn test_required_usage() {
        assert_eq!(
            BufferViewType::Vertex { stride: 12 }.required_usage(),
            BufferUsage::VERTEX
        );
        assert_eq!(
            BufferViewType::RwStorageBinding.required_usage(),
            BufferUsage::RW_STORAGE
        );
    }

    #[test]
    fn test_mappable() {
        assert!(BufferUsage::MAP_WRITE.is_mappable());
        assert!(!(BufferUsage::STORAGE | BufferUsage::COPY_DST).is_mappable());
    }
}
