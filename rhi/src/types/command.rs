//! Command recording value types.

use super::{Extent3d, Origin3d, TextureSubResourceInfo};

/// What happens to an attachment at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadOp {
    /// Keep the previous contents.
    Load,
    /// Clear to the attachment's clear value.
    #[default]
    Clear,
}

/// What happens to an attachment at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreOp {
    /// Keep the rendered contents.
    #[default]
    Store,
    /// Contents may be discarded.
    Discard,
}

/// Region of a buffer-to-buffer copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferCopyInfo {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub copy_size: u64,
}

impl BufferCopyInfo {
    /// Create a buffer copy info.
    pub fn new(src_offset: u64, dst_offset: u64, copy_size: u64) -> Self {
        Self {
            src_offset,
            dst_offset,
            copy_size,
        }
    }
}

/// Region of a texture-to-texture copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureCopyInfo {
    pub src_sub_resource: TextureSubResourceInfo,
    pub src_origin: Origin3d,
    pub dst_sub_resource: TextureSubResourceInfo,
    pub dst_origin: Origin3d,
    pub copy_region: Extent3d,
}

impl TextureCopyInfo {
    /// Copy `copy_region` between the first sub-resources of two textures.
    pub fn new(copy_region: Extent3d) -> Self {
        Self {
            src_sub_resource: TextureSubResourceInfo::default(),
            src_origin: Origin3d::ZERO,
            dst_sub_resource: TextureSubResourceInfo::default(),
            dst_origin: Origin3d::ZERO,
            copy_region,
        }
    }

    /// Set the source sub-resource and origin.
    pub fn with_src(mut self, sub_resource: TextureSubResourceInfo, origin: Origin3d) -> Self {
        self.src_sub_resource = sub_resource;
        self.src_origin = origin;
        self
    }

    /// Set the destination sub-resource and origin.
    pub fn with_dst(mut self, sub_resource: TextureSubResourceInfo, origin: Origin3d) -> Self {
        self.dst_sub_resource = sub_resource;
        self.dst_origin = origin;
        self
    }
}

/// Region of a copy between a buffer and a texture.
///
/// Buffer rows are laid out with the texture's copy footprint row pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferTextureCopyInfo {
    pub buffer_offset: u64,
    pub texture_sub_resource: TextureSubResourceInfo,
    pub texture_origin: Origin3d,
    pub copy_region: Extent3d,
}

impl BufferTextureCopyInfo {
    /// Copy `copy_region` of the first texture sub-resource from/to buffer offset 0.
    pub fn new(copy_region: Extent3d) -> Self {
        Self {
            buffer_offset: 0,
            texture_sub_resource: TextureSubResourceInfo::default(),
            texture_origin: Origin3d::ZERO,
            copy_region,
        }
    }

    /// Set the buffer offset.
    pub fn with_buffer_offset(mut self, offset: u64) -> Self {
        self.buffer_offset = offset;
        self
    }

    /// Set the texture sub-resource and origin.
    pub fn with_texture(mut self, sub_resource: TextureSubResourceInfo, origin: Origin3d) -> Self {
        self.texture_sub_resource = sub_resource;
        self.texture_origin = origin;
        self
    }
}
