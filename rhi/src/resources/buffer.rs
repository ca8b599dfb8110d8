//! GPU buffer and buffer view.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::backend::{BackendObject, BufferBackend};
use crate::error::{RhiError, RhiResult};
use crate::types::{
    BufferCreateInfo, BufferUsage, BufferViewCreateInfo, BufferViewType, MapMode, ObjectId,
};

/// A GPU buffer resource.
///
/// Created by [`Device::create_buffer`](crate::Device::create_buffer).
/// The buffer is exclusively owned by the returned value and released by
/// [`destroy`](Self::destroy) or by dropping it. The caller must make sure no
/// submitted command buffer still references it (wait on a [`Fence`](crate::Fence)).
pub struct Buffer {
    id: ObjectId,
    info: BufferCreateInfo,
    raw: Box<dyn BufferBackend>,
}

impl Buffer {
    pub(crate) fn new(raw: Box<dyn BufferBackend>, info: BufferCreateInfo) -> Self {
        Self {
            id: ObjectId::next(),
            info,
            raw,
        }
    }

    /// Get the buffer identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the create info the buffer was created with.
    pub fn create_info(&self) -> &BufferCreateInfo {
        &self.info
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.info.label.as_deref()
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.info.size
    }

    /// Get the usage flags.
    pub fn usages(&self) -> BufferUsage {
        self.info.usages
    }

    /// Whether the host can map the buffer.
    pub fn is_host_visible(&self) -> bool {
        self.raw.is_host_visible()
    }

    /// Map `length` bytes starting at `offset` for host access.
    ///
    /// The mapping ends when the returned range is dropped or
    /// [`unmap`](MappedRange::unmap)ped. The contents persist across mappings.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not host visible, if `mode` is not permitted by
    /// the buffer usage on non-unified memory, or if the range exceeds the buffer.
    pub fn map(&mut self, mode: MapMode, offset: u64, length: u64) -> MappedRange<'_> {
        assert!(
            self.raw.is_host_visible(),
            "Buffer::map: buffer {:?} ({}) is not host visible",
            self.info.label,
            self.id
        );
        if self.info.usages.is_mappable() {
            let required = match mode {
                MapMode::Read => BufferUsage::MAP_READ,
                MapMode::Write => BufferUsage::MAP_WRITE,
            };
            assert!(
                self.info.usages.contains(required),
                "Buffer::map: buffer {:?} ({}) does not allow {mode:?} mapping",
                self.info.label,
                self.id
            );
        }
        assert!(
            length > 0 && offset.checked_add(length).is_some_and(|end| end <= self.info.size),
            "Buffer::map: range {offset}+{length} exceeds buffer {:?} of size {}",
            self.info.label,
            self.info.size
        );
        let len = usize::try_from(length).unwrap_or_else(|_| {
            panic!("Buffer::map: length {length} exceeds the host address space")
        });

        let ptr = self.raw.map(mode, offset, length);
        log::trace!(
            "Buffer: mapped {:?} ({}) {mode:?} [{offset}, {})",
            self.info.label,
            self.id,
            offset + length
        );

        MappedRange {
            buffer: self,
            ptr,
            len,
        }
    }

    /// Create a view over a byte range of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or exceeds the buffer, if the
    /// buffer usage does not allow the view type, or if a vertex view has a
    /// zero stride.
    pub fn create_view(&self, info: &BufferViewCreateInfo) -> RhiResult<BufferView> {
        if info.size == 0 {
            return Err(RhiError::ViewOutOfRange(
                "buffer view size cannot be zero".to_string(),
            ));
        }
        let end = info.offset.checked_add(info.size);
        if end.is_none_or(|end| end > self.info.size) {
            return Err(RhiError::ViewOutOfRange(format!(
                "buffer view [{}, +{}) exceeds buffer {:?} of size {}",
                info.offset, info.size, self.info.label, self.info.size
            )));
        }

        let required = info.view_type.required_usage();
        if !self.info.usages.contains(required) {
            return Err(RhiError::IncompatibleView(format!(
                "{:?} view requires {:?} usage, buffer {:?} has {:?}",
                info.view_type, required, self.info.label, self.info.usages
            )));
        }
        if let BufferViewType::Vertex { stride: 0 } = info.view_type {
            return Err(RhiError::IncompatibleView(
                "vertex buffer view stride cannot be zero".to_string(),
            ));
        }

        let raw = self.raw.create_view(info)?;
        log::trace!(
            "Buffer: created {:?} view of {:?} ({})",
            info.view_type,
            self.info.label,
            self.id
        );
        Ok(BufferView {
            id: ObjectId::next(),
            buffer_id: self.id,
            info: *info,
            raw,
        })
    }

    /// Destroy the buffer.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BufferBackend {
        self.raw.as_ref()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        log::trace!("Buffer: destroyed {:?} ({})", self.info.label, self.id);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("label", &self.info.label)
            .field("size", &self.info.size)
            .field("usages", &self.info.usages)
            .finish()
    }
}

/// Host access to a mapped byte range of a [`Buffer`].
///
/// Dereferences to the mapped bytes. Dropping it unmaps the buffer.
pub struct MappedRange<'a> {
    buffer: &'a mut Buffer,
    ptr: NonNull<u8>,
    len: usize,
}

impl MappedRange<'_> {
    /// End the mapping.
    pub fn unmap(self) {
        drop(self);
    }
}

impl Deref for MappedRange<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the backend keeps `len` bytes at `ptr` valid until unmap,
        // and the exclusive borrow of the buffer prevents a second mapping.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for MappedRange<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `deref`.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for MappedRange<'_> {
    fn drop(&mut self) {
        self.buffer.raw.unmap();
        log::trace!(
            "Buffer: unmapped {:?} ({})",
            self.buffer.info.label,
            self.buffer.id
        );
    }
}

impl fmt::Debug for MappedRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedRange")
            .field("buffer", &self.buffer.id)
            .field("len", &self.len)
            .finish()
    }
}

/// A typed byte range of a [`Buffer`].
///
/// The view does not own the buffer and must not outlive it.
pub struct BufferView {
    id: ObjectId,
    buffer_id: ObjectId,
    info: BufferViewCreateInfo,
    raw: Box<dyn BackendObject>,
}

impl BufferView {
    /// Get the view identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the viewed buffer.
    pub fn buffer_id(&self) -> ObjectId {
        self.buffer_id
    }

    /// Get the create info the view was created with.
    pub fn create_info(&self) -> &BufferViewCreateInfo {
        &self.info
    }

    /// How the bytes are interpreted.
    pub fn view_type(&self) -> BufferViewType {
        self.info.view_type
    }

    /// Destroy the view.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for BufferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("id", &self.id)
            .field("buffer_id", &self.buffer_id)
            .field("info", &self.info)
            .finish()
    }
}

static_assertions::assert_impl_all!(Buffer: Send, Sync);
static_assertions::assert_impl_all!(BufferView: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use crate::test_support::dummy_device;
    use crate::types::{
        BufferCopyInfo, BufferCreateInfo, BufferUsage, BufferViewCreateInfo, BufferViewType,
        IndexFormat, MapMode, QueueType,
    };
    use crate::{QueueSubmitInfo, RhiError};

    #[test]
    fn test_create_info_round_trip() {
        let device = dummy_device();
        let info = BufferCreateInfo::new(4096, BufferUsage::VERTEX | BufferUsage::COPY_DST)
            .with_label("vertices");
        let buffer = device.create_buffer(&info).unwrap();
        assert_eq!(buffer.create_info(), &info);
        assert_eq!(buffer.size(), 4096);
        assert_eq!(buffer.label(), Some("vertices"));
    }

    #[test]
    fn test_map_write_then_read() {
        let device = dummy_device();
        let mut buffer = device
            .create_buffer(&BufferCreateInfo::new(64, BufferUsage::STORAGE))
            .unwrap();

        {
            let mut range = buffer.map(MapMode::Write, 16, 16);
            range.copy_from_slice(&[0xab; 16]);
            range.unmap();
        }

        let range = buffer.map(MapMode::Read, 0, 64);
        assert!(range[..16].iter().all(|&b| b == 0));
        assert!(range[16..32].iter().all(|&b| b == 0xab));
    }

    #[test]
    #[should_panic(expected = "exceeds buffer")]
    fn test_map_out_of_range_panics() {
        let device = dummy_device();
        let mut buffer = device
            .create_buffer(&BufferCreateInfo::new(64, BufferUsage::MAP_WRITE))
            .unwrap();
        let _range = buffer.map(MapMode::Write, 32, 64);
    }

    #[test]
    #[should_panic(expected = "does not allow Read mapping")]
    fn test_map_mode_must_match_usage() {
        let device = dummy_device();
        let mut buffer = device
            .create_buffer(&BufferCreateInfo::new(64, BufferUsage::MAP_WRITE))
            .unwrap();
        let _range = buffer.map(MapMode::Read, 0, 64);
    }

    #[test]
    #[should_panic(expected = "is mapped on the host")]
    fn test_submit_into_mapped_buffer_panics() {
        let device = dummy_device();
        let mut staging = device
            .create_buffer(&BufferCreateInfo::new(
                16,
                BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC,
            ))
            .unwrap();
        staging.map(MapMode::Write, 0, 16).copy_from_slice(&[7; 16]);
        let mut dst = device
            .create_buffer(&BufferCreateInfo::new(
                16,
                BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            ))
            .unwrap();

        let mut command_buffer = device.create_command_buffer().unwrap();
        {
            let mut recorder = command_buffer.begin();
            recorder
                .begin_copy_pass()
                .copy_buffer_to_buffer(&staging, &dst, BufferCopyInfo::new(0, 0, 16));
        }

        // The copy must not write under a live host mapping.
        let range = dst.map(MapMode::Read, 0, 16);
        let queue = device.queue(QueueType::Transfer, 0).unwrap();
        queue.submit(&command_buffer, &QueueSubmitInfo::new());
        assert_eq!(range[0], 0);
    }

    #[test]
    fn test_submit_after_unmap_copies() {
        let device = dummy_device();
        let mut staging = device
            .create_buffer(&BufferCreateInfo::new(
                16,
                BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC,
            ))
            .unwrap();
        staging.map(MapMode::Write, 0, 16).copy_from_slice(&[7; 16]);
        let mut dst = device
            .create_buffer(&BufferCreateInfo::new(
                16,
                BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            ))
            .unwrap();

        let mut command_buffer = device.create_command_buffer().unwrap();
        {
            let mut recorder = command_buffer.begin();
            recorder
                .begin_copy_pass()
                .copy_buffer_to_buffer(&staging, &dst, BufferCopyInfo::new(0, 0, 16));
        }

        dst.map(MapMode::Read, 0, 16).unmap();
        let fence = device.create_fence(false).unwrap();
        let queue = device.queue(QueueType::Transfer, 0).unwrap();
        queue.submit(&command_buffer, &QueueSubmitInfo::new().with_signal_fence(&fence));
        fence.wait();
        assert!(dst.map(MapMode::Read, 0, 16).iter().all(|&b| b == 7));
    }

    #[test]
    fn test_view_range_validation() {
        let device = dummy_device();
        let buffer = device
            .create_buffer(&BufferCreateInfo::new(256, BufferUsage::UNIFORM))
            .unwrap();

        let view = buffer
            .create_view(
                &BufferViewCreateInfo::new(BufferViewType::UniformBinding, 128).with_offset(128),
            )
            .unwrap();
        assert_eq!(view.buffer_id(), buffer.id());

        let result = buffer.create_view(
            &BufferViewCreateInfo::new(BufferViewType::UniformBinding, 128).with_offset(192),
        );
        assert!(matches!(result, Err(RhiError::ViewOutOfRange(_))));

        let result =
            buffer.create_view(&BufferViewCreateInfo::new(BufferViewType::UniformBinding, 0));
        assert!(matches!(result, Err(RhiError::ViewOutOfRange(_))));
    }

    #[test]
    fn test_view_type_must_match_usage() {
        let device = dummy_device();
        let buffer = device
            .create_buffer(&BufferCreateInfo::new(256, BufferUsage::VERTEX))
            .unwrap();

        let result = buffer.create_view(&BufferViewCreateInfo::new(
            BufferViewType::Index {
                format: IndexFormat::Uint16,
            },
            256,
        ));
        assert!(matches!(result, Err(RhiError::IncompatibleView(_))));

        let result = buffer.create_view(&BufferViewCreateInfo::new(
            BufferViewType::Vertex { stride: 0 },
            256,
        ));
        assert!(matches!(result, Err(RhiError::IncompatibleView(_))));

        assert!(buffer
            .create_view(&BufferViewCreateInfo::new(BufferViewType::Vertex { stride: 16 }, 256))
            .is_ok());
    }
}
