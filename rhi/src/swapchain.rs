//! Presentation surfaces and swapchains.
//!
//! # Frame protocol
//!
//! ```ignore
//! let index = swap_chain.acquire_back_texture(&image_available);
//! // record into swap_chain.texture(index) ...
//! queue.submit(
//!     &command_buffer,
//!     &QueueSubmitInfo::new()
//!         .with_wait_semaphore(&image_available)
//!         .with_signal_semaphore(&render_finished)
//!         .with_signal_fence(&frame_fence),
//! );
//! swap_chain.present(&render_finished);
//! ```
//!
//! Acquire and present strictly alternate; acquiring twice or presenting
//! without an acquired texture is a protocol violation.

use std::fmt;

use crate::backend::{RawSwapChainDesc, SurfaceBackend, SwapChainBackend};
use crate::error::{RhiError, RhiResult};
use crate::queue::Queue;
use crate::resources::Texture;
use crate::sync::Semaphore;
use crate::types::{Extent2d, ObjectId, PixelFormat, PresentMode};

/// Maximum number of textures in a swapchain.
pub const MAX_SWAP_CHAIN_TEXTURES: u8 = 8;

/// A presentation target wrapping a native window.
///
/// The window is owned by the caller and must outlive the surface.
pub struct Surface {
    id: ObjectId,
    raw: Box<dyn SurfaceBackend>,
}

impl Surface {
    pub(crate) fn new(raw: Box<dyn SurfaceBackend>) -> Self {
        Self {
            id: ObjectId::next(),
            raw,
        }
    }

    /// Get the surface identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Destroy the surface. Swapchains created on it must be destroyed first.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn SurfaceBackend {
        self.raw.as_ref()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface").field("id", &self.id).finish()
    }
}

/// Create info for a swapchain.
#[derive(Debug, Clone, Copy)]
pub struct SwapChainCreateInfo<'a> {
    /// Graphics-capable queue presentation is scheduled on.
    pub present_queue: &'a Queue,
    pub surface: &'a Surface,
    pub texture_count: u8,
    pub format: PixelFormat,
    pub extent: Extent2d,
    pub present_mode: PresentMode,
}

impl<'a> SwapChainCreateInfo<'a> {
    /// Double-buffered `Bgra8Unorm` swapchain with vsync.
    pub fn new(present_queue: &'a Queue, surface: &'a Surface, extent: Extent2d) -> Self {
        Self {
            present_queue,
            surface,
            texture_count: 2,
            format: PixelFormat::Bgra8Unorm,
            extent,
            present_mode: PresentMode::Vsync,
        }
    }

    pub fn with_texture_count(mut self, texture_count: u8) -> Self {
        self.texture_count = texture_count;
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_present_mode(mut self, present_mode: PresentMode) -> Self {
        self.present_mode = present_mode;
        self
    }

    pub(crate) fn validate(&self) -> RhiResult<()> {
        if !(1..=MAX_SWAP_CHAIN_TEXTURES).contains(&self.texture_count) {
            return Err(RhiError::InvalidParameter(format!(
                "swapchain texture count {} outside 1..={MAX_SWAP_CHAIN_TEXTURES}",
                self.texture_count
            )));
        }
        if self.extent.is_empty() {
            return Err(RhiError::InvalidParameter(format!(
                "swapchain extent {}x{} is empty",
                self.extent.width, self.extent.height
            )));
        }
        if !self.present_queue.queue_type().supports_graphics() {
            return Err(RhiError::InvalidParameter(format!(
                "swapchain present queue must be graphics-capable, got {:?}",
                self.present_queue.queue_type()
            )));
        }
        Ok(())
    }

    pub(crate) fn raw_desc(&self) -> RawSwapChainDesc {
        RawSwapChainDesc {
            texture_count: self.texture_count,
            format: self.format,
            extent: self.extent,
            present_mode: self.present_mode,
        }
    }
}

/// A ring of presentable textures.
pub struct SwapChain {
    id: ObjectId,
    format: PixelFormat,
    extent: Extent2d,
    present_mode: PresentMode,
    acquired: Option<u8>,
    // Declared before `raw` so the textures drop first.
    textures: Vec<Texture>,
    raw: Box<dyn SwapChainBackend>,
}

impl SwapChain {
    pub(crate) fn new(
        raw: Box<dyn SwapChainBackend>,
        info: &SwapChainCreateInfo<'_>,
        textures: Vec<Texture>,
    ) -> Self {
        Self {
            id: ObjectId::next(),
            format: info.format,
            extent: info.extent,
            present_mode: info.present_mode,
            acquired: None,
            textures,
            raw,
        }
    }

    /// Get the swapchain identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn extent(&self) -> Extent2d {
        self.extent
    }

    pub fn present_mode(&self) -> PresentMode {
        self.present_mode
    }

    /// Number of textures in the ring.
    pub fn texture_count(&self) -> u8 {
        self.textures.len() as u8
    }

    /// Texture at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`texture_count`](Self::texture_count).
    pub fn texture(&self, index: u8) -> &Texture {
        &self.textures[usize::from(index)]
    }

    /// Index of the currently acquired texture, if any.
    pub fn acquired_index(&self) -> Option<u8> {
        self.acquired
    }

    /// Acquire the next texture of the ring. `signal` fires once the texture
    /// can be rendered to.
    pub fn acquire_back_texture(&mut self, signal: &Semaphore) -> u8 {
        debug_assert!(
            self.acquired.is_none(),
            "SwapChain::acquire_back_texture: texture {:?} acquired but not presented",
            self.acquired
        );
        let index = self.raw.acquire_back_texture(signal.raw());
        debug_assert!(
            index < self.texture_count(),
            "SwapChain::acquire_back_texture: backend returned index {index} of {}",
            self.texture_count()
        );
        signal.mark_signal();
        self.acquired = Some(index);
        log::trace!("SwapChain {}: acquired texture {index}", self.id);
        index
    }

    /// Present the acquired texture once `wait` fires.
    pub fn present(&mut self, wait: &Semaphore) {
        debug_assert!(
            self.acquired.is_some(),
            "SwapChain::present: no texture acquired"
        );
        wait.mark_wait();
        self.raw.present(wait.raw());
        log::trace!("SwapChain {}: presented texture {:?}", self.id, self.acquired);
        self.acquired = None;
    }

    /// Destroy the swapchain and its textures.
    pub fn destroy(self) {
        drop(self);
    }
}

impl fmt::Debug for SwapChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapChain")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("extent", &self.extent)
            .field("texture_count", &self.textures.len())
            .field("acquired", &self.acquired)
            .finish()
    }
}

static_assertions::assert_impl_all!(Surface: Send, Sync);
static_assertions::assert_impl_all!(SwapChain: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::test_support::{dummy_device, dummy_window};
    use crate::types::{QueueType, SurfaceCreateInfo};

    #[test]
    fn test_create_info_validation() {
        let device = dummy_device();
        let surface = device.create_surface(&SurfaceCreateInfo::new(dummy_window())).unwrap();
        let graphics = device.queue(QueueType::Graphics, 0).unwrap();
        let transfer = device.queue(QueueType::Transfer, 0).unwrap();
        let extent = Extent2d::new(640, 480);

        let info = SwapChainCreateInfo::new(graphics, &surface, extent);
        assert!(device.create_swap_chain(&info.with_texture_count(0)).is_err());
        assert!(device.create_swap_chain(&info.with_texture_count(9)).is_err());
        assert!(device
            .create_swap_chain(&SwapChainCreateInfo::new(graphics, &surface, Extent2d::new(0, 480)))
            .is_err());
        assert!(device
            .create_swap_chain(&SwapChainCreateInfo::new(transfer, &surface, extent))
            .is_err());
        assert_eq!(
            device
                .create_swap_chain(&info.with_format(PixelFormat::R8Unorm))
                .err(),
            Some(RhiError::UnsupportedFormat(PixelFormat::R8Unorm))
        );

        let swap_chain = device.create_swap_chain(&info.with_texture_count(3)).unwrap();
        assert_eq!(swap_chain.texture_count(), 3);
        assert_eq!(swap_chain.texture(2).extent().width, 640);
    }

    #[test]
    fn test_acquire_cycles_through_ring() {
        let device = dummy_device();
        let surface = device.create_surface(&SurfaceCreateInfo::new(dummy_window())).unwrap();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let mut swap_chain = device
            .create_swap_chain(
                &SwapChainCreateInfo::new(queue, &surface, Extent2d::new(64, 64))
                    .with_texture_count(3),
            )
            .unwrap();
        let available = device.create_semaphore().unwrap();
        let finished = device.create_semaphore().unwrap();

        let mut indices = Vec::new();
        for _ in 0..6 {
            let index = swap_chain.acquire_back_texture(&available);
            assert_eq!(swap_chain.acquired_index(), Some(index));
            available.mark_wait();
            finished.mark_signal();
            swap_chain.present(&finished);
            indices.push(index);
        }
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "no texture acquired")]
    fn test_present_without_acquire_asserts() {
        let device = dummy_device();
        let surface = device.create_surface(&SurfaceCreateInfo::new(dummy_window())).unwrap();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let mut swap_chain = device
            .create_swap_chain(&SwapChainCreateInfo::new(queue, &surface, Extent2d::new(64, 64)))
            .unwrap();
        let finished = device.create_semaphore().unwrap();
        swap_chain.present(&finished);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "acquired but not presented")]
    fn test_acquire_twice_asserts() {
        let device = dummy_device();
        let surface = device.create_surface(&SurfaceCreateInfo::new(dummy_window())).unwrap();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let mut swap_chain = device
            .create_swap_chain(&SwapChainCreateInfo::new(queue, &surface, Extent2d::new(64, 64)))
            .unwrap();
        let first = device.create_semaphore().unwrap();
        let second = device.create_semaphore().unwrap();
        swap_chain.acquire_back_texture(&first);
        swap_chain.acquire_back_texture(&second);
    }
}
