//! Synchronization primitives: fences, semaphores and resource barriers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{Command, FenceBackend, SemaphoreBackend};
use crate::resources::{Buffer, Texture};
use crate::types::{BufferState, ObjectId, TextureState};

// ============================================================================
// Fence
// ============================================================================

/// Observable state of a [`Fence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceStatus {
    Unsignaled,
    Signaled,
}

/// GPU-to-CPU signal.
///
/// A fence becomes signaled when the submission or flush it was attached to
/// completes, stays signaled through any number of waits, and returns to
/// unsignaled on [`reset`](Self::reset).
pub struct Fence {
    id: ObjectId,
    raw: Box<dyn FenceBackend>,
}

impl Fence {
    pub(crate) fn new(raw: Box<dyn FenceBackend>) -> Self {
        Self {
            id: ObjectId::next(),
            raw,
        }
    }

    /// Get the fence identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Poll the fence without blocking.
    pub fn status(&self) -> FenceStatus {
        if self.raw.is_signaled() {
            FenceStatus::Signaled
        } else {
            FenceStatus::Unsignaled
        }
    }

    /// Whether the fence is signaled.
    pub fn is_signaled(&self) -> bool {
        self.status() == FenceStatus::Signaled
    }

    /// Block the calling thread until the fence is signaled.
    ///
    /// Waiting on a fence that nothing will signal never returns.
    pub fn wait(&self) {
        self.raw.wait();
    }

    /// Return the fence to unsignaled. Idempotent.
    pub fn reset(&self) {
        self.raw.reset();
    }

    /// Destroy the fence.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn FenceBackend {
        self.raw.as_ref()
    }
}

impl fmt::Debug for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fence")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

// ============================================================================
// Semaphore
// ============================================================================

/// GPU-to-GPU signal between submissions, acquire and present.
///
/// Every signal must be consumed by exactly one wait before the semaphore is
/// signaled again.
pub struct Semaphore {
    id: ObjectId,
    pending: AtomicBool,
    raw: Box<dyn SemaphoreBackend>,
}

impl Semaphore {
    pub(crate) fn new(raw: Box<dyn SemaphoreBackend>) -> Self {
        Self {
            id: ObjectId::next(),
            pending: AtomicBool::new(false),
            raw,
        }
    }

    /// Get the semaphore identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Destroy the semaphore.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn mark_signal(&self) {
        let was_pending = self.pending.swap(true, Ordering::AcqRel);
        debug_assert!(
            !was_pending,
            "Semaphore {} signaled again before its previous signal was waited on",
            self.id
        );
    }

    pub(crate) fn mark_wait(&self) {
        let was_pending = self.pending.swap(false, Ordering::AcqRel);
        debug_assert!(
            was_pending,
            "Semaphore {} waited on without a pending signal",
            self.id
        );
    }

    pub(crate) fn raw(&self) -> &dyn SemaphoreBackend {
        self.raw.as_ref()
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("id", &self.id)
            .field("pending", &self.pending.load(Ordering::Relaxed))
            .finish()
    }
}

// ============================================================================
// Barrier
// ============================================================================

/// A resource that can be transitioned by a [`Barrier`].
///
/// The associated state type fixes the state vocabulary per resource kind.
pub trait BarrierResource {
    type State: Copy + fmt::Debug;

    /// Build the transition barrier for this resource.
    fn barrier(&self, before: Self::State, after: Self::State) -> Barrier<'_>;
}

impl BarrierResource for Buffer {
    type State = BufferState;

    fn barrier(&self, before: BufferState, after: BufferState) -> Barrier<'_> {
        Barrier::Buffer {
            buffer: self,
            before,
            after,
        }
    }
}

impl BarrierResource for Texture {
    type State = TextureState;

    fn barrier(&self, before: TextureState, after: TextureState) -> Barrier<'_> {
        Barrier::Texture {
            texture: self,
            before,
            after,
        }
    }
}

/// A declarative state transition, consumed while recording.
///
/// No state is tracked: `before` must be the state the resource is in when
/// the barrier executes.
#[derive(Debug, Clone, Copy)]
pub enum Barrier<'a> {
    Buffer {
        buffer: &'a Buffer,
        before: BufferState,
        after: BufferState,
    },
    Texture {
        texture: &'a Texture,
        before: TextureState,
        after: TextureState,
    },
}

impl<'a> Barrier<'a> {
    /// Transition `resource` from `before` to `after`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// recorder.resource_barrier(&[
    ///     Barrier::transition(&buffer, BufferState::CopyDst, BufferState::ShaderReadOnly),
    ///     Barrier::transition(&texture, TextureState::Undefined, TextureState::RenderTarget),
    /// ]);
    /// ```
    pub fn transition<R: BarrierResource>(
        resource: &'a R,
        before: R::State,
        after: R::State,
    ) -> Self {
        resource.barrier(before, after)
    }

    pub(crate) fn to_command(self) -> Command<'a> {
        match self {
            Self::Buffer {
                buffer,
                before,
                after,
            } => Command::BufferBarrier {
                buffer: buffer.raw(),
                before,
                after,
            },
            Self::Texture {
                texture,
                before,
                after,
            } => Command::TextureBarrier {
                texture: texture.raw(),
                before,
                after,
            },
        }
    }
}

static_assertions::assert_impl_all!(Fence: Send, Sync);
static_assertions::assert_impl_all!(Semaphore: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::QueueSubmitInfo;
    use crate::test_support::dummy_device;
    use crate::types::{
        BufferCreateInfo, BufferUsage, PixelFormat, QueueType, TextureCreateInfo, TextureUsage,
    };

    #[test]
    fn test_fence_initial_state() {
        let device = dummy_device();
        assert_eq!(device.create_fence(false).unwrap().status(), FenceStatus::Unsignaled);
        assert_eq!(device.create_fence(true).unwrap().status(), FenceStatus::Signaled);
    }

    #[test]
    fn test_fence_reset_is_idempotent() {
        let device = dummy_device();
        let fence = device.create_fence(true).unwrap();
        fence.wait();
        assert!(fence.is_signaled());
        fence.reset();
        fence.reset();
        assert!(!fence.is_signaled());
    }

    #[test]
    fn test_semaphore_signal_wait_pairing() {
        let device = dummy_device();
        let semaphore = device.create_semaphore().unwrap();
        semaphore.mark_signal();
        semaphore.mark_wait();
        semaphore.mark_signal();
        semaphore.mark_wait();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "without a pending signal")]
    fn test_semaphore_double_wait_asserts() {
        let device = dummy_device();
        let semaphore = device.create_semaphore().unwrap();
        semaphore.mark_signal();
        semaphore.mark_wait();
        semaphore.mark_wait();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "signaled again before its previous signal was waited on")]
    fn test_semaphore_double_signal_asserts() {
        let device = dummy_device();
        let semaphore = device.create_semaphore().unwrap();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let mut first = device.create_command_buffer().unwrap();
        let mut second = device.create_command_buffer().unwrap();
        first.begin().end();
        second.begin().end();

        queue.submit(&first, &QueueSubmitInfo::new().with_signal_semaphore(&semaphore));
        queue.submit(&second, &QueueSubmitInfo::new().with_signal_semaphore(&semaphore));
    }

    #[test]
    fn test_barrier_kind_follows_resource() {
        let device = dummy_device();
        let buffer = device
            .create_buffer(&BufferCreateInfo::new(64, BufferUsage::COPY_DST))
            .unwrap();
        let texture = device
            .create_texture(&TextureCreateInfo::new_2d(
                4,
                4,
                PixelFormat::Rgba8Unorm,
                TextureUsage::COPY_DST,
            ))
            .unwrap();

        let barrier = Barrier::transition(&buffer, BufferState::Undefined, BufferState::CopyDst);
        assert!(matches!(barrier, Barrier::Buffer { after: BufferState::CopyDst, .. }));

        let barrier = Barrier::transition(&texture, TextureState::Undefined, TextureState::CopyDst);
        assert!(matches!(barrier, Barrier::Texture { before: TextureState::Undefined, .. }));
    }
}
