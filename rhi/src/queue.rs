//! Submission queues.

use std::fmt;

use crate::backend::{QueueBackend, RawSubmitInfo, SemaphoreBackend};
use crate::command::CommandBuffer;
use crate::sync::{Fence, Semaphore};
use crate::types::{ObjectId, QueueType};

/// Synchronization attached to one submission.
#[derive(Debug, Clone, Default)]
pub struct QueueSubmitInfo<'a> {
    /// Semaphores the GPU waits on before starting the work.
    pub wait_semaphores: Vec<&'a Semaphore>,
    /// Semaphores signaled once the work completes.
    pub signal_semaphores: Vec<&'a Semaphore>,
    /// Fence signaled once the work completes.
    pub signal_fence: Option<&'a Fence>,
}

impl<'a> QueueSubmitInfo<'a> {
    /// Create a submission without synchronization.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_semaphore(mut self, semaphore: &'a Semaphore) -> Self {
        self.wait_semaphores.push(semaphore);
        self
    }

    pub fn with_signal_semaphore(mut self, semaphore: &'a Semaphore) -> Self {
        self.signal_semaphores.push(semaphore);
        self
    }

    pub fn with_signal_fence(mut self, fence: &'a Fence) -> Self {
        self.signal_fence = Some(fence);
        self
    }
}

/// A device queue.
///
/// Work submitted to one queue executes in submission order. Work on
/// different queues is ordered only through semaphores.
pub struct Queue {
    id: ObjectId,
    queue_type: QueueType,
    index: u8,
    raw: Box<dyn QueueBackend>,
}

impl Queue {
    pub(crate) fn new(raw: Box<dyn QueueBackend>, queue_type: QueueType, index: u8) -> Self {
        Self {
            id: ObjectId::next(),
            queue_type,
            index,
            raw,
        }
    }

    /// Get the queue identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Capability class of the queue.
    pub fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    /// Index among the device queues of the same type.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Submit an executable command buffer.
    ///
    /// The command buffer and every resource it references must stay alive
    /// until the work completed.
    pub fn submit(&self, command_buffer: &CommandBuffer, info: &QueueSubmitInfo<'_>) {
        debug_assert!(
            command_buffer.is_executable(),
            "Queue::submit: {command_buffer:?} is not executable"
        );
        debug_assert!(
            command_buffer.is_supported_by(self.queue_type),
            "Queue::submit: {command_buffer:?} records passes a {:?} queue cannot execute",
            self.queue_type
        );

        for semaphore in &info.wait_semaphores {
            semaphore.mark_wait();
        }
        for semaphore in &info.signal_semaphores {
            semaphore.mark_signal();
        }

        let wait: Vec<&dyn SemaphoreBackend> =
            info.wait_semaphores.iter().map(|semaphore| semaphore.raw()).collect();
        let signal: Vec<&dyn SemaphoreBackend> =
            info.signal_semaphores.iter().map(|semaphore| semaphore.raw()).collect();

        log::trace!(
            "Queue {:?}[{}]: submit {} (wait {}, signal {}, fence {:?})",
            self.queue_type,
            self.index,
            command_buffer.id(),
            wait.len(),
            signal.len(),
            info.signal_fence.map(Fence::id)
        );
        self.raw.submit(
            command_buffer.raw(),
            &RawSubmitInfo {
                wait_semaphores: &wait,
                signal_semaphores: &signal,
                signal_fence: info.signal_fence.map(Fence::raw),
            },
        );
    }

    /// Signal `fence` once all work submitted so far has completed.
    pub fn flush(&self, fence: &Fence) {
        log::trace!(
            "Queue {:?}[{}]: flush into {}",
            self.queue_type,
            self.index,
            fence.id()
        );
        self.raw.flush(fence.raw());
    }

    pub(crate) fn raw(&self) -> &dyn QueueBackend {
        self.raw.as_ref()
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("id", &self.id)
            .field("queue_type", &self.queue_type)
            .field("index", &self.index)
            .finish()
    }
}

static_assertions::assert_impl_all!(Queue: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::test_support::dummy_device;

    #[test]
    fn test_submit_signals_fence() {
        let device = dummy_device();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let mut command_buffer = device.create_command_buffer().unwrap();
        command_buffer.begin().end();

        let fence = device.create_fence(false).unwrap();
        queue.submit(&command_buffer, &QueueSubmitInfo::new().with_signal_fence(&fence));
        fence.wait();
        assert!(fence.is_signaled());
    }

    #[test]
    fn test_flush_signals_fence() {
        let device = dummy_device();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let fence = device.create_fence(false).unwrap();
        queue.flush(&fence);
        assert!(fence.is_signaled());
    }

    #[test]
    fn test_semaphore_chain_between_submissions() {
        let device = dummy_device();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let semaphore = device.create_semaphore().unwrap();
        let mut first = device.create_command_buffer().unwrap();
        let mut second = device.create_command_buffer().unwrap();
        first.begin().end();
        second.begin().end();

        queue.submit(&first, &QueueSubmitInfo::new().with_signal_semaphore(&semaphore));
        queue.submit(&second, &QueueSubmitInfo::new().with_wait_semaphore(&semaphore));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "is not executable")]
    fn test_submit_unrecorded_buffer_asserts() {
        let device = dummy_device();
        let queue = device.queue(QueueType::Graphics, 0).unwrap();
        let command_buffer = device.create_command_buffer().unwrap();
        queue.submit(&command_buffer, &QueueSubmitInfo::new());
    }
}
