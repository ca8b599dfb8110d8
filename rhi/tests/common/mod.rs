//! Common utilities for RHI integration tests.
//!
//! This module provides shared test infrastructure that can be reused
//! across different backend implementations.

use std::sync::Arc;

use raw_window_handle::{RawWindowHandle, WebWindowHandle};
use redlilium_rhi::{
    Buffer, BufferCreateInfo, BufferUsage, CommandBuffer, Device, DeviceCreateInfo, Instance,
    MapMode, QueueSubmitInfo, QueueType, RhiType, is_module_registered,
};

/// Deterministic byte pattern of `len` bytes.
pub fn generate_test_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// A window handle every headless backend accepts.
#[allow(dead_code)]
pub fn test_window() -> RawWindowHandle {
    RawWindowHandle::Web(WebWindowHandle::new(1))
}

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Backends the integration tests run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dummy backend (host memory, no GPU work).
    Dummy,
    Vulkan,
    DirectX12,
    Metal,
}

impl Backend {
    pub fn rhi_type(self) -> RhiType {
        match self {
            Backend::Dummy => RhiType::Dummy,
            Backend::Vulkan => RhiType::Vulkan,
            Backend::DirectX12 => RhiType::DirectX12,
            Backend::Metal => RhiType::Metal,
        }
    }

    /// Check if a module for this backend is registered in this process.
    pub fn is_available(self) -> bool {
        is_module_registered(self.rhi_type())
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// Instance and device shared by one test.
pub struct TestContext {
    #[allow(dead_code)]
    pub backend: Backend,
    #[allow(dead_code)]
    pub instance: Arc<Instance>,
    pub device: Device,
}

impl TestContext {
    /// Create a context with one queue of every type.
    ///
    /// Returns `None` if the backend is not available.
    pub fn new(backend: Backend) -> Option<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        if !backend.is_available() {
            return None;
        }

        let instance = Instance::get_by_type(backend.rhi_type())?;
        let gpu = instance.gpu(0)?;
        let mut info = DeviceCreateInfo::new();
        for queue_type in QueueType::ALL {
            if gpu.queue_capacity(queue_type) > 0 {
                info = info.with_queue_request(queue_type, 1);
            }
        }
        let device = gpu.request_device(&info).ok()?;

        Some(Self {
            backend,
            instance,
            device,
        })
    }

    /// Create a buffer, panicking on failure.
    pub fn create_buffer(&self, size: u64, usages: BufferUsage) -> Buffer {
        self.device
            .create_buffer(&BufferCreateInfo::new(size, usages))
            .expect("Failed to create buffer")
    }

    /// Create a host-writable upload buffer filled with `data`.
    pub fn create_staging_buffer(&self, data: &[u8]) -> Buffer {
        let mut buffer = self.create_buffer(
            data.len() as u64,
            BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC,
        );
        buffer
            .map(MapMode::Write, 0, data.len() as u64)
            .copy_from_slice(data);
        buffer
    }

    /// Read `len` bytes of a host-readable buffer.
    pub fn read_buffer(&self, buffer: &mut Buffer, len: u64) -> Vec<u8> {
        buffer.map(MapMode::Read, 0, len).to_vec()
    }

    /// Submit `command_buffer` to the first queue of `queue_type` and block
    /// until it completed.
    pub fn submit_and_wait(&self, queue_type: QueueType, command_buffer: &CommandBuffer) {
        let queue = self
            .device
            .queue(queue_type, 0)
            .expect("Queue was not requested");
        let fence = self.device.create_fence(false).expect("Failed to create fence");
        queue.submit(
            command_buffer,
            &QueueSubmitInfo::new().with_signal_fence(&fence),
        );
        fence.wait();
    }
}
