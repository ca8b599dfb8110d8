//! Dummy backend for testing and fallback.
//!
//! Performs no GPU work. Buffers are backed by host memory so mapping and
//! buffer-to-buffer copies behave like a real unified-memory device; every
//! other command is accepted and logged. Submissions complete immediately.

use std::any::Any;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::backend::{
    BackendObject, BufferBackend, Command, CommandBufferBackend, DeviceBackend, FenceBackend,
    GpuBackend, InstanceBackend, QueueBackend, RawBindGroupEntry, RawComputePipelineDesc,
    RawRasterPipelineDesc, RawSubmitInfo, RawSwapChainDesc, SemaphoreBackend, SurfaceBackend,
    SwapChainBackend, TextureBackend,
};
use crate::config::InstanceParameters;
use crate::debug::{DebugMessageSeverity, report_debug_message};
use crate::error::RhiResult;
use crate::instance::GpuProperty;
use crate::module::BackendModule;
use crate::types::{
    BindGroupLayoutCreateInfo, BufferCopyInfo, BufferCreateInfo, BufferViewCreateInfo, GpuType,
    MapMode, PipelineConstantLayout, PixelFormat, QueueType, RhiType, SamplerCreateInfo,
    ShaderModuleCreateInfo, SurfaceCreateInfo, TextureCreateInfo, TextureViewCreateInfo,
};

/// Formats the dummy surface can present.
const PRESENTABLE_FORMATS: [PixelFormat; 6] = [
    PixelFormat::Bgra8Unorm,
    PixelFormat::Bgra8UnormSrgb,
    PixelFormat::Rgba8Unorm,
    PixelFormat::Rgba8UnormSrgb,
    PixelFormat::Rgba16Float,
    PixelFormat::Rgb10A2Unorm,
];

/// Shape of the simulated hardware.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DummyParameters {
    /// Number of enumerated GPUs.
    pub gpu_count: u32,
    /// Queue capacity of every queue type.
    pub queues_per_type: u8,
    /// Whether every buffer is host visible regardless of its usages.
    pub unified_memory: bool,
}

impl Default for DummyParameters {
    fn default() -> Self {
        Self {
            gpu_count: 1,
            queues_per_type: 4,
            unified_memory: true,
        }
    }
}

impl DummyParameters {
    pub fn with_gpu_count(mut self, gpu_count: u32) -> Self {
        self.gpu_count = gpu_count;
        self
    }

    pub fn with_queues_per_type(mut self, queues_per_type: u8) -> Self {
        self.queues_per_type = queues_per_type;
        self
    }

    pub fn with_unified_memory(mut self, unified_memory: bool) -> Self {
        self.unified_memory = unified_memory;
        self
    }
}

// ============================================================================
// Module / Instance / Gpu / Device
// ============================================================================

/// Built-in module creating [`DummyInstance`]s.
#[derive(Debug, Default)]
pub struct DummyModule {
    parameters: DummyParameters,
}

impl DummyModule {
    pub fn new(parameters: DummyParameters) -> Self {
        Self { parameters }
    }
}

impl BackendModule for DummyModule {
    fn rhi_type(&self) -> RhiType {
        RhiType::Dummy
    }

    fn module_name(&self) -> &str {
        "dummy"
    }

    fn create_instance(&self, parameters: &InstanceParameters) -> Option<Box<dyn InstanceBackend>> {
        Some(Box::new(
            DummyInstance::new(self.parameters.clone()).with_validation(parameters.validation),
        ))
    }
}

/// Dummy instance that performs no GPU operations.
#[derive(Debug)]
pub struct DummyInstance {
    parameters: DummyParameters,
    validation: bool,
}

impl DummyInstance {
    /// Create a new dummy instance with validation disabled.
    pub fn new(parameters: DummyParameters) -> Self {
        log::trace!("DummyInstance: created with {:?}", parameters);
        Self {
            parameters,
            validation: false,
        }
    }

    /// Report redundant barriers and empty submissions as debug messages.
    pub fn with_validation(mut self, validation: bool) -> Self {
        self.validation = validation;
        self
    }
}

impl InstanceBackend for DummyInstance {
    fn rhi_type(&self) -> RhiType {
        RhiType::Dummy
    }

    fn enumerate_gpus(&self) -> Vec<Box<dyn GpuBackend>> {
        (0..self.parameters.gpu_count)
            .map(|index| {
                Box::new(DummyGpu {
                    index,
                    parameters: self.parameters.clone(),
                    validation: self.validation,
                }) as Box<dyn GpuBackend>
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct DummyGpu {
    index: u32,
    parameters: DummyParameters,
    validation: bool,
}

impl GpuBackend for DummyGpu {
    fn property(&self) -> GpuProperty {
        GpuProperty {
            vendor_id: 0,
            device_id: self.index,
            kind: GpuType::Software,
            name: format!("Dummy GPU {}", self.index),
        }
    }

    fn queue_capacity(&self, _queue_type: QueueType) -> u8 {
        self.parameters.queues_per_type
    }

    fn request_device(
        &self,
        queue_requests: &[(QueueType, u8)],
    ) -> RhiResult<Box<dyn DeviceBackend>> {
        log::trace!(
            "DummyGpu {}: creating device with queues {:?}",
            self.index,
            queue_requests
        );
        Ok(Box::new(DummyDevice {
            unified_memory: self.parameters.unified_memory,
            validation: self.validation,
        }))
    }
}

#[derive(Debug)]
pub struct DummyDevice {
    unified_memory: bool,
    validation: bool,
}

impl DeviceBackend for DummyDevice {
    fn create_queue(&self, queue_type: QueueType, index: u8) -> Box<dyn QueueBackend> {
        log::trace!("DummyDevice: creating queue {:?}[{}]", queue_type, index);
        Box::new(DummyQueue {
            queue_type,
            index,
            validation: self.validation,
        })
    }

    fn create_buffer(&self, info: &BufferCreateInfo) -> RhiResult<Box<dyn BufferBackend>> {
        log::trace!(
            "DummyDevice: creating buffer {:?} (size: {})",
            info.label,
            info.size
        );
        let size = usize::try_from(info.size).map_err(|_| {
            crate::error::RhiError::ResourceCreationFailed(format!(
                "buffer size {} exceeds the host address space",
                info.size
            ))
        })?;
        Ok(Box::new(DummyBuffer {
            memory: Arc::new(DummyMemory::new(size)),
            host_visible: info.usages.is_mappable() || self.unified_memory,
        }))
    }

    fn create_texture(&self, info: &TextureCreateInfo) -> RhiResult<Box<dyn TextureBackend>> {
        log::trace!(
            "DummyDevice: creating texture {:?} ({}x{}x{}, {:?})",
            info.label,
            info.extent.width,
            info.extent.height,
            info.extent.depth,
            info.format
        );
        Ok(Box::new(DummyTexture {
            format: info.format,
        }))
    }

    fn create_sampler(&self, info: &SamplerCreateInfo) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!("DummyDevice: creating sampler {:?}", info);
        Ok(DummyObject::boxed("sampler"))
    }

    fn create_bind_group_layout(
        &self,
        info: &BindGroupLayoutCreateInfo,
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!(
            "DummyDevice: creating bind group layout {} ({} entries)",
            info.layout_index,
            info.entries.len()
        );
        Ok(DummyObject::boxed("bind group layout"))
    }

    fn create_bind_group(
        &self,
        _layout: &dyn BackendObject,
        entries: &[RawBindGroupEntry<'_>],
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!("DummyDevice: creating bind group ({} entries)", entries.len());
        Ok(DummyObject::boxed("bind group"))
    }

    fn create_pipeline_layout(
        &self,
        bind_group_layouts: &[&dyn BackendObject],
        constant_layouts: &[PipelineConstantLayout],
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!(
            "DummyDevice: creating pipeline layout ({} groups, {} constant ranges)",
            bind_group_layouts.len(),
            constant_layouts.len()
        );
        Ok(DummyObject::boxed("pipeline layout"))
    }

    fn create_shader_module(
        &self,
        info: &ShaderModuleCreateInfo,
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!(
            "DummyDevice: creating shader module {:?} ({} bytes)",
            info.entry_point,
            info.byte_code.len()
        );
        Ok(DummyObject::boxed("shader module"))
    }

    fn create_compute_pipeline(
        &self,
        desc: &RawComputePipelineDesc<'_>,
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!("DummyDevice: creating compute pipeline {:?}", desc.label);
        Ok(DummyObject::boxed("compute pipeline"))
    }

    fn create_raster_pipeline(
        &self,
        desc: &RawRasterPipelineDesc<'_>,
    ) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!(
            "DummyDevice: creating raster pipeline {:?} ({} color targets)",
            desc.label,
            desc.fragment_state.color_targets.len()
        );
        Ok(DummyObject::boxed("raster pipeline"))
    }

    fn create_command_buffer(&self) -> RhiResult<Box<dyn CommandBufferBackend>> {
        Ok(Box::new(DummyCommandBuffer {
            copies: Vec::new(),
            command_count: 0,
            validation: self.validation,
        }))
    }

    fn create_fence(&self, signaled: bool) -> RhiResult<Box<dyn FenceBackend>> {
        Ok(Box::new(DummyFence {
            signaled: AtomicBool::new(signaled),
        }))
    }

    fn create_semaphore(&self) -> RhiResult<Box<dyn SemaphoreBackend>> {
        Ok(Box::new(DummySemaphore::default()))
    }

    fn create_surface(&self, info: &SurfaceCreateInfo) -> RhiResult<Box<dyn SurfaceBackend>> {
        log::trace!("DummyDevice: creating surface for {:?}", info.window);
        Ok(Box::new(DummySurface))
    }

    fn create_swap_chain(
        &self,
        _present_queue: &dyn QueueBackend,
        _surface: &dyn SurfaceBackend,
        desc: &RawSwapChainDesc,
    ) -> RhiResult<Box<dyn SwapChainBackend>> {
        log::trace!(
            "DummyDevice: creating swapchain {}x{} ({} textures, {:?})",
            desc.extent.width,
            desc.extent.height,
            desc.texture_count,
            desc.present_mode
        );
        let textures = (0..desc.texture_count)
            .map(|_| {
                Box::new(DummyTexture {
                    format: desc.format,
                }) as Box<dyn TextureBackend>
            })
            .collect();
        Ok(Box::new(DummySwapChain {
            textures,
            texture_count: desc.texture_count,
            next: 0,
            present_count: 0,
        }))
    }

    fn check_swap_chain_format_support(
        &self,
        _surface: &dyn SurfaceBackend,
        format: PixelFormat,
    ) -> bool {
        PRESENTABLE_FORMATS.contains(&format)
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Host memory backing a dummy buffer.
///
/// The allocation never moves, so pointers handed out by `map` stay valid
/// after the lock is released.
#[derive(Debug)]
struct DummyMemory {
    bytes: Mutex<Box<[u8]>>,
    mapped: AtomicBool,
}

impl DummyMemory {
    fn new(size: usize) -> Self {
        Self {
            bytes: Mutex::new(vec![0u8; size].into_boxed_slice()),
            mapped: AtomicBool::new(false),
        }
    }
}

#[derive(Debug)]
pub struct DummyBuffer {
    memory: Arc<DummyMemory>,
    host_visible: bool,
}

impl DummyBuffer {
    /// Snapshot of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.memory.bytes.lock().to_vec()
    }
}

impl BufferBackend for DummyBuffer {
    fn is_host_visible(&self) -> bool {
        self.host_visible
    }

    fn map(&self, mode: MapMode, offset: u64, length: u64) -> NonNull<u8> {
        log::trace!("DummyBuffer: map {:?} [{}, {})", mode, offset, offset + length);

        // The flag flips under the lock so queued copies observe it.
        let mut bytes = self.memory.bytes.lock();
        let was_mapped = self.memory.mapped.swap(true, Ordering::AcqRel);
        debug_assert!(!was_mapped, "DummyBuffer: mapped twice");
        // Offsets are validated against the size, which fits in usize.
        NonNull::from(&mut bytes[offset as usize..]).cast::<u8>()
    }

    fn unmap(&self) {
        self.memory.mapped.store(false, Ordering::Release);
    }

    fn create_view(&self, info: &BufferViewCreateInfo) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!("DummyBuffer: creating view {:?}", info.view_type);
        Ok(DummyObject::boxed("buffer view"))
    }
}

#[derive(Debug)]
pub struct DummyTexture {
    format: PixelFormat,
}

impl TextureBackend for DummyTexture {
    fn create_view(&self, info: &TextureViewCreateInfo) -> RhiResult<Box<dyn BackendObject>> {
        log::trace!(
            "DummyTexture: creating {:?} view of {:?}",
            info.view_type,
            self.format
        );
        Ok(DummyObject::boxed("texture view"))
    }
}

/// Backend object without behavior: views, samplers, layouts, bind groups,
/// shader modules and pipelines.
#[derive(Debug)]
pub struct DummyObject {
    kind: &'static str,
}

impl DummyObject {
    fn boxed(kind: &'static str) -> Box<dyn BackendObject> {
        Box::new(Self { kind })
    }

    /// What the object stands for.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug)]
struct DummyCopy {
    src: Arc<DummyMemory>,
    dst: Arc<DummyMemory>,
    info: BufferCopyInfo,
}

impl DummyCopy {
    fn execute(&self) {
        let src = self.info.src_offset as usize;
        let dst = self.info.dst_offset as usize;
        let len = self.info.copy_size as usize;

        if Arc::ptr_eq(&self.src, &self.dst) {
            let mut bytes = self.dst.bytes.lock();
            Self::assert_unmapped(&self.dst, "source and destination");
            bytes.copy_within(src..src + len, dst);
            return;
        }

        // Stage through a temporary so two buffers are never locked at once.
        let staged = {
            let bytes = self.src.bytes.lock();
            Self::assert_unmapped(&self.src, "source");
            bytes[src..src + len].to_vec()
        };
        let mut bytes = self.dst.bytes.lock();
        Self::assert_unmapped(&self.dst, "destination");
        bytes[dst..dst + len].copy_from_slice(&staged);
    }

    /// Host and device access to one buffer must not overlap. Called with the
    /// memory lock held.
    fn assert_unmapped(memory: &DummyMemory, role: &str) {
        assert!(
            !memory.mapped.load(Ordering::Acquire),
            "Queue::submit: copy {role} buffer is mapped on the host; unmap it before submitting"
        );
    }
}

#[derive(Debug)]
pub struct DummyCommandBuffer {
    copies: Vec<DummyCopy>,
    command_count: usize,
    validation: bool,
}

impl DummyCommandBuffer {
    /// Number of commands recorded since the last `begin`.
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    fn memory_of(buffer: &dyn BufferBackend) -> Option<Arc<DummyMemory>> {
        buffer
            .as_any()
            .downcast_ref::<DummyBuffer>()
            .map(|buffer| Arc::clone(&buffer.memory))
    }

    fn warn(&self, message: &str) {
        if self.validation {
            report_debug_message(RhiType::Dummy, DebugMessageSeverity::Warning, message);
        }
    }
}

impl CommandBufferBackend for DummyCommandBuffer {
    fn begin(&mut self) {
        self.copies.clear();
        self.command_count = 0;
    }

    fn record(&mut self, command: Command<'_>) {
        self.command_count += 1;
        match command {
            Command::BufferBarrier { before, after, .. } if before == after => {
                self.warn(&format!("redundant buffer barrier {before:?} -> {after:?}"));
            }
            Command::TextureBarrier { before, after, .. } if before == after => {
                self.warn(&format!("redundant texture barrier {before:?} -> {after:?}"));
            }
            Command::CopyBufferToBuffer { src, dst, info } => {
                match (Self::memory_of(src), Self::memory_of(dst)) {
                    (Some(src), Some(dst)) => self.copies.push(DummyCopy { src, dst, info }),
                    _ => log::error!("DummyCommandBuffer: copy between foreign buffers ignored"),
                }
            }
            Command::Dispatch { x, y, z } => {
                log::trace!("DummyCommandBuffer: dispatch {}x{}x{}", x, y, z);
            }
            Command::Draw { vertex_count, instance_count, .. } => {
                log::trace!(
                    "DummyCommandBuffer: draw {} vertices x {} instances",
                    vertex_count,
                    instance_count
                );
            }
            Command::DrawIndexed { index_count, instance_count, .. } => {
                log::trace!(
                    "DummyCommandBuffer: draw {} indices x {} instances",
                    index_count,
                    instance_count
                );
            }
            _ => {}
        }
    }

    fn end(&mut self) {
        log::trace!(
            "DummyCommandBuffer: recorded {} commands ({} buffer copies)",
            self.command_count,
            self.copies.len()
        );
    }
}

// ============================================================================
// Submission / Synchronization / Presentation
// ============================================================================

#[derive(Debug)]
pub struct DummyQueue {
    queue_type: QueueType,
    index: u8,
    validation: bool,
}

impl DummyQueue {
    fn signal_fence(fence: &dyn FenceBackend) {
        match fence.as_any().downcast_ref::<DummyFence>() {
            Some(fence) => fence.signaled.store(true, Ordering::Release),
            None => log::error!("DummyQueue: cannot signal a foreign fence"),
        }
    }
}

impl QueueBackend for DummyQueue {
    fn submit(&self, command_buffer: &dyn CommandBufferBackend, info: &RawSubmitInfo<'_>) {
        let Some(command_buffer) = command_buffer
            .as_any()
            .downcast_ref::<DummyCommandBuffer>()
        else {
            log::error!("DummyQueue: cannot execute a foreign command buffer");
            return;
        };

        log::trace!(
            "DummyQueue {:?}[{}]: executing {} commands",
            self.queue_type,
            self.index,
            command_buffer.command_count
        );
        if self.validation && command_buffer.command_count == 0 {
            report_debug_message(
                RhiType::Dummy,
                DebugMessageSeverity::Verbose,
                "submitted an empty command buffer",
            );
        }

        for copy in &command_buffer.copies {
            copy.execute();
        }

        for semaphore in info.signal_semaphores {
            if let Some(semaphore) = semaphore.as_any().downcast_ref::<DummySemaphore>() {
                semaphore.signal();
            }
        }

        // Work completes immediately, so the fence is signaled right away.
        if let Some(fence) = info.signal_fence {
            Self::signal_fence(fence);
        }
    }

    fn flush(&self, fence: &dyn FenceBackend) {
        Self::signal_fence(fence);
    }
}

#[derive(Debug)]
pub struct DummyFence {
    signaled: AtomicBool,
}

impl FenceBackend for DummyFence {
    fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    fn wait(&self) {
        while !self.signaled.load(Ordering::Acquire) {
            std::thread::yield_now();
        }
    }

    fn reset(&self) {
        self.signaled.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct DummySemaphore {
    signal_count: AtomicU64,
}

impl DummySemaphore {
    fn signal(&self) {
        self.signal_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of times the semaphore was signaled.
    pub fn signal_count(&self) -> u64 {
        self.signal_count.load(Ordering::Acquire)
    }
}

impl SemaphoreBackend for DummySemaphore {}

#[derive(Debug)]
pub struct DummySurface;

impl SurfaceBackend for DummySurface {}

#[derive(Debug)]
pub struct DummySwapChain {
    textures: Vec<Box<dyn TextureBackend>>,
    texture_count: u8,
    next: u8,
    present_count: u64,
}

impl DummySwapChain {
    /// Number of completed presents.
    pub fn present_count(&self) -> u64 {
        self.present_count
    }
}

impl SwapChainBackend for DummySwapChain {
    fn take_textures(&mut self) -> Vec<Box<dyn TextureBackend>> {
        std::mem::take(&mut self.textures)
    }

    fn acquire_back_texture(&mut self, signal: &dyn SemaphoreBackend) -> u8 {
        let index = self.next;
        self.next = (self.next + 1) % self.texture_count;
        if let Some(signal) = signal.as_any().downcast_ref::<DummySemaphore>() {
            signal.signal();
        }
        index
    }

    fn present(&mut self, _wait: &dyn SemaphoreBackend) {
        self.present_count += 1;
    }
}

macro_rules! impl_backend_object {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BackendObject for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

impl_backend_object!(
    DummyInstance,
    DummyGpu,
    DummyDevice,
    DummyBuffer,
    DummyTexture,
    DummyObject,
    DummyCommandBuffer,
    DummyQueue,
    DummyFence,
    DummySemaphore,
    DummySurface,
    DummySwapChain,
);
