//! Backend seam of the RHI.
//!
//! Every abstraction has its own backend trait. A backend module provides one
//! implementing type per trait; the frontend types in this crate hold them as
//! boxed trait objects and perform all shared validation before calling in,
//! so backends only translate already-validated requests.
//!
//! Passive objects (views, samplers, layouts, bind groups, shader modules and
//! pipelines) are plain [`BackendObject`]s that backends downcast when they
//! are referenced again.

#[cfg(feature = "dummy")]
pub mod dummy;

use std::any::Any;
use std::fmt;
use std::ptr::NonNull;

use crate::error::RhiResult;
use crate::instance::GpuProperty;
use crate::types::{
    BufferCopyInfo, BufferCreateInfo, BufferState, BufferTextureCopyInfo, BufferViewCreateInfo,
    ClearColor, DepthStencilState, Extent2d, FragmentState, LoadOp, MapMode,
    MultiSampleState, PipelineConstantLayout, PixelFormat, PresentMode, PrimitiveState,
    PrimitiveTopology, QueueType, ResourceBinding, RhiType, SamplerCreateInfo, ScissorRect,
    ShaderModuleCreateInfo, StoreOp, SurfaceCreateInfo, TextureCopyInfo, TextureCreateInfo,
    TextureState, TextureViewCreateInfo, VertexState, Viewport, BindGroupLayoutCreateInfo,
    BindingType,
};

/// Base trait of every backend object.
pub trait BackendObject: Send + Sync + fmt::Debug {
    /// Access the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Downcast a backend object to its concrete type.
pub fn downcast_ref<T: Any>(object: &dyn BackendObject) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}

// ============================================================================
// Instance / Gpu / Device
// ============================================================================

/// A loaded native API instance.
pub trait InstanceBackend: BackendObject {
    /// The API family.
    fn rhi_type(&self) -> RhiType;

    /// Enumerate the physical GPUs. Called once per instance.
    fn enumerate_gpus(&self) -> Vec<Box<dyn GpuBackend>>;
}

/// A physical GPU.
pub trait GpuBackend: BackendObject {
    /// Identification of the GPU.
    fn property(&self) -> GpuProperty;

    /// Number of queues of `queue_type` a device can create.
    fn queue_capacity(&self, queue_type: QueueType) -> u8;

    /// Create a logical device. Queue requests are already validated against
    /// [`queue_capacity`](Self::queue_capacity).
    fn request_device(
        &self,
        queue_requests: &[(QueueType, u8)],
    ) -> RhiResult<Box<dyn DeviceBackend>>;
}

/// Entry of a bind group as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawBindGroupEntry<'a> {
    pub binding_type: BindingType,
    pub binding: ResourceBinding,
    /// Sampler, texture view or buffer view backend object.
    pub resource: &'a dyn BackendObject,
}

/// Compute pipeline description as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawComputePipelineDesc<'a> {
    pub label: Option<&'a str>,
    pub layout: &'a dyn BackendObject,
    pub compute_shader: &'a dyn BackendObject,
}

/// Raster pipeline description as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawRasterPipelineDesc<'a> {
    pub label: Option<&'a str>,
    pub layout: &'a dyn BackendObject,
    pub vertex_shader: &'a dyn BackendObject,
    pub pixel_shader: Option<&'a dyn BackendObject>,
    pub geometry_shader: Option<&'a dyn BackendObject>,
    pub domain_shader: Option<&'a dyn BackendObject>,
    pub hull_shader: Option<&'a dyn BackendObject>,
    pub vertex_state: &'a VertexState,
    pub primitive_state: &'a PrimitiveState,
    pub depth_stencil_state: &'a DepthStencilState,
    pub multi_sample_state: &'a MultiSampleState,
    pub fragment_state: &'a FragmentState,
}

/// Swapchain parameters as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawSwapChainDesc {
    pub texture_count: u8,
    pub format: PixelFormat,
    pub extent: Extent2d,
    pub present_mode: PresentMode,
}

/// A logical device; factory of every other backend object.
pub trait DeviceBackend: BackendObject {
    /// Create queue `index` of `queue_type`. Called eagerly for every requested queue.
    fn create_queue(&self, queue_type: QueueType, index: u8) -> Box<dyn QueueBackend>;

    fn create_buffer(&self, info: &BufferCreateInfo) -> RhiResult<Box<dyn BufferBackend>>;

    fn create_texture(&self, info: &TextureCreateInfo) -> RhiResult<Box<dyn TextureBackend>>;

    fn create_sampler(&self, info: &SamplerCreateInfo) -> RhiResult<Box<dyn BackendObject>>;

    fn create_bind_group_layout(
        &self,
        info: &BindGroupLayoutCreateInfo,
    ) -> RhiResult<Box<dyn BackendObject>>;

    fn create_bind_group(
        &self,
        layout: &dyn BackendObject,
        entries: &[RawBindGroupEntry<'_>],
    ) -> RhiResult<Box<dyn BackendObject>>;

    fn create_pipeline_layout(
        &self,
        bind_group_layouts: &[&dyn BackendObject],
        constant_layouts: &[PipelineConstantLayout],
    ) -> RhiResult<Box<dyn BackendObject>>;

    fn create_shader_module(&self, info: &ShaderModuleCreateInfo)
    -> RhiResult<Box<dyn BackendObject>>;

    fn create_compute_pipeline(
        &self,
        desc: &RawComputePipelineDesc<'_>,
    ) -> RhiResult<Box<dyn BackendObject>>;

    fn create_raster_pipeline(
        &self,
        desc: &RawRasterPipelineDesc<'_>,
    ) -> RhiResult<Box<dyn BackendObject>>;

    fn create_command_buffer(&self) -> RhiResult<Box<dyn CommandBufferBackend>>;

    fn create_fence(&self, signaled: bool) -> RhiResult<Box<dyn FenceBackend>>;

    fn create_semaphore(&self) -> RhiResult<Box<dyn SemaphoreBackend>>;

    fn create_surface(&self, info: &SurfaceCreateInfo) -> RhiResult<Box<dyn SurfaceBackend>>;

    fn create_swap_chain(
        &self,
        present_queue: &dyn QueueBackend,
        surface: &dyn SurfaceBackend,
        desc: &RawSwapChainDesc,
    ) -> RhiResult<Box<dyn SwapChainBackend>>;

    /// Whether `surface` can present images of `format`.
    fn check_swap_chain_format_support(&self, surface: &dyn SurfaceBackend, format: PixelFormat)
    -> bool;
}

// ============================================================================
// Resources
// ============================================================================

/// A buffer allocation.
pub trait BufferBackend: BackendObject {
    /// Whether the allocation can be mapped by the host.
    fn is_host_visible(&self) -> bool;

    /// Map `length` bytes at `offset`.
    ///
    /// The returned pointer stays valid until [`unmap`](Self::unmap). The
    /// range is already validated against the buffer size and host visibility.
    fn map(&self, mode: MapMode, offset: u64, length: u64) -> NonNull<u8>;

    /// End the current mapping.
    fn unmap(&self);

    fn create_view(&self, info: &BufferViewCreateInfo) -> RhiResult<Box<dyn BackendObject>>;
}

/// A texture allocation.
pub trait TextureBackend: BackendObject {
    fn create_view(&self, info: &TextureViewCreateInfo) -> RhiResult<Box<dyn BackendObject>>;
}

// ============================================================================
// Commands
// ============================================================================

/// Color attachment of a raster pass as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawColorAttachment<'a> {
    pub view: &'a dyn BackendObject,
    pub resolve_view: Option<&'a dyn BackendObject>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearColor,
}

/// Depth/stencil attachment of a raster pass as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawDepthStencilAttachment<'a> {
    pub view: &'a dyn BackendObject,
    pub depth_read_only: bool,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub depth_clear_value: f32,
    pub stencil_read_only: bool,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub stencil_clear_value: u32,
}

/// One recorded command, forwarded to the backend as soon as it is recorded.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    BufferBarrier {
        buffer: &'a dyn BufferBackend,
        before: BufferState,
        after: BufferState,
    },
    TextureBarrier {
        texture: &'a dyn TextureBackend,
        before: TextureState,
        after: TextureState,
    },

    BeginCopyPass,
    CopyBufferToBuffer {
        src: &'a dyn BufferBackend,
        dst: &'a dyn BufferBackend,
        info: BufferCopyInfo,
    },
    CopyBufferToTexture {
        src: &'a dyn BufferBackend,
        dst: &'a dyn TextureBackend,
        info: BufferTextureCopyInfo,
    },
    CopyTextureToBuffer {
        src: &'a dyn TextureBackend,
        dst: &'a dyn BufferBackend,
        info: BufferTextureCopyInfo,
    },
    CopyTextureToTexture {
        src: &'a dyn TextureBackend,
        dst: &'a dyn TextureBackend,
        info: TextureCopyInfo,
    },

    BeginComputePass,
    SetComputePipeline(&'a dyn BackendObject),
    Dispatch {
        x: u32,
        y: u32,
        z: u32,
    },

    BeginRasterPass {
        color_attachments: &'a [RawColorAttachment<'a>],
        depth_stencil_attachment: Option<RawDepthStencilAttachment<'a>>,
    },
    SetRasterPipeline(&'a dyn BackendObject),
    SetIndexBuffer(&'a dyn BackendObject),
    SetVertexBuffer {
        slot: u8,
        view: &'a dyn BackendObject,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    },
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    SetPrimitiveTopology(PrimitiveTopology),
    SetBlendConstant(ClearColor),
    SetStencilReference(u32),

    /// Valid in compute and raster passes.
    SetBindGroup {
        layout_index: u8,
        group: &'a dyn BackendObject,
    },
    EndPass,
}

/// A command buffer being recorded or ready for submission.
pub trait CommandBufferBackend: BackendObject {
    /// Reset and start recording.
    fn begin(&mut self);

    fn record(&mut self, command: Command<'_>);

    /// Finish recording.
    fn end(&mut self);
}

// ============================================================================
// Submission / Synchronization / Presentation
// ============================================================================

/// Submission parameters as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct RawSubmitInfo<'a> {
    pub wait_semaphores: &'a [&'a dyn SemaphoreBackend],
    pub signal_semaphores: &'a [&'a dyn SemaphoreBackend],
    pub signal_fence: Option<&'a dyn FenceBackend>,
}

/// A submission queue.
pub trait QueueBackend: BackendObject {
    fn submit(&self, command_buffer: &dyn CommandBufferBackend, info: &RawSubmitInfo<'_>);

    /// Signal `fence` once all previously submitted work completed.
    fn flush(&self, fence: &dyn FenceBackend);
}

/// CPU-observable signal.
pub trait FenceBackend: BackendObject {
    fn is_signaled(&self) -> bool;

    /// Block until signaled.
    fn wait(&self);

    fn reset(&self);
}

/// GPU-only signal.
pub trait SemaphoreBackend: BackendObject {}

/// A presentation target.
pub trait SurfaceBackend: BackendObject {}

/// A ring of presentable textures.
pub trait SwapChainBackend: BackendObject {
    /// Hand over the presentable textures. Called once, right after creation.
    fn take_textures(&mut self) -> Vec<Box<dyn TextureBackend>>;

    /// Index of the next presentable texture; `signal` fires once it is available.
    fn acquire_back_texture(&mut self, signal: &dyn SemaphoreBackend) -> u8;

    /// Present the acquired texture after `wait` fires.
    fn present(&mut self, wait: &dyn SemaphoreBackend);
}
