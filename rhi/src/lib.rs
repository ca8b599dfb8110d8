//! # RedLilium RHI
//!
//! Backend-agnostic render hardware interface for RedLilium.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Instance`] / [`Gpu`] / [`Device`] - backend loading, adapter enumeration and device creation
//! - [`Buffer`], [`Texture`], [`Sampler`] and their views - GPU resources
//! - [`BindGroupLayout`], [`BindGroup`], [`PipelineLayout`] - resource binding
//! - [`ComputePipeline`], [`RasterPipeline`], [`PipelineCache`] - pipeline state
//! - [`CommandBuffer`] with typed pass recorders - command recording
//! - [`Queue`], [`Fence`], [`Semaphore`], [`Barrier`] - submission and synchronization
//! - [`Surface`], [`SwapChain`] - presentation
//! - [`backend`] - the seam native backends implement; a Dummy backend ships built in
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_rhi::*;
//!
//! let instance = Instance::get_by_type(RhiType::Dummy).expect("dummy backend");
//! let device = instance.gpu(0).expect("no gpu").request_device(
//!     &DeviceCreateInfo::new().with_queue_request(QueueType::Graphics, 1),
//! )?;
//! let queue = device.queue(QueueType::Graphics, 0).expect("no queue");
//!
//! let mut command_buffer = device.create_command_buffer()?;
//! {
//!     let mut recorder = command_buffer.begin();
//!     let mut pass = recorder.begin_copy_pass();
//!     pass.copy_buffer_to_buffer(&src, &dst, BufferCopyInfo::new(0, 0, 256));
//! }
//! let fence = device.create_fence(false)?;
//! queue.submit(&command_buffer, &QueueSubmitInfo::new().with_signal_fence(&fence));
//! fence.wait();
//! ```

pub mod backend;
pub mod binding;
pub mod command;
pub mod config;
pub mod debug;
pub mod device;
pub mod error;
pub mod instance;
pub mod module;
pub mod pipeline;
pub mod queue;
pub mod resources;
pub mod swapchain;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use backend::BackendObject;
pub use binding::{
    BindGroup, BindGroupCreateInfo, BindGroupEntry, BindGroupLayout, BindingResource,
    PipelineLayout, PipelineLayoutCreateInfo,
};
pub use command::{
    ColorAttachment, CommandBuffer, CommandBufferState, CommandRecorder, ComputePassRecorder,
    CopyPassRecorder, DepthStencilAttachment, RasterPassBeginInfo, RasterPassRecorder,
};
pub use config::{BACKEND_ENV_VAR, InstanceParameters, VALIDATION_ENV_VAR};
pub use debug::{
    DebugMessage, DebugMessageSeverity, clear_debug_callback, report_debug_message,
    set_debug_callback,
};
pub use device::{Device, DeviceCreateInfo, QueueRequestInfo};
pub use error::{RhiError, RhiResult};
pub use instance::{Gpu, GpuProperty, Instance};
pub use module::{
    BackendModule, instance_parameters, is_instance_loaded, is_module_registered,
    register_backend_module, set_instance_parameters,
};
pub use pipeline::{
    ComputePipeline, ComputePipelineCreateInfo, PipelineCache, RasterPipeline,
    RasterPipelineCreateInfo, ShaderModule,
};
pub use queue::{Queue, QueueSubmitInfo};
pub use resources::{Buffer, BufferView, MappedRange, Sampler, Texture, TextureView};
pub use swapchain::{MAX_SWAP_CHAIN_TEXTURES, Surface, SwapChain, SwapChainCreateInfo};
pub use sync::{Barrier, BarrierResource, Fence, FenceStatus, Semaphore};
pub use types::*;

/// RHI library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(all(test, feature = "dummy"))]
pub(crate) mod test_support {
    use raw_window_handle::{RawWindowHandle, WebWindowHandle};

    use crate::backend::dummy::{DummyInstance, DummyParameters};
    use crate::{Device, DeviceCreateInfo, Instance, InstanceParameters, QueueType};

    /// A dummy device with one queue of every type.
    ///
    /// Built from a private instance so tests never share registry state.
    pub(crate) fn dummy_device() -> Device {
        let instance = Instance::new(
            Box::new(DummyInstance::new(DummyParameters::default())),
            InstanceParameters::new().with_validation(false),
        );
        let gpu = instance.gpu(0).expect("dummy instance has a gpu");
        gpu.request_device(
            &DeviceCreateInfo::new()
                .with_queue_request(QueueType::Graphics, 1)
                .with_queue_request(QueueType::Compute, 1)
                .with_queue_request(QueueType::Transfer, 1),
        )
        .expect("dummy device")
    }

    /// A window handle the dummy backend accepts.
    pub(crate) fn dummy_window() -> RawWindowHandle {
        RawWindowHandle::Web(WebWindowHandle::new(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
