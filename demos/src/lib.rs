//! # RedLilium RHI Demos
//!
//! Headless programs driving the RHI end to end.
//!
//! ## Available Demos
//!
//! - `triangle` - swapchain frame loop drawing one triangle
//! - `parallel_compute` - commands recorded on several threads, chained across queues

pub mod args;

use std::sync::Arc;

use raw_window_handle::{RawWindowHandle, WebWindowHandle};
use redlilium_rhi::{
    Device, DeviceCreateInfo, Instance, InstanceParameters, QueueType, RhiError, RhiResult,
    set_instance_parameters,
};

pub use args::{CliBackend, CommonArgs};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the logger. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Window handle standing in for a real window in headless runs.
pub fn headless_window() -> RawWindowHandle {
    RawWindowHandle::Web(WebWindowHandle::new(1))
}

/// Loaded instance and the device created on its first GPU.
pub struct DemoContext {
    pub instance: Arc<Instance>,
    pub device: Device,
}

impl DemoContext {
    /// Load the backend chosen by `args` and create a device with `queues`.
    ///
    /// Queue counts are clamped to what the GPU exposes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be loaded, exposes no GPU, or
    /// refuses to create the device.
    pub fn new(args: &CommonArgs, queues: &[(QueueType, u8)]) -> RhiResult<Self> {
        let mut parameters = InstanceParameters::from_env()
            .with_validation(args.validation())
            .with_application_name("RedLilium RHI demo");
        if let Some(kind) = args.backend.rhi_type() {
            parameters = parameters.with_backend(kind);
        }
        set_instance_parameters(parameters);

        let instance = Instance::get_by_platform().ok_or_else(|| {
            RhiError::InitializationFailed(format!(
                "backend {:?} is not available in this build",
                args.backend
            ))
        })?;
        let gpu = instance.gpu(0).ok_or_else(|| {
            RhiError::InitializationFailed(format!("{} exposes no GPU", instance.rhi_type()))
        })?;
        log::info!("Using {} GPU '{}'", instance.rhi_type(), gpu.property().name);

        let mut info = DeviceCreateInfo::new();
        for &(queue_type, count) in queues {
            let count = count.min(gpu.queue_capacity(queue_type));
            if count > 0 {
                info = info.with_queue_request(queue_type, count);
            }
        }
        let device = gpu.request_device(&info)?;

        Ok(Self { instance, device })
    }
}
