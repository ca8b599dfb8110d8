//! Backend instance and GPU enumeration.
//!
//! An [`Instance`] is obtained from the module loader with
//! [`Instance::get_by_type`] or [`Instance::get_by_platform`]. It enumerates
//! its [`Gpu`]s once at load time; a [`Gpu`] creates [`Device`]s.

use std::fmt;
use std::sync::Arc;

use crate::backend::{GpuBackend, InstanceBackend};
use crate::config::InstanceParameters;
use crate::device::{Device, DeviceCreateInfo};
use crate::error::{RhiError, RhiResult};
use crate::module;
use crate::types::{GpuType, QueueType, RhiType};

/// Identification of a physical GPU.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GpuProperty {
    /// PCI vendor id.
    pub vendor_id: u32,
    /// PCI device id.
    pub device_id: u32,
    /// Hardware or software adapter.
    pub kind: GpuType,
    /// Driver-reported adapter name.
    pub name: String,
}

/// A loaded backend instance.
///
/// # Thread Safety
///
/// `Instance` is `Send + Sync`; the module loader hands out one shared
/// `Arc<Instance>` per backend kind.
///
/// # Example
///
/// ```ignore
/// let instance = Instance::get_by_type(RhiType::Dummy).expect("dummy backend");
/// let gpu = instance.gpu(0).expect("no gpu");
/// let device = gpu.request_device(
///     &DeviceCreateInfo::new().with_queue_request(QueueType::Graphics, 1),
/// )?;
/// ```
pub struct Instance {
    rhi_type: RhiType,
    parameters: InstanceParameters,
    gpus: Vec<Gpu>,
    // Declared last so GPUs drop before the instance they came from.
    raw: Box<dyn InstanceBackend>,
}

impl Instance {
    /// Wrap a backend instance. Used by the module loader and by tests that
    /// need a custom-configured backend.
    pub fn new(raw: Box<dyn InstanceBackend>, parameters: InstanceParameters) -> Self {
        let rhi_type = raw.rhi_type();
        let gpus: Vec<Gpu> = raw
            .enumerate_gpus()
            .into_iter()
            .map(|gpu| Gpu::new(gpu, rhi_type, parameters.validation))
            .collect();

        log::info!("Created {rhi_type} instance with {} GPU(s)", gpus.len());
        for (index, gpu) in gpus.iter().enumerate() {
            log::debug!(
                "  GPU {index}: {} ({:?}, vendor={:#06x}, device={:#06x})",
                gpu.property.name,
                gpu.property.kind,
                gpu.property.vendor_id,
                gpu.property.device_id
            );
        }

        Self {
            rhi_type,
            parameters,
            gpus,
            raw,
        }
    }

    /// Load (once per process) and return the instance of `kind`.
    ///
    /// Returns `None` if no module is registered for `kind` or the module
    /// cannot create an instance on this machine.
    pub fn get_by_type(kind: RhiType) -> Option<Arc<Instance>> {
        module::load_instance(kind)
    }

    /// Load the platform default backend, or the configured override.
    pub fn get_by_platform() -> Option<Arc<Instance>> {
        module::load_instance(module::instance_parameters().platform_backend())
    }

    /// Drop the cached instance of `kind`. Returns whether one was loaded.
    ///
    /// Outstanding `Arc`s keep the instance alive; the next
    /// [`get_by_type`](Self::get_by_type) loads a fresh one.
    pub fn unload_by_type(kind: RhiType) -> bool {
        module::unload_instance(kind)
    }

    /// Drop every cached instance.
    pub fn unload_all_instances() {
        module::unload_all();
    }

    /// The backend kind.
    pub fn rhi_type(&self) -> RhiType {
        self.rhi_type
    }

    /// The parameters the instance was created with.
    pub fn parameters(&self) -> &InstanceParameters {
        &self.parameters
    }

    /// Number of GPUs.
    pub fn gpu_count(&self) -> usize {
        self.gpus.len()
    }

    /// GPU at `index`.
    pub fn gpu(&self, index: usize) -> Option<&Gpu> {
        self.gpus.get(index)
    }

    /// All GPUs.
    pub fn gpus(&self) -> &[Gpu] {
        &self.gpus
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("rhi_type", &self.rhi_type)
            .field("gpu_count", &self.gpus.len())
            .field("raw", &self.raw)
            .finish()
    }
}

/// A physical GPU.
pub struct Gpu {
    raw: Box<dyn GpuBackend>,
    property: GpuProperty,
    rhi_type: RhiType,
    validation: bool,
}

impl Gpu {
    fn new(raw: Box<dyn GpuBackend>, rhi_type: RhiType, validation: bool) -> Self {
        let property = raw.property();
        Self {
            raw,
            property,
            rhi_type,
            validation,
        }
    }

    /// Identification of the GPU.
    pub fn property(&self) -> &GpuProperty {
        &self.property
    }

    /// Number of queues of `queue_type` a device can create.
    pub fn queue_capacity(&self, queue_type: QueueType) -> u8 {
        self.raw.queue_capacity(queue_type)
    }

    /// Create a logical device with every requested queue.
    ///
    /// # Errors
    ///
    /// Returns an error if a queue type is requested twice or with a zero
    /// count, if more queues are requested than the GPU exposes, or if the
    /// driver fails to create the device.
    pub fn request_device(&self, info: &DeviceCreateInfo) -> RhiResult<Device> {
        let mut requests = Vec::with_capacity(info.queue_requests.len());
        for request in &info.queue_requests {
            if request.count == 0 {
                return Err(RhiError::InvalidParameter(format!(
                    "queue request for {:?} has a zero count",
                    request.queue_type
                )));
            }
            if requests.iter().any(|(ty, _)| *ty == request.queue_type) {
                return Err(RhiError::InvalidParameter(format!(
                    "{:?} queues requested more than once",
                    request.queue_type
                )));
            }

            let available = self.raw.queue_capacity(request.queue_type);
            if request.count > available {
                return Err(RhiError::QueueUnavailable {
                    queue_type: request.queue_type,
                    requested: request.count,
                    available,
                });
            }
            requests.push((request.queue_type, request.count));
        }

        let raw = self.raw.request_device(&requests)?;
        let device = Device::new(raw, self.rhi_type, self.validation, &requests);

        log::info!(
            "Created device on '{}' with queues {:?}",
            self.property.name,
            requests
        );
        Ok(device)
    }
}

impl fmt::Debug for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gpu")
            .field("property", &self.property)
            .field("rhi_type", &self.rhi_type)
            .finish()
    }
}

static_assertions::assert_impl_all!(Instance: Send, Sync);
static_assertions::assert_impl_all!(Gpu: Send, Sync);
