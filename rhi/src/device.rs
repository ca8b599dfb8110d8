//! Logical device.
//!
//! The [`Device`] is the factory of every GPU object. It is created by
//! [`Gpu::request_device`](crate::Gpu::request_device) together with all of
//! its queues.
//!
//! Objects are owned by the values the factories return. They do not borrow
//! the device, but must be destroyed (or dropped) before it.

use std::collections::BTreeMap;
use std::fmt;

use crate::backend::DeviceBackend;
use crate::binding::{
    BindGroup, BindGroupCreateInfo, BindGroupLayout, PipelineLayout, PipelineLayoutCreateInfo,
    validate_bind_group_layout,
};
use crate::command::CommandBuffer;
use crate::debug::{DebugMessageSeverity, report_debug_message};
use crate::error::{RhiError, RhiResult};
use crate::pipeline::{
    ComputePipeline, ComputePipelineCreateInfo, RasterPipeline, RasterPipelineCreateInfo,
    ShaderModule,
};
use crate::queue::Queue;
use crate::resources::{Buffer, Sampler, Texture, validate_texture_create_info};
use crate::swapchain::{Surface, SwapChain, SwapChainCreateInfo};
use crate::sync::{Fence, Semaphore};
use crate::types::{
    BindGroupLayoutCreateInfo, BufferCreateInfo, PixelFormat, QueueType, RhiType,
    SamplerCreateInfo, ShaderModuleCreateInfo, SurfaceCreateInfo, TextureCreateInfo,
    TextureUsage,
};

fn validate_sampler_create_info(info: &SamplerCreateInfo) -> RhiResult<()> {
    if info.lod_min_clamp > info.lod_max_clamp {
        return Err(RhiError::InvalidParameter(format!(
            "sampler {:?} LOD range [{}, {}] is inverted",
            info.label, info.lod_min_clamp, info.lod_max_clamp
        )));
    }
    if !(1..=16).contains(&info.max_anisotropy) {
        return Err(RhiError::InvalidParameter(format!(
            "sampler {:?} anisotropy {} outside 1..=16",
            info.label, info.max_anisotropy
        )));
    }
    Ok(())
}

/// Number of queues of one type requested from a GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueRequestInfo {
    pub queue_type: QueueType,
    pub count: u8,
}

/// Create info for a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCreateInfo {
    /// At most one request per queue type.
    pub queue_requests: Vec<QueueRequestInfo>,
}

impl DeviceCreateInfo {
    /// Create a device create info without queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `count` queues of `queue_type`.
    pub fn with_queue_request(mut self, queue_type: QueueType, count: u8) -> Self {
        self.queue_requests.push(QueueRequestInfo { queue_type, count });
        self
    }
}

/// A logical device.
pub struct Device {
    rhi_type: RhiType,
    validation: bool,
    queues: BTreeMap<QueueType, Vec<Queue>>,
    // Declared last so queues drop before the device.
    raw: Box<dyn DeviceBackend>,
}

impl Device {
    pub(crate) fn new(
        raw: Box<dyn DeviceBackend>,
        rhi_type: RhiType,
        validation: bool,
        queue_requests: &[(QueueType, u8)],
    ) -> Self {
        let queues = queue_requests
            .iter()
            .map(|&(queue_type, count)| {
                let queues = (0..count)
                    .map(|index| Queue::new(raw.create_queue(queue_type, index), queue_type, index))
                    .collect();
                (queue_type, queues)
            })
            .collect();

        Self {
            rhi_type,
            validation,
            queues,
            raw,
        }
    }

    /// The backend kind.
    pub fn rhi_type(&self) -> RhiType {
        self.rhi_type
    }

    /// Whether backend validation reporting is enabled.
    pub fn is_validation_enabled(&self) -> bool {
        self.validation
    }

    /// Number of queues of `queue_type` the device was created with.
    pub fn queue_count(&self, queue_type: QueueType) -> u8 {
        self.queues
            .get(&queue_type)
            .map_or(0, |queues| queues.len() as u8)
    }

    /// Queue `index` of `queue_type`.
    pub fn queue(&self, queue_type: QueueType, index: u8) -> Option<&Queue> {
        self.queues.get(&queue_type)?.get(usize::from(index))
    }

    fn report(&self, error: &RhiError) {
        if self.validation {
            report_debug_message(self.rhi_type, DebugMessageSeverity::Error, &error.to_string());
        }
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Create a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero or the allocation fails.
    pub fn create_buffer(&self, info: &BufferCreateInfo) -> RhiResult<Buffer> {
        if info.size == 0 {
            let error =
                RhiError::InvalidParameter(format!("buffer {:?} size cannot be zero", info.label));
            self.report(&error);
            return Err(error);
        }
        let raw = self.raw.create_buffer(info)?;
        log::trace!("Device: created buffer {:?} ({} bytes)", info.label, info.size);
        Ok(Buffer::new(raw, info.clone()))
    }

    /// Create a texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the extent, mip count, sample count or format is
    /// invalid for the requested dimension and usage, or the allocation fails.
    pub fn create_texture(&self, info: &TextureCreateInfo) -> RhiResult<Texture> {
        validate_texture_create_info(info).inspect_err(|error| self.report(error))?;
        let raw = self.raw.create_texture(info)?;
        log::trace!(
            "Device: created texture {:?} ({:?} {:?} {:?})",
            info.label,
            info.dimension,
            info.extent,
            info.format
        );
        Ok(Texture::new(raw, info.clone()))
    }

    /// Create a sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if the LOD range is inverted or the anisotropy is
    /// outside `1..=16`.
    pub fn create_sampler(&self, info: &SamplerCreateInfo) -> RhiResult<Sampler> {
        validate_sampler_create_info(info).inspect_err(|error| self.report(error))?;
        let raw = self.raw.create_sampler(info)?;
        log::trace!("Device: created sampler {:?}", info.label);
        Ok(Sampler::new(raw, info.clone()))
    }

    // ========================================================================
    // Binding Model
    // ========================================================================

    /// Create a bind group layout.
    ///
    /// # Errors
    ///
    /// Returns an error if entries mix binding schemes, repeat a binding, or
    /// place a resource in the wrong HLSL register range.
    pub fn create_bind_group_layout(
        &self,
        info: &BindGroupLayoutCreateInfo,
    ) -> RhiResult<BindGroupLayout> {
        validate_bind_group_layout(info).inspect_err(|error| self.report(error))?;
        let raw = self.raw.create_bind_group_layout(info)?;
        log::trace!(
            "Device: created bind group layout {:?} (slot {}, {} entries)",
            info.label,
            info.layout_index,
            info.entries.len()
        );
        Ok(BindGroupLayout::new(raw, info.clone()))
    }

    /// Create a bind group.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::BindingMismatch`] unless the entries match the
    /// layout entries exactly, in order.
    pub fn create_bind_group(&self, info: &BindGroupCreateInfo<'_>) -> RhiResult<BindGroup> {
        info.validate().inspect_err(|error| self.report(error))?;
        let raw = self
            .raw
            .create_bind_group(info.layout.raw(), &info.raw_entries())?;
        log::trace!("Device: created bind group {:?}", info.label);
        Ok(BindGroup::new(raw, info))
    }

    /// Create a pipeline layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a bind group layout is not at the position of its
    /// layout index, or a constant range is empty or misaligned.
    pub fn create_pipeline_layout(
        &self,
        info: &PipelineLayoutCreateInfo<'_>,
    ) -> RhiResult<PipelineLayout> {
        info.validate().inspect_err(|error| self.report(error))?;
        let layouts: Vec<_> = info
            .bind_group_layouts
            .iter()
            .map(|layout| layout.raw())
            .collect();
        let raw = self
            .raw
            .create_pipeline_layout(&layouts, &info.constant_layouts)?;
        log::trace!(
            "Device: created pipeline layout {:?} ({} groups)",
            info.label,
            layouts.len()
        );
        Ok(PipelineLayout::new(raw, info))
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    /// Create a shader module.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte code or entry point is empty.
    pub fn create_shader_module(&self, info: &ShaderModuleCreateInfo) -> RhiResult<ShaderModule> {
        ShaderModule::validate(info).inspect_err(|error| self.report(error))?;
        let raw = self.raw.create_shader_module(info)?;
        log::trace!(
            "Device: created shader module {:?} ({}, {} bytes)",
            info.label,
            info.entry_point,
            info.byte_code.len()
        );
        Ok(ShaderModule::new(raw, info))
    }

    /// Create a compute pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to build the pipeline.
    pub fn create_compute_pipeline(
        &self,
        info: &ComputePipelineCreateInfo<'_>,
    ) -> RhiResult<ComputePipeline> {
        let raw = self.raw.create_compute_pipeline(&info.raw_desc())?;
        log::trace!("Device: created compute pipeline {:?}", info.label);
        Ok(ComputePipeline::new(raw, info))
    }

    /// Create a raster pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex attribute exceeds its stride, the
    /// depth/stencil or color target formats do not fit their role, more than
    /// eight color targets are declared, or the backend fails.
    pub fn create_raster_pipeline(
        &self,
        info: &RasterPipelineCreateInfo<'_>,
    ) -> RhiResult<RasterPipeline> {
        info.validate().inspect_err(|error| self.report(error))?;
        let raw = self.raw.create_raster_pipeline(&info.raw_desc())?;
        log::trace!("Device: created raster pipeline {:?}", info.label);
        Ok(RasterPipeline::new(raw, info))
    }

    // ========================================================================
    // Commands / Synchronization
    // ========================================================================

    /// Create an empty command buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to allocate it.
    pub fn create_command_buffer(&self) -> RhiResult<CommandBuffer> {
        let raw = self.raw.create_command_buffer()?;
        Ok(CommandBuffer::new(raw))
    }

    /// Create a fence, optionally already signaled.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to create it.
    pub fn create_fence(&self, init_signaled: bool) -> RhiResult<Fence> {
        let raw = self.raw.create_fence(init_signaled)?;
        Ok(Fence::new(raw))
    }

    /// Create a semaphore.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to create it.
    pub fn create_semaphore(&self) -> RhiResult<Semaphore> {
        let raw = self.raw.create_semaphore()?;
        Ok(Semaphore::new(raw))
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Create a surface for a native window.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot present to the window.
    pub fn create_surface(&self, info: &SurfaceCreateInfo) -> RhiResult<Surface> {
        let raw = self.raw.create_surface(info)?;
        log::debug!("Device: created surface for {:?}", info.window);
        Ok(Surface::new(raw))
    }

    /// Whether `surface` can present textures of `format`.
    pub fn check_swap_chain_format_support(&self, surface: &Surface, format: PixelFormat) -> bool {
        self.raw.check_swap_chain_format_support(surface.raw(), format)
    }

    /// Create a swapchain.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture count is outside `1..=8`, the extent
    /// is empty, the present queue is not graphics-capable, or the surface
    /// does not support the format.
    pub fn create_swap_chain(&self, info: &SwapChainCreateInfo<'_>) -> RhiResult<SwapChain> {
        info.validate().inspect_err(|error| self.report(error))?;
        if !self.check_swap_chain_format_support(info.surface, info.format) {
            let error = RhiError::UnsupportedFormat(info.format);
            self.report(&error);
            return Err(error);
        }

        let mut raw = self.raw.create_swap_chain(
            info.present_queue.raw(),
            info.surface.raw(),
            &info.raw_desc(),
        )?;
        let raw_textures = raw.take_textures();
        if raw_textures.len() != usize::from(info.texture_count) {
            return Err(RhiError::ResourceCreationFailed(format!(
                "swapchain returned {} textures, {} requested",
                raw_textures.len(),
                info.texture_count
            )));
        }

        let textures = raw_textures
            .into_iter()
            .enumerate()
            .map(|(index, texture)| {
                let texture_info = TextureCreateInfo::new_2d(
                    info.extent.width,
                    info.extent.height,
                    info.format,
                    TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_DST,
                )
                .with_label(format!("swapchain texture {index}"));
                Texture::new(texture, texture_info)
            })
            .collect();

        log::debug!(
            "Device: created swapchain {}x{} {:?} x{} ({:?})",
            info.extent.width,
            info.extent.height,
            info.format,
            info.texture_count,
            info.present_mode
        );
        Ok(SwapChain::new(raw, info, textures))
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("rhi_type", &self.rhi_type)
            .field("validation", &self.validation)
            .field(
                "queues",
                &self
                    .queues
                    .iter()
                    .map(|(queue_type, queues)| (*queue_type, queues.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

static_assertions::assert_impl_all!(Device: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::test_support::dummy_device;
    use crate::types::{BufferUsage, Extent3d};

    #[test]
    fn test_zero_sized_buffer_is_rejected() {
        let device = dummy_device();
        let result = device.create_buffer(&BufferCreateInfo::new(0, BufferUsage::STORAGE));
        assert!(matches!(result, Err(RhiError::InvalidParameter(_))));
    }

    #[test]
    fn test_sampler_validation() {
        let device = dummy_device();
        assert!(device.create_sampler(&SamplerCreateInfo::linear()).is_ok());
        assert!(device
            .create_sampler(&SamplerCreateInfo::linear().with_anisotropy(0))
            .is_err());

        let mut inverted = SamplerCreateInfo::nearest();
        inverted.lod_min_clamp = 4.0;
        inverted.lod_max_clamp = 1.0;
        assert!(device.create_sampler(&inverted).is_err());
    }

    #[test]
    fn test_texture_create_info_round_trip() {
        let device = dummy_device();
        let usage = TextureUsage::STORAGE_BINDING;
        let info = TextureCreateInfo::new_3d(8, 8, 4, PixelFormat::Rgba16Float, usage)
            .with_label("volume");
        let texture = device.create_texture(&info).unwrap();
        assert_eq!(texture.create_info(), &info);
        assert_eq!(texture.extent(), Extent3d::new(8, 8, 4));
    }

    #[test]
    fn test_queues_are_grouped_by_type() {
        let device = dummy_device();
        for queue_type in QueueType::ALL {
            let queue = device.queue(queue_type, 0).unwrap();
            assert_eq!(queue.queue_type(), queue_type);
            assert_eq!(queue.index(), 0);
        }
    }
}
