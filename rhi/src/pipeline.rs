//! Shader modules, compute and raster pipelines, and the pipeline cache.

use std::collections::HashMap;
use std::collections::hash_map::{DefaultHasher, Entry};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::backend::{BackendObject, RawComputePipelineDesc, RawRasterPipelineDesc};
use crate::binding::PipelineLayout;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::types::{
    DepthStencilState, FragmentState, MultiSampleState, ObjectId, PrimitiveState,
    PrimitiveTopologyType, ShaderModuleCreateInfo, VertexState,
};

// ============================================================================
// Shader Module
// ============================================================================

/// Pre-compiled shader byte code with its entry point.
pub struct ShaderModule {
    id: ObjectId,
    label: Option<String>,
    entry_point: String,
    byte_code_len: usize,
    raw: Box<dyn BackendObject>,
}

impl ShaderModule {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: &ShaderModuleCreateInfo) -> Self {
        Self {
            id: ObjectId::next(),
            label: info.label.clone(),
            entry_point: info.entry_point.clone(),
            byte_code_len: info.byte_code.len(),
            raw,
        }
    }

    pub(crate) fn validate(info: &ShaderModuleCreateInfo) -> RhiResult<()> {
        if info.byte_code.is_empty() {
            return Err(RhiError::InvalidParameter(format!(
                "shader module {:?} has no byte code",
                info.label
            )));
        }
        if info.entry_point.is_empty() {
            return Err(RhiError::InvalidParameter(format!(
                "shader module {:?} has an empty entry point",
                info.label
            )));
        }
        Ok(())
    }

    /// Get the module identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Entry point name.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Size of the byte code in bytes.
    pub fn byte_code_len(&self) -> usize {
        self.byte_code_len
    }

    /// Destroy the module. Pipelines built from it stay valid.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for ShaderModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderModule")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("entry_point", &self.entry_point)
            .field("byte_code_len", &self.byte_code_len)
            .finish()
    }
}

// ============================================================================
// Compute Pipeline
// ============================================================================

/// Create info for a compute pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ComputePipelineCreateInfo<'a> {
    pub label: Option<&'a str>,
    pub layout: &'a PipelineLayout,
    pub compute_shader: &'a ShaderModule,
}

impl<'a> ComputePipelineCreateInfo<'a> {
    /// Create a compute pipeline create info.
    pub fn new(layout: &'a PipelineLayout, compute_shader: &'a ShaderModule) -> Self {
        Self {
            label: None,
            layout,
            compute_shader,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Stable key over the whole create info. Layout and shader contribute
    /// their identity.
    pub fn hash_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        "compute".hash(&mut hasher);
        self.cache_key().hash(&mut hasher);
        hasher.finish()
    }

    fn cache_key(&self) -> ComputePipelineKey {
        ComputePipelineKey {
            label: self.label.map(str::to_owned),
            layout: self.layout.id(),
            compute_shader: self.compute_shader.id(),
        }
    }

    pub(crate) fn raw_desc(&self) -> RawComputePipelineDesc<'_> {
        RawComputePipelineDesc {
            label: self.label,
            layout: self.layout.raw(),
            compute_shader: self.compute_shader.raw(),
        }
    }
}

/// A compute pipeline.
pub struct ComputePipeline {
    id: ObjectId,
    label: Option<String>,
    layout_id: ObjectId,
    bind_group_layout_ids: Vec<ObjectId>,
    raw: Box<dyn BackendObject>,
}

impl ComputePipeline {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: &ComputePipelineCreateInfo<'_>) -> Self {
        Self {
            id: ObjectId::next(),
            label: info.label.map(str::to_owned),
            layout_id: info.layout.id(),
            bind_group_layout_ids: info.layout.bind_group_layout_ids().to_vec(),
            raw,
        }
    }

    /// Get the pipeline identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the pipeline layout.
    pub fn layout_id(&self) -> ObjectId {
        self.layout_id
    }

    /// Identities of the bind group layouts, by group slot.
    pub fn bind_group_layout_ids(&self) -> &[ObjectId] {
        &self.bind_group_layout_ids
    }

    /// Destroy the pipeline.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for ComputePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputePipeline")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layout_id", &self.layout_id)
            .finish()
    }
}

// ============================================================================
// Raster Pipeline
// ============================================================================

/// Create info for a raster pipeline.
///
/// # Example
///
/// ```ignore
/// let info = RasterPipelineCreateInfo::new(&layout, &vs)
///     .with_pixel_shader(&ps)
///     .with_vertex_state(VertexState::default().with_buffer_layout(
///         VertexBufferLayout::new(12)
///             .with_attribute(VertexAttribute::new("POSITION", 0, VertexFormat::Float32X3, 0)),
///     ))
///     .with_fragment_state(FragmentState::default().with_color_target(
///         ColorTargetState::new(PixelFormat::Bgra8Unorm),
///     ));
/// let pipeline = device.create_raster_pipeline(&info)?;
/// ```
#[derive(Debug, Clone)]
pub struct RasterPipelineCreateInfo<'a> {
    pub label: Option<&'a str>,
    pub layout: &'a PipelineLayout,
    pub vertex_shader: &'a ShaderModule,
    pub pixel_shader: Option<&'a ShaderModule>,
    pub geometry_shader: Option<&'a ShaderModule>,
    pub domain_shader: Option<&'a ShaderModule>,
    pub hull_shader: Option<&'a ShaderModule>,
    pub vertex_state: VertexState,
    pub primitive_state: PrimitiveState,
    pub depth_stencil_state: DepthStencilState,
    pub multi_sample_state: MultiSampleState,
    pub fragment_state: FragmentState,
}

impl<'a> RasterPipelineCreateInfo<'a> {
    /// Create a raster pipeline create info with default fixed-function state.
    pub fn new(layout: &'a PipelineLayout, vertex_shader: &'a ShaderModule) -> Self {
        Self {
            label: None,
            layout,
            vertex_shader,
            pixel_shader: None,
            geometry_shader: None,
            domain_shader: None,
            hull_shader: None,
            vertex_state: VertexState::default(),
            primitive_state: PrimitiveState::default(),
            depth_stencil_state: DepthStencilState::default(),
            multi_sample_state: MultiSampleState::default(),
            fragment_state: FragmentState::default(),
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the pixel shader.
    pub fn with_pixel_shader(mut self, shader: &'a ShaderModule) -> Self {
        self.pixel_shader = Some(shader);
        self
    }

    /// Set the geometry shader.
    pub fn with_geometry_shader(mut self, shader: &'a ShaderModule) -> Self {
        self.geometry_shader = Some(shader);
        self
    }

    /// Set the hull and domain shaders.
    pub fn with_tessellation(mut self, hull: &'a ShaderModule, domain: &'a ShaderModule) -> Self {
        self.hull_shader = Some(hull);
        self.domain_shader = Some(domain);
        self
    }

    pub fn with_vertex_state(mut self, state: VertexState) -> Self {
        self.vertex_state = state;
        self
    }

    pub fn with_primitive_state(mut self, state: PrimitiveState) -> Self {
        self.primitive_state = state;
        self
    }

    pub fn with_depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.depth_stencil_state = state;
        self
    }

    pub fn with_multi_sample_state(mut self, state: MultiSampleState) -> Self {
        self.multi_sample_state = state;
        self
    }

    pub fn with_fragment_state(mut self, state: FragmentState) -> Self {
        self.fragment_state = state;
        self
    }

    /// Stable key over the whole create info. Layout and shaders contribute
    /// their identity.
    pub fn hash_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        "raster".hash(&mut hasher);
        self.cache_key().hash(&mut hasher);
        hasher.finish()
    }

    fn cache_key(&self) -> RasterPipelineKey {
        RasterPipelineKey {
            label: self.label.map(str::to_owned),
            layout: self.layout.id(),
            shaders: [
                Some(self.vertex_shader),
                self.pixel_shader,
                self.geometry_shader,
                self.domain_shader,
                self.hull_shader,
            ]
            .map(|shader| shader.map(ShaderModule::id)),
            vertex_state: self.vertex_state.clone(),
            primitive_state: self.primitive_state,
            depth_stencil_state: self.depth_stencil_state,
            multi_sample_state: self.multi_sample_state,
            fragment_state: self.fragment_state.clone(),
        }
    }

    pub(crate) fn validate(&self) -> RhiResult<()> {
        for (slot, layout) in self.vertex_state.buffer_layouts.iter().enumerate() {
            for attribute in &layout.attributes {
                let end = u64::from(attribute.offset) + u64::from(attribute.format.size());
                if end > u64::from(layout.stride) {
                    return Err(RhiError::InvalidParameter(format!(
                        "raster pipeline {:?}: attribute {}{} of vertex buffer {slot} ends at byte {end}, past stride {}",
                        self.label, attribute.semantic_name, attribute.semantic_index, layout.stride
                    )));
                }
            }
        }

        if self.hull_shader.is_some() != self.domain_shader.is_some() {
            return Err(RhiError::InvalidParameter(format!(
                "raster pipeline {:?}: hull and domain shaders must be set together",
                self.label
            )));
        }

        let targets = &self.fragment_state.color_targets;
        if targets.len() > FragmentState::MAX_COLOR_TARGETS {
            return Err(RhiError::InvalidParameter(format!(
                "raster pipeline {:?} has {} color targets, at most {} are supported",
                self.label,
                targets.len(),
                FragmentState::MAX_COLOR_TARGETS
            )));
        }
        if let Some(target) = targets.iter().find(|target| !target.format.is_color()) {
            return Err(RhiError::UnsupportedFormat(target.format));
        }

        let depth_stencil = &self.depth_stencil_state;
        if depth_stencil.depth_enabled && !depth_stencil.format.is_depth() {
            return Err(RhiError::UnsupportedFormat(depth_stencil.format));
        }
        if depth_stencil.stencil_enabled && !depth_stencil.format.has_stencil() {
            return Err(RhiError::UnsupportedFormat(depth_stencil.format));
        }

        if !matches!(self.multi_sample_state.count, 1 | 2 | 4 | 8 | 16) {
            return Err(RhiError::InvalidParameter(format!(
                "raster pipeline {:?}: sample count {} is not a power of two up to 16",
                self.label, self.multi_sample_state.count
            )));
        }

        Ok(())
    }

    pub(crate) fn raw_desc(&self) -> RawRasterPipelineDesc<'_> {
        RawRasterPipelineDesc {
            label: self.label,
            layout: self.layout.raw(),
            vertex_shader: self.vertex_shader.raw(),
            pixel_shader: self.pixel_shader.map(ShaderModule::raw),
            geometry_shader: self.geometry_shader.map(ShaderModule::raw),
            domain_shader: self.domain_shader.map(ShaderModule::raw),
            hull_shader: self.hull_shader.map(ShaderModule::raw),
            vertex_state: &self.vertex_state,
            primitive_state: &self.primitive_state,
            depth_stencil_state: &self.depth_stencil_state,
            multi_sample_state: &self.multi_sample_state,
            fragment_state: &self.fragment_state,
        }
    }
}

/// A raster (graphics) pipeline.
pub struct RasterPipeline {
    id: ObjectId,
    label: Option<String>,
    layout_id: ObjectId,
    bind_group_layout_ids: Vec<ObjectId>,
    topology_type: PrimitiveTopologyType,
    vertex_buffer_count: usize,
    raw: Box<dyn BackendObject>,
}

impl RasterPipeline {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: &RasterPipelineCreateInfo<'_>) -> Self {
        Self {
            id: ObjectId::next(),
            label: info.label.map(str::to_owned),
            layout_id: info.layout.id(),
            bind_group_layout_ids: info.layout.bind_group_layout_ids().to_vec(),
            topology_type: info.primitive_state.topology_type,
            vertex_buffer_count: info.vertex_state.buffer_layouts.len(),
            raw,
        }
    }

    /// Get the pipeline identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the pipeline layout.
    pub fn layout_id(&self) -> ObjectId {
        self.layout_id
    }

    /// Identities of the bind group layouts, by group slot.
    pub fn bind_group_layout_ids(&self) -> &[ObjectId] {
        &self.bind_group_layout_ids
    }

    /// Topology class fixed at creation; dynamic topologies must belong to it.
    pub fn topology_type(&self) -> PrimitiveTopologyType {
        self.topology_type
    }

    /// Number of vertex buffer slots the pipeline reads.
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffer_count
    }

    /// Destroy the pipeline.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for RasterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterPipeline")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layout_id", &self.layout_id)
            .field("topology_type", &self.topology_type)
            .finish()
    }
}

// ============================================================================
// Pipeline Cache
// ============================================================================

/// Owned identity of a [`ComputePipelineCreateInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ComputePipelineKey {
    label: Option<String>,
    layout: ObjectId,
    compute_shader: ObjectId,
}

/// Owned identity of a [`RasterPipelineCreateInfo`]. Shaders are ordered
/// vertex, pixel, geometry, domain, hull.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RasterPipelineKey {
    label: Option<String>,
    layout: ObjectId,
    shaders: [Option<ObjectId>; 5],
    vertex_state: VertexState,
    primitive_state: PrimitiveState,
    depth_stencil_state: DepthStencilState,
    multi_sample_state: MultiSampleState,
    fragment_state: FragmentState,
}

/// Pipelines keyed by the full create info they were built from.
///
/// Pipelines are never created implicitly by recording; callers route their
/// creation through the cache so a create info seen before is not rebuilt.
/// Two create infos share an entry only when they are equal, not merely when
/// their [`hash_key`](RasterPipelineCreateInfo::hash_key)s collide.
#[derive(Default)]
pub struct PipelineCache {
    compute: HashMap<ComputePipelineKey, ComputePipeline>,
    raster: HashMap<RasterPipelineKey, RasterPipeline>,
}

impl PipelineCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compute pipeline for `info`, creating it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the creation error on a miss that fails to build.
    pub fn get_or_create_compute(
        &mut self,
        device: &Device,
        info: &ComputePipelineCreateInfo<'_>,
    ) -> RhiResult<&ComputePipeline> {
        match self.compute.entry(info.cache_key()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                log::trace!("PipelineCache: compute miss for {:?}", info.label);
                Ok(entry.insert(device.create_compute_pipeline(info)?))
            }
        }
    }

    /// Get the raster pipeline for `info`, creating it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the creation error on a miss that fails to build.
    pub fn get_or_create_raster(
        &mut self,
        device: &Device,
        info: &RasterPipelineCreateInfo<'_>,
    ) -> RhiResult<&RasterPipeline> {
        match self.raster.entry(info.cache_key()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                log::trace!("PipelineCache: raster miss for {:?}", info.label);
                Ok(entry.insert(device.create_raster_pipeline(info)?))
            }
        }
    }

    /// Number of cached pipelines.
    pub fn len(&self) -> usize {
        self.compute.len() + self.raster.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroy every cached pipeline.
    pub fn clear(&mut self) {
        self.compute.clear();
        self.raster.clear();
    }
}

impl fmt::Debug for PipelineCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineCache")
            .field("compute", &self.compute.len())
            .field("raster", &self.raster.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ShaderModule: Send, Sync);
static_assertions::assert_impl_all!(ComputePipeline: Send, Sync);
static_assertions::assert_impl_all!(RasterPipeline: Send, Sync);
static_assertions::assert_impl_all!(PipelineCache: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::binding::PipelineLayoutCreateInfo;
    use crate::test_support::dummy_device;
    use crate::types::{
        ColorTargetState, CompareFunction, CullMode, PixelFormat, VertexAttribute,
        VertexBufferLayout, VertexFormat,
    };

    fn shader(device: &Device, entry: &str) -> ShaderModule {
        device
            .create_shader_module(&ShaderModuleCreateInfo::new(entry, vec![0x03, 0x02, 0x23, 0x07]))
            .unwrap()
    }

    #[test]
    fn test_shader_module_requires_byte_code() {
        let device = dummy_device();
        let result = device.create_shader_module(&ShaderModuleCreateInfo::new("main", Vec::new()));
        assert!(matches!(result, Err(RhiError::InvalidParameter(_))));
        assert_eq!(shader(&device, "vs_main").entry_point(), "vs_main");
    }

    #[test]
    fn test_attribute_must_fit_stride() {
        let device = dummy_device();
        let layout = device.create_pipeline_layout(&PipelineLayoutCreateInfo::new()).unwrap();
        let vs = shader(&device, "vs_main");

        let overflowing = RasterPipelineCreateInfo::new(&layout, &vs).with_vertex_state(
            VertexState::default().with_buffer_layout(
                VertexBufferLayout::new(12)
                    .with_attribute(VertexAttribute::new("POSITION", 0, VertexFormat::Float32X3, 0))
                    .with_attribute(VertexAttribute::new(
                        "TEXCOORD",
                        0,
                        VertexFormat::Float32X2,
                        8,
                    )),
            ),
        );
        assert!(device.create_raster_pipeline(&overflowing).is_err());

        let fitting = RasterPipelineCreateInfo::new(&layout, &vs).with_vertex_state(
            VertexState::default().with_buffer_layout(
                VertexBufferLayout::new(20)
                    .with_attribute(VertexAttribute::new("POSITION", 0, VertexFormat::Float32X3, 0))
                    .with_attribute(VertexAttribute::new(
                        "TEXCOORD",
                        0,
                        VertexFormat::Float32X2,
                        12,
                    )),
            ),
        );
        let pipeline = device.create_raster_pipeline(&fitting).unwrap();
        assert_eq!(pipeline.layout_id(), layout.id());
        assert_eq!(pipeline.vertex_buffer_count(), 1);
    }

    #[test]
    fn test_fixed_function_validation() {
        let device = dummy_device();
        let layout = device.create_pipeline_layout(&PipelineLayoutCreateInfo::new()).unwrap();
        let vs = shader(&device, "vs_main");

        let color_depth = RasterPipelineCreateInfo::new(&layout, &vs).with_depth_stencil_state(
            DepthStencilState::depth(PixelFormat::Rgba8Unorm, CompareFunction::Less),
        );
        assert_eq!(
            device.create_raster_pipeline(&color_depth).err(),
            Some(RhiError::UnsupportedFormat(PixelFormat::Rgba8Unorm))
        );

        let mut too_many = FragmentState::default();
        for _ in 0..=FragmentState::MAX_COLOR_TARGETS {
            too_many = too_many.with_color_target(ColorTargetState::new(PixelFormat::Rgba8Unorm));
        }
        let info = RasterPipelineCreateInfo::new(&layout, &vs).with_fragment_state(too_many);
        assert!(device.create_raster_pipeline(&info).is_err());

        let depth_target = RasterPipelineCreateInfo::new(&layout, &vs).with_fragment_state(
            FragmentState::default()
                .with_color_target(ColorTargetState::new(PixelFormat::D32Float)),
        );
        assert!(device.create_raster_pipeline(&depth_target).is_err());

        let hull = shader(&device, "hs_main");
        let mut half_tessellation = RasterPipelineCreateInfo::new(&layout, &vs);
        half_tessellation.hull_shader = Some(&hull);
        assert!(device.create_raster_pipeline(&half_tessellation).is_err());
    }

    #[test]
    fn test_hash_key_tracks_identity_and_state() {
        let device = dummy_device();
        let layout = device.create_pipeline_layout(&PipelineLayoutCreateInfo::new()).unwrap();
        let vs = shader(&device, "vs_main");
        let other_vs = shader(&device, "vs_main");

        let base = RasterPipelineCreateInfo::new(&layout, &vs);
        assert_eq!(base.hash_key(), base.clone().hash_key());
        assert_ne!(base.hash_key(), RasterPipelineCreateInfo::new(&layout, &other_vs).hash_key());

        let blended = base.clone().with_fragment_state(
            FragmentState::default()
                .with_color_target(ColorTargetState::new(PixelFormat::Rgba8Unorm)),
        );
        assert_ne!(base.hash_key(), blended.hash_key());
    }

    #[test]
    fn test_cache_reuses_pipelines() {
        let device = dummy_device();
        let layout = device.create_pipeline_layout(&PipelineLayoutCreateInfo::new()).unwrap();
        let cs = shader(&device, "cs_main");
        let info = ComputePipelineCreateInfo::new(&layout, &cs).with_label("reduce");

        let mut cache = PipelineCache::new();
        let first = cache.get_or_create_compute(&device, &info).unwrap().id();
        let second = cache.get_or_create_compute(&device, &info).unwrap().id();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_matches_whole_create_info() {
        let device = dummy_device();
        let layout = device.create_pipeline_layout(&PipelineLayoutCreateInfo::new()).unwrap();
        let vs = shader(&device, "vs_main");
        let ps = shader(&device, "ps_main");

        let pixel = RasterPipelineCreateInfo::new(&layout, &vs).with_pixel_shader(&ps);
        let geometry = RasterPipelineCreateInfo::new(&layout, &vs).with_geometry_shader(&ps);
        assert_ne!(pixel.cache_key(), geometry.cache_key());
        assert_eq!(
            pixel.cache_key(),
            RasterPipelineCreateInfo::new(&layout, &vs).with_pixel_shader(&ps).cache_key()
        );

        let culled = pixel.clone().with_primitive_state(PrimitiveState {
            cull_mode: CullMode::Back,
            ..PrimitiveState::default()
        });

        let mut cache = PipelineCache::new();
        let first = cache.get_or_create_raster(&device, &pixel).unwrap().id();
        let second = cache.get_or_create_raster(&device, &culled).unwrap().id();
        let rebuilt = RasterPipelineCreateInfo::new(&layout, &vs).with_pixel_shader(&ps);
        let third = cache.get_or_create_raster(&device, &rebuilt).unwrap().id();
        assert_ne!(first, second);
        assert_eq!(first, third);
        assert_eq!(cache.len(), 2);
    }
}
