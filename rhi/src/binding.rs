//! Binding model: bind group layouts, bind groups and pipeline layouts.
//!
//! A [`BindGroupLayout`] declares binding slots independent of concrete
//! resources. A [`BindGroup`] fills those slots with views and samplers and
//! must match its layout exactly. A [`PipelineLayout`] orders bind group
//! layouts by group slot and adds pipeline constant ranges.

use std::collections::HashSet;
use std::fmt;

use crate::backend::BackendObject;
use crate::error::{RhiError, RhiResult};
use crate::resources::{BufferView, Sampler, TextureView};
use crate::types::{
    BindGroupLayoutCreateInfo, BindingType, BufferViewType, ObjectId, PipelineConstantLayout,
    ResourceBinding, TextureViewType,
};

// ============================================================================
// Bind Group Layout
// ============================================================================

pub(crate) fn validate_bind_group_layout(info: &BindGroupLayoutCreateInfo) -> RhiResult<()> {
    let mut seen = HashSet::with_capacity(info.entries.len());

    let Some(first) = info.entries.first() else {
        return Ok(());
    };

    for (position, entry) in info.entries.iter().enumerate() {
        if !first.binding.same_scheme(&entry.binding) {
            return Err(RhiError::InvalidParameter(format!(
                "bind group layout {:?} mixes binding schemes at entry {position}",
                info.label
            )));
        }

        if let ResourceBinding::Hlsl { range_type, .. } = entry.binding {
            if range_type != entry.binding_type.hlsl_range_type() {
                return Err(RhiError::InvalidParameter(format!(
                    "entry {position} of bind group layout {:?}: {:?} cannot live in the {:?} register range",
                    info.label, entry.binding_type, range_type
                )));
            }
        }

        if entry.shader_visibility.is_empty() {
            return Err(RhiError::InvalidParameter(format!(
                "entry {position} of bind group layout {:?} is visible to no shader stage",
                info.label
            )));
        }

        if !seen.insert(entry.binding) {
            return Err(RhiError::InvalidParameter(format!(
                "bind group layout {:?} declares {:?} twice",
                info.label, entry.binding
            )));
        }
    }

    Ok(())
}

/// Binding slots of one bind group.
pub struct BindGroupLayout {
    id: ObjectId,
    info: BindGroupLayoutCreateInfo,
    raw: Box<dyn BackendObject>,
}

impl BindGroupLayout {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: BindGroupLayoutCreateInfo) -> Self {
        Self {
            id: ObjectId::next(),
            info,
            raw,
        }
    }

    /// Get the layout identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the create info the layout was created with.
    pub fn create_info(&self) -> &BindGroupLayoutCreateInfo {
        &self.info
    }

    /// Group slot this layout occupies.
    pub fn layout_index(&self) -> u8 {
        self.info.layout_index
    }

    /// Destroy the layout.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for BindGroupLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindGroupLayout")
            .field("id", &self.id)
            .field("label", &self.info.label)
            .field("layout_index", &self.info.layout_index)
            .field("entries", &self.info.entries.len())
            .finish()
    }
}

// ============================================================================
// Bind Group
// ============================================================================

/// A resource bound to a bind group slot.
#[derive(Debug, Clone, Copy)]
pub enum BindingResource<'a> {
    Sampler(&'a Sampler),
    TextureView(&'a TextureView),
    BufferView(&'a BufferView),
}

impl BindingResource<'_> {
    fn accepts(&self, binding_type: BindingType) -> bool {
        match (binding_type, self) {
            (BindingType::Sampler, Self::Sampler(_)) => true,
            (BindingType::Texture, Self::TextureView(view)) => {
                view.view_type() == TextureViewType::TextureBinding
            }
            (BindingType::StorageTexture, Self::TextureView(view)) => {
                view.view_type() == TextureViewType::StorageBinding
            }
            (BindingType::UniformBuffer, Self::BufferView(view)) => {
                view.view_type() == BufferViewType::UniformBinding
            }
            (BindingType::StorageBuffer, Self::BufferView(view)) => {
                view.view_type() == BufferViewType::StorageBinding
            }
            (BindingType::RwStorageBuffer, Self::BufferView(view)) => {
                view.view_type() == BufferViewType::RwStorageBinding
            }
            _ => false,
        }
    }

    fn raw(&self) -> &dyn BackendObject {
        match self {
            Self::Sampler(sampler) => sampler.raw(),
            Self::TextureView(view) => view.raw(),
            Self::BufferView(view) => view.raw(),
        }
    }
}

/// One entry of a bind group.
#[derive(Debug, Clone, Copy)]
pub struct BindGroupEntry<'a> {
    /// Declared resource kind; must match the layout entry.
    pub binding_type: BindingType,
    /// Slot number; must match the layout entry.
    pub binding: ResourceBinding,
    pub resource: BindingResource<'a>,
}

impl<'a> BindGroupEntry<'a> {
    /// Create a bind group entry.
    pub fn new(
        binding_type: BindingType,
        binding: ResourceBinding,
        resource: BindingResource<'a>,
    ) -> Self {
        Self {
            binding_type,
            binding,
            resource,
        }
    }
}

/// Create info for a bind group.
#[derive(Debug, Clone)]
pub struct BindGroupCreateInfo<'a> {
    pub label: Option<String>,
    pub layout: &'a BindGroupLayout,
    /// Entries in the same order as the layout entries.
    pub entries: Vec<BindGroupEntry<'a>>,
}

impl<'a> BindGroupCreateInfo<'a> {
    /// Create an empty bind group create info.
    pub fn new(layout: &'a BindGroupLayout) -> Self {
        Self {
            label: None,
            layout,
            entries: Vec::new(),
        }
    }

    /// Add an entry.
    pub fn with_entry(mut self, entry: BindGroupEntry<'a>) -> Self {
        self.entries.push(entry);
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn validate(&self) -> RhiResult<()> {
        let layout_entries = &self.layout.info.entries;
        if self.entries.len() != layout_entries.len() {
            return Err(RhiError::BindingMismatch(format!(
                "bind group {:?} has {} entries, layout {:?} declares {}",
                self.label,
                self.entries.len(),
                self.layout.info.label,
                layout_entries.len()
            )));
        }

        for (position, (entry, expected)) in self.entries.iter().zip(layout_entries).enumerate() {
            if entry.binding_type != expected.binding_type {
                return Err(RhiError::BindingMismatch(format!(
                    "entry {position} of bind group {:?} is {:?}, layout declares {:?}",
                    self.label, entry.binding_type, expected.binding_type
                )));
            }
            if entry.binding != expected.binding {
                return Err(RhiError::BindingMismatch(format!(
                    "entry {position} of bind group {:?} binds {:?}, layout declares {:?}",
                    self.label, entry.binding, expected.binding
                )));
            }
            if !entry.resource.accepts(entry.binding_type) {
                return Err(RhiError::BindingMismatch(format!(
                    "entry {position} of bind group {:?}: resource {:?} cannot be bound as {:?}",
                    self.label, entry.resource, entry.binding_type
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn raw_entries(&self) -> Vec<crate::backend::RawBindGroupEntry<'_>> {
        self.entries
            .iter()
            .map(|entry| crate::backend::RawBindGroupEntry {
                binding_type: entry.binding_type,
                binding: entry.binding,
                resource: entry.resource.raw(),
            })
            .collect()
    }
}

/// Concrete resources bound to the slots of a [`BindGroupLayout`].
///
/// The group references, but does not own, its resources; recreate it when
/// the bound set changes.
pub struct BindGroup {
    id: ObjectId,
    label: Option<String>,
    layout_id: ObjectId,
    layout_index: u8,
    raw: Box<dyn BackendObject>,
}

impl BindGroup {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: &BindGroupCreateInfo<'_>) -> Self {
        Self {
            id: ObjectId::next(),
            label: info.label.clone(),
            layout_id: info.layout.id,
            layout_index: info.layout.info.layout_index,
            raw,
        }
    }

    /// Get the group identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the originating layout.
    pub fn layout_id(&self) -> ObjectId {
        self.layout_id
    }

    /// Group slot of the originating layout.
    pub fn layout_index(&self) -> u8 {
        self.layout_index
    }

    /// Destroy the group.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for BindGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindGroup")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layout_id", &self.layout_id)
            .field("layout_index", &self.layout_index)
            .finish()
    }
}

// ============================================================================
// Pipeline Layout
// ============================================================================

/// Create info for a pipeline layout.
#[derive(Debug, Clone, Default)]
pub struct PipelineLayoutCreateInfo<'a> {
    pub label: Option<String>,
    /// Layouts ordered by group slot: the layout at position `i` has `layout_index == i`.
    pub bind_group_layouts: Vec<&'a BindGroupLayout>,
    pub constant_layouts: Vec<PipelineConstantLayout>,
}

impl<'a> PipelineLayoutCreateInfo<'a> {
    /// Create an empty pipeline layout create info.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bind group layout.
    pub fn with_bind_group_layout(mut self, layout: &'a BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Append a constant range.
    pub fn with_constant_layout(mut self, constant: PipelineConstantLayout) -> Self {
        self.constant_layouts.push(constant);
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn validate(&self) -> RhiResult<()> {
        for (slot, layout) in self.bind_group_layouts.iter().enumerate() {
            if usize::from(layout.layout_index()) != slot {
                return Err(RhiError::InvalidParameter(format!(
                    "pipeline layout {:?}: bind group layout {:?} has layout index {}, expected {slot}",
                    self.label,
                    layout.info.label,
                    layout.layout_index()
                )));
            }
        }

        for constant in &self.constant_layouts {
            if constant.size == 0 || constant.offset % 4 != 0 || constant.size % 4 != 0 {
                return Err(RhiError::InvalidParameter(format!(
                    "pipeline layout {:?}: constant range {}+{} must be non-empty and 4-byte aligned",
                    self.label, constant.offset, constant.size
                )));
            }
            if constant.stage_flags.is_empty() {
                return Err(RhiError::InvalidParameter(format!(
                    "pipeline layout {:?}: constant range {}+{} is visible to no shader stage",
                    self.label, constant.offset, constant.size
                )));
            }
        }

        Ok(())
    }
}

/// Group slots and constant ranges shared by the pipelines built against it.
pub struct PipelineLayout {
    id: ObjectId,
    label: Option<String>,
    bind_group_layout_ids: Vec<ObjectId>,
    constant_layouts: Vec<PipelineConstantLayout>,
    raw: Box<dyn BackendObject>,
}

impl PipelineLayout {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: &PipelineLayoutCreateInfo<'_>) -> Self {
        Self {
            id: ObjectId::next(),
            label: info.label.clone(),
            bind_group_layout_ids: info
                .bind_group_layouts
                .iter()
                .map(|layout| layout.id())
                .collect(),
            constant_layouts: info.constant_layouts.clone(),
            raw,
        }
    }

    /// Get the layout identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identities of the bind group layouts, by group slot.
    pub fn bind_group_layout_ids(&self) -> &[ObjectId] {
        &self.bind_group_layout_ids
    }

    /// Constant ranges.
    pub fn constant_layouts(&self) -> &[PipelineConstantLayout] {
        &self.constant_layouts
    }

    /// Destroy the layout.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for PipelineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineLayout")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("bind_group_layout_ids", &self.bind_group_layout_ids)
            .finish()
    }
}

static_assertions::assert_impl_all!(BindGroupLayout: Send, Sync);
static_assertions::assert_impl_all!(BindGroup: Send, Sync);
static_assertions::assert_impl_all!(PipelineLayout: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::test_support::dummy_device;
    use crate::types::{
        BindGroupLayoutEntry, BufferCreateInfo, BufferUsage, BufferViewCreateInfo,
        HlslBindingRangeType, SamplerCreateInfo, ShaderStage,
    };

    fn uniform_entry(index: u8) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry::new(
            BindingType::UniformBuffer,
            ResourceBinding::glsl(index),
            ShaderStage::VERTEX | ShaderStage::PIXEL,
        )
    }

    #[test]
    fn test_layout_rejects_duplicate_bindings() {
        let device = dummy_device();
        let info = BindGroupLayoutCreateInfo::new(0)
            .with_entry(uniform_entry(0))
            .with_entry(uniform_entry(0));
        assert!(matches!(
            device.create_bind_group_layout(&info),
            Err(RhiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_layout_rejects_mixed_schemes_and_wrong_ranges() {
        let device = dummy_device();
        let mixed = BindGroupLayoutCreateInfo::new(0)
            .with_entry(uniform_entry(0))
            .with_entry(BindGroupLayoutEntry::new(
                BindingType::Sampler,
                ResourceBinding::hlsl(HlslBindingRangeType::Sampler, 0),
                ShaderStage::PIXEL,
            ));
        assert!(device.create_bind_group_layout(&mixed).is_err());

        let wrong_range = BindGroupLayoutCreateInfo::new(0).with_entry(BindGroupLayoutEntry::new(
            BindingType::UniformBuffer,
            ResourceBinding::hlsl(HlslBindingRangeType::Texture, 0),
            ShaderStage::VERTEX,
        ));
        assert!(device.create_bind_group_layout(&wrong_range).is_err());

        let hlsl = BindGroupLayoutCreateInfo::new(0)
            .with_entry(BindGroupLayoutEntry::new(
                BindingType::UniformBuffer,
                ResourceBinding::hlsl(HlslBindingRangeType::ConstantBuffer, 0),
                ShaderStage::VERTEX,
            ))
            .with_entry(BindGroupLayoutEntry::new(
                BindingType::Sampler,
                ResourceBinding::hlsl(HlslBindingRangeType::Sampler, 0),
                ShaderStage::PIXEL,
            ));
        assert!(device.create_bind_group_layout(&hlsl).is_ok());
    }

    #[test]
    fn test_bind_group_must_match_layout() {
        let device = dummy_device();
        let layout = device
            .create_bind_group_layout(
                &BindGroupLayoutCreateInfo::new(0).with_entry(uniform_entry(0)),
            )
            .unwrap();
        let buffer = device
            .create_buffer(&BufferCreateInfo::new(256, BufferUsage::UNIFORM))
            .unwrap();
        let view = buffer
            .create_view(&BufferViewCreateInfo::new(BufferViewType::UniformBinding, 256))
            .unwrap();
        let sampler = device.create_sampler(&SamplerCreateInfo::linear()).unwrap();

        let matching = BindGroupCreateInfo::new(&layout).with_entry(BindGroupEntry::new(
            BindingType::UniformBuffer,
            ResourceBinding::glsl(0),
            BindingResource::BufferView(&view),
        ));
        let group = device.create_bind_group(&matching).unwrap();
        assert_eq!(group.layout_id(), layout.id());

        let empty = BindGroupCreateInfo::new(&layout);
        assert!(matches!(device.create_bind_group(&empty), Err(RhiError::BindingMismatch(_))));

        let wrong_type = BindGroupCreateInfo::new(&layout).with_entry(BindGroupEntry::new(
            BindingType::Sampler,
            ResourceBinding::glsl(0),
            BindingResource::Sampler(&sampler),
        ));
        assert!(matches!(device.create_bind_group(&wrong_type), Err(RhiError::BindingMismatch(_))));

        let wrong_resource = BindGroupCreateInfo::new(&layout).with_entry(BindGroupEntry::new(
            BindingType::UniformBuffer,
            ResourceBinding::glsl(0),
            BindingResource::Sampler(&sampler),
        ));
        assert!(matches!(
            device.create_bind_group(&wrong_resource),
            Err(RhiError::BindingMismatch(_))
        ));
    }

    #[test]
    fn test_pipeline_layout_orders_groups_by_slot() {
        let device = dummy_device();
        let set0 = device
            .create_bind_group_layout(
                &BindGroupLayoutCreateInfo::new(0).with_entry(uniform_entry(0)),
            )
            .unwrap();
        let set1 = device
            .create_bind_group_layout(
                &BindGroupLayoutCreateInfo::new(1).with_entry(uniform_entry(0)),
            )
            .unwrap();

        let ordered = PipelineLayoutCreateInfo::new()
            .with_bind_group_layout(&set0)
            .with_bind_group_layout(&set1);
        let layout = device.create_pipeline_layout(&ordered).unwrap();
        assert_eq!(layout.bind_group_layout_ids(), &[set0.id(), set1.id()]);

        let swapped = PipelineLayoutCreateInfo::new()
            .with_bind_group_layout(&set1)
            .with_bind_group_layout(&set0);
        assert!(device.create_pipeline_layout(&swapped).is_err());
    }

    #[test]
    fn test_pipeline_layout_constant_alignment() {
        let device = dummy_device();
        let misaligned = PipelineLayoutCreateInfo::new()
            .with_constant_layout(PipelineConstantLayout::new(ShaderStage::VERTEX, 2, 16));
        assert!(device.create_pipeline_layout(&misaligned).is_err());

        let aligned = PipelineLayoutCreateInfo::new()
            .with_constant_layout(PipelineConstantLayout::new(ShaderStage::VERTEX, 0, 64));
        assert_eq!(device.create_pipeline_layout(&aligned).unwrap().constant_layouts().len(), 1);
    }
}
