//! Command buffers and their scoped recorders.
//!
//! Recording is strictly scoped: [`CommandBuffer::begin`] returns a
//! [`CommandRecorder`] that mutably borrows the buffer, and each pass is a
//! recorder borrowed from it. Dropping a recorder ends its scope, so a buffer
//! can never be left half-recorded.
//!
//! Recording is forwarded to the backend command by command. Misuse (binding
//! a group from the wrong layout, copying out of range, drawing without a
//! pipeline) is checked with debug assertions only.

use std::fmt;

use crate::backend::{Command, CommandBufferBackend, RawColorAttachment, RawDepthStencilAttachment};
use crate::binding::BindGroup;
use crate::pipeline::{ComputePipeline, RasterPipeline};
use crate::resources::{Buffer, BufferView, Texture, TextureView};
use crate::sync::Barrier;
use crate::types::{
    BufferCopyInfo, BufferTextureCopyInfo, BufferUsage, BufferViewType, ClearColor, Extent3d,
    FragmentState, LoadOp, ObjectId, Origin3d, PrimitiveTopology, PrimitiveTopologyType,
    QueueType, ScissorRect, StoreOp, TextureCopyInfo, TextureDimension, TextureSubResourceInfo,
    TextureUsage, TextureViewType, Viewport,
};

// ============================================================================
// Command Buffer
// ============================================================================

/// Recording state of a [`CommandBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandBufferState {
    /// Created, never recorded.
    Initial,
    /// A recorder is alive.
    Recording,
    /// Recording ended; ready for submission.
    Executable,
}

/// A list of GPU commands.
///
/// A command buffer may be re-recorded only after the GPU finished executing
/// its previous contents; wait on the fence of that submission first.
pub struct CommandBuffer {
    id: ObjectId,
    state: CommandBufferState,
    command_count: usize,
    uses_raster: bool,
    uses_compute: bool,
    raw: Box<dyn CommandBufferBackend>,
}

impl CommandBuffer {
    pub(crate) fn new(raw: Box<dyn CommandBufferBackend>) -> Self {
        Self {
            id: ObjectId::next(),
            state: CommandBufferState::Initial,
            command_count: 0,
            uses_raster: false,
            uses_compute: false,
            raw,
        }
    }

    /// Get the command buffer identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current recording state.
    pub fn state(&self) -> CommandBufferState {
        self.state
    }

    /// Whether the buffer can be submitted.
    pub fn is_executable(&self) -> bool {
        self.state == CommandBufferState::Executable
    }

    /// Number of commands recorded since the last `begin`.
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    /// Whether `queue_type` can execute every pass recorded in the buffer.
    pub fn is_supported_by(&self, queue_type: QueueType) -> bool {
        (!self.uses_raster || queue_type.supports_graphics())
            && (!self.uses_compute || queue_type.supports_compute())
    }

    /// Reset the buffer and start recording.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut recorder = command_buffer.begin();
    /// {
    ///     let mut pass = recorder.begin_compute_pass();
    ///     pass.set_pipeline(&pipeline);
    ///     pass.set_bind_group(0, &group);
    ///     pass.dispatch(64, 1, 1);
    /// }
    /// recorder.end();
    /// queue.submit(&command_buffer, &QueueSubmitInfo::new().with_signal_fence(&fence));
    /// ```
    pub fn begin(&mut self) -> CommandRecorder<'_> {
        self.raw.begin();
        self.state = CommandBufferState::Recording;
        self.command_count = 0;
        self.uses_raster = false;
        self.uses_compute = false;
        log::trace!("CommandBuffer: begin ({})", self.id);
        CommandRecorder {
            command_buffer: self,
        }
    }

    /// Destroy the command buffer.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn CommandBufferBackend {
        self.raw.as_ref()
    }

    fn record(&mut self, command: Command<'_>) {
        debug_assert_eq!(
            self.state,
            CommandBufferState::Recording,
            "CommandBuffer {}: recording outside of begin/end",
            self.id
        );
        log::trace!("CommandBuffer {}: {command:?}", self.id);
        self.raw.record(command);
        self.command_count += 1;
    }

    fn record_barriers(&mut self, barriers: &[Barrier<'_>]) {
        for barrier in barriers {
            self.record(barrier.to_command());
        }
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("command_count", &self.command_count)
            .finish()
    }
}

// ============================================================================
// Command Recorder
// ============================================================================

/// Top-level recording scope of a [`CommandBuffer`].
///
/// Ending it (explicitly or by drop) makes the buffer executable.
pub struct CommandRecorder<'a> {
    command_buffer: &'a mut CommandBuffer,
}

impl CommandRecorder<'_> {
    /// Record resource state transitions.
    pub fn resource_barrier(&mut self, barriers: &[Barrier<'_>]) {
        self.command_buffer.record_barriers(barriers);
    }

    /// Begin a copy pass.
    pub fn begin_copy_pass(&mut self) -> CopyPassRecorder<'_> {
        self.command_buffer.record(Command::BeginCopyPass);
        CopyPassRecorder {
            command_buffer: &mut *self.command_buffer,
        }
    }

    /// Begin a compute pass.
    pub fn begin_compute_pass(&mut self) -> ComputePassRecorder<'_> {
        self.command_buffer.record(Command::BeginComputePass);
        self.command_buffer.uses_compute = true;
        ComputePassRecorder {
            command_buffer: &mut *self.command_buffer,
            bind_group_layout_ids: None,
        }
    }

    /// Begin a raster pass rendering into the given attachments.
    pub fn begin_raster_pass(&mut self, info: &RasterPassBeginInfo<'_>) -> RasterPassRecorder<'_> {
        debug_assert!(
            info.validate().is_ok(),
            "CommandRecorder::begin_raster_pass: {}",
            info.validate().err().unwrap_or_default()
        );

        let color_attachments: Vec<RawColorAttachment<'_>> = info
            .color_attachments
            .iter()
            .map(|attachment| RawColorAttachment {
                view: attachment.view.raw(),
                resolve_view: attachment.resolve_view.map(TextureView::raw),
                load_op: attachment.load_op,
                store_op: attachment.store_op,
                clear_value: attachment.clear_value,
            })
            .collect();
        let depth_stencil_attachment =
            info.depth_stencil_attachment
                .as_ref()
                .map(|attachment| RawDepthStencilAttachment {
                    view: attachment.view.raw(),
                    depth_read_only: attachment.depth_read_only,
                    depth_load_op: attachment.depth_load_op,
                    depth_store_op: attachment.depth_store_op,
                    depth_clear_value: attachment.depth_clear_value,
                    stencil_read_only: attachment.stencil_read_only,
                    stencil_load_op: attachment.stencil_load_op,
                    stencil_store_op: attachment.stencil_store_op,
                    stencil_clear_value: attachment.stencil_clear_value,
                });

        self.command_buffer.record(Command::BeginRasterPass {
            color_attachments: &color_attachments,
            depth_stencil_attachment,
        });
        self.command_buffer.uses_raster = true;
        RasterPassRecorder {
            command_buffer: &mut *self.command_buffer,
            bind_group_layout_ids: None,
            topology_type: None,
            has_index_buffer: false,
        }
    }

    /// End recording. Equivalent to dropping the recorder.
    pub fn end(self) {
        drop(self);
    }
}

impl Drop for CommandRecorder<'_> {
    fn drop(&mut self) {
        self.command_buffer.raw.end();
        self.command_buffer.state = CommandBufferState::Executable;
        log::trace!(
            "CommandBuffer: end ({}, {} commands)",
            self.command_buffer.id,
            self.command_buffer.command_count
        );
    }
}

impl fmt::Debug for CommandRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRecorder")
            .field("command_buffer", &self.command_buffer.id)
            .finish()
    }
}

fn check_bind_group(expected: Option<&[ObjectId]>, layout_index: u8, group: &BindGroup) -> bool {
    let Some(layout_ids) = expected else {
        return false;
    };
    group.layout_index() == layout_index
        && layout_ids.get(usize::from(layout_index)) == Some(&group.layout_id())
}

// ============================================================================
// Copy Pass
// ============================================================================

/// Recording scope of a copy pass.
pub struct CopyPassRecorder<'a> {
    command_buffer: &'a mut CommandBuffer,
}

impl CopyPassRecorder<'_> {
    /// Copy bytes between two buffers.
    pub fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, info: BufferCopyInfo) {
        debug_assert!(
            buffer_copy_fits(src, dst, &info),
            "CopyPassRecorder::copy_buffer_to_buffer: {info:?} does not fit {src:?} -> {dst:?}"
        );
        self.command_buffer.record(Command::CopyBufferToBuffer {
            src: src.raw(),
            dst: dst.raw(),
            info,
        });
    }

    /// Copy a linear buffer region into a texture sub-resource.
    pub fn copy_buffer_to_texture(
        &mut self,
        src: &Buffer,
        dst: &Texture,
        info: BufferTextureCopyInfo,
    ) {
        debug_assert!(
            src.usages().contains(BufferUsage::COPY_SRC)
                && dst.create_info().usages.contains(TextureUsage::COPY_DST)
                && buffer_texture_copy_fits(src, dst, &info),
            "CopyPassRecorder::copy_buffer_to_texture: {info:?} does not fit {src:?} -> {dst:?}"
        );
        self.command_buffer.record(Command::CopyBufferToTexture {
            src: src.raw(),
            dst: dst.raw(),
            info,
        });
    }

    /// Copy a texture sub-resource region into a linear buffer.
    pub fn copy_texture_to_buffer(
        &mut self,
        src: &Texture,
        dst: &Buffer,
        info: BufferTextureCopyInfo,
    ) {
        debug_assert!(
            src.create_info().usages.contains(TextureUsage::COPY_SRC)
                && dst.usages().contains(BufferUsage::COPY_DST)
                && buffer_texture_copy_fits(dst, src, &info),
            "CopyPassRecorder::copy_texture_to_buffer: {info:?} does not fit {src:?} -> {dst:?}"
        );
        self.command_buffer.record(Command::CopyTextureToBuffer {
            src: src.raw(),
            dst: dst.raw(),
            info,
        });
    }

    /// Copy a region between two texture sub-resources.
    pub fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, info: TextureCopyInfo) {
        debug_assert!(
            texture_copy_fits(src, dst, &info),
            "CopyPassRecorder::copy_texture_to_texture: {info:?} does not fit {src:?} -> {dst:?}"
        );
        self.command_buffer.record(Command::CopyTextureToTexture {
            src: src.raw(),
            dst: dst.raw(),
            info,
        });
    }

    /// Record resource state transitions.
    pub fn resource_barrier(&mut self, barriers: &[Barrier<'_>]) {
        self.command_buffer.record_barriers(barriers);
    }

    /// End the pass. Equivalent to dropping the recorder.
    pub fn end_pass(self) {
        drop(self);
    }
}

impl Drop for CopyPassRecorder<'_> {
    fn drop(&mut self) {
        self.command_buffer.record(Command::EndPass);
    }
}

impl fmt::Debug for CopyPassRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyPassRecorder")
            .field("command_buffer", &self.command_buffer.id)
            .finish()
    }
}

fn range_fits(offset: u64, size: u64, total: u64) -> bool {
    offset.checked_add(size).is_some_and(|end| end <= total)
}

fn buffer_copy_fits(src: &Buffer, dst: &Buffer, info: &BufferCopyInfo) -> bool {
    info.copy_size > 0
        && src.usages().contains(BufferUsage::COPY_SRC)
        && dst.usages().contains(BufferUsage::COPY_DST)
        && range_fits(info.src_offset, info.copy_size, src.size())
        && range_fits(info.dst_offset, info.copy_size, dst.size())
}

fn region_fits(
    texture: &Texture,
    sub_resource: TextureSubResourceInfo,
    origin: Origin3d,
    region: Extent3d,
) -> bool {
    if region.is_empty()
        || sub_resource.mip_level >= texture.mip_levels()
        || sub_resource.array_layer >= texture.array_layer_count()
        || !sub_resource.aspect.is_present_in(texture.format())
    {
        return false;
    }
    let extent = texture.copy_footprint(sub_resource).extent;
    let depth_fits = if texture.create_info().dimension == TextureDimension::D3 {
        range_fits(origin.z.into(), region.depth.into(), extent.depth.into())
    } else {
        origin.z == 0 && region.depth == 1
    };
    range_fits(origin.x.into(), region.width.into(), extent.width.into())
        && range_fits(origin.y.into(), region.height.into(), extent.height.into())
        && depth_fits
}

fn buffer_texture_copy_fits(
    buffer: &Buffer,
    texture: &Texture,
    info: &BufferTextureCopyInfo,
) -> bool {
    if !region_fits(texture, info.texture_sub_resource, info.texture_origin, info.copy_region) {
        return false;
    }
    let footprint = texture.copy_footprint(info.texture_sub_resource);
    let region = info.copy_region;
    let bytes = u64::from(region.depth - 1) * footprint.slice_pitch
        + u64::from(region.height - 1) * footprint.row_pitch
        + u64::from(region.width) * u64::from(footprint.bytes_per_pixel);
    range_fits(info.buffer_offset, bytes, buffer.size())
}

fn texture_copy_fits(src: &Texture, dst: &Texture, info: &TextureCopyInfo) -> bool {
    src.create_info().usages.contains(TextureUsage::COPY_SRC)
        && dst.create_info().usages.contains(TextureUsage::COPY_DST)
        && src.format().bytes_per_pixel() == dst.format().bytes_per_pixel()
        && region_fits(src, info.src_sub_resource, info.src_origin, info.copy_region)
        && region_fits(dst, info.dst_sub_resource, info.dst_origin, info.copy_region)
}

// ============================================================================
// Compute Pass
// ============================================================================

/// Recording scope of a compute pass.
pub struct ComputePassRecorder<'a> {
    command_buffer: &'a mut CommandBuffer,
    bind_group_layout_ids: Option<Vec<ObjectId>>,
}

impl ComputePassRecorder<'_> {
    /// Bind a compute pipeline.
    pub fn set_pipeline(&mut self, pipeline: &ComputePipeline) {
        self.bind_group_layout_ids = Some(pipeline.bind_group_layout_ids().to_vec());
        self.command_buffer
            .record(Command::SetComputePipeline(pipeline.raw()));
    }

    /// Bind `group` at group slot `layout_index`.
    ///
    /// The group must originate from the layout the bound pipeline declares
    /// at that slot.
    pub fn set_bind_group(&mut self, layout_index: u8, group: &BindGroup) {
        debug_assert!(
            check_bind_group(self.bind_group_layout_ids.as_deref(), layout_index, group),
            "ComputePassRecorder::set_bind_group: {group:?} does not match slot {layout_index} of the bound pipeline"
        );
        self.command_buffer.record(Command::SetBindGroup {
            layout_index,
            group: group.raw(),
        });
    }

    /// Dispatch `x * y * z` work groups.
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        debug_assert!(
            self.bind_group_layout_ids.is_some(),
            "ComputePassRecorder::dispatch: no pipeline bound"
        );
        self.command_buffer.record(Command::Dispatch { x, y, z });
    }

    /// Record resource state transitions.
    pub fn resource_barrier(&mut self, barriers: &[Barrier<'_>]) {
        self.command_buffer.record_barriers(barriers);
    }

    /// End the pass. Equivalent to dropping the recorder.
    pub fn end_pass(self) {
        drop(self);
    }
}

impl Drop for ComputePassRecorder<'_> {
    fn drop(&mut self) {
        self.command_buffer.record(Command::EndPass);
    }
}

impl fmt::Debug for ComputePassRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputePassRecorder")
            .field("command_buffer", &self.command_buffer.id)
            .field("pipeline_bound", &self.bind_group_layout_ids.is_some())
            .finish()
    }
}

// ============================================================================
// Raster Pass
// ============================================================================

/// Color attachment of a raster pass.
#[derive(Debug, Clone, Copy)]
pub struct ColorAttachment<'a> {
    pub view: &'a TextureView,
    /// Single-sample view the multisampled `view` resolves into.
    pub resolve_view: Option<&'a TextureView>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearColor,
}

impl<'a> ColorAttachment<'a> {
    /// Clear to black and store.
    pub fn new(view: &'a TextureView) -> Self {
        Self {
            view,
            resolve_view: None,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            clear_value: ClearColor::BLACK,
        }
    }

    pub fn with_resolve_view(mut self, view: &'a TextureView) -> Self {
        self.resolve_view = Some(view);
        self
    }

    pub fn with_load_op(mut self, load_op: LoadOp) -> Self {
        self.load_op = load_op;
        self
    }

    pub fn with_store_op(mut self, store_op: StoreOp) -> Self {
        self.store_op = store_op;
        self
    }

    /// Clear to `color` on load.
    pub fn with_clear_color(mut self, color: ClearColor) -> Self {
        self.load_op = LoadOp::Clear;
        self.clear_value = color;
        self
    }
}

/// Depth/stencil attachment of a raster pass.
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilAttachment<'a> {
    pub view: &'a TextureView,
    pub depth_read_only: bool,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub depth_clear_value: f32,
    pub stencil_read_only: bool,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub stencil_clear_value: u32,
}

impl<'a> DepthStencilAttachment<'a> {
    /// Clear depth to 1.0 and stencil to 0, store both.
    pub fn new(view: &'a TextureView) -> Self {
        Self {
            view,
            depth_read_only: false,
            depth_load_op: LoadOp::Clear,
            depth_store_op: StoreOp::Store,
            depth_clear_value: 1.0,
            stencil_read_only: false,
            stencil_load_op: LoadOp::Clear,
            stencil_store_op: StoreOp::Store,
            stencil_clear_value: 0,
        }
    }

    /// Set the depth load/store ops and clear value.
    pub fn with_depth(mut self, load_op: LoadOp, store_op: StoreOp, clear_value: f32) -> Self {
        self.depth_load_op = load_op;
        self.depth_store_op = store_op;
        self.depth_clear_value = clear_value;
        self
    }

    /// Set the stencil load/store ops and clear value.
    pub fn with_stencil(mut self, load_op: LoadOp, store_op: StoreOp, clear_value: u32) -> Self {
        self.stencil_load_op = load_op;
        self.stencil_store_op = store_op;
        self.stencil_clear_value = clear_value;
        self
    }

    /// Load both aspects and never write them.
    pub fn read_only(mut self) -> Self {
        self.depth_read_only = true;
        self.stencil_read_only = true;
        self.depth_load_op = LoadOp::Load;
        self.stencil_load_op = LoadOp::Load;
        self
    }
}

/// Attachments of a raster pass.
#[derive(Debug, Clone, Default)]
pub struct RasterPassBeginInfo<'a> {
    pub color_attachments: Vec<ColorAttachment<'a>>,
    pub depth_stencil_attachment: Option<DepthStencilAttachment<'a>>,
}

impl<'a> RasterPassBeginInfo<'a> {
    /// Create a pass with no attachments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a color attachment.
    pub fn with_color_attachment(mut self, attachment: ColorAttachment<'a>) -> Self {
        self.color_attachments.push(attachment);
        self
    }

    /// Set the depth/stencil attachment.
    pub fn with_depth_stencil_attachment(mut self, attachment: DepthStencilAttachment<'a>) -> Self {
        self.depth_stencil_attachment = Some(attachment);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.color_attachments.len() > FragmentState::MAX_COLOR_TARGETS {
            return Err(format!(
                "{} color attachments, at most {}",
                self.color_attachments.len(),
                FragmentState::MAX_COLOR_TARGETS
            ));
        }

        let mut size = None;
        let mut check_size = |view: &TextureView| {
            let extent = view.extent();
            let current = (extent.width, extent.height);
            match size {
                None => {
                    size = Some(current);
                    Ok(())
                }
                Some(expected) if expected == current => Ok(()),
                Some(expected) => Err(format!(
                    "attachment {:?} is {current:?}, expected {expected:?}",
                    view.id()
                )),
            }
        };

        for attachment in &self.color_attachments {
            if attachment.view.view_type() != TextureViewType::ColorAttachment {
                return Err(format!("{:?} is not a color attachment view", attachment.view.id()));
            }
            check_size(attachment.view)?;
            if let Some(resolve) = attachment.resolve_view {
                if attachment.view.samples() == 1 || resolve.samples() != 1 {
                    return Err(format!(
                        "resolve requires a multisampled source and single-sample target, got {} -> {}",
                        attachment.view.samples(),
                        resolve.samples()
                    ));
                }
                check_size(resolve)?;
            }
        }

        if let Some(attachment) = &self.depth_stencil_attachment {
            if attachment.view.view_type() != TextureViewType::DepthStencil {
                return Err(format!("{:?} is not a depth/stencil view", attachment.view.id()));
            }
            check_size(attachment.view)?;
        }

        Ok(())
    }
}

/// Recording scope of a raster pass.
pub struct RasterPassRecorder<'a> {
    command_buffer: &'a mut CommandBuffer,
    bind_group_layout_ids: Option<Vec<ObjectId>>,
    topology_type: Option<PrimitiveTopologyType>,
    has_index_buffer: bool,
}

impl RasterPassRecorder<'_> {
    /// Bind a raster pipeline.
    pub fn set_pipeline(&mut self, pipeline: &RasterPipeline) {
        self.bind_group_layout_ids = Some(pipeline.bind_group_layout_ids().to_vec());
        self.topology_type = Some(pipeline.topology_type());
        self.command_buffer
            .record(Command::SetRasterPipeline(pipeline.raw()));
    }

    /// Bind `group` at group slot `layout_index`.
    ///
    /// The group must originate from the layout the bound pipeline declares
    /// at that slot.
    pub fn set_bind_group(&mut self, layout_index: u8, group: &BindGroup) {
        debug_assert!(
            check_bind_group(self.bind_group_layout_ids.as_deref(), layout_index, group),
            "RasterPassRecorder::set_bind_group: {group:?} does not match slot {layout_index} of the bound pipeline"
        );
        self.command_buffer.record(Command::SetBindGroup {
            layout_index,
            group: group.raw(),
        });
    }

    /// Bind an index buffer view.
    pub fn set_index_buffer(&mut self, view: &BufferView) {
        debug_assert!(
            matches!(view.view_type(), BufferViewType::Index { .. }),
            "RasterPassRecorder::set_index_buffer: {view:?} is not an index view"
        );
        self.has_index_buffer = true;
        self.command_buffer.record(Command::SetIndexBuffer(view.raw()));
    }

    /// Bind a vertex buffer view at `slot`.
    pub fn set_vertex_buffer(&mut self, slot: u8, view: &BufferView) {
        debug_assert!(
            matches!(view.view_type(), BufferViewType::Vertex { .. }),
            "RasterPassRecorder::set_vertex_buffer: {view:?} is not a vertex view"
        );
        self.command_buffer.record(Command::SetVertexBuffer {
            slot,
            view: view.raw(),
        });
    }

    pub fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        debug_assert!(
            self.topology_type.is_some(),
            "RasterPassRecorder::draw: no pipeline bound"
        );
        self.command_buffer.record(Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
    }

    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        debug_assert!(
            self.topology_type.is_some() && self.has_index_buffer,
            "RasterPassRecorder::draw_indexed: pipeline or index buffer not bound"
        );
        self.command_buffer.record(Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            base_vertex,
            first_instance,
        });
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.command_buffer.record(Command::SetViewport(viewport));
    }

    pub fn set_scissor(&mut self, scissor: ScissorRect) {
        debug_assert!(
            scissor.left <= scissor.right && scissor.top <= scissor.bottom,
            "RasterPassRecorder::set_scissor: inverted rectangle {scissor:?}"
        );
        self.command_buffer.record(Command::SetScissor(scissor));
    }

    /// Set the topology; it must belong to the class the pipeline was built for.
    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        debug_assert!(
            self.topology_type.is_none_or(|ty| ty == topology.topology_type()),
            "RasterPassRecorder::set_primitive_topology: {topology:?} does not match pipeline topology {:?}",
            self.topology_type
        );
        self.command_buffer
            .record(Command::SetPrimitiveTopology(topology));
    }

    pub fn set_blend_constant(&mut self, color: ClearColor) {
        self.command_buffer.record(Command::SetBlendConstant(color));
    }

    pub fn set_stencil_reference(&mut self, reference: u32) {
        self.command_buffer
            .record(Command::SetStencilReference(reference));
    }

    /// Record resource state transitions.
    pub fn resource_barrier(&mut self, barriers: &[Barrier<'_>]) {
        self.command_buffer.record_barriers(barriers);
    }

    /// End the pass. Equivalent to dropping the recorder.
    pub fn end_pass(self) {
        drop(self);
    }
}

impl Drop for RasterPassRecorder<'_> {
    fn drop(&mut self) {
        self.command_buffer.record(Command::EndPass);
    }
}

impl fmt::Debug for RasterPassRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterPassRecorder")
            .field("command_buffer", &self.command_buffer.id)
            .field("topology_type", &self.topology_type)
            .finish()
    }
}

static_assertions::assert_impl_all!(CommandBuffer: Send, Sync);
