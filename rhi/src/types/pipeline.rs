//! Fixed-function pipeline state and shader module create info.

use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use super::{CompareFunction, IndexFormat, PixelFormat, VertexFormat};

bitflags! {
    /// Color channels written by a color target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWrite: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const RGB = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
        const ALL = Self::RGB.bits() | Self::ALPHA.bits();
    }
}

impl Default for ColorWrite {
    fn default() -> Self {
        Self::ALL
    }
}

/// Create info for a shader module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderModuleCreateInfo {
    /// Debug label for the module.
    pub label: Option<String>,
    /// Entry point function name.
    pub entry_point: String,
    /// Pre-compiled byte code (DXIL, SPIR-V, ...).
    pub byte_code: Vec<u8>,
}

impl ShaderModuleCreateInfo {
    /// Create a shader module create info.
    pub fn new(entry_point: impl Into<String>, byte_code: impl Into<Vec<u8>>) -> Self {
        Self {
            label: None,
            entry_point: entry_point.into(),
            byte_code: byte_code.into(),
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// ============================================================================
// Vertex State
// ============================================================================

/// Rate at which a vertex buffer advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    #[default]
    PerVertex,
    PerInstance,
}

/// One attribute inside a vertex buffer layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader semantic, e.g. `POSITION`.
    pub semantic_name: String,
    /// Semantic index, e.g. 1 for `TEXCOORD1`.
    pub semantic_index: u8,
    pub format: VertexFormat,
    /// Byte offset inside one element.
    pub offset: u32,
}

impl VertexAttribute {
    /// Create a vertex attribute.
    pub fn new(
        semantic_name: impl Into<String>,
        semantic_index: u8,
        format: VertexFormat,
        offset: u32,
    ) -> Self {
        Self {
            semantic_name: semantic_name.into(),
            semantic_index,
            format,
            offset,
        }
    }
}

/// Layout of one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexBufferLayout {
    pub stride: u32,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// Create an empty per-vertex layout with the given stride.
    pub fn new(stride: u32) -> Self {
        Self {
            stride,
            step_mode: VertexStepMode::PerVertex,
            attributes: Vec::new(),
        }
    }

    /// Set the step mode.
    pub fn with_step_mode(mut self, step_mode: VertexStepMode) -> Self {
        self.step_mode = step_mode;
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Vertex input of a raster pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexState {
    pub buffer_layouts: Vec<VertexBufferLayout>,
}

impl VertexState {
    /// Add a vertex buffer layout.
    pub fn with_buffer_layout(mut self, layout: VertexBufferLayout) -> Self {
        self.buffer_layouts.push(layout);
        self
    }
}

// ============================================================================
// Primitive State
// ============================================================================

/// Primitive class a raster pipeline is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopologyType {
    Point,
    Line,
    #[default]
    Triangle,
}

/// Concrete primitive topology, set while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    LineListAdj,
    LineStripAdj,
    TriangleListAdj,
    TriangleStripAdj,
}

impl PrimitiveTopology {
    /// Primitive class of the topology.
    pub fn topology_type(&self) -> PrimitiveTopologyType {
        match self {
            Self::PointList => PrimitiveTopologyType::Point,
            Self::LineList | Self::LineStrip | Self::LineListAdj | Self::LineStripAdj => {
                PrimitiveTopologyType::Line
            }
            Self::TriangleList
            | Self::TriangleStrip
            | Self::TriangleListAdj
            | Self::TriangleStripAdj => PrimitiveTopologyType::Triangle,
        }
    }
}

/// Winding order of front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    Ccw,
    Cw,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

/// Primitive assembly and rasterization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrimitiveState {
    pub topology_type: PrimitiveTopologyType,
    /// Index format used for strip restart.
    pub strip_index_format: IndexFormat,
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
    pub depth_clip: bool,
}

// ============================================================================
// Depth / Stencil State
// ============================================================================

/// Stencil operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Invert,
    IncrementClamp,
    DecrementClamp,
    IncrementWrap,
    DecrementWrap,
}

/// Stencil test of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    pub compare: CompareFunction,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
        }
    }
}

/// Depth and stencil test state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    pub depth_enabled: bool,
    pub stencil_enabled: bool,
    /// Format of the depth/stencil attachment.
    pub format: PixelFormat,
    pub depth_compare: CompareFunction,
    pub stencil_front: StencilFaceState,
    pub stencil_back: StencilFaceState,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub depth_bias: i32,
    pub depth_bias_slope_scale: f32,
    pub depth_bias_clamp: f32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enabled: false,
            stencil_enabled: false,
            format: PixelFormat::D24UnormS8Uint,
            depth_compare: CompareFunction::Always,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            depth_bias: 0,
            depth_bias_slope_scale: 0.0,
            depth_bias_clamp: 0.0,
        }
    }
}

impl DepthStencilState {
    /// Depth test with writes for the given format and compare function.
    pub fn depth(format: PixelFormat, compare: CompareFunction) -> Self {
        Self {
            depth_enabled: true,
            format,
            depth_compare: compare,
            ..Default::default()
        }
    }

    /// Whether any test is enabled.
    pub fn is_enabled(&self) -> bool {
        self.depth_enabled || self.stencil_enabled
    }
}

impl Eq for DepthStencilState {}

impl Hash for DepthStencilState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth_enabled.hash(state);
        self.stencil_enabled.hash(state);
        self.format.hash(state);
        self.depth_compare.hash(state);
        self.stencil_front.hash(state);
        self.stencil_back.hash(state);
        self.stencil_read_mask.hash(state);
        self.stencil_write_mask.hash(state);
        self.depth_bias.hash(state);
        self.depth_bias_slope_scale.to_bits().hash(state);
        self.depth_bias_clamp.to_bits().hash(state);
    }
}

// ============================================================================
// Multisample / Fragment State
// ============================================================================

/// Multisampling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultiSampleState {
    pub count: u32,
    pub mask: u32,
    pub alpha_to_coverage: bool,
}

impl Default for MultiSampleState {
    fn default() -> Self {
        Self {
            count: 1,
            mask: u32::MAX,
            alpha_to_coverage: false,
        }
    }
}

/// Blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    Src,
    OneMinusSrc,
    SrcAlpha,
    OneMinusSrcAlpha,
    Dst,
    OneMinusDst,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend equation of one channel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    pub op: BlendOp,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl BlendComponent {
    /// `src * 1 + dst * 0`.
    pub const REPLACE: Self = Self {
        op: BlendOp::Add,
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
    };

    /// Standard alpha blending.
    pub const OVER: Self = Self {
        op: BlendOp::Add,
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };
}

impl Default for BlendComponent {
    fn default() -> Self {
        Self::REPLACE
    }
}

/// Blend state of a color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard alpha blending on color, additive coverage on alpha.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent::OVER,
        alpha: BlendComponent {
            op: BlendOp::Add,
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
        },
    };
}

/// One color output of a raster pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorTargetState {
    pub format: PixelFormat,
    /// `None` disables blending.
    pub blend: Option<BlendState>,
    pub write_mask: ColorWrite,
}

impl ColorTargetState {
    /// Opaque target of the given format.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            blend: None,
            write_mask: ColorWrite::ALL,
        }
    }

    /// Set the blend state.
    pub fn with_blend(mut self, blend: BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    /// Set the write mask.
    pub fn with_write_mask(mut self, write_mask: ColorWrite) -> Self {
        self.write_mask = write_mask;
        self
    }
}

/// Color outputs of a raster pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FragmentState {
    pub color_targets: Vec<ColorTargetState>,
}

impl FragmentState {
    /// Maximum number of simultaneous color targets.
    pub const MAX_COLOR_TARGETS: usize = 8;

    /// Add a color target.
    pub fn with_color_target(mut self, target: ColorTargetState) -> Self {
        self.color_targets.push(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_depth_stencil_hash_tracks_bias() {
        let a = DepthStencilState::depth(PixelFormat::D32Float, CompareFunction::Less);
        let mut b = a;
        assert_eq!(hash_of(&a), hash_of(&b));
        b.depth_bias_slope_scale = 1.5;
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_topology_type() {
        assert_eq!(
            PrimitiveTopology::TriangleStrip.topology_type(),
            PrimitiveTopologyType::Triangle
        );
        assert_eq!(
            PrimitiveTopology::LineListAdj.topology_type(),
            PrimitiveTopologyType::Line
        );
    }

    #[test]
    fn test_color_write_defaults_to_all() {
        let target = ColorTargetState::new(PixelFormat::Bgra8Unorm);
        assert_eq!(target.write_mask, ColorWrite::ALL);
        assert!(target.blend.is_none());
    }
}
