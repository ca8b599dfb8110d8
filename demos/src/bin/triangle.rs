//! # Triangle Demo
//!
//! Uploads one triangle through a staging buffer and draws it into a
//! double-buffered swapchain for a fixed number of frames.
//!
//! ```bash
//! cargo run -p redlilium-rhi-demos --bin triangle -- --frames 120
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use redlilium_rhi::{
    Barrier, BufferCopyInfo, BufferCreateInfo, BufferState, BufferUsage, BufferViewCreateInfo,
    BufferViewType, ClearColor, ColorAttachment, ColorTargetState, Device, Extent2d,
    FragmentState, LoadOp, MapMode, PipelineLayoutCreateInfo, PresentMode, PrimitiveTopology,
    QueueSubmitInfo, QueueType, RasterPassBeginInfo, RasterPipelineCreateInfo, RhiError,
    RhiResult, ScissorRect, ShaderModule, ShaderModuleCreateInfo, SurfaceCreateInfo,
    SwapChainCreateInfo, TextureState, TextureViewCreateInfo, TextureViewDimension,
    TextureViewType, VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, Viewport,
};
use redlilium_rhi_demos::{CommonArgs, DemoContext, headless_window, init_logging};

/// Position (xyz) and color (rgb) per vertex.
const VERTICES: [[f32; 6]; 3] = [
    [0.0, 0.5, 0.0, 1.0, 0.0, 0.0],
    [0.5, -0.5, 0.0, 0.0, 1.0, 0.0],
    [-0.5, -0.5, 0.0, 0.0, 0.0, 1.0],
];
const VERTEX_STRIDE: u32 = 6 * 4;

/// Stand-in byte code accepted by the dummy backend.
const PLACEHOLDER_BYTE_CODE: [u8; 4] = [0x03, 0x02, 0x23, 0x07];

#[derive(Parser, Debug)]
#[command(name = "triangle", about = "Draw a triangle into a swapchain", version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of frames to render.
    #[arg(long, default_value = "60")]
    frames: u32,

    #[arg(long, default_value = "1280")]
    width: u32,

    #[arg(long, default_value = "720")]
    height: u32,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    no_vsync: bool,

    /// Pre-compiled vertex shader (entry point `vs_main`).
    #[arg(long)]
    vertex_shader: Option<PathBuf>,

    /// Pre-compiled pixel shader (entry point `ps_main`).
    #[arg(long)]
    pixel_shader: Option<PathBuf>,
}

fn load_shader(device: &Device, path: Option<&Path>, entry_point: &str) -> RhiResult<ShaderModule> {
    let byte_code = match path {
        Some(path) => std::fs::read(path).map_err(|e| {
            RhiError::InvalidParameter(format!("cannot read shader {}: {e}", path.display()))
        })?,
        None => PLACEHOLDER_BYTE_CODE.to_vec(),
    };
    device.create_shader_module(
        &ShaderModuleCreateInfo::new(entry_point, byte_code).with_label(entry_point),
    )
}

fn vertex_bytes() -> Vec<u8> {
    VERTICES
        .iter()
        .flatten()
        .flat_map(|value| value.to_le_bytes())
        .collect()
}

fn run(args: &Args) -> RhiResult<()> {
    let context = DemoContext::new(&args.common, &[(QueueType::Graphics, 1)])?;
    let device = &context.device;
    let queue = device
        .queue(QueueType::Graphics, 0)
        .ok_or_else(|| RhiError::InitializationFailed("no graphics queue".to_string()))?;

    // Presentation
    let surface = device.create_surface(&SurfaceCreateInfo::new(headless_window()))?;
    let extent = Extent2d::new(args.width, args.height);
    let present_mode = if args.no_vsync {
        PresentMode::Immediately
    } else {
        PresentMode::Vsync
    };
    let mut swap_chain = device.create_swap_chain(
        &SwapChainCreateInfo::new(queue, &surface, extent).with_present_mode(present_mode),
    )?;
    log::info!(
        "Swapchain: {} x {:?} textures, {:?}",
        swap_chain.texture_count(),
        swap_chain.format(),
        swap_chain.present_mode()
    );

    // Pipeline
    let vs = load_shader(device, args.vertex_shader.as_deref(), "vs_main")?;
    let ps = load_shader(device, args.pixel_shader.as_deref(), "ps_main")?;
    let layout =
        device.create_pipeline_layout(&PipelineLayoutCreateInfo::new().with_label("triangle"))?;
    let pipeline = device.create_raster_pipeline(
        &RasterPipelineCreateInfo::new(&layout, &vs)
            .with_label("triangle")
            .with_pixel_shader(&ps)
            .with_vertex_state(
                VertexState::default().with_buffer_layout(
                    VertexBufferLayout::new(VERTEX_STRIDE)
                        .with_attribute(VertexAttribute::new(
                            "POSITION",
                            0,
                            VertexFormat::Float32X3,
                            0,
                        ))
                        .with_attribute(VertexAttribute::new(
                            "COLOR",
                            0,
                            VertexFormat::Float32X3,
                            12,
                        )),
                ),
            )
            .with_fragment_state(
                FragmentState::default()
                    .with_color_target(ColorTargetState::new(swap_chain.format())),
            ),
    )?;

    // Vertex upload
    let vertices = vertex_bytes();
    let size = vertices.len() as u64;
    let mut staging = device.create_buffer(
        &BufferCreateInfo::new(size, BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC)
            .with_label("triangle staging")
            .with_initial_state(BufferState::Staging),
    )?;
    staging.map(MapMode::Write, 0, size).copy_from_slice(&vertices);

    let vertex_buffer = device.create_buffer(
        &BufferCreateInfo::new(size, BufferUsage::VERTEX | BufferUsage::COPY_DST)
            .with_label("triangle vertices"),
    )?;
    let vertex_view = vertex_buffer.create_view(&BufferViewCreateInfo::new(
        BufferViewType::Vertex {
            stride: VERTEX_STRIDE,
        },
        size,
    ))?;

    let upload_fence = device.create_fence(false)?;
    let mut upload = device.create_command_buffer()?;
    {
        let mut recorder = upload.begin();
        recorder.resource_barrier(&[
            Barrier::transition(&staging, BufferState::Staging, BufferState::CopySrc),
            Barrier::transition(&vertex_buffer, BufferState::Undefined, BufferState::CopyDst),
        ]);
        recorder
            .begin_copy_pass()
            .copy_buffer_to_buffer(&staging, &vertex_buffer, BufferCopyInfo::new(0, 0, size));
        recorder.resource_barrier(&[Barrier::transition(
            &vertex_buffer,
            BufferState::CopyDst,
            BufferState::ShaderReadOnly,
        )]);
    }
    queue.submit(&upload, &QueueSubmitInfo::new().with_signal_fence(&upload_fence));
    upload_fence.wait();
    staging.destroy();
    log::info!("Uploaded {} vertex bytes", size);

    // Frame loop
    let image_available = device.create_semaphore()?;
    let render_finished = device.create_semaphore()?;
    let frame_fence = device.create_fence(true)?;
    let mut command_buffer = device.create_command_buffer()?;

    for frame in 0..args.frames {
        frame_fence.wait();
        frame_fence.reset();

        let index = swap_chain.acquire_back_texture(&image_available);
        let texture = swap_chain.texture(index);
        let target = texture.create_view(&TextureViewCreateInfo::new(
            TextureViewType::ColorAttachment,
            TextureViewDimension::D2,
        ))?;

        {
            let mut recorder = command_buffer.begin();
            recorder.resource_barrier(&[Barrier::transition(
                texture,
                TextureState::Undefined,
                TextureState::RenderTarget,
            )]);
            {
                let pass_info = RasterPassBeginInfo::new().with_color_attachment(
                    ColorAttachment::new(&target)
                        .with_load_op(LoadOp::Clear)
                        .with_clear_color(ClearColor::new(0.1, 0.1, 0.12, 1.0)),
                );
                let mut pass = recorder.begin_raster_pass(&pass_info);
                pass.set_pipeline(&pipeline);
                pass.set_viewport(Viewport::new(args.width as f32, args.height as f32));
                pass.set_scissor(ScissorRect::new(0, 0, args.width, args.height));
                pass.set_primitive_topology(PrimitiveTopology::TriangleList);
                pass.set_vertex_buffer(0, &vertex_view);
                pass.draw(3, 1, 0, 0);
            }
            recorder.resource_barrier(&[Barrier::transition(
                texture,
                TextureState::RenderTarget,
                TextureState::Present,
            )]);
        }

        queue.submit(
            &command_buffer,
            &QueueSubmitInfo::new()
                .with_wait_semaphore(&image_available)
                .with_signal_semaphore(&render_finished)
                .with_signal_fence(&frame_fence),
        );
        swap_chain.present(&render_finished);

        if frame % 30 == 0 {
            log::debug!("Frame {} presented texture {}", frame, index);
        }
    }

    frame_fence.wait();
    log::info!("Rendered {} frames", args.frames);
    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("Triangle demo failed: {e}");
        std::process::exit(1);
    }
}
