//! # Parallel Compute Demo
//!
//! Records one compute command buffer per job on its own thread, runs the
//! jobs on the compute queues, and chains a transfer queue readback behind
//! them with semaphores.
//!
//! ```bash
//! cargo run -p redlilium-rhi-demos --bin parallel_compute -- --jobs 4
//! ```

use clap::Parser;
use redlilium_rhi::{
    BindGroup, BindGroupCreateInfo, BindGroupEntry, BindGroupLayout, BindGroupLayoutCreateInfo,
    BindGroupLayoutEntry, BindingResource, BindingType, Barrier, Buffer, BufferCopyInfo,
    BufferCreateInfo, BufferState, BufferUsage, BufferView, BufferViewCreateInfo, BufferViewType,
    CommandBuffer, ComputePipeline, ComputePipelineCreateInfo, Device, MapMode,
    PipelineLayoutCreateInfo, QueueSubmitInfo, QueueType, ResourceBinding, RhiError, RhiResult,
    Semaphore, ShaderModuleCreateInfo, ShaderStage,
};
use redlilium_rhi_demos::{CommonArgs, DemoContext, init_logging};

const WORKGROUP_SIZE: u32 = 64;

#[derive(Parser, Debug)]
#[command(
    name = "parallel_compute",
    about = "Record compute work on several threads and chain it across queues",
    version
)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of independent jobs.
    #[arg(long, default_value = "4")]
    jobs: u32,

    /// Elements (u32) per job.
    #[arg(long, default_value = "4096")]
    elements: u32,

    /// Compute queues to spread the jobs over.
    #[arg(long, default_value = "2")]
    compute_queues: u8,
}

/// GPU resources of one job.
struct Job {
    data: Buffer,
    readback: Buffer,
    /// Kept alive for the bind group.
    _view: BufferView,
    bind_group: BindGroup,
    finished: Semaphore,
}

impl Job {
    fn new(device: &Device, args: &Args, index: u32, layout: &BindGroupLayout) -> RhiResult<Self> {
        let size = u64::from(args.elements) * 4;

        let mut data = device.create_buffer(
            &BufferCreateInfo::new(
                size,
                BufferUsage::RW_STORAGE | BufferUsage::COPY_SRC | BufferUsage::MAP_WRITE,
            )
            .with_label(format!("job {index} data")),
        )?;
        {
            let mut range = data.map(MapMode::Write, 0, size);
            for (i, chunk) in range.chunks_exact_mut(4).enumerate() {
                chunk.copy_from_slice(&(index * args.elements + i as u32).to_le_bytes());
            }
        }

        let readback = device.create_buffer(
            &BufferCreateInfo::new(size, BufferUsage::MAP_READ | BufferUsage::COPY_DST)
                .with_label(format!("job {index} readback")),
        )?;
        let view =
            data.create_view(&BufferViewCreateInfo::new(BufferViewType::RwStorageBinding, size))?;
        let bind_group = device.create_bind_group(
            &BindGroupCreateInfo::new(layout)
                .with_label(format!("job {index}"))
                .with_entry(BindGroupEntry::new(
                    BindingType::RwStorageBuffer,
                    ResourceBinding::glsl(0),
                    BindingResource::BufferView(&view),
                )),
        )?;

        Ok(Self {
            data,
            readback,
            _view: view,
            bind_group,
            finished: device.create_semaphore()?,
        })
    }

    fn record(
        &self,
        command_buffer: &mut CommandBuffer,
        pipeline: &ComputePipeline,
        elements: u32,
    ) {
        let mut recorder = command_buffer.begin();
        recorder.resource_barrier(&[Barrier::transition(
            &self.data,
            BufferState::Staging,
            BufferState::RwStorage,
        )]);
        {
            let mut pass = recorder.begin_compute_pass();
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group);
            pass.dispatch(elements.div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        recorder.resource_barrier(&[Barrier::transition(
            &self.data,
            BufferState::RwStorage,
            BufferState::CopySrc,
        )]);
    }
}

fn run(args: &Args) -> RhiResult<()> {
    let context = DemoContext::new(
        &args.common,
        &[
            (QueueType::Compute, args.compute_queues.max(1)),
            (QueueType::Transfer, 1),
        ],
    )?;
    let device = &context.device;
    let compute_queue_count = device.queue_count(QueueType::Compute);
    let transfer = device
        .queue(QueueType::Transfer, 0)
        .ok_or_else(|| RhiError::InitializationFailed("no transfer queue".to_string()))?;
    if compute_queue_count == 0 {
        return Err(RhiError::InitializationFailed("no compute queue".to_string()));
    }

    let group_layout = device.create_bind_group_layout(
        &BindGroupLayoutCreateInfo::new(0)
            .with_label("job data")
            .with_entry(BindGroupLayoutEntry::new(
                BindingType::RwStorageBuffer,
                ResourceBinding::glsl(0),
                ShaderStage::COMPUTE,
            )),
    )?;
    let layout = device.create_pipeline_layout(
        &PipelineLayoutCreateInfo::new().with_bind_group_layout(&group_layout),
    )?;
    let shader = device.create_shader_module(&ShaderModuleCreateInfo::new(
        "cs_main",
        vec![0x03, 0x02, 0x23, 0x07],
    ))?;
    let pipeline = device.create_compute_pipeline(
        &ComputePipelineCreateInfo::new(&layout, &shader).with_label("job"),
    )?;

    let jobs = (0..args.jobs)
        .map(|index| Job::new(device, args, index, &group_layout))
        .collect::<RhiResult<Vec<_>>>()?;
    let mut command_buffers = jobs
        .iter()
        .map(|_| device.create_command_buffer())
        .collect::<RhiResult<Vec<_>>>()?;

    // Every object is Send + Sync, so distinct command buffers record in parallel.
    std::thread::scope(|scope| {
        for (job, command_buffer) in jobs.iter().zip(command_buffers.iter_mut()) {
            let pipeline = &pipeline;
            scope.spawn(move || job.record(command_buffer, pipeline, args.elements));
        }
    });
    log::info!("Recorded {} jobs on {} threads", jobs.len(), jobs.len());

    for (i, (job, command_buffer)) in jobs.iter().zip(&command_buffers).enumerate() {
        let queue_index = (i % usize::from(compute_queue_count)) as u8;
        let Some(queue) = device.queue(QueueType::Compute, queue_index) else {
            continue;
        };
        queue.submit(command_buffer, &QueueSubmitInfo::new().with_signal_semaphore(&job.finished));
    }

    let mut readback_commands = device.create_command_buffer()?;
    {
        let mut recorder = readback_commands.begin();
        let mut pass = recorder.begin_copy_pass();
        for job in &jobs {
            pass.resource_barrier(&[Barrier::transition(
                &job.readback,
                BufferState::Undefined,
                BufferState::CopyDst,
            )]);
            let info = BufferCopyInfo::new(0, 0, job.data.size());
            pass.copy_buffer_to_buffer(&job.data, &job.readback, info);
        }
    }

    let done = device.create_fence(false)?;
    let submit_info = jobs
        .iter()
        .fold(QueueSubmitInfo::new(), |info, job| info.with_wait_semaphore(&job.finished))
        .with_signal_fence(&done);
    transfer.submit(&readback_commands, &submit_info);
    done.wait();

    let mut mismatches = 0;
    for (index, job) in jobs.into_iter().enumerate() {
        let mut readback = job.readback;
        let size = readback.size();
        let range = readback.map(MapMode::Read, 0, size);
        let first = u32::from_le_bytes([range[0], range[1], range[2], range[3]]);
        let expected = index as u32 * args.elements;
        if first != expected {
            mismatches += 1;
            log::warn!("Job {index}: first element {first}, expected {expected}");
        }
    }

    log::info!(
        "{} jobs finished across {} compute queue(s), {} mismatching",
        args.jobs,
        compute_queue_count,
        mismatches
    );
    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("Parallel compute demo failed: {e}");
        std::process::exit(1);
    }
}
