use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_rhi::{
    BindGroupLayoutCreateInfo, BindGroupLayoutEntry, BindingType, BufferCopyInfo,
    BufferCreateInfo, BufferUsage, ComputePipelineCreateInfo, Device, DeviceCreateInfo, Instance,
    PipelineCache, PipelineLayoutCreateInfo, PixelFormat, QueueSubmitInfo, QueueType,
    ResourceBinding, RhiType, ShaderModuleCreateInfo, ShaderStage, TextureCreateInfo,
    TextureUsage,
};

fn dummy_device() -> Device {
    let instance = Instance::get_by_type(RhiType::Dummy).expect("dummy backend");
    let gpu = instance.gpu(0).expect("dummy gpu");
    gpu.request_device(
        &DeviceCreateInfo::new()
            .with_queue_request(QueueType::Graphics, 1)
            .with_queue_request(QueueType::Transfer, 1),
    )
    .expect("dummy device")
}

// ---------------------------------------------------------------------------
// Resource creation
// ---------------------------------------------------------------------------

fn bench_dummy_create_buffer(c: &mut Criterion) {
    let device = dummy_device();

    c.bench_function("dummy_create_buffer_1kb", |b| {
        b.iter(|| {
            black_box(
                device
                    .create_buffer(&BufferCreateInfo::new(1024, BufferUsage::VERTEX))
                    .unwrap(),
            );
        });
    });
}

fn bench_dummy_create_texture(c: &mut Criterion) {
    let device = dummy_device();

    c.bench_function("dummy_create_texture_256x256", |b| {
        b.iter(|| {
            black_box(
                device
                    .create_texture(&TextureCreateInfo::new_2d(
                        256,
                        256,
                        PixelFormat::Rgba8Unorm,
                        TextureUsage::TEXTURE_BINDING,
                    ))
                    .unwrap(),
            );
        });
    });
}

// ---------------------------------------------------------------------------
// Recording and submission
// ---------------------------------------------------------------------------

fn bench_record_copy_pass(c: &mut Criterion) {
    let device = dummy_device();
    let src = device
        .create_buffer(&BufferCreateInfo::new(64 * 1024, BufferUsage::COPY_SRC))
        .unwrap();
    let dst = device
        .create_buffer(&BufferCreateInfo::new(64 * 1024, BufferUsage::COPY_DST))
        .unwrap();
    let mut command_buffer = device.create_command_buffer().unwrap();

    c.bench_function("record_copy_pass_64_copies", |b| {
        b.iter(|| {
            let mut recorder = command_buffer.begin();
            let mut pass = recorder.begin_copy_pass();
            for i in 0..64 {
                let info = BufferCopyInfo::new(i * 1024, i * 1024, 1024);
                pass.copy_buffer_to_buffer(&src, &dst, info);
            }
        });
        black_box(command_buffer.command_count());
    });
}

fn bench_submit_and_wait(c: &mut Criterion) {
    let device = dummy_device();
    let queue = device.queue(QueueType::Transfer, 0).unwrap();
    let src = device
        .create_buffer(&BufferCreateInfo::new(4096, BufferUsage::COPY_SRC))
        .unwrap();
    let dst = device
        .create_buffer(&BufferCreateInfo::new(4096, BufferUsage::COPY_DST))
        .unwrap();
    let fence = device.create_fence(false).unwrap();
    let mut command_buffer = device.create_command_buffer().unwrap();
    {
        let mut recorder = command_buffer.begin();
        recorder
            .begin_copy_pass()
            .copy_buffer_to_buffer(&src, &dst, BufferCopyInfo::new(0, 0, 4096));
    }

    c.bench_function("submit_4kb_copy_and_wait", |b| {
        b.iter(|| {
            queue.submit(&command_buffer, &QueueSubmitInfo::new().with_signal_fence(&fence));
            fence.wait();
            fence.reset();
        });
    });
}

// ---------------------------------------------------------------------------
// Pipeline cache
// ---------------------------------------------------------------------------

fn bench_pipeline_cache_hit(c: &mut Criterion) {
    let device = dummy_device();
    let group_layout = device
        .create_bind_group_layout(&BindGroupLayoutCreateInfo::new(0).with_entry(
            BindGroupLayoutEntry::new(
                BindingType::RwStorageBuffer,
                ResourceBinding::glsl(0),
                ShaderStage::COMPUTE,
            ),
        ))
        .unwrap();
    let layout = device
        .create_pipeline_layout(
            &PipelineLayoutCreateInfo::new().with_bind_group_layout(&group_layout),
        )
        .unwrap();
    let shader = device
        .create_shader_module(&ShaderModuleCreateInfo::new("cs_main", vec![0u8; 64]))
        .unwrap();
    let info = ComputePipelineCreateInfo::new(&layout, &shader);
    let mut cache = PipelineCache::new();

    c.bench_function("pipeline_cache_compute_hit", |b| {
        b.iter(|| {
            black_box(cache.get_or_create_compute(&device, &info).unwrap().id());
        });
    });
}

criterion_group!(
    benches,
    bench_dummy_create_buffer,
    bench_dummy_create_texture,
    bench_record_copy_pass,
    bench_submit_and_wait,
    bench_pipeline_cache_hit,
);
criterion_main!(benches);
