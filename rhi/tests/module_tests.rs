//! Module loader and debug hook tests.
//!
//! These tests mutate the process-wide registry, so they run serialized.

use std::sync::Arc;

use parking_lot::Mutex;
use redlilium_rhi::backend::dummy::{DummyModule, DummyParameters};
use redlilium_rhi::{
    Barrier, BufferCreateInfo, BufferState, BufferUsage, DebugMessageSeverity, DeviceCreateInfo,
    Instance, InstanceParameters, QueueType, RhiType, clear_debug_callback, is_instance_loaded,
    register_backend_module, set_debug_callback, set_instance_parameters,
};

static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_instance_is_cached_until_unloaded() {
    let _guard = REGISTRY_LOCK.lock();
    init_logger();
    Instance::unload_all_instances();

    let first = Instance::get_by_type(RhiType::Dummy).unwrap();
    let second = Instance::get_by_type(RhiType::Dummy).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(is_instance_loaded(RhiType::Dummy));

    assert!(Instance::unload_by_type(RhiType::Dummy));
    assert!(!Instance::unload_by_type(RhiType::Dummy));
    assert!(!is_instance_loaded(RhiType::Dummy));

    // Outstanding handles stay usable after unloading.
    assert_eq!(first.rhi_type(), RhiType::Dummy);
    let third = Instance::get_by_type(RhiType::Dummy).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}

#[test]
fn test_replacing_a_module() {
    let _guard = REGISTRY_LOCK.lock();
    init_logger();
    Instance::unload_all_instances();

    let previous = register_backend_module(Box::new(DummyModule::new(
        DummyParameters::default().with_gpu_count(3),
    )));
    assert!(previous.is_some());
    assert_eq!(Instance::get_by_type(RhiType::Dummy).unwrap().gpu_count(), 3);

    register_backend_module(Box::new(DummyModule::default()));
    Instance::unload_all_instances();
    assert_eq!(Instance::get_by_type(RhiType::Dummy).unwrap().gpu_count(), 1);
}

#[test]
fn test_platform_backend_override() {
    let _guard = REGISTRY_LOCK.lock();
    init_logger();
    Instance::unload_all_instances();

    set_instance_parameters(InstanceParameters::new().with_backend(RhiType::Dummy));
    let instance = Instance::get_by_platform().unwrap();
    assert_eq!(instance.rhi_type(), RhiType::Dummy);
    assert_eq!(instance.parameters().backend, Some(RhiType::Dummy));

    set_instance_parameters(InstanceParameters::new());
    Instance::unload_all_instances();
}

#[test]
fn test_validation_messages_reach_callback() {
    let _guard = REGISTRY_LOCK.lock();
    init_logger();
    Instance::unload_all_instances();
    set_instance_parameters(InstanceParameters::new().with_validation(true));

    let messages: Arc<Mutex<Vec<(DebugMessageSeverity, String)>>> = Arc::default();
    let sink = Arc::clone(&messages);
    set_debug_callback(move |message| {
        sink.lock().push((message.severity, message.message.to_string()));
    });

    let instance = Instance::get_by_type(RhiType::Dummy).unwrap();
    let device = instance
        .gpu(0)
        .unwrap()
        .request_device(&DeviceCreateInfo::new().with_queue_request(QueueType::Graphics, 1))
        .unwrap();

    // Frontend validation failures are reported as errors.
    assert!(device.create_buffer(&BufferCreateInfo::new(0, BufferUsage::UNIFORM)).is_err());

    // Backend validation reports a redundant barrier.
    let buffer = device
        .create_buffer(&BufferCreateInfo::new(16, BufferUsage::STORAGE))
        .unwrap();
    let mut command_buffer = device.create_command_buffer().unwrap();
    command_buffer.begin().resource_barrier(&[Barrier::transition(
        &buffer,
        BufferState::Storage,
        BufferState::Storage,
    )]);

    clear_debug_callback();
    set_instance_parameters(InstanceParameters::new());
    Instance::unload_all_instances();

    let messages = messages.lock();
    assert!(messages.iter().any(|(severity, _)| *severity == DebugMessageSeverity::Error));
    assert!(messages.iter().any(|(severity, text)| {
        *severity == DebugMessageSeverity::Warning && text.contains("redundant")
    }));
}
