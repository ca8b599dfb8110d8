//! Backend module registry.
//!
//! Backend modules register themselves in a process-wide registry. An
//! [`Instance`] is created the first time its kind is requested and then
//! cached until it is unloaded, so every caller shares one instance per kind.
//!
//! Built-in modules (the dummy backend with the `dummy` feature) are
//! registered on first use of the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::backend::InstanceBackend;
use crate::config::InstanceParameters;
use crate::instance::Instance;
use crate::types::RhiType;

/// A loadable backend.
pub trait BackendModule: Send + Sync {
    /// The API family this module implements.
    fn rhi_type(&self) -> RhiType;

    /// Human-readable module name.
    fn module_name(&self) -> &str;

    /// Create the backend instance, or `None` if the native API is unavailable.
    fn create_instance(&self, parameters: &InstanceParameters) -> Option<Box<dyn InstanceBackend>>;
}

struct ModuleRegistry {
    modules: HashMap<RhiType, Box<dyn BackendModule>>,
    instances: HashMap<RhiType, Arc<Instance>>,
    parameters: InstanceParameters,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("instances", &self.instances.keys().collect::<Vec<_>>())
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl ModuleRegistry {
    fn with_builtin_modules() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self {
            modules: HashMap::new(),
            instances: HashMap::new(),
            parameters: InstanceParameters::from_env(),
        };

        #[cfg(feature = "dummy")]
        registry.modules.insert(
            RhiType::Dummy,
            Box::new(crate::backend::dummy::DummyModule::default()),
        );

        registry
    }
}

fn registry() -> &'static RwLock<ModuleRegistry> {
    static REGISTRY: OnceLock<RwLock<ModuleRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(ModuleRegistry::with_builtin_modules()))
}

/// Register a backend module, replacing any module of the same kind.
///
/// An instance already loaded from the replaced module stays cached until it
/// is unloaded. Returns the replaced module.
pub fn register_backend_module(module: Box<dyn BackendModule>) -> Option<Box<dyn BackendModule>> {
    let kind = module.rhi_type();
    log::debug!("Registering RHI module '{}' for {kind}", module.module_name());
    registry().write().modules.insert(kind, module)
}

/// Whether a module is registered for `kind`.
pub fn is_module_registered(kind: RhiType) -> bool {
    registry().read().modules.contains_key(&kind)
}

/// Whether an instance of `kind` is currently loaded.
pub fn is_instance_loaded(kind: RhiType) -> bool {
    registry().read().instances.contains_key(&kind)
}

/// Set the parameters used for instances loaded from now on.
///
/// The initial parameters are read with [`InstanceParameters::from_env`].
pub fn set_instance_parameters(parameters: InstanceParameters) {
    registry().write().parameters = parameters;
}

/// The parameters used for instances loaded from now on.
pub fn instance_parameters() -> InstanceParameters {
    registry().read().parameters.clone()
}

pub(crate) fn load_instance(kind: RhiType) -> Option<Arc<Instance>> {
    if let Some(instance) = registry().read().instances.get(&kind) {
        return Some(Arc::clone(instance));
    }

    let mut registry = registry().write();
    // Another thread may have loaded it between the two locks.
    if let Some(instance) = registry.instances.get(&kind) {
        return Some(Arc::clone(instance));
    }

    let Some(module) = registry.modules.get(&kind) else {
        log::warn!("No RHI module registered for {kind}");
        return None;
    };

    log::info!("Loading RHI module '{}'", module.module_name());
    let Some(raw) = module.create_instance(&registry.parameters) else {
        log::warn!("RHI module '{}' failed to create an instance", module.module_name());
        return None;
    };

    let instance = Arc::new(Instance::new(raw, registry.parameters.clone()));
    registry.instances.insert(kind, Arc::clone(&instance));
    Some(instance)
}

pub(crate) fn unload_instance(kind: RhiType) -> bool {
    let removed = registry().write().instances.remove(&kind);
    if removed.is_some() {
        log::info!("Unloaded RHI instance {kind}");
    }
    removed.is_some()
}

pub(crate) fn unload_all() {
    let unloaded: Vec<RhiType> = registry()
        .write()
        .instances
        .drain()
        .map(|(kind, _)| kind)
        .collect();
    for kind in unloaded {
        log::info!("Unloaded RHI instance {kind}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct UnavailableModule;

    impl BackendModule for UnavailableModule {
        fn rhi_type(&self) -> RhiType {
            RhiType::Metal
        }

        fn module_name(&self) -> &str {
            "unavailable"
        }

        fn create_instance(&self, _: &InstanceParameters) -> Option<Box<dyn InstanceBackend>> {
            None
        }
    }

    #[test]
    fn test_unavailable_module_yields_none() {
        register_backend_module(Box::new(UnavailableModule));
        assert!(is_module_registered(RhiType::Metal));
        assert!(load_instance(RhiType::Metal).is_none());
        assert!(!is_instance_loaded(RhiType::Metal));
    }

    #[test]
    fn test_unregistered_kind_yields_none() {
        assert!(load_instance(RhiType::DirectX12).is_none());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_is_builtin() {
        assert!(is_module_registered(RhiType::Dummy));
    }
}
