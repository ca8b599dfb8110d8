//! Instance configuration.

use crate::types::RhiType;

/// Environment variable overriding the platform backend.
pub const BACKEND_ENV_VAR: &str = "REDLILIUM_RHI_BACKEND";
/// Environment variable toggling backend validation.
pub const VALIDATION_ENV_VAR: &str = "REDLILIUM_RHI_VALIDATION";

/// Parameters applied to backend instances when they are loaded.
///
/// # Example
///
/// ```ignore
/// rhi::set_instance_parameters(
///     InstanceParameters::new()
///         .with_backend(RhiType::Dummy)
///         .with_validation(true),
/// );
/// let instance = Instance::get_by_platform().expect("no backend");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceParameters {
    /// Backend used by [`Instance::get_by_platform`](crate::Instance::get_by_platform)
    /// instead of the platform default.
    pub backend: Option<RhiType>,
    /// Enable backend validation and debug message reporting.
    pub validation: bool,
    /// Application name reported to the driver.
    pub application_name: String,
}

impl Default for InstanceParameters {
    fn default() -> Self {
        Self {
            backend: None,
            validation: cfg!(debug_assertions),
            application_name: "RedLilium".to_string(),
        }
    }
}

impl InstanceParameters {
    /// Create parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from [`BACKEND_ENV_VAR`] and [`VALIDATION_ENV_VAR`].
    ///
    /// Unknown values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(BACKEND_ENV_VAR).ok().as_deref(),
            std::env::var(VALIDATION_ENV_VAR).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, backend: Option<&str>, validation: Option<&str>) -> Self {
        if let Some(value) = backend {
            match value.parse::<RhiType>() {
                Ok(kind) => self.backend = Some(kind),
                Err(e) => log::warn!("Ignoring {BACKEND_ENV_VAR}: {e}"),
            }
        }

        if let Some(value) = validation {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => self.validation = true,
                "0" | "false" | "off" => self.validation = false,
                other => log::warn!("Ignoring {VALIDATION_ENV_VAR}: unknown value '{other}'"),
            }
        }

        self
    }

    /// Set the backend override.
    pub fn with_backend(mut self, backend: RhiType) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Enable or disable validation.
    pub fn with_validation(mut self, validation: bool) -> Self {
        self.validation = validation;
        self
    }

    /// Set the application name.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// The backend kind [`Instance::get_by_platform`](crate::Instance::get_by_platform)
    /// resolves to.
    pub fn platform_backend(&self) -> RhiType {
        self.backend.unwrap_or_else(RhiType::platform_default)
    }
}
