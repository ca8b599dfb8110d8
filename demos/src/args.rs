//! Command line arguments shared by the demos.

use redlilium_rhi::RhiType;

/// Backend selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliBackend {
    /// Platform default, or `REDLILIUM_RHI_BACKEND` when set.
    Auto,
    Vulkan,
    Dx12,
    Metal,
    /// Host-memory backend for testing without a GPU.
    #[default]
    Dummy,
}

impl CliBackend {
    /// The requested backend, or `None` for the platform default.
    pub fn rhi_type(self) -> Option<RhiType> {
        match self {
            CliBackend::Auto => None,
            CliBackend::Vulkan => Some(RhiType::Vulkan),
            CliBackend::Dx12 => Some(RhiType::DirectX12),
            CliBackend::Metal => Some(RhiType::Metal),
            CliBackend::Dummy => Some(RhiType::Dummy),
        }
    }
}

/// Options every demo accepts.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Backend to run on.
    #[arg(long, default_value = "dummy", value_enum)]
    pub backend: CliBackend,

    /// Enable backend validation (slower but helps catch bugs).
    #[arg(long, conflicts_with = "no_validation")]
    pub validation: bool,

    /// Disable backend validation.
    #[arg(long, conflicts_with = "validation")]
    pub no_validation: bool,
}

impl CommonArgs {
    /// Explicit flags override the debug-build default.
    pub fn validation(&self) -> bool {
        self.validation || (!self.no_validation && cfg!(debug_assertions))
    }
}
