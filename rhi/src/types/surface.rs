//! Presentation value types.

use raw_window_handle::RawWindowHandle;

/// How presented images are queued to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentMode {
    /// Present as soon as possible, tearing allowed.
    Immediately,
    /// Wait for vertical blank.
    #[default]
    Vsync,
}

/// Create info for a surface.
///
/// The window is owned by the caller and must outlive the surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceCreateInfo {
    /// Native window handle.
    pub window: RawWindowHandle,
}

impl SurfaceCreateInfo {
    /// Create a surface create info.
    pub fn new(window: RawWindowHandle) -> Self {
        Self { window }
    }
}
