//! Process-wide debug message hook.
//!
//! Backends running with validation enabled report driver and validation
//! layer messages through [`report_debug_message`]. Without an installed
//! callback the messages go to the `log` facade.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::RhiType;

/// Severity of a debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DebugMessageSeverity {
    Verbose,
    Info,
    Warning,
    Error,
}

/// A message reported by a backend.
#[derive(Debug, Clone, Copy)]
pub struct DebugMessage<'a> {
    pub rhi_type: RhiType,
    pub severity: DebugMessageSeverity,
    pub message: &'a str,
}

type DebugCallback = Arc<dyn Fn(&DebugMessage<'_>) + Send + Sync>;

static DEBUG_CALLBACK: RwLock<Option<DebugCallback>> = RwLock::new(None);

/// Install the process-wide debug callback, replacing the previous one.
pub fn set_debug_callback(callback: impl Fn(&DebugMessage<'_>) + Send + Sync + 'static) {
    *DEBUG_CALLBACK.write() = Some(Arc::new(callback));
}

/// Remove the debug callback; messages go to the `log` facade again.
pub fn clear_debug_callback() {
    *DEBUG_CALLBACK.write() = None;
}

/// Report a backend message.
pub fn report_debug_message(rhi_type: RhiType, severity: DebugMessageSeverity, message: &str) {
    let message = DebugMessage {
        rhi_type,
        severity,
        message,
    };

    // Clone out of the lock so callbacks may install callbacks.
    let callback = DEBUG_CALLBACK.read().clone();
    match callback {
        Some(callback) => callback(&message),
        None => match severity {
            DebugMessageSeverity::Verbose => log::trace!("[{rhi_type}] {}", message.message),
            DebugMessageSeverity::Info => log::info!("[{rhi_type}] {}", message.message),
            DebugMessageSeverity::Warning => log::warn!("[{rhi_type}] {}", message.message),
            DebugMessageSeverity::Error => log::error!("[{rhi_type}] {}", message.message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_callback_receives_messages() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        set_debug_callback(move |msg| {
            if msg.message.starts_with("debug-test:") {
                sink.lock().push((msg.severity, msg.message.to_string()));
            }
        });

        report_debug_message(
            RhiType::Dummy,
            DebugMessageSeverity::Warning,
            "debug-test: hello",
        );
        clear_debug_callback();
        report_debug_message(RhiType::Dummy, DebugMessageSeverity::Info, "debug-test: dropped");

        let received = received.lock();
        assert_eq!(
            received.as_slice(),
            &[(DebugMessageSeverity::Warning, "debug-test: hello".to_string())]
        );
    }
}
