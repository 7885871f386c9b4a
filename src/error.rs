//! Error types for the engine, the native layer and application callbacks.

use crate::actor::WindowHandle;
use thiserror::Error;

/// Opaque error returned by application callbacks.
pub type AppError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Native operation that produced a [`NativeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    /// Creating the platform window.
    Create,
    /// Showing the platform window.
    Show,
    /// Applying a property change.
    SetProperties,
    /// Destroying the platform window.
    Destroy,
    /// Asking for a redraw callback.
    Redraw,
    /// Running an application-supplied task on the pump thread.
    Custom,
    /// Waking the pump thread.
    Wake,
    /// Posting the quit message.
    PostQuit,
    /// Running the message pump itself.
    RunPump,
}

impl std::fmt::Display for NativeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create window",
            Self::Show => "show window",
            Self::SetProperties => "set window properties",
            Self::Destroy => "destroy window",
            Self::Redraw => "request redraw",
            Self::Custom => "custom pump task",
            Self::Wake => "wake pump",
            Self::PostQuit => "post quit",
            Self::RunPump => "run pump",
        };
        f.write_str(name)
    }
}

/// A failed call into the native platform layer.
///
/// Carries the primary code returned by the call, an optional secondary
/// platform-specific code (what the OS reports as its last error), and
/// free-form context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op} failed with code {code}{}: {context}", secondary_suffix(.secondary))]
pub struct NativeError {
    /// Operation that failed.
    pub op: NativeOp,
    /// Primary error code.
    pub code: i32,
    /// Platform-specific secondary code, if the layer reported one.
    pub secondary: Option<i32>,
    /// Human-readable context.
    pub context: String,
}

fn secondary_suffix(secondary: &Option<i32>) -> String {
    secondary.map_or_else(String::new, |code| format!(" (platform code {code})"))
}

impl NativeError {
    /// Create an error with no secondary code.
    pub fn new(op: NativeOp, code: i32, context: impl Into<String>) -> Self {
        Self {
            op,
            code,
            secondary: None,
            context: context.into(),
        }
    }

    /// Attach a platform-specific secondary code.
    #[must_use]
    pub const fn with_secondary(mut self, secondary: i32) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors latched by the engine.
///
/// Only the first one recorded during a run is kept; it is what
/// [`Engine::run`](crate::Engine::run) returns.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The OS refused to start an actor thread.
    #[error("failed to spawn window actor thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A native window operation failed.
    #[error("native call failed for window {handle:?}: {source}")]
    Native {
        /// Window the request belonged to, if any.
        handle: Option<WindowHandle>,
        /// The native failure.
        #[source]
        source: NativeError,
    },

    /// The pump thread could not be woken; no further requests can reach it.
    #[error("native pump unreachable: {0}")]
    PumpUnreachable(#[source] NativeError),

    /// A request was submitted after the pump stopped draining.
    #[error("native pump has shut down")]
    PumpClosed,

    /// An application callback returned an error.
    #[error("window {handle} {callback} callback failed: {source}")]
    Callback {
        /// Window whose behavior failed.
        handle: WindowHandle,
        /// Callback name.
        callback: &'static str,
        /// Error returned by the application.
        #[source]
        source: AppError,
    },

    /// The bridge could not deliver an event because the inbox was full.
    #[error("inbox of window {handle} is full")]
    InboxFull {
        /// Window whose inbox overflowed.
        handle: WindowHandle,
    },

    /// A window actor thread panicked.
    #[error("actor thread of window {handle} panicked")]
    ActorPanicked {
        /// Window whose actor panicked.
        handle: WindowHandle,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
