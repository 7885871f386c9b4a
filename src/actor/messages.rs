//! Message types crossing the logic/native boundary.
//!
//! [`Event`]s travel from the pump thread (or an actor itself) into one
//! actor's inbox. [`Request`]s travel from an actor to the pump thread.

use super::WindowHandle;
use crate::error::NativeError;
use crate::error::NativeOp;
use crate::geometry::Point;
use crate::native::{NativeWindowId, NativeWindows};
use crate::window::{PropertyDelta, WindowProperties};

/// Raw platform key code, passed through untranslated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

/// An event delivered to a window actor.
#[derive(Debug, Clone)]
pub struct Event {
    /// Nanoseconds since engine start.
    pub timestamp: u64,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Create an event.
    pub const fn new(timestamp: u64, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }
}

/// The kinds of events an actor processes.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Seed event: ask the application for its window properties.
    Config,
    /// The native window exists.
    Created {
        /// Properties as the platform applied them.
        properties: WindowProperties,
    },
    /// The native window is visible.
    Shown,
    /// Geometry or minimized state changed.
    Resized {
        /// Snapshot after the change.
        properties: WindowProperties,
    },
    /// A key went down.
    KeyDown {
        /// Platform key code.
        key: KeyCode,
        /// Auto-repeat count reported by the platform.
        repeat: u16,
    },
    /// A key went up.
    KeyUp {
        /// Platform key code.
        key: KeyCode,
    },
    /// The cursor moved over the client area.
    MouseMove {
        /// Client-area position.
        position: Point,
    },
    /// The mouse wheel turned.
    Wheel {
        /// Signed wheel delta (positive = away from the user).
        delta: i16,
    },
    /// Time to run the update callback.
    UpdateTick {
        /// The native paint answering this window's `request_update`, as
        /// opposed to a synthesized frame or a paint the platform chose.
        requested: bool,
    },
    /// The user asked to close the window.
    CloseRequested,
    /// The native window is gone.
    Destroyed,
    /// A request of this window failed natively. The error is already latched.
    NativeFailure {
        /// Failed operation.
        op: NativeOp,
    },
}

impl EventKind {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Created { .. } => "created",
            Self::Shown => "shown",
            Self::Resized { .. } => "resized",
            Self::KeyDown { .. } => "key-down",
            Self::KeyUp { .. } => "key-up",
            Self::MouseMove { .. } => "mouse-move",
            Self::Wheel { .. } => "wheel",
            Self::UpdateTick { .. } => "update-tick",
            Self::CloseRequested => "close-requested",
            Self::Destroyed => "destroyed",
            Self::NativeFailure { .. } => "native-failure",
        }
    }
}

/// Work run on the pump thread against one window's native object.
pub type PumpTask =
    Box<dyn FnOnce(&mut dyn NativeWindows, NativeWindowId) -> Result<(), NativeError> + Send>;

/// Application-defined requests.
pub enum CustomRequest {
    /// Ask the platform for a redraw callback, which arrives as an update tick.
    Redraw,
    /// Run a task on the pump thread.
    Call(PumpTask),
}

impl std::fmt::Debug for CustomRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redraw => f.write_str("Redraw"),
            Self::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// A command for the native pump thread.
#[derive(Debug)]
pub struct Request {
    /// Window the command targets.
    pub handle: WindowHandle,
    /// The command.
    pub kind: RequestKind,
}

impl Request {
    /// Create a request.
    pub const fn new(handle: WindowHandle, kind: RequestKind) -> Self {
        Self { handle, kind }
    }
}

/// The commands an actor can send to the pump thread.
#[derive(Debug)]
pub enum RequestKind {
    /// Create the native window.
    Create(Box<WindowProperties>),
    /// Make the native window visible.
    Show,
    /// Change some properties.
    SetProperties(Box<PropertyDelta>),
    /// Destroy the native window.
    Destroy,
    /// Application-defined request.
    Custom(CustomRequest),
}

impl RequestKind {
    /// Native operation this request performs.
    pub const fn op(&self) -> NativeOp {
        match self {
            Self::Create(_) => NativeOp::Create,
            Self::Show => NativeOp::Show,
            Self::SetProperties(_) => NativeOp::SetProperties,
            Self::Destroy => NativeOp::Destroy,
            Self::Custom(CustomRequest::Redraw) => NativeOp::Redraw,
            Self::Custom(CustomRequest::Call(_)) => NativeOp::Custom,
        }
    }
}
