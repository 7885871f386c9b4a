//! Actor Model: One logic thread per window, one native pump thread.
//!
//! This module implements the engine's concurrency using crossbeam channels
//! and a single shared lock:
//! - **Window Actors**: Own a window's state machine and run its callbacks
//! - **Native Loop Bridge**: Runs on the pump thread, translates native
//!   callbacks into events and executes queued requests
//! - **Hub**: Handle registry and request queue behind one lock, plus the
//!   shutdown coordinator
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Event (bounded inbox)   ┌──────────────┐
//! │ Window Actor │ ◀──────────────────────── │              │
//! │   #0 .. #n   │                           │ Native Loop  │
//! └──────────────┘                           │   Bridge     │
//!        │                                   │ (pump thread)│
//!        │ Request           ┌───────┐  wake │              │
//!        └─────────────────▶ │  Hub  │ ────▶ │              │
//!                            └───────┘       └──────────────┘
//!                                │                  │
//!                                │ first error      │ NativeWindows
//!                                ▼                  ▼
//!                        ┌──────────────┐    ┌──────────────┐
//!                        │  Shutdown    │    │   Platform   │
//!                        │ Coordinator  │    │  Message Pump│
//!                        └──────────────┘    └──────────────┘
//! ```

mod bridge;
mod engine;
mod hub;
mod messages;
mod queue;
mod registry;
mod shutdown;
mod window;

pub use bridge::NativeLoopBridge;
pub use engine::{launch, Engine, EngineConfig};
pub use hub::Hub;
pub use messages::{CustomRequest, Event, EventKind, KeyCode, PumpTask, Request, RequestKind};
pub use queue::{RequestQueue, Submitted, Ticket};
pub use registry::{HandleRegistry, WindowHandle};
pub use shutdown::ShutdownCoordinator;
pub use window::{ActorThread, WindowActor, WindowState};

pub(crate) use window::ActorCore;
