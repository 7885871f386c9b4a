//! Shutdown Coordinator: First-error-wins latch and quit-once signalling.
//!
//! Any thread may record an error. Only the first one is kept; recording it
//! also asks the native pump to quit. The quit post itself happens at most
//! once per engine run, whether it was triggered by an error or by the last
//! window going away.

use crate::error::EngineError;
use crate::native::PumpControl;
use log::{debug, error, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Process-wide error latch for one engine run.
pub struct ShutdownCoordinator {
    /// Used to post the quit message.
    control: Arc<dyn PumpControl>,
    /// Set by the first accepted error.
    latched: AtomicBool,
    /// Set by the first quit request.
    quit_requested: AtomicBool,
    /// The accepted error, until the engine takes it.
    error: Mutex<Option<EngineError>>,
}

impl ShutdownCoordinator {
    /// Create an unset latch.
    pub fn new(control: Arc<dyn PumpControl>) -> Self {
        Self {
            control,
            latched: AtomicBool::new(false),
            quit_requested: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Record an error.
    ///
    /// Returns `true` if this call set the latch, `false` if an earlier
    /// error already holds it (the new one is dropped).
    pub fn record_error(&self, err: EngineError) -> bool {
        if self
            .latched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Error after latch ignored: {err}");
            return false;
        }

        error!("Engine error latched: {err}");
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
        self.request_quit();
        true
    }

    /// Ask the native pump to quit. Only the first call posts.
    ///
    /// A failed post is logged and otherwise ignored; teardown still runs
    /// once the pump returns on its own.
    pub fn request_quit(&self) -> bool {
        if self.quit_requested.swap(true, Ordering::AcqRel) {
            return false;
        }
        debug!("Posting quit to native pump");
        if let Err(err) = self.control.post_quit() {
            warn!("Failed to post quit to native pump: {err}");
        }
        true
    }

    /// Check if an error was latched or a quit was requested.
    pub fn is_shutting_down(&self) -> bool {
        self.latched.load(Ordering::Acquire) || self.quit_requested.load(Ordering::Acquire)
    }

    /// Check if an error was latched.
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }

    /// Take the latched error, leaving the latch set.
    pub fn take_error(&self) -> Option<EngineError> {
        self.error.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
