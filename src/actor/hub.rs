//! Hub: State shared by every actor and the pump thread for one engine run.
//!
//! The handle registry and the request queue sit behind a single lock. The
//! lock is only held to append, swap, allocate or release; native calls and
//! application callbacks always run outside it.

use super::messages::{Event, Request};
use super::queue::RequestQueue;
use super::registry::{HandleRegistry, WindowHandle};
use super::shutdown::ShutdownCoordinator;
use crate::error::EngineError;
use crate::native::PumpControl;
use crossbeam_channel::Sender;
use log::{debug, trace};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// What the registry stores per live window.
#[derive(Debug)]
pub(crate) struct ActorSlot {
    /// Sending half of the actor's inbox.
    pub inbox: Sender<Event>,
}

/// Everything guarded by the hub lock.
struct Switchboard {
    registry: HandleRegistry<ActorSlot>,
    queue: RequestQueue,
    /// Windows are still being launched; an empty registry is not final yet.
    launching: bool,
}

/// Shared engine state.
pub struct Hub {
    board: Mutex<Switchboard>,
    coordinator: ShutdownCoordinator,
    control: Arc<dyn PumpControl>,
    /// Engine start, for event timestamps.
    epoch: Instant,
}

impl Hub {
    /// Create the hub for a new engine run.
    pub fn new(control: Arc<dyn PumpControl>) -> Self {
        Self {
            board: Mutex::new(Switchboard {
                registry: HandleRegistry::new(),
                queue: RequestQueue::new(),
                launching: true,
            }),
            coordinator: ShutdownCoordinator::new(Arc::clone(&control)),
            control,
            epoch: Instant::now(),
        }
    }

    fn board(&self) -> MutexGuard<'_, Switchboard> {
        // Every critical section leaves the board consistent.
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Nanoseconds since the engine started.
    pub fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// The shutdown coordinator.
    pub const fn coordinator(&self) -> &ShutdownCoordinator {
        &self.coordinator
    }

    /// Record an error in the latch.
    pub fn record_error(&self, err: EngineError) -> bool {
        self.coordinator.record_error(err)
    }

    /// Check if the engine is shutting down.
    pub fn is_shutting_down(&self) -> bool {
        self.coordinator.is_shutting_down()
    }

    /// Take the latched error.
    pub fn take_error(&self) -> Option<EngineError> {
        self.coordinator.take_error()
    }

    /// Register a new window and return its handle.
    pub(crate) fn register(&self, inbox: Sender<Event>) -> Option<WindowHandle> {
        self.board().registry.allocate(ActorSlot { inbox })
    }

    /// Release a window's handle.
    ///
    /// When the last window goes away after launch, the pump is asked to quit.
    pub(crate) fn release(&self, handle: WindowHandle) -> bool {
        let (released, last) = {
            let mut board = self.board();
            let released = board.registry.release(handle).is_some();
            (released, released && !board.launching && board.registry.is_empty())
        };
        if released {
            debug!("Window {handle} released");
        }
        if last {
            debug!("Last window released");
            self.coordinator.request_quit();
        }
        released
    }

    /// Mark launch as complete. Quits right away if no window is left.
    pub fn finish_launch(&self) {
        let empty = {
            let mut board = self.board();
            board.launching = false;
            board.registry.is_empty()
        };
        if empty {
            self.coordinator.request_quit();
        }
    }

    /// Inbox of a live window, or `None` if the handle is not live.
    pub(crate) fn inbox(&self, handle: WindowHandle) -> Option<Sender<Event>> {
        self.board()
            .registry
            .lookup(handle)
            .map(|slot| slot.inbox.clone())
    }

    /// Check if a handle is live.
    pub fn is_live(&self, handle: WindowHandle) -> bool {
        self.board().registry.lookup(handle).is_some()
    }

    /// Handles of every live window.
    pub fn live_handles(&self) -> Vec<WindowHandle> {
        self.board().registry.live_handles()
    }

    /// Queue a request for the pump thread and wake it if idle.
    ///
    /// If the wake fails the request is taken back, the queue closes, the
    /// failure is latched, and `PumpUnreachable` is returned. Requests that
    /// joined the failed wake are left for [`close_queue`](Self::close_queue).
    pub fn submit(&self, request: Request) -> Result<(), EngineError> {
        let handle = request.handle;
        let submitted = self.board().queue.push(request).ok_or(EngineError::PumpClosed)?;
        trace!("Window {handle} queued request #{}", submitted.ticket);

        if submitted.needs_wake {
            if let Err(source) = self.control.wake() {
                self.board().queue.abandon_wake(submitted.ticket);
                self.coordinator
                    .record_error(EngineError::PumpUnreachable(source.clone()));
                return Err(EngineError::PumpUnreachable(source));
            }
        }
        Ok(())
    }

    /// Swap out every pending request. Called on the pump thread only.
    pub fn drain_all(&self) -> Vec<Request> {
        self.board().queue.take_all()
    }

    /// Refuse further submissions and return whatever was never executed.
    pub fn close_queue(&self) -> Vec<Request> {
        let mut board = self.board();
        board.queue.close();
        board.queue.take_remaining()
    }
}
