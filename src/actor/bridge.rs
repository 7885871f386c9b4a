//! Native Loop Bridge: The pump thread's half of the engine.
//!
//! The platform's message pump calls into the bridge for every native
//! callback. The bridge only translates and enqueues: it never runs
//! application code, and it never blocks on an actor. When woken, it drains
//! the request queue and executes each request against the native layer
//! before returning to the pump.
//!
//! The bridge is the only owner of native window ids. Actors address their
//! windows by [`WindowHandle`] alone.

use super::hub::Hub;
use super::messages::{CustomRequest, Event, EventKind, KeyCode, Request, RequestKind};
use super::registry::WindowHandle;
use crate::error::{EngineError, NativeError};
use crate::geometry::{Point, Size};
use crate::native::{NativeWindowId, NativeWindows};
use crate::window::{PropertyDelta, WindowProperties};
use crossbeam_channel::TrySendError;
use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// What the bridge knows about one live native window.
#[derive(Debug)]
struct NativeRecord {
    id: NativeWindowId,
    /// Properties as last reported by the platform.
    properties: WindowProperties,
    /// A redraw was requested by the actor and not yet painted.
    redraw_requested: bool,
}

/// Translates native callbacks into events and executes queued requests.
pub struct NativeLoopBridge {
    hub: Arc<Hub>,
    records: HashMap<WindowHandle, NativeRecord>,
}

impl NativeLoopBridge {
    /// Create a bridge over the engine's hub.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            records: HashMap::new(),
        }
    }

    /// Number of native windows currently alive.
    pub fn window_count(&self) -> usize {
        self.records.len()
    }

    /// Native id of a window, if its native window exists.
    pub fn native_id(&self, handle: WindowHandle) -> Option<NativeWindowId> {
        self.records.get(&handle).map(|record| record.id)
    }

    // ------------------------------------------------------------------
    // Native callbacks
    // ------------------------------------------------------------------

    /// The pump was woken: execute every queued request in order.
    pub fn on_wake(&mut self, windows: &mut dyn NativeWindows) {
        let requests = self.hub.drain_all();
        trace!("Pump woken with {} request(s)", requests.len());
        for request in requests {
            self.execute(request, windows);
        }
    }

    /// A key went down.
    pub fn on_key_down(&self, handle: WindowHandle, key: KeyCode, repeat: u16) {
        self.deliver(handle, EventKind::KeyDown { key, repeat });
    }

    /// A key went up.
    pub fn on_key_up(&self, handle: WindowHandle, key: KeyCode) {
        self.deliver(handle, EventKind::KeyUp { key });
    }

    /// The cursor moved over the client area.
    pub fn on_mouse_move(&self, handle: WindowHandle, position: Point) {
        self.deliver(handle, EventKind::MouseMove { position });
    }

    /// The wheel turned.
    pub fn on_wheel(&self, handle: WindowHandle, delta: i16) {
        self.deliver(handle, EventKind::Wheel { delta });
    }

    /// The client area was resized by the platform.
    pub fn on_resized(&mut self, handle: WindowHandle, size: Size) {
        self.update_record(handle, |properties| properties.size = size);
    }

    /// The window was moved by the platform.
    pub fn on_moved(&mut self, handle: WindowHandle, position: Point) {
        self.update_record(handle, |properties| properties.position = position);
    }

    /// The window was minimized or restored.
    pub fn on_minimized(&mut self, handle: WindowHandle, minimized: bool) {
        self.update_record(handle, |properties| properties.minimized = minimized);
    }

    /// The user hit the close box.
    pub fn on_close_requested(&self, handle: WindowHandle) {
        self.deliver(handle, EventKind::CloseRequested);
    }

    /// The platform asked the window to repaint.
    ///
    /// Only the first paint after a requested redraw answers the request.
    pub fn on_redraw(&mut self, handle: WindowHandle) {
        let requested = self
            .records
            .get_mut(&handle)
            .is_some_and(|record| std::mem::take(&mut record.redraw_requested));
        self.deliver(handle, EventKind::UpdateTick { requested });
    }

    /// The platform destroyed the window on its own.
    pub fn on_destroyed(&mut self, handle: WindowHandle) {
        if self.records.remove(&handle).is_some() {
            debug!("Window {handle} destroyed by the platform");
            self.deliver(handle, EventKind::Destroyed);
        }
    }

    fn update_record(&mut self, handle: WindowHandle, change: impl FnOnce(&mut WindowProperties)) {
        let Some(record) = self.records.get_mut(&handle) else {
            trace!("Geometry change for unknown window {handle}");
            return;
        };
        change(&mut record.properties);
        let properties = record.properties.clone();
        self.deliver(handle, EventKind::Resized { properties });
    }

    // ------------------------------------------------------------------
    // Request execution
    // ------------------------------------------------------------------

    fn execute(&mut self, request: Request, windows: &mut dyn NativeWindows) {
        let Request { handle, kind } = request;
        let op = kind.op();
        debug!("Window {handle}: executing {op}");

        let result = match kind {
            RequestKind::Create(properties) => self.create(handle, *properties, windows),
            RequestKind::Show => self.show(handle, windows),
            RequestKind::SetProperties(delta) => self.set_properties(handle, &delta, windows),
            RequestKind::Destroy => {
                self.destroy(handle, windows);
                Ok(())
            }
            RequestKind::Custom(custom) => self.custom(handle, custom, windows),
        };

        if let Err(source) = result {
            self.hub.record_error(EngineError::Native {
                handle: Some(handle),
                source,
            });
            self.deliver(handle, EventKind::NativeFailure { op });
        }
    }

    fn create(
        &mut self,
        handle: WindowHandle,
        mut properties: WindowProperties,
        windows: &mut dyn NativeWindows,
    ) -> Result<(), NativeError> {
        if self.records.contains_key(&handle) {
            warn!("Window {handle} already has a native window");
            return Ok(());
        }
        properties.size = properties.clamped_size(properties.size);
        let id = windows.create_window(handle, &properties)?;
        self.records.insert(
            handle,
            NativeRecord {
                id,
                properties: properties.clone(),
                redraw_requested: false,
            },
        );
        self.deliver(handle, EventKind::Created { properties });
        Ok(())
    }

    fn show(&self, handle: WindowHandle, windows: &mut dyn NativeWindows) -> Result<(), NativeError> {
        let Some(record) = self.records.get(&handle) else {
            trace!("Show for window {handle} without native window");
            return Ok(());
        };
        windows.show_window(record.id)?;
        self.deliver(handle, EventKind::Shown);
        Ok(())
    }

    fn set_properties(
        &mut self,
        handle: WindowHandle,
        delta: &PropertyDelta,
        windows: &mut dyn NativeWindows,
    ) -> Result<(), NativeError> {
        let Some(record) = self.records.get_mut(&handle) else {
            trace!("Property change for window {handle} without native window");
            return Ok(());
        };
        windows.set_properties(record.id, delta)?;
        if record.properties.apply(delta) {
            let properties = record.properties.clone();
            self.deliver(handle, EventKind::Resized { properties });
        }
        Ok(())
    }

    /// Destroy the native window if there is one, then confirm to the actor.
    ///
    /// A failed native destroy is latched but still confirmed: the window is
    /// unusable either way.
    fn destroy(&mut self, handle: WindowHandle, windows: &mut dyn NativeWindows) {
        if let Some(record) = self.records.remove(&handle) {
            if let Err(source) = windows.destroy_window(record.id) {
                self.hub.record_error(EngineError::Native {
                    handle: Some(handle),
                    source,
                });
            }
        }
        self.deliver(handle, EventKind::Destroyed);
    }

    fn custom(
        &mut self,
        handle: WindowHandle,
        custom: CustomRequest,
        windows: &mut dyn NativeWindows,
    ) -> Result<(), NativeError> {
        let Some(record) = self.records.get_mut(&handle) else {
            trace!("Custom request for window {handle} without native window");
            return Ok(());
        };
        match custom {
            CustomRequest::Redraw => {
                windows.request_redraw(record.id)?;
                record.redraw_requested = true;
                Ok(())
            }
            CustomRequest::Call(task) => task(windows, record.id),
        }
    }

    // ------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------

    /// Push an event into a window's inbox without blocking.
    ///
    /// A full inbox is fatal; a released handle just drops the event.
    fn deliver(&self, handle: WindowHandle, kind: EventKind) {
        let Some(inbox) = self.hub.inbox(handle) else {
            trace!("Dropping {} for released window {handle}", kind.name());
            return;
        };
        let name = kind.name();
        match inbox.try_send(Event::new(self.hub.now(), kind)) {
            Ok(()) => trace!("Window {handle} -> {name}"),
            Err(TrySendError::Full(_)) => {
                self.hub.record_error(EngineError::InboxFull { handle });
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!("Window {handle} inbox closed, dropping {name}");
            }
        }
    }

    /// Push an event, waiting for room. Only used once the pump has stopped.
    fn deliver_blocking(&self, handle: WindowHandle, kind: EventKind) {
        if let Some(inbox) = self.hub.inbox(handle) {
            let name = kind.name();
            if inbox.send(Event::new(self.hub.now(), kind)).is_err() {
                trace!("Window {handle} inbox closed, dropping {name}");
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Wind down every window after the pump has returned.
    ///
    /// Closes the request queue, honours pending destroys, then sends each
    /// still-live actor a close-requested/destroyed pair and destroys any
    /// native window that is left.
    pub fn teardown(&mut self, windows: &mut dyn NativeWindows) {
        let leftovers = self.hub.close_queue();
        let live = self.hub.live_handles();
        info!(
            "Tearing down: {} pending request(s), {} live window(s), {} native window(s)",
            leftovers.len(),
            live.len(),
            self.records.len()
        );

        for request in leftovers {
            if matches!(request.kind, RequestKind::Destroy) {
                self.destroy(request.handle, windows);
            } else {
                trace!("Discarding {} for window {}", request.kind.op(), request.handle);
            }
        }

        for handle in live {
            self.deliver_blocking(handle, EventKind::CloseRequested);
            if let Some(record) = self.records.remove(&handle) {
                if let Err(err) = windows.destroy_window(record.id) {
                    warn!("Window {handle} native destroy failed during teardown: {err}");
                }
            }
            self.deliver_blocking(handle, EventKind::Destroyed);
        }

        for (handle, record) in self.records.drain() {
            if let Err(err) = windows.destroy_window(record.id) {
                warn!("Orphaned window {handle} native destroy failed: {err}");
            }
        }
    }
}
