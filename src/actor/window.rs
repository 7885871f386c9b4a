//! Window Actor: One logic thread per window running its lifecycle state machine.
//!
//! The actor owns a private inbox and processes one event at a time:
//!
//! ```text
//!  Config ──created──▶ Running ──close confirmed──▶ Closing ──destroyed──▶ Quit
//!    │                    │ ▲                          ▲
//!    │                    └─┘ input / update / veto    │
//!    └──────── callback error / native failure ────────┘
//! ```
//!
//! When auto-update is on and the window is shown, an empty inbox means
//! "draw another frame": the actor synthesizes its own update tick instead
//! of blocking.

use super::hub::Hub;
use super::messages::{CustomRequest, Event, EventKind, Request, RequestKind};
use super::registry::WindowHandle;
use crate::actor::EngineConfig;
use crate::error::{AppError, EngineError};
use crate::geometry::Point;
use crate::window::{WindowBehavior, WindowContext, WindowProperties};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle state of a window actor. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowState {
    /// Waiting for the application's configuration and the native window.
    Config,
    /// Native window exists; callbacks run.
    Running,
    /// Destroy requested; waiting for confirmation.
    Closing,
    /// Terminal.
    Quit,
}

/// Engine-side state a [`WindowContext`] exposes to callbacks.
pub(crate) struct ActorCore {
    pub handle: WindowHandle,
    pub hub: Arc<Hub>,
    pub properties: WindowProperties,
    pub cursor: Point,
    pub timestamp: u64,
    pub auto_update: bool,
    /// An explicit update request is outstanding.
    pub update_pending: bool,
    /// An update was asked for and not yet submitted.
    pub update_wanted: bool,
    /// The native window exists, so requests addressed to it can run.
    pub native_ready: bool,
    /// The application asked to close from inside a callback.
    pub close_requested: bool,
}

impl ActorCore {
    pub(crate) fn submit(&self, kind: RequestKind) -> Result<(), EngineError> {
        self.hub.submit(Request::new(self.handle, kind))
    }

    /// Submit the redraw behind a wanted update once the native window
    /// exists. Does nothing while one is outstanding or auto-update is on.
    pub(crate) fn submit_wanted_update(&mut self) -> Result<(), EngineError> {
        if !self.native_ready || !std::mem::take(&mut self.update_wanted) {
            return Ok(());
        }
        if self.auto_update || self.update_pending {
            return Ok(());
        }
        self.submit(RequestKind::Custom(CustomRequest::Redraw))?;
        self.update_pending = true;
        Ok(())
    }
}

/// A running actor thread.
pub struct ActorThread {
    handle: WindowHandle,
    join: JoinHandle<()>,
}

impl ActorThread {
    /// Handle of the window this thread serves.
    pub const fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Wait for the actor to reach `Quit`.
    pub fn join(self) {
        if self.join.join().is_err() {
            // Already latched by the actor's drop guard.
            debug!("Window {} actor thread panicked", self.handle);
        }
    }
}

/// One window's logic: state, cached properties, inbox, and behavior.
pub struct WindowActor {
    core: ActorCore,
    behavior: Box<dyn WindowBehavior>,
    inbox: Receiver<Event>,
    state: WindowState,
    /// `shown` processed; update ticks may be synthesized.
    shown: bool,
    /// A create request reached the queue, so a native window may exist.
    native_requested: bool,
    /// `Running` was reached, so `on_destroy` is owed.
    created: bool,
    /// Cleared by the first callback error.
    callbacks_enabled: bool,
    /// Pacing for synthesized ticks; `None` ticks whenever idle.
    frame_interval: Option<Duration>,
    next_frame: Instant,
    released: bool,
}

impl WindowActor {
    /// Register a new window, seed its inbox with `config`, and start its thread.
    pub fn spawn(
        hub: &Arc<Hub>,
        behavior: Box<dyn WindowBehavior>,
        config: &EngineConfig,
    ) -> Result<ActorThread, EngineError> {
        let (tx, rx) = bounded(config.inbox_capacity.max(1));
        let handle = hub
            .register(tx.clone())
            .ok_or_else(|| EngineError::Spawn(std::io::Error::other("window handle space exhausted")))?;

        let actor = Self::new(Arc::clone(hub), handle, behavior, rx, config.frame_interval());
        if tx.try_send(Event::new(hub.now(), EventKind::Config)).is_err() {
            // Capacity is at least one and the receiver is alive.
            warn!("Window {handle} could not be seeded with its config event");
        }

        let join = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, handle.raw()))
            .spawn(move || actor.run())
            .map_err(EngineError::Spawn)?;

        debug!("Window {handle} actor spawned");
        Ok(ActorThread { handle, join })
    }

    pub(crate) fn new(
        hub: Arc<Hub>,
        handle: WindowHandle,
        behavior: Box<dyn WindowBehavior>,
        inbox: Receiver<Event>,
        frame_interval: Option<Duration>,
    ) -> Self {
        Self {
            core: ActorCore {
                handle,
                hub,
                properties: WindowProperties::default(),
                cursor: Point::ORIGIN,
                timestamp: 0,
                auto_update: false,
                update_pending: false,
                update_wanted: false,
                native_ready: false,
                close_requested: false,
            },
            behavior,
            inbox,
            state: WindowState::Config,
            shown: false,
            native_requested: false,
            created: false,
            callbacks_enabled: true,
            frame_interval,
            next_frame: Instant::now(),
            released: false,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> WindowState {
        self.state
    }

    /// This actor's window handle.
    pub const fn handle(&self) -> WindowHandle {
        self.core.handle
    }

    /// Process events until `Quit`, then run the destroy callback and release the handle.
    pub fn run(mut self) {
        debug!("Window {} actor running", self.core.handle);
        while self.state != WindowState::Quit {
            if let Some(event) = self.next_event() {
                self.handle_event(event);
            } else {
                warn!("Window {} inbox disconnected", self.core.handle);
                self.transition(WindowState::Quit);
            }
        }
        self.finish();
    }

    const fn ticking(&self) -> bool {
        matches!(self.state, WindowState::Running)
            && self.shown
            && self.core.auto_update
            && self.callbacks_enabled
    }

    fn tick(&self) -> Event {
        Event::new(self.core.hub.now(), EventKind::UpdateTick { requested: false })
    }

    /// Next inbox event, or a synthesized tick when idle and auto-updating.
    fn next_event(&mut self) -> Option<Event> {
        if !self.ticking() {
            return self.inbox.recv().ok();
        }

        match self.inbox.try_recv() {
            Ok(event) => return Some(event),
            Err(TryRecvError::Disconnected) => return None,
            Err(TryRecvError::Empty) => {}
        }

        let Some(interval) = self.frame_interval else {
            return Some(self.tick());
        };
        match self.inbox.recv_deadline(self.next_frame) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => {
                // Catch up without queuing ticks when we fall behind.
                let now = Instant::now();
                self.next_frame += interval;
                if self.next_frame < now {
                    self.next_frame = now + interval;
                }
                Some(self.tick())
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn transition(&mut self, next: WindowState) {
        debug_assert!(next > self.state, "{:?} -> {next:?}", self.state);
        debug!("Window {}: {:?} -> {next:?}", self.core.handle, self.state);
        self.state = next;
    }

    /// Advance the state machine by one event.
    pub(crate) fn handle_event(&mut self, event: Event) {
        self.core.timestamp = event.timestamp;
        trace!("Window {} <- {}", self.core.handle, event.kind.name());

        match (self.state, event.kind) {
            (WindowState::Quit, kind) => {
                trace!("Window {} already quit, dropping {}", self.core.handle, kind.name());
            }
            (_, EventKind::Destroyed) => self.transition(WindowState::Quit),
            (_, EventKind::NativeFailure { op }) => {
                debug!("Window {} closing after native {op} failure", self.core.handle);
                self.begin_closing();
            }
            (WindowState::Config, EventKind::Config) => self.configure(),
            (WindowState::Config, EventKind::Created { properties }) => self.created(properties),
            (WindowState::Running, kind) => self.dispatch_running(kind),
            (state, kind) => {
                trace!("Window {} discarding {} in {state:?}", self.core.handle, kind.name());
            }
        }
    }

    fn configure(&mut self) {
        let result = self.behavior.configure(&mut WindowContext::new(&mut self.core));
        let properties = match result {
            Ok(properties) => properties,
            Err(source) => return self.callback_failed("configure", source),
        };

        self.core.auto_update = properties.auto_update;
        self.core.properties = properties.clone();
        match self.core.submit(RequestKind::Create(Box::new(properties))) {
            Ok(()) => self.native_requested = true,
            Err(err) => {
                debug!("Window {} create not submitted: {err}", self.core.handle);
                self.begin_closing();
            }
        }
    }

    fn created(&mut self, properties: WindowProperties) {
        self.core.properties = properties;
        self.core.native_ready = true;
        self.created = true;
        self.transition(WindowState::Running);

        if self.invoke("create", |b, ctx| b.on_create(ctx)) && !self.honor_close_request() {
            // An update asked for during configure goes out behind the show.
            let submitted = self
                .core
                .submit(RequestKind::Show)
                .and_then(|()| self.core.submit_wanted_update());
            if let Err(err) = submitted {
                debug!("Window {} show not submitted: {err}", self.core.handle);
                self.begin_closing();
            }
        }
    }

    fn dispatch_running(&mut self, kind: EventKind) {
        match kind {
            EventKind::Shown => {
                self.shown = true;
                self.next_frame = Instant::now();
                self.invoke("show", |b, ctx| b.on_show(ctx));
            }
            EventKind::Resized { properties } => {
                self.core.properties = properties;
                self.invoke("resize", |b, ctx| b.on_resize(ctx));
            }
            EventKind::KeyDown { key, repeat } => {
                self.invoke("key-down", |b, ctx| b.on_key_down(ctx, key, repeat));
            }
            EventKind::KeyUp { key } => {
                self.invoke("key-up", |b, ctx| b.on_key_up(ctx, key));
            }
            EventKind::MouseMove { position } => {
                self.core.cursor = position;
                self.invoke("mouse-move", |b, ctx| b.on_mouse_move(ctx, position));
            }
            EventKind::Wheel { delta } => {
                self.invoke("wheel", |b, ctx| b.on_wheel(ctx, delta));
            }
            EventKind::UpdateTick { requested } => {
                if requested {
                    self.core.update_pending = false;
                }
                self.invoke("update", |b, ctx| b.on_update(ctx));
            }
            EventKind::CloseRequested => self.close_requested(),
            other => {
                trace!("Window {} discarding {} while running", self.core.handle, other.name());
            }
        }
        self.honor_close_request();
    }

    fn close_requested(&mut self) {
        let result = self.behavior.on_close(&mut WindowContext::new(&mut self.core));
        match result {
            Ok(true) => self.begin_closing(),
            Ok(false) => debug!("Window {} vetoed close", self.core.handle),
            Err(source) => self.callback_failed("close", source),
        }
    }

    /// Close if a callback called `request_close`. Returns `true` if closing.
    fn honor_close_request(&mut self) -> bool {
        if self.core.close_requested && self.state == WindowState::Running {
            self.core.close_requested = false;
            self.begin_closing();
        }
        self.state >= WindowState::Closing
    }

    /// Run a callback; on error latch it and start closing.
    fn invoke<F>(&mut self, name: &'static str, callback: F) -> bool
    where
        F: FnOnce(&mut dyn WindowBehavior, &mut WindowContext<'_>) -> Result<(), AppError>,
    {
        if !self.callbacks_enabled {
            return false;
        }
        let result = callback(self.behavior.as_mut(), &mut WindowContext::new(&mut self.core));
        match result {
            Ok(()) => true,
            Err(source) => {
                self.callback_failed(name, source);
                false
            }
        }
    }

    fn callback_failed(&mut self, callback: &'static str, source: AppError) {
        self.callbacks_enabled = false;
        self.core.hub.record_error(EngineError::Callback {
            handle: self.core.handle,
            callback,
            source,
        });
        self.begin_closing();
    }

    /// Move to `Closing` and ask for the native window to be destroyed.
    ///
    /// Without a native window there is nothing to wait for; go to `Quit`.
    fn begin_closing(&mut self) {
        if self.state >= WindowState::Closing {
            return;
        }
        if !self.native_requested {
            self.transition(WindowState::Quit);
            return;
        }

        self.transition(WindowState::Closing);
        if let Err(err) = self.core.submit(RequestKind::Destroy) {
            // Teardown delivers `destroyed` to every live window.
            debug!("Window {} destroy not submitted: {err}", self.core.handle);
        }
    }

    fn finish(&mut self) {
        if self.created {
            self.invoke("destroy", |b, ctx| b.on_destroy(ctx));
        }
        info!("Window {} quit", self.core.handle);
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.core.hub.release(self.core.handle);
        }
    }
}

impl Drop for WindowActor {
    fn drop(&mut self) {
        if thread::panicking() {
            self.core.hub.record_error(EngineError::ActorPanicked {
                handle: self.core.handle,
            });
        }
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::messages::KeyCode;
    use crate::error::{NativeError, NativeOp};
    use crate::native::PumpControl;
    use crossbeam_channel::{unbounded, Sender};
    use std::sync::Mutex;

    struct NullControl;

    impl PumpControl for NullControl {
        fn wake(&self) -> Result<(), NativeError> {
            Ok(())
        }

        fn post_quit(&self) -> Result<(), NativeError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Script {
        log: Arc<Mutex<Vec<String>>>,
        veto_close: bool,
        fail_configure: bool,
        fail_key: bool,
        panic_key: bool,
        auto_update: bool,
        update_on_configure: bool,
    }

    impl Script {
        fn push(&self, entry: impl Into<String>) {
            self.log.lock().unwrap().push(entry.into());
        }
    }

    impl WindowBehavior for Script {
        fn configure(&mut self, ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
            self.push("config");
            if self.fail_configure {
                return Err("no display".into());
            }
            if self.update_on_configure {
                ctx.request_update()?;
            }
            Ok(WindowProperties::default().with_auto_update(self.auto_update))
        }

        fn on_create(&mut self, _ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
            self.push("created");
            Ok(())
        }

        fn on_show(&mut self, _ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
            self.push("shown");
            Ok(())
        }

        fn on_key_down(
            &mut self,
            _ctx: &mut WindowContext<'_>,
            key: KeyCode,
            _repeat: u16,
        ) -> Result<(), AppError> {
            self.push(format!("key {}", key.0));
            if self.fail_key {
                return Err("bad key".into());
            }
            assert!(!self.panic_key, "key {} unhandled", key.0);
            Ok(())
        }

        fn on_mouse_move(&mut self, ctx: &mut WindowContext<'_>, _position: Point) -> Result<(), AppError> {
            let cursor = ctx.cursor();
            self.push(format!("mouse {} {}", cursor.x, cursor.y));
            Ok(())
        }

        fn on_update(&mut self, _ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
            self.push("update");
            Ok(())
        }

        fn on_close(&mut self, _ctx: &mut WindowContext<'_>) -> Result<bool, AppError> {
            self.push("close");
            Ok(!self.veto_close)
        }

        fn on_destroy(&mut self, _ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
            self.push("destroyed");
            Ok(())
        }
    }

    struct Harness {
        hub: Arc<Hub>,
        actor: WindowActor,
        log: Arc<Mutex<Vec<String>>>,
        _tx: Sender<Event>,
    }

    fn harness(script: Script) -> Harness {
        let hub = Arc::new(Hub::new(Arc::new(NullControl)));
        let (tx, rx) = unbounded();
        let handle = hub.register(tx.clone()).unwrap();
        hub.finish_launch();
        let log = Arc::clone(&script.log);
        let actor = WindowActor::new(Arc::clone(&hub), handle, Box::new(script), rx, None);
        Harness { hub, actor, log, _tx: tx }
    }

    impl Harness {
        fn feed(&mut self, kind: EventKind) {
            self.actor.handle_event(Event::new(self.hub.now(), kind));
        }

        fn requests(&self) -> Vec<NativeOp> {
            self.hub.drain_all().iter().map(|r| r.kind.op()).collect()
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn boot(&mut self) {
            self.feed(EventKind::Config);
            self.feed(EventKind::Created {
                properties: WindowProperties::default(),
            });
            self.feed(EventKind::Shown);
            self.requests();
        }
    }

    #[test]
    fn test_lifecycle_order() {
        let mut h = harness(Script::default());
        assert_eq!(h.actor.state(), WindowState::Config);

        h.feed(EventKind::Config);
        assert_eq!(h.actor.state(), WindowState::Config);
        assert_eq!(h.requests(), vec![NativeOp::Create]);

        h.feed(EventKind::Created {
            properties: WindowProperties::default(),
        });
        assert_eq!(h.actor.state(), WindowState::Running);
        assert_eq!(h.requests(), vec![NativeOp::Show]);

        h.feed(EventKind::Shown);
        h.feed(EventKind::UpdateTick { requested: false });
        h.feed(EventKind::CloseRequested);
        assert_eq!(h.actor.state(), WindowState::Closing);
        assert_eq!(h.requests(), vec![NativeOp::Destroy]);

        h.feed(EventKind::Destroyed);
        assert_eq!(h.actor.state(), WindowState::Quit);
        h.actor.finish();

        assert_eq!(
            h.log(),
            vec!["config", "created", "shown", "update", "close", "destroyed"]
        );
        assert!(!h.hub.is_live(h.actor.handle()));
        assert!(!h.hub.coordinator().is_latched());
    }

    #[test]
    fn test_close_veto_keeps_running() {
        let mut h = harness(Script {
            veto_close: true,
            ..Script::default()
        });
        h.boot();

        h.feed(EventKind::CloseRequested);
        assert_eq!(h.actor.state(), WindowState::Running);
        assert!(h.requests().is_empty());

        h.feed(EventKind::KeyDown {
            key: KeyCode(65),
            repeat: 1,
        });
        assert_eq!(h.log().last().map(String::as_str), Some("key 65"));
        assert_eq!(h.actor.state(), WindowState::Running);
    }

    #[test]
    fn test_closing_discards_input_until_destroyed() {
        let mut h = harness(Script::default());
        h.boot();
        h.feed(EventKind::CloseRequested);
        let before = h.log().len();

        h.feed(EventKind::KeyDown {
            key: KeyCode(13),
            repeat: 1,
        });
        h.feed(EventKind::UpdateTick { requested: false });
        h.feed(EventKind::CloseRequested);
        assert_eq!(h.log().len(), before);
        assert_eq!(h.actor.state(), WindowState::Closing);

        h.feed(EventKind::Destroyed);
        assert_eq!(h.actor.state(), WindowState::Quit);
    }

    #[test]
    fn test_configure_error_skips_create() {
        let mut h = harness(Script {
            fail_configure: true,
            ..Script::default()
        });
        h.feed(EventKind::Config);
        assert_eq!(h.actor.state(), WindowState::Quit);
        assert!(h.requests().is_empty());

        h.actor.finish();
        // No destroy callback for a window that never existed.
        assert_eq!(h.log(), vec!["config"]);
        assert!(matches!(
            h.hub.take_error(),
            Some(EngineError::Callback { callback: "configure", .. })
        ));
    }

    #[test]
    fn test_callback_error_suppresses_further_callbacks() {
        let mut h = harness(Script {
            fail_key: true,
            ..Script::default()
        });
        h.boot();

        h.feed(EventKind::KeyDown {
            key: KeyCode(1),
            repeat: 1,
        });
        assert_eq!(h.actor.state(), WindowState::Closing);
        assert_eq!(h.requests(), vec![NativeOp::Destroy]);

        h.feed(EventKind::Destroyed);
        h.actor.finish();
        assert_eq!(h.log(), vec!["config", "created", "shown", "key 1"]);
        assert!(h.hub.coordinator().is_latched());
    }

    #[test]
    fn test_native_failure_before_create_closes() {
        let mut h = harness(Script::default());
        h.feed(EventKind::Config);
        h.requests();

        h.feed(EventKind::NativeFailure { op: NativeOp::Create });
        assert_eq!(h.actor.state(), WindowState::Closing);
        assert_eq!(h.requests(), vec![NativeOp::Destroy]);

        // A late `created` is not processed while closing.
        h.feed(EventKind::Created {
            properties: WindowProperties::default(),
        });
        assert_eq!(h.actor.state(), WindowState::Closing);
        h.feed(EventKind::Destroyed);
        assert_eq!(h.actor.state(), WindowState::Quit);
    }

    #[test]
    fn test_input_updates_cached_state() {
        let mut h = harness(Script::default());
        h.boot();

        h.feed(EventKind::MouseMove {
            position: Point::new(12, 34),
        });
        assert_eq!(h.log().last().map(String::as_str), Some("mouse 12 34"));

        let resized = WindowProperties::default().with_size(800, 600);
        h.feed(EventKind::Resized {
            properties: resized.clone(),
        });
        assert_eq!(h.actor.core.properties, resized);
    }

    #[test]
    fn test_auto_update_synthesizes_ticks_after_show() {
        let mut h = harness(Script {
            auto_update: true,
            ..Script::default()
        });
        h.feed(EventKind::Config);
        h.feed(EventKind::Created {
            properties: WindowProperties::default(),
        });
        assert!(!h.actor.ticking());

        h.feed(EventKind::Shown);
        assert!(h.actor.ticking());
        let event = h.actor.next_event().unwrap();
        assert_eq!(event.kind, EventKind::UpdateTick { requested: false });
    }

    #[test]
    fn test_request_update_is_coalesced() {
        let mut h = harness(Script::default());
        h.boot();

        {
            let mut ctx = WindowContext::new(&mut h.actor.core);
            ctx.request_update().unwrap();
            ctx.request_update().unwrap();
        }
        assert_eq!(h.requests(), vec![NativeOp::Redraw]);

        h.feed(EventKind::UpdateTick { requested: true });
        WindowContext::new(&mut h.actor.core).request_update().unwrap();
        assert_eq!(h.requests(), vec![NativeOp::Redraw]);
    }

    #[test]
    fn test_platform_paint_leaves_request_outstanding() {
        let mut h = harness(Script::default());
        h.boot();
        WindowContext::new(&mut h.actor.core).request_update().unwrap();
        assert_eq!(h.requests(), vec![NativeOp::Redraw]);

        // A paint the platform chose runs the callback but does not answer
        // the request, so no second redraw goes out.
        h.feed(EventKind::UpdateTick { requested: false });
        assert_eq!(h.log().last().map(String::as_str), Some("update"));
        WindowContext::new(&mut h.actor.core).request_update().unwrap();
        assert!(h.requests().is_empty());

        h.feed(EventKind::UpdateTick { requested: true });
        WindowContext::new(&mut h.actor.core).request_update().unwrap();
        assert_eq!(h.requests(), vec![NativeOp::Redraw]);
    }

    #[test]
    fn test_update_requested_in_configure_follows_show() {
        let mut h = harness(Script {
            update_on_configure: true,
            ..Script::default()
        });
        h.feed(EventKind::Config);
        // No native window to redraw yet.
        assert_eq!(h.requests(), vec![NativeOp::Create]);

        h.feed(EventKind::Created {
            properties: WindowProperties::default(),
        });
        assert_eq!(h.requests(), vec![NativeOp::Show, NativeOp::Redraw]);

        h.feed(EventKind::Shown);
        h.feed(EventKind::UpdateTick { requested: true });
        assert_eq!(h.log().last().map(String::as_str), Some("update"));

        // The request was answered, so the next one goes out.
        WindowContext::new(&mut h.actor.core).request_update().unwrap();
        assert_eq!(h.requests(), vec![NativeOp::Redraw]);
    }

    #[test]
    fn test_update_requested_in_configure_is_dropped_with_auto_update() {
        let mut h = harness(Script {
            update_on_configure: true,
            auto_update: true,
            ..Script::default()
        });
        h.feed(EventKind::Config);
        h.requests();
        h.feed(EventKind::Created {
            properties: WindowProperties::default(),
        });
        assert_eq!(h.requests(), vec![NativeOp::Show]);
        assert!(!h.actor.core.update_wanted);
    }

    #[test]
    fn test_request_close_from_callback() {
        struct Quitter;
        impl WindowBehavior for Quitter {
            fn configure(&mut self, _ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
                Ok(WindowProperties::default().with_auto_update(false))
            }

            fn on_update(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
                ctx.request_close();
                Ok(())
            }
        }

        let hub = Arc::new(Hub::new(Arc::new(NullControl)));
        let (tx, rx) = unbounded();
        let handle = hub.register(tx).unwrap();
        let mut actor = WindowActor::new(Arc::clone(&hub), handle, Box::new(Quitter), rx, None);
        for kind in [
            EventKind::Config,
            EventKind::Created {
                properties: WindowProperties::default(),
            },
            EventKind::Shown,
            EventKind::UpdateTick { requested: false },
        ] {
            actor.handle_event(Event::new(0, kind));
        }
        assert_eq!(actor.state(), WindowState::Closing);
    }

    #[test]
    fn test_panicking_callback_releases_and_latches() {
        let mut h = harness(Script {
            panic_key: true,
            ..Script::default()
        });
        h.boot();
        let Harness { hub, mut actor, .. } = h;
        let handle = actor.handle();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            actor.handle_event(Event::new(0, EventKind::KeyDown { key: KeyCode(7), repeat: 1 }));
        }));
        assert!(outcome.is_err());
        assert!(!hub.is_live(handle));
        assert!(hub.is_shutting_down());
        assert!(matches!(
            hub.take_error(),
            Some(EngineError::ActorPanicked { handle: panicked }) if panicked == handle
        ));
    }

    #[test]
    fn test_drop_releases_handle() {
        let h = harness(Script::default());
        let handle = h.actor.handle();
        assert!(h.hub.is_live(handle));
        let hub = Arc::clone(&h.hub);
        drop(h);
        assert!(!hub.is_live(handle));
    }
}
