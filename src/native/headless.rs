//! Headless platform: An in-process message pump with no OS windows.
//!
//! Messages (wakes, quits, injected input, paint requests) go through one
//! channel and are dispatched in order on whichever thread calls
//! [`NativePlatform::run_pump`]. Window state lives in plain structs, and
//! every native call is logged so callers can check what the engine asked
//! for.

use super::{NativePlatform, NativeWindowId, NativeWindows, PumpControl};
use crate::actor::{KeyCode, NativeLoopBridge, WindowHandle};
use crate::error::{NativeError, NativeOp};
use crate::geometry::{Point, Size};
use crate::window::{PropertyDelta, WindowProperties, WindowStyle};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Messages processed by the headless pump.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PumpMessage {
    Wake,
    Quit,
    Paint(WindowHandle),
    Input(WindowHandle, NativeInput),
}

/// Simulated user or host input for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeInput {
    /// Key pressed.
    KeyDown {
        /// Platform key code.
        key: KeyCode,
        /// Repeat count.
        repeat: u16,
    },
    /// Key released.
    KeyUp {
        /// Platform key code.
        key: KeyCode,
    },
    /// Cursor moved, in client coordinates. Ignored outside the client area.
    MouseMove(Point),
    /// Wheel turned.
    Wheel(i16),
    /// User dragged the border. Clamped to the window's bounds.
    Resize(Size),
    /// User dragged the title bar.
    Move(Point),
    /// Minimize (`true`) or restore (`false`).
    Minimize(bool),
    /// Close box clicked.
    Close,
    /// The host destroyed the window.
    Destroy,
}

/// A native call made by the engine, as recorded by [`HeadlessWindows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    /// `create_window`.
    Create(WindowHandle),
    /// `show_window`.
    Show(WindowHandle),
    /// `set_properties`.
    SetProperties(WindowHandle),
    /// `destroy_window`.
    Destroy(WindowHandle),
    /// `request_redraw`.
    Redraw(WindowHandle),
}

/// Thread-safe pump controls.
#[derive(Debug)]
pub struct HeadlessControl {
    tx: Sender<PumpMessage>,
    fail_wake: AtomicBool,
    wakes: AtomicUsize,
}

impl PumpControl for HeadlessControl {
    fn wake(&self) -> Result<(), NativeError> {
        if self.fail_wake.load(Ordering::Acquire) {
            return Err(NativeError::new(NativeOp::Wake, 1, "headless pump unreachable"));
        }
        self.wakes.fetch_add(1, Ordering::Relaxed);
        self.tx
            .send(PumpMessage::Wake)
            .map_err(|_| NativeError::new(NativeOp::Wake, 2, "headless pump gone"))
    }

    fn post_quit(&self) -> Result<(), NativeError> {
        self.tx
            .send(PumpMessage::Quit)
            .map_err(|_| NativeError::new(NativeOp::PostQuit, 2, "headless pump gone"))
    }
}

/// Cloneable handle for injecting input from any thread.
#[derive(Debug, Clone)]
pub struct HeadlessInjector {
    tx: Sender<PumpMessage>,
}

impl HeadlessInjector {
    /// Queue input for a window. Returns `false` if the platform is gone.
    pub fn send(&self, handle: WindowHandle, input: NativeInput) -> bool {
        self.tx.send(PumpMessage::Input(handle, input)).is_ok()
    }

    /// Press and release a key.
    pub fn tap(&self, handle: WindowHandle, key: KeyCode) -> bool {
        self.send(handle, NativeInput::KeyDown { key, repeat: 1 }) && self.send(handle, NativeInput::KeyUp { key })
    }

    /// Click the close box.
    pub fn close(&self, handle: WindowHandle) -> bool {
        self.send(handle, NativeInput::Close)
    }
}

#[derive(Debug)]
struct HeadlessWindow {
    handle: WindowHandle,
    properties: WindowProperties,
    visible: bool,
}

/// Window table of the headless platform.
#[derive(Debug)]
pub struct HeadlessWindows {
    tx: Sender<PumpMessage>,
    next_id: u64,
    windows: HashMap<NativeWindowId, HeadlessWindow>,
    calls: Vec<NativeCall>,
    fail_create: Option<i32>,
}

impl HeadlessWindows {
    fn get(&self, id: NativeWindowId, op: NativeOp) -> Result<&HeadlessWindow, NativeError> {
        self.windows
            .get(&id)
            .ok_or_else(|| NativeError::new(op, 1400, format!("no window {}", id.0)))
    }

    fn find(&mut self, handle: WindowHandle) -> Option<(NativeWindowId, &mut HeadlessWindow)> {
        self.windows
            .iter_mut()
            .find(|(_, window)| window.handle == handle)
            .map(|(id, window)| (*id, window))
    }

    /// Forward one input message to the bridge, as an OS would.
    fn dispatch(&mut self, bridge: &mut NativeLoopBridge, handle: WindowHandle, input: NativeInput) {
        let Some((id, window)) = self.find(handle) else {
            trace!("Input for window {handle} without native window: {input:?}");
            return;
        };
        match input {
            NativeInput::KeyDown { key, repeat } => bridge.on_key_down(handle, key, repeat),
            NativeInput::KeyUp { key } => bridge.on_key_up(handle, key),
            NativeInput::MouseMove(position) => {
                if window.properties.client_rect().contains(position) {
                    bridge.on_mouse_move(handle, position);
                }
            }
            NativeInput::Wheel(delta) => bridge.on_wheel(handle, delta),
            NativeInput::Resize(size) => {
                if window.properties.style.contains(WindowStyle::RESIZABLE) {
                    let size = window.properties.clamped_size(size);
                    window.properties.size = size;
                    bridge.on_resized(handle, size);
                }
            }
            NativeInput::Move(position) => {
                window.properties.position = position;
                bridge.on_moved(handle, position);
            }
            NativeInput::Minimize(minimized) => {
                window.properties.minimized = minimized;
                bridge.on_minimized(handle, minimized);
            }
            NativeInput::Close => bridge.on_close_requested(handle),
            NativeInput::Destroy => {
                self.windows.remove(&id);
                bridge.on_destroyed(handle);
            }
        }
    }
}

impl NativeWindows for HeadlessWindows {
    fn create_window(
        &mut self,
        handle: WindowHandle,
        properties: &WindowProperties,
    ) -> Result<NativeWindowId, NativeError> {
        self.calls.push(NativeCall::Create(handle));
        if let Some(code) = self.fail_create.take() {
            return Err(NativeError::new(NativeOp::Create, code, "injected failure").with_secondary(-1));
        }
        self.next_id += 1;
        let id = NativeWindowId(self.next_id);
        self.windows.insert(
            id,
            HeadlessWindow {
                handle,
                properties: properties.clone(),
                visible: false,
            },
        );
        Ok(id)
    }

    fn show_window(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        let handle = self.get(id, NativeOp::Show)?.handle;
        self.calls.push(NativeCall::Show(handle));
        if let Some(window) = self.windows.get_mut(&id) {
            window.visible = true;
        }
        Ok(())
    }

    fn set_properties(&mut self, id: NativeWindowId, delta: &PropertyDelta) -> Result<(), NativeError> {
        let handle = self.get(id, NativeOp::SetProperties)?.handle;
        self.calls.push(NativeCall::SetProperties(handle));
        if let Some(window) = self.windows.get_mut(&id) {
            window.properties.apply(delta);
        }
        Ok(())
    }

    fn destroy_window(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        let window = self
            .windows
            .remove(&id)
            .ok_or_else(|| NativeError::new(NativeOp::Destroy, 1400, format!("no window {}", id.0)))?;
        self.calls.push(NativeCall::Destroy(window.handle));
        Ok(())
    }

    fn request_redraw(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        let handle = self.get(id, NativeOp::Redraw)?.handle;
        self.calls.push(NativeCall::Redraw(handle));
        self.tx
            .send(PumpMessage::Paint(handle))
            .map_err(|_| NativeError::new(NativeOp::Redraw, 2, "headless pump gone"))
    }
}

/// A complete native platform without a display.
#[derive(Debug)]
pub struct HeadlessPlatform {
    rx: Receiver<PumpMessage>,
    control: Arc<HeadlessControl>,
    windows: HeadlessWindows,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// Create a platform with no windows.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            rx,
            control: Arc::new(HeadlessControl {
                tx: tx.clone(),
                fail_wake: AtomicBool::new(false),
                wakes: AtomicUsize::new(0),
            }),
            windows: HeadlessWindows {
                tx,
                next_id: 0,
                windows: HashMap::new(),
                calls: Vec::new(),
                fail_create: None,
            },
        }
    }

    /// Input injector usable from any thread.
    pub fn injector(&self) -> HeadlessInjector {
        HeadlessInjector {
            tx: self.control.tx.clone(),
        }
    }

    /// Make the next `create_window` fail with `code`.
    pub fn fail_next_create(&mut self, code: i32) {
        self.windows.fail_create = Some(code);
    }

    /// Make every wake fail (or succeed again).
    pub fn set_wake_failure(&self, fail: bool) {
        self.control.fail_wake.store(fail, Ordering::Release);
    }

    /// Native calls made so far, in order.
    pub fn calls(&self) -> &[NativeCall] {
        &self.windows.calls
    }

    /// Number of native windows still open.
    pub fn open_windows(&self) -> usize {
        self.windows.windows.len()
    }

    /// Number of visible native windows.
    pub fn visible_windows(&self) -> usize {
        self.windows.windows.values().filter(|w| w.visible).count()
    }

    /// Number of successful wakes.
    pub fn wake_count(&self) -> usize {
        self.control.wakes.load(Ordering::Relaxed)
    }
}

impl NativePlatform for HeadlessPlatform {
    fn control(&self) -> Arc<dyn PumpControl> {
        self.control.clone()
    }

    fn run_pump(&mut self, bridge: &mut NativeLoopBridge) -> Result<(), NativeError> {
        loop {
            let message = self
                .rx
                .recv()
                .map_err(|_| NativeError::new(NativeOp::RunPump, 2, "headless pump disconnected"))?;
            match message {
                PumpMessage::Wake => bridge.on_wake(&mut self.windows),
                PumpMessage::Quit => return Ok(()),
                PumpMessage::Paint(handle) => bridge.on_redraw(handle),
                PumpMessage::Input(handle, input) => self.windows.dispatch(bridge, handle, input),
            }
        }
    }

    fn windows(&mut self) -> &mut dyn NativeWindows {
        &mut self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Event, EventKind, Hub, Request, RequestKind};
    use crossbeam_channel::Receiver as EventReceiver;

    fn setup() -> (HeadlessPlatform, Arc<Hub>, WindowHandle, EventReceiver<Event>) {
        let platform = HeadlessPlatform::new();
        let hub = Arc::new(Hub::new(platform.control()));
        let (tx, rx) = unbounded();
        let handle = hub.register(tx).unwrap();
        hub.finish_launch();
        (platform, hub, handle, rx)
    }

    fn names(rx: &EventReceiver<Event>) -> Vec<&'static str> {
        rx.try_iter().map(|event| event.kind.name()).collect()
    }

    #[test]
    fn test_pump_runs_requests_and_input_until_quit() {
        let (mut platform, hub, handle, rx) = setup();
        let mut bridge = NativeLoopBridge::new(Arc::clone(&hub));

        hub.submit(Request::new(handle, RequestKind::Create(Box::default()))).unwrap();
        hub.submit(Request::new(handle, RequestKind::Show)).unwrap();
        let injector = platform.injector();
        injector.tap(handle, KeyCode(32));
        injector.send(handle, NativeInput::MouseMove(Point::new(5000, 5)));
        injector.send(handle, NativeInput::MouseMove(Point::new(10, 5)));
        injector.close(handle);
        hub.coordinator().request_quit();

        platform.run_pump(&mut bridge).unwrap();

        assert_eq!(
            names(&rx),
            vec!["created", "shown", "key-down", "key-up", "mouse-move", "close-requested"]
        );
        assert_eq!(
            platform.calls(),
            &[NativeCall::Create(handle), NativeCall::Show(handle)]
        );
        assert_eq!(platform.visible_windows(), 1);
        assert_eq!(platform.wake_count(), 1);
    }

    #[test]
    fn test_resize_is_clamped_by_platform() {
        let (mut platform, hub, handle, rx) = setup();
        let mut bridge = NativeLoopBridge::new(Arc::clone(&hub));
        let properties = WindowProperties::default().with_bounds(None, Some(Size::new(800, 600)));
        hub.submit(Request::new(handle, RequestKind::Create(Box::new(properties)))).unwrap();
        platform.injector().send(handle, NativeInput::Resize(Size::new(1000, 500)));
        hub.coordinator().request_quit();

        platform.run_pump(&mut bridge).unwrap();

        let last = rx.try_iter().last().unwrap();
        match last.kind {
            EventKind::Resized { properties } => assert_eq!(properties.size, Size::new(800, 500)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_redraw_round_trips_as_update_tick() {
        let (mut platform, hub, handle, rx) = setup();
        let mut bridge = NativeLoopBridge::new(Arc::clone(&hub));
        hub.submit(Request::new(handle, RequestKind::Create(Box::default()))).unwrap();
        hub.submit(Request::new(
            handle,
            RequestKind::Custom(crate::actor::CustomRequest::Redraw),
        ))
        .unwrap();

        // Quit only once the paint has been turned into a tick.
        let control = platform.control();
        let watcher = std::thread::spawn(move || {
            let kinds: Vec<EventKind> = rx.iter().take(2).map(|event| event.kind).collect();
            control.post_quit().map(|()| kinds)
        });
        platform.run_pump(&mut bridge).unwrap();
        let kinds = watcher.join().unwrap().unwrap();

        assert_eq!(kinds[0].name(), "created");
        assert_eq!(kinds[1], EventKind::UpdateTick { requested: true });
    }

    #[test]
    fn test_wake_failure_is_reported() {
        let (platform, hub, handle, _rx) = setup();
        platform.set_wake_failure(true);
        let result = hub.submit(Request::new(handle, RequestKind::Show));
        assert!(result.is_err());
        assert_eq!(platform.wake_count(), 0);
    }

    #[test]
    fn test_host_destroy_notifies_bridge() {
        let (mut platform, hub, handle, rx) = setup();
        let mut bridge = NativeLoopBridge::new(Arc::clone(&hub));
        hub.submit(Request::new(handle, RequestKind::Create(Box::default()))).unwrap();
        platform.injector().send(handle, NativeInput::Destroy);
        hub.coordinator().request_quit();

        platform.run_pump(&mut bridge).unwrap();
        assert_eq!(names(&rx), vec!["created", "destroyed"]);
        assert_eq!(platform.open_windows(), 0);
        assert_eq!(bridge.window_count(), 0);
    }
}
