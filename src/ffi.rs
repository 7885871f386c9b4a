//! C Foreign Function Interface (FFI) for Casement.
//!
//! This module lets a native host written in another language supply the
//! platform layer. The host fills a [`CasementPlatformVTable`] with
//! `extern "C"` functions; [`FfiPlatform`] turns it into a
//! [`NativePlatform`] the engine can run on. While its `run_pump` function
//! runs, the host reports native callbacks through the `casement_notify_*`
//! functions.
//!
//! # Safety
//!
//! All functions that accept pointers require valid pointers. The
//! `CasementBridge` pointer handed to `run_pump` is only valid until
//! `run_pump` returns, and only on the thread that called it. Notifications
//! must not be sent from inside another vtable call; they are refused with
//! [`CasementStatus::Reentrant`].
//!
//! # Example (C)
//!
//! ```c
//! #include "casement.h"
//!
//! static int run_pump(void* user_data, CasementBridge* bridge) {
//!     MSG msg;
//!     while (GetMessage(&msg, NULL, 0, 0) > 0) {
//!         if (msg.message == WM_APP_WAKE) {
//!             casement_notify_wake(bridge);
//!         }
//!         DispatchMessage(&msg);
//!     }
//!     return 0;
//! }
//! ```

// FFI modules intentionally use unsafe and no_mangle
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use crate::actor::{KeyCode, NativeLoopBridge, WindowHandle};
use crate::error::{NativeError, NativeOp};
use crate::geometry::{Point, Size};
use crate::native::{NativePlatform, NativeWindowId, NativeWindows, PumpControl};
use crate::window::{PropertyDelta, WindowProperties};
use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::sync::Arc;

// =============================================================================
// Result Codes
// =============================================================================

/// Result codes for notification functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasementStatus {
    /// Notification delivered.
    Ok = 0,
    /// Null bridge pointer passed.
    NullPointer = 1,
    /// Called from inside another vtable call.
    Reentrant = 2,
}

// =============================================================================
// Host Interface
// =============================================================================

/// Window properties as seen by the host.
///
/// `title` is NUL-terminated UTF-8, valid only for the duration of the call.
/// A bound of zero means unbounded.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CasementProperties {
    /// Window title.
    pub title: *const c_char,
    /// Left edge in screen coordinates.
    pub x: i32,
    /// Top edge in screen coordinates.
    pub y: i32,
    /// Client-area width.
    pub width: u32,
    /// Client-area height.
    pub height: u32,
    /// Minimum width, or 0.
    pub min_width: u32,
    /// Minimum height, or 0.
    pub min_height: u32,
    /// Maximum width, or 0.
    pub max_width: u32,
    /// Maximum height, or 0.
    pub max_height: u32,
    /// `WindowStyle` bits.
    pub style: u32,
    /// Whether the window is minimized.
    pub minimized: bool,
}

/// Platform functions supplied by the host.
///
/// Every function returns 0 on success and a host-defined error code
/// otherwise. `wake` and `post_quit` may be called from any thread; all
/// others are called on the thread running `run_pump`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CasementPlatformVTable {
    /// Passed back as the first argument of every function.
    pub user_data: *mut c_void,
    /// Wake the pump; it must then call `casement_notify_wake`.
    pub wake: extern "C" fn(user_data: *mut c_void) -> c_int,
    /// Make `run_pump` return. May be called before the pump starts.
    pub post_quit: extern "C" fn(user_data: *mut c_void) -> c_int,
    /// Run the message pump until a quit is posted.
    pub run_pump: extern "C" fn(user_data: *mut c_void, bridge: *mut CasementBridge) -> c_int,
    /// Create a hidden window and write its id to `out_id`.
    pub create_window: extern "C" fn(
        user_data: *mut c_void,
        handle: u32,
        properties: *const CasementProperties,
        out_id: *mut u64,
    ) -> c_int,
    /// Show a window.
    pub show_window: extern "C" fn(user_data: *mut c_void, id: u64) -> c_int,
    /// Apply the complete new property set.
    pub set_properties:
        extern "C" fn(user_data: *mut c_void, id: u64, properties: *const CasementProperties) -> c_int,
    /// Destroy a window.
    pub destroy_window: extern "C" fn(user_data: *mut c_void, id: u64) -> c_int,
    /// Schedule a repaint; the host answers with `casement_notify_redraw`.
    pub request_redraw: extern "C" fn(user_data: *mut c_void, id: u64) -> c_int,
    /// Optional: the platform's last error code, reported as the secondary code.
    pub last_platform_error: Option<extern "C" fn(user_data: *mut c_void) -> c_int>,
}

#[derive(Debug)]
struct Host(CasementPlatformVTable);

// SAFETY: `FfiPlatform::new` requires `user_data` to outlive the platform and
// `wake`/`post_quit` to be callable from any thread. Every other function is
// only called from the pump thread.
unsafe impl Send for Host {}
unsafe impl Sync for Host {}

impl Host {
    fn check(&self, op: NativeOp, code: c_int, context: &str) -> Result<(), NativeError> {
        if code == 0 {
            return Ok(());
        }
        let err = NativeError::new(op, code, context);
        Err(match self.0.last_platform_error {
            Some(last_error) => err.with_secondary(last_error(self.0.user_data)),
            None => err,
        })
    }
}

/// Properties marshaled for one host call.
struct Marshaled {
    raw: CasementProperties,
    // Owns the buffer `raw.title` points into.
    _title: CString,
}

impl Marshaled {
    fn new(properties: &WindowProperties, op: NativeOp) -> Result<Self, NativeError> {
        let title = CString::new(properties.title.as_str())
            .map_err(|_| NativeError::new(op, -1, "window title contains a NUL byte"))?;
        let (min_width, min_height) = bound(properties.min_size);
        let (max_width, max_height) = bound(properties.max_size);
        Ok(Self {
            raw: CasementProperties {
                title: title.as_ptr(),
                x: properties.position.x,
                y: properties.position.y,
                width: properties.size.width,
                height: properties.size.height,
                min_width,
                min_height,
                max_width,
                max_height,
                style: properties.style.bits(),
                minimized: properties.minimized,
            },
            _title: title,
        })
    }
}

fn bound(size: Option<Size>) -> (u32, u32) {
    size.map_or((0, 0), |size| (size.width, size.height))
}

// =============================================================================
// Platform Adapter
// =============================================================================

/// Pump controls backed by the host's `wake` and `post_quit`.
#[derive(Debug)]
pub struct FfiControl {
    host: Arc<Host>,
}

impl PumpControl for FfiControl {
    fn wake(&self) -> Result<(), NativeError> {
        let code = (self.host.0.wake)(self.host.0.user_data);
        self.host.check(NativeOp::Wake, code, "host wake failed")
    }

    fn post_quit(&self) -> Result<(), NativeError> {
        let code = (self.host.0.post_quit)(self.host.0.user_data);
        self.host.check(NativeOp::PostQuit, code, "host post_quit failed")
    }
}

/// Window operations backed by the host.
///
/// The host is always handed complete property sets, so the last applied
/// properties of every window are kept here.
#[derive(Debug)]
pub struct FfiWindows {
    host: Arc<Host>,
    properties: HashMap<NativeWindowId, WindowProperties>,
}

impl FfiWindows {
    fn track(&mut self, bridge: &NativeLoopBridge, handle: WindowHandle, change: impl FnOnce(&mut WindowProperties)) {
        if let Some(properties) = bridge.native_id(handle).and_then(|id| self.properties.get_mut(&id)) {
            change(properties);
        }
    }
}

impl NativeWindows for FfiWindows {
    fn create_window(
        &mut self,
        handle: WindowHandle,
        properties: &WindowProperties,
    ) -> Result<NativeWindowId, NativeError> {
        let marshaled = Marshaled::new(properties, NativeOp::Create)?;
        let mut id = 0;
        let code = (self.host.0.create_window)(self.host.0.user_data, handle.raw(), &marshaled.raw, &mut id);
        self.host.check(NativeOp::Create, code, "host create_window failed")?;
        let id = NativeWindowId(id);
        self.properties.insert(id, properties.clone());
        Ok(id)
    }

    fn show_window(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        let code = (self.host.0.show_window)(self.host.0.user_data, id.0);
        self.host.check(NativeOp::Show, code, "host show_window failed")
    }

    fn set_properties(&mut self, id: NativeWindowId, delta: &PropertyDelta) -> Result<(), NativeError> {
        let mut next = self
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| NativeError::new(NativeOp::SetProperties, -1, format!("unknown window {}", id.0)))?;
        next.apply(delta);
        let marshaled = Marshaled::new(&next, NativeOp::SetProperties)?;
        let code = (self.host.0.set_properties)(self.host.0.user_data, id.0, &marshaled.raw);
        self.host.check(NativeOp::SetProperties, code, "host set_properties failed")?;
        self.properties.insert(id, next);
        Ok(())
    }

    fn destroy_window(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        self.properties.remove(&id);
        let code = (self.host.0.destroy_window)(self.host.0.user_data, id.0);
        self.host.check(NativeOp::Destroy, code, "host destroy_window failed")
    }

    fn request_redraw(&mut self, id: NativeWindowId) -> Result<(), NativeError> {
        let code = (self.host.0.request_redraw)(self.host.0.user_data, id.0);
        self.host.check(NativeOp::Redraw, code, "host request_redraw failed")
    }
}

/// A [`NativePlatform`] implemented by a C host.
#[derive(Debug)]
pub struct FfiPlatform {
    host: Arc<Host>,
    control: Arc<FfiControl>,
    windows: FfiWindows,
}

impl FfiPlatform {
    /// Wrap a host vtable.
    ///
    /// # Safety
    ///
    /// Every function pointer must be callable with `user_data` for as long
    /// as the platform lives, and `wake`/`post_quit` must be safe to call
    /// from any thread.
    pub unsafe fn new(vtable: CasementPlatformVTable) -> Self {
        let host = Arc::new(Host(vtable));
        Self {
            control: Arc::new(FfiControl {
                host: Arc::clone(&host),
            }),
            windows: FfiWindows {
                host: Arc::clone(&host),
                properties: HashMap::new(),
            },
            host,
        }
    }
}

impl NativePlatform for FfiPlatform {
    fn control(&self) -> Arc<dyn PumpControl> {
        self.control.clone()
    }

    fn run_pump(&mut self, bridge: &mut NativeLoopBridge) -> Result<(), NativeError> {
        let mut shim = CasementBridge {
            bridge,
            windows: &mut self.windows,
            busy: Cell::new(false),
        };
        let code = (self.host.0.run_pump)(self.host.0.user_data, &mut shim);
        self.host.check(NativeOp::RunPump, code, "host run_pump failed")
    }

    fn windows(&mut self) -> &mut dyn NativeWindows {
        &mut self.windows
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Opaque handle to the engine's side of a running pump.
pub struct CasementBridge {
    bridge: *mut NativeLoopBridge,
    windows: *mut FfiWindows,
    busy: Cell<bool>,
}

unsafe fn with_bridge(
    bridge: *mut CasementBridge,
    notify: impl FnOnce(&mut NativeLoopBridge, &mut FfiWindows),
) -> CasementStatus {
    let Some(shim) = bridge.as_ref() else {
        return CasementStatus::NullPointer;
    };
    if shim.busy.replace(true) {
        return CasementStatus::Reentrant;
    }
    notify(&mut *shim.bridge, &mut *shim.windows);
    shim.busy.set(false);
    CasementStatus::Ok
}

/// The pump was woken: execute queued requests.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_wake(bridge: *mut CasementBridge) -> CasementStatus {
    with_bridge(bridge, |bridge, windows| bridge.on_wake(windows))
}

/// A key went down.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_key_down(
    bridge: *mut CasementBridge,
    handle: u32,
    key: u32,
    repeat: u16,
) -> CasementStatus {
    with_bridge(bridge, |bridge, _| {
        bridge.on_key_down(WindowHandle::new(handle), KeyCode(key), repeat);
    })
}

/// A key went up.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_key_up(bridge: *mut CasementBridge, handle: u32, key: u32) -> CasementStatus {
    with_bridge(bridge, |bridge, _| bridge.on_key_up(WindowHandle::new(handle), KeyCode(key)))
}

/// The cursor moved over the client area.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_mouse_move(
    bridge: *mut CasementBridge,
    handle: u32,
    x: i32,
    y: i32,
) -> CasementStatus {
    with_bridge(bridge, |bridge, _| {
        bridge.on_mouse_move(WindowHandle::new(handle), Point::new(x, y));
    })
}

/// The wheel turned.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_wheel(bridge: *mut CasementBridge, handle: u32, delta: i16) -> CasementStatus {
    with_bridge(bridge, |bridge, _| bridge.on_wheel(WindowHandle::new(handle), delta))
}

/// The client area was resized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_resized(
    bridge: *mut CasementBridge,
    handle: u32,
    width: u32,
    height: u32,
) -> CasementStatus {
    with_bridge(bridge, |bridge, windows| {
        let handle = WindowHandle::new(handle);
        let size = Size::new(width, height);
        windows.track(bridge, handle, |properties| properties.size = size);
        bridge.on_resized(handle, size);
    })
}

/// The window was moved.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_moved(
    bridge: *mut CasementBridge,
    handle: u32,
    x: i32,
    y: i32,
) -> CasementStatus {
    with_bridge(bridge, |bridge, windows| {
        let handle = WindowHandle::new(handle);
        let position = Point::new(x, y);
        windows.track(bridge, handle, |properties| properties.position = position);
        bridge.on_moved(handle, position);
    })
}

/// The window was minimized or restored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_minimized(
    bridge: *mut CasementBridge,
    handle: u32,
    minimized: bool,
) -> CasementStatus {
    with_bridge(bridge, |bridge, windows| {
        let handle = WindowHandle::new(handle);
        windows.track(bridge, handle, |properties| properties.minimized = minimized);
        bridge.on_minimized(handle, minimized);
    })
}

/// The user asked to close the window.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_close(bridge: *mut CasementBridge, handle: u32) -> CasementStatus {
    with_bridge(bridge, |bridge, _| bridge.on_close_requested(WindowHandle::new(handle)))
}

/// The window should repaint.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_redraw(bridge: *mut CasementBridge, handle: u32) -> CasementStatus {
    with_bridge(bridge, |bridge, _| bridge.on_redraw(WindowHandle::new(handle)))
}

/// The host destroyed the window on its own.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn casement_notify_destroyed(bridge: *mut CasementBridge, handle: u32) -> CasementStatus {
    with_bridge(bridge, |bridge, windows| {
        let handle = WindowHandle::new(handle);
        if let Some(id) = bridge.native_id(handle) {
            windows.properties.remove(&id);
        }
        bridge.on_destroyed(handle);
    })
}

// =============================================================================
// Version Information
// =============================================================================

/// Get the Casement version string.
#[unsafe(no_mangle)]
pub extern "C" fn casement_version() -> *const c_char {
    static VERSION: &[u8] = b"0.1.0\0";
    VERSION.as_ptr().cast::<c_char>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Engine, EngineConfig, Hub};
    use crate::error::{AppError, EngineError};
    use crate::window::{WindowBehavior, WindowContext};
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    struct TestHost {
        calls: Mutex<Vec<String>>,
        // `true` wakes, `false` quits.
        tx: Sender<bool>,
        rx: Receiver<bool>,
        next_id: AtomicU64,
        fail_create: c_int,
    }

    fn host<'a>(user_data: *mut c_void) -> &'a TestHost {
        unsafe { &*user_data.cast::<TestHost>() }
    }

    fn title(properties: *const CasementProperties) -> String {
        unsafe { CStr::from_ptr((*properties).title) }.to_string_lossy().into_owned()
    }

    extern "C" fn test_wake(user_data: *mut c_void) -> c_int {
        c_int::from(host(user_data).tx.send(true).is_err())
    }

    extern "C" fn test_post_quit(user_data: *mut c_void) -> c_int {
        c_int::from(host(user_data).tx.send(false).is_err())
    }

    extern "C" fn test_run_pump(user_data: *mut c_void, bridge: *mut CasementBridge) -> c_int {
        while let Ok(wake) = host(user_data).rx.recv() {
            if !wake {
                return 0;
            }
            unsafe { casement_notify_wake(bridge) };
        }
        1
    }

    extern "C" fn test_create(
        user_data: *mut c_void,
        handle: u32,
        properties: *const CasementProperties,
        out_id: *mut u64,
    ) -> c_int {
        let host = host(user_data);
        let (width, height) = unsafe { ((*properties).width, (*properties).height) };
        host.calls
            .lock()
            .unwrap()
            .push(format!("create {handle} {} {width}x{height}", title(properties)));
        if host.fail_create != 0 {
            return host.fail_create;
        }
        unsafe { *out_id = host.next_id.fetch_add(1, Ordering::Relaxed) + 1 };
        0
    }

    extern "C" fn test_show(user_data: *mut c_void, id: u64) -> c_int {
        host(user_data).calls.lock().unwrap().push(format!("show {id}"));
        0
    }

    extern "C" fn test_set(user_data: *mut c_void, id: u64, properties: *const CasementProperties) -> c_int {
        host(user_data)
            .calls
            .lock()
            .unwrap()
            .push(format!("set {id} {}", title(properties)));
        0
    }

    extern "C" fn test_destroy(user_data: *mut c_void, id: u64) -> c_int {
        host(user_data).calls.lock().unwrap().push(format!("destroy {id}"));
        0
    }

    extern "C" fn test_redraw(user_data: *mut c_void, id: u64) -> c_int {
        host(user_data).calls.lock().unwrap().push(format!("redraw {id}"));
        0
    }

    extern "C" fn test_last_error(_user_data: *mut c_void) -> c_int {
        1407
    }

    fn platform(fail_create: c_int) -> (FfiPlatform, &'static TestHost) {
        let (tx, rx) = unbounded();
        let host: &'static TestHost = Box::leak(Box::new(TestHost {
            calls: Mutex::new(Vec::new()),
            tx,
            rx,
            next_id: AtomicU64::new(0),
            fail_create,
        }));
        let vtable = CasementPlatformVTable {
            user_data: std::ptr::from_ref(host).cast_mut().cast::<c_void>(),
            wake: test_wake,
            post_quit: test_post_quit,
            run_pump: test_run_pump,
            create_window: test_create,
            show_window: test_show,
            set_properties: test_set,
            destroy_window: test_destroy,
            request_redraw: test_redraw,
            last_platform_error: Some(test_last_error),
        };
        (unsafe { FfiPlatform::new(vtable) }, host)
    }

    struct Renamer;

    impl WindowBehavior for Renamer {
        fn configure(&mut self, _ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
            Ok(WindowProperties::default().with_title("ffi").with_auto_update(false))
        }

        fn on_show(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
            ctx.set_properties(PropertyDelta::default().title("renamed"))?;
            ctx.request_close();
            Ok(())
        }
    }

    #[test]
    fn test_engine_runs_on_host_vtable() {
        let (mut platform, host) = platform(0);
        let engine = Engine::with_config(EngineConfig::default());

        engine.run(&mut platform, vec![Box::new(Renamer)]).unwrap();

        assert_eq!(
            *host.calls.lock().unwrap(),
            vec!["create 0 ffi 640x480", "show 1", "set 1 renamed", "destroy 1"]
        );
    }

    #[test]
    fn test_host_failure_carries_platform_code() {
        let (mut platform, _host) = platform(5);

        let err = Engine::new().run(&mut platform, vec![Box::new(Renamer)]).unwrap_err();

        match err {
            EngineError::Native { source, .. } => {
                assert_eq!(source.op, NativeOp::Create);
                assert_eq!(source.code, 5);
                assert_eq!(source.secondary, Some(1407));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_null_bridge_is_rejected() {
        unsafe {
            assert_eq!(casement_notify_wake(std::ptr::null_mut()), CasementStatus::NullPointer);
            assert_eq!(casement_notify_close(std::ptr::null_mut(), 0), CasementStatus::NullPointer);
        }
    }

    #[test]
    fn test_reentrant_notification_is_refused() {
        let (mut platform, _host) = platform(0);
        let hub = Arc::new(Hub::new(platform.control()));
        let mut bridge = NativeLoopBridge::new(hub);
        let mut shim = CasementBridge {
            bridge: &mut bridge,
            windows: &mut platform.windows,
            busy: Cell::new(true),
        };
        unsafe {
            assert_eq!(casement_notify_redraw(&mut shim, 0), CasementStatus::Reentrant);
        }
        shim.busy.set(false);
        unsafe {
            assert_eq!(casement_notify_redraw(&mut shim, 0), CasementStatus::Ok);
        }
    }

    #[test]
    fn test_marshaled_bounds_use_zero_for_unbounded() {
        let properties = WindowProperties::default().with_bounds(None, Some(Size::new(800, 600)));
        let marshaled = Marshaled::new(&properties, NativeOp::Create).unwrap();
        assert_eq!((marshaled.raw.min_width, marshaled.raw.min_height), (0, 0));
        assert_eq!((marshaled.raw.max_width, marshaled.raw.max_height), (800, 600));
        assert_eq!(title(&marshaled.raw), "casement");
    }

    #[test]
    fn test_title_with_nul_is_rejected() {
        let properties = WindowProperties::default().with_title("bad\0title");
        let err = Marshaled::new(&properties, NativeOp::Create).err().unwrap();
        assert_eq!(err.code, -1);
    }

    #[test]
    fn test_casement_version() {
        unsafe {
            let version = casement_version();
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, "0.1.0");
        }
    }
}
