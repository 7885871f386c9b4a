//! Headless demo: Two windows driven by injected input.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_demo` to watch the
//! actors and the pump talk to each other.

use casement::native::headless::{HeadlessPlatform, NativeInput};
use casement::{
    AppError, Engine, EngineConfig, KeyCode, Point, PropertyDelta, Size, WindowBehavior, WindowContext,
    WindowHandle, WindowProperties,
};
use log::info;
use std::thread;
use std::time::Duration;

/// Counts frames and keys; refuses the first close.
struct Counter {
    frames: u64,
    keys: u32,
    vetoed: bool,
}

impl WindowBehavior for Counter {
    fn configure(&mut self, _ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
        Ok(WindowProperties::default().with_title("counter"))
    }

    fn on_key_down(&mut self, ctx: &mut WindowContext<'_>, key: KeyCode, _repeat: u16) -> Result<(), AppError> {
        self.keys += 1;
        info!("[{}] key {} down ({} so far)", ctx.handle(), key.0, self.keys);
        ctx.set_properties(PropertyDelta::default().title(format!("counter: {} keys", self.keys)))?;
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        self.frames += 1;
        Ok(())
    }

    fn on_close(&mut self, ctx: &mut WindowContext<'_>) -> Result<bool, AppError> {
        if !self.vetoed {
            self.vetoed = true;
            info!("[{}] close vetoed once", ctx.handle());
            return Ok(false);
        }
        Ok(true)
    }

    fn on_destroy(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        info!("[{}] destroyed after {} frames", ctx.handle(), self.frames);
        Ok(())
    }
}

/// Redraws only on demand and follows the cursor.
struct Tracker;

impl WindowBehavior for Tracker {
    fn configure(&mut self, _ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
        Ok(WindowProperties::default()
            .with_title("tracker")
            .with_position(700, 50)
            .with_bounds(Some(Size::new(200, 200)), None)
            .with_auto_update(false))
    }

    fn on_mouse_move(&mut self, ctx: &mut WindowContext<'_>, position: Point) -> Result<(), AppError> {
        info!("[{}] cursor at {position:?}", ctx.handle());
        ctx.request_update()?;
        Ok(())
    }

    fn on_resize(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        info!("[{}] now {:?}", ctx.handle(), ctx.properties().size);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        info!("[{}] redraw at {}ns", ctx.handle(), ctx.timestamp());
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let mut platform = HeadlessPlatform::new();
    let injector = platform.injector();
    let counter = WindowHandle::new(0);
    let tracker = WindowHandle::new(1);

    let script = thread::spawn(move || {
        let pause = || thread::sleep(Duration::from_millis(50));
        pause();
        for key in [72, 73] {
            injector.tap(counter, KeyCode(key));
        }
        injector.send(tracker, NativeInput::MouseMove(Point::new(12, 34)));
        injector.send(tracker, NativeInput::Resize(Size::new(100, 900)));
        pause();
        injector.close(tracker);
        injector.close(counter);
        pause();
        injector.close(counter);
    });

    let engine = Engine::with_config(EngineConfig {
        target_fps: Some(30),
        ..EngineConfig::default()
    });
    let counter_window = Counter {
        frames: 0,
        keys: 0,
        vetoed: false,
    };
    let result = engine.run(&mut platform, vec![Box::new(counter_window), Box::new(Tracker)]);
    let _ = script.join();

    match result {
        Ok(()) => info!("All windows closed; {} native calls made", platform.calls().len()),
        Err(err) => {
            eprintln!("engine failed: {err}");
            std::process::exit(1);
        }
    }
}
