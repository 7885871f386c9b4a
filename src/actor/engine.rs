//! Engine: Main coordinator that ties actors and the native pump together.
//!
//! The Engine is the entry point for applications using Casement. It builds
//! the shared hub, spawns one actor per window, runs the native message pump
//! on the calling thread, and winds everything down once the pump returns.

use super::bridge::NativeLoopBridge;
use super::hub::Hub;
use super::window::WindowActor;
use crate::error::EngineError;
use crate::native::NativePlatform;
use crate::window::WindowBehavior;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the Engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of each window's inbox. Overflow is fatal.
    pub inbox_capacity: usize,
    /// Pace of synthesized update ticks. `None` ticks whenever idle.
    pub target_fps: Option<u32>,
    /// Actor threads are named `{prefix}-{handle}`.
    pub thread_name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 1024,
            target_fps: Some(60),
            thread_name_prefix: String::from("casement-window"),
        }
    }
}

impl EngineConfig {
    /// Time between synthesized ticks, if paced.
    pub fn frame_interval(&self) -> Option<Duration> {
        self.target_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs(1) / fps)
    }
}

/// The main Casement engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    /// Configuration.
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new engine with custom configuration.
    pub const fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `windows` to completion on `platform`.
    ///
    /// Blocks the calling thread, which becomes the pump thread, until every
    /// window has quit or the first fatal error ends the run. Returns that
    /// first error, if any.
    pub fn run<P>(&self, platform: &mut P, windows: Vec<Box<dyn WindowBehavior>>) -> Result<(), EngineError>
    where
        P: NativePlatform + ?Sized,
    {
        info!("Engine starting with {} window(s)", windows.len());
        let hub = Arc::new(Hub::new(platform.control()));

        let mut threads = Vec::with_capacity(windows.len());
        for behavior in windows {
            match WindowActor::spawn(&hub, behavior, &self.config) {
                Ok(thread) => threads.push(thread),
                Err(err) => {
                    hub.record_error(err);
                    break;
                }
            }
        }
        hub.finish_launch();

        let mut bridge = NativeLoopBridge::new(Arc::clone(&hub));
        if let Err(source) = platform.run_pump(&mut bridge) {
            hub.record_error(EngineError::Native { handle: None, source });
        }
        debug!("Pump returned");

        bridge.teardown(platform.windows());
        for thread in threads {
            thread.join();
        }

        match hub.take_error() {
            Some(err) => {
                info!("Engine stopped: {err}");
                Err(err)
            }
            None => {
                info!("Engine stopped");
                Ok(())
            }
        }
    }
}

/// Run `windows` on `platform` with the default configuration.
pub fn launch<P>(platform: &mut P, windows: Vec<Box<dyn WindowBehavior>>) -> Result<(), EngineError>
where
    P: NativePlatform + ?Sized,
{
    Engine::new().run(platform, windows)
}
