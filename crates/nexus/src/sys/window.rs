//! Window/context subsystem
//!
//! Owns the single native window of the process and its graphics context.
//! Lifecycle:
//!
//! ```text
//! Uninitialized --init--> Initializing --ok--> Running --deinit--> Terminated
//!                              |                                      ^
//!                              +-----------------failure--------------+
//! ```
//!
//! A failed `init` unwinds exactly the native steps that completed, so the
//! platform is left as it was found. Terminated is final; a new [`Window`]
//! is needed to open another window.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::platform::{WindowEvent, WindowPlatform};
use crate::assert::contract_violation;
use crate::graphics::SharedGraphicsApi;
use crate::math::Dimensions;
use crate::nexus_assert;
use crate::outcome::{Error, Outcome};

crate::error_codes! {
    /// Failure codes of the window subsystem
    pub enum WindowErrorCode in "window" {
        /// `init` called while already running
        AlreadyInitialized = 1 => "window subsystem already initialized",
        /// The windowing library failed to initialize
        FailedToInitializePlatform = 2 => "failed to initialize windowing platform",
        /// The native window could not be created
        FailedToCreateWindow = 3 => "failed to create window",
        /// Graphics API entry points could not be loaded
        FailedToLoadGraphicsApi = 4 => "failed to load graphics API",
        /// The subsystem was terminated and cannot be initialized again
        Terminated = 5 => "window subsystem terminated",
        /// Another window subsystem instance is alive
        AlreadyExists = 6 => "window subsystem instance already exists",
    }
}

/// Lifecycle state of the window subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// Created, `init` not called yet
    Uninitialized,
    /// `init` in progress
    Initializing,
    /// Window open, graphics API loaded
    Running,
    /// Torn down, either by `deinit` or by a failed `init`
    Terminated,
}

/// Requested window parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window size in screen coordinates
    pub dimensions: Dimensions<u32>,
    /// Window title
    pub title: String,
    /// Synchronize buffer swaps with the display refresh
    pub vsync: bool,
}

impl WindowSettings {
    /// Settings with the given size and title, vsync on
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            dimensions: Dimensions::new(width, height),
            title: title.into(),
            vsync: true,
        }
    }

    /// Enable or disable vsync
    #[must_use]
    pub const fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::new(800, 600, "forge")
    }
}

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

fn to_gl_extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// The window subsystem
///
/// At most one instance exists per process. Dropping it runs [`Window::deinit`].
pub struct Window {
    platform: Box<dyn WindowPlatform>,
    state: WindowState,
    library_initialized: bool,
    window_created: bool,
    dimensions: Dimensions<u32>,
    framebuffer: Dimensions<u32>,
    title: String,
    graphics: Option<SharedGraphicsApi>,
}

impl Window {
    /// Claim the process-wide window slot
    ///
    /// Nothing native happens until [`Window::init`].
    pub fn new(platform: Box<dyn WindowPlatform>) -> Outcome<Self> {
        if INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::new(WindowErrorCode::AlreadyExists));
        }

        Ok(Self {
            platform,
            state: WindowState::Uninitialized,
            library_initialized: false,
            window_created: false,
            dimensions: Dimensions::default(),
            framebuffer: Dimensions::default(),
            title: String::new(),
            graphics: None,
        })
    }

    /// Claim the slot and initialize in one step
    pub fn open(platform: Box<dyn WindowPlatform>, settings: &WindowSettings) -> Outcome<Self> {
        let mut window = Self::new(platform)?;
        window.init(settings)?;
        Ok(window)
    }

    /// Open the window and load the graphics API
    pub fn init(&mut self, settings: &WindowSettings) -> Outcome<()> {
        match self.state {
            WindowState::Uninitialized => {}
            WindowState::Initializing | WindowState::Running => {
                return Err(Error::new(WindowErrorCode::AlreadyInitialized));
            }
            WindowState::Terminated => return Err(Error::new(WindowErrorCode::Terminated)),
        }

        self.state = WindowState::Initializing;
        log::info!(
            "Initializing window subsystem: {}x{} '{}'",
            settings.dimensions.width,
            settings.dimensions.height,
            settings.title
        );

        if let Err(e) = self.platform.init_library() {
            log::error!("{e}");
            return Err(self.abort(Error::with_message(
                WindowErrorCode::FailedToInitializePlatform,
                e.0,
            )));
        }
        self.library_initialized = true;

        if !self.platform.create_window(settings.dimensions, &settings.title) {
            log::error!("Failed to create window '{}'", settings.title);
            return Err(self.abort(Error::new(WindowErrorCode::FailedToCreateWindow)));
        }
        self.window_created = true;
        self.dimensions = settings.dimensions;
        self.title.clone_from(&settings.title);

        self.platform.enable_resize_events();
        self.platform.make_context_current();
        self.platform.set_swap_interval(u32::from(settings.vsync));

        let Some(graphics) = self.platform.load_graphics_api() else {
            log::error!("Failed to load graphics API entry points");
            return Err(self.abort(Error::new(WindowErrorCode::FailedToLoadGraphicsApi)));
        };

        self.framebuffer = self.platform.framebuffer_size();
        graphics.viewport(
            0,
            0,
            to_gl_extent(self.framebuffer.width),
            to_gl_extent(self.framebuffer.height),
        );
        self.graphics = Some(graphics);
        self.state = WindowState::Running;

        log::info!(
            "Window subsystem running, framebuffer {}x{}",
            self.framebuffer.width,
            self.framebuffer.height
        );
        Ok(())
    }

    /// Tear down everything `init` set up
    ///
    /// Safe to call in any state and more than once. GPU resources should be
    /// released before this; their context is gone afterwards.
    pub fn deinit(&mut self) {
        if self.state == WindowState::Terminated {
            return;
        }
        if let Some(graphics) = &self.graphics {
            let live = graphics.live_objects();
            if live > 0 {
                log::warn!("Window deinitialized while {live} GPU object(s) are still alive");
            }
        }
        self.release_native();
        self.state = WindowState::Terminated;
        log::info!("Window subsystem terminated");
    }

    fn abort(&mut self, error: Error) -> Error {
        self.release_native();
        self.state = WindowState::Terminated;
        error
    }

    fn release_native(&mut self) {
        self.graphics = None;
        if self.window_created {
            self.platform.destroy_window();
            self.window_created = false;
        }
        if self.library_initialized {
            self.platform.terminate_library();
            self.library_initialized = false;
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> WindowState {
        self.state
    }

    /// Whether the subsystem is running
    pub fn is_running(&self) -> bool {
        self.state == WindowState::Running
    }

    #[track_caller]
    fn expect_running(&self) {
        nexus_assert!(
            self.state == WindowState::Running,
            "window subsystem not running (state {:?})",
            self.state
        );
    }

    /// Whether the window was asked to close
    #[track_caller]
    pub fn should_close(&self) -> bool {
        self.expect_running();
        self.platform.should_close()
    }

    /// Set or clear the close flag
    #[track_caller]
    pub fn set_should_close(&mut self, should_close: bool) {
        self.expect_running();
        self.platform.set_should_close(should_close);
    }

    /// Process pending events and apply them
    ///
    /// Resizes update the tracked dimensions; framebuffer resizes also reset
    /// the viewport. The drained events are returned for the caller.
    #[track_caller]
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.expect_running();
        let events = self.platform.poll_events();
        for event in &events {
            match *event {
                WindowEvent::Resized { width, height } => {
                    self.dimensions = Dimensions::new(width, height);
                }
                WindowEvent::FramebufferResized { width, height } => {
                    self.framebuffer = Dimensions::new(width, height);
                    if let Some(graphics) = &self.graphics {
                        graphics.viewport(0, 0, to_gl_extent(width), to_gl_extent(height));
                    }
                    log::debug!("Framebuffer resized to {width}x{height}");
                }
                WindowEvent::CloseRequested => self.platform.set_should_close(true),
            }
        }
        events
    }

    /// Present the back buffer
    #[track_caller]
    pub fn swap_buffers(&mut self) {
        self.expect_running();
        self.platform.swap_buffers();
    }

    /// Window size in screen coordinates
    #[track_caller]
    pub fn dimensions(&self) -> Dimensions<u32> {
        self.expect_running();
        self.dimensions
    }

    /// Framebuffer size in pixels
    #[track_caller]
    pub fn framebuffer_dimensions(&self) -> Dimensions<u32> {
        self.expect_running();
        self.framebuffer
    }

    /// Window title
    #[track_caller]
    pub fn title(&self) -> &str {
        self.expect_running();
        &self.title
    }

    /// Graphics API of the window's context
    #[track_caller]
    pub fn graphics(&self) -> SharedGraphicsApi {
        self.expect_running();
        self.graphics.clone().unwrap_or_else(|| {
            contract_violation("Window::graphics", "graphics API not loaded")
        })
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.deinit();
        INSTANCE_ALIVE.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("state", &self.state)
            .field("dimensions", &self.dimensions)
            .field("framebuffer", &self.framebuffer)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Serializes tests that create a [`Window`]
#[cfg(test)]
pub(crate) fn instance_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
