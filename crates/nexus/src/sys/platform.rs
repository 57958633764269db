//! Narrow interface to the native windowing library
//!
//! The window subsystem drives its init/deinit state machine through this
//! trait and never touches GLFW directly. Each method maps to one native
//! step, so the subsystem decides what to unwind when a later step fails.

use crate::graphics::SharedGraphicsApi;
use crate::math::Dimensions;

/// Native library initialization failed
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("platform initialization failed: {0}")]
pub struct PlatformInitError(pub String);

/// Notification produced by the windowing library
///
/// Events are queued by the platform and only handed to the window subsystem
/// when it polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window's logical size changed
    Resized {
        /// New width in screen coordinates
        width: u32,
        /// New height in screen coordinates
        height: u32,
    },
    /// The drawable framebuffer size changed
    FramebufferResized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// Native windowing primitives consumed by [`Window`](super::Window)
///
/// Implementations hold at most one window. Calls other than
/// `init_library` are only made after `init_library` succeeded, and window
/// calls only while a window exists.
pub trait WindowPlatform {
    /// Initialize the native library
    fn init_library(&mut self) -> Result<(), PlatformInitError>;

    /// Terminate the native library
    fn terminate_library(&mut self);

    /// Create the window and its graphics context; `false` on failure
    fn create_window(&mut self, dimensions: Dimensions<u32>, title: &str) -> bool;

    /// Destroy the window
    fn destroy_window(&mut self);

    /// Start delivering resize and framebuffer-resize events
    fn enable_resize_events(&mut self);

    /// Make the window's context current on this thread
    fn make_context_current(&mut self);

    /// Set the buffer swap interval (1 enables vertical sync)
    fn set_swap_interval(&mut self, interval: u32);

    /// Load graphics API entry points for the current context
    fn load_graphics_api(&mut self) -> Option<SharedGraphicsApi>;

    /// Current framebuffer size in pixels
    fn framebuffer_size(&self) -> Dimensions<u32>;

    /// Whether the window was asked to close
    fn should_close(&self) -> bool;

    /// Set or clear the close flag
    fn set_should_close(&mut self, should_close: bool);

    /// Process pending native events and drain the event queue
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Present the back buffer
    fn swap_buffers(&mut self);
}
