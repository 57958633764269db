//! Scripted windowing platform without a display
//!
//! [`HeadlessPlatform`] walks through the same native steps as GLFW but only
//! records them. A [`HeadlessProbe`] obtained before handing the platform to
//! the window subsystem can inject events and inspect the journal afterwards.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::platform::{PlatformInitError, WindowEvent, WindowPlatform};
use crate::graphics::{HeadlessGraphics, SharedGraphicsApi};
use crate::math::Dimensions;

/// Native step at which the headless platform reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Library initialization fails
    LibraryInit,
    /// Window creation fails
    WindowCreation,
    /// Graphics API loading fails
    GraphicsLoad,
}

/// One native step performed by [`HeadlessPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PlatformCall {
    InitLibrary,
    TerminateLibrary,
    CreateWindow {
        dimensions: Dimensions<u32>,
        title: String,
    },
    DestroyWindow,
    EnableResizeEvents,
    MakeContextCurrent,
    SetSwapInterval(u32),
    LoadGraphicsApi,
    PollEvents,
    SwapBuffers,
}

#[derive(Debug)]
struct HeadlessState {
    fail_at: Option<FailurePoint>,
    close_after_polls: Option<u32>,
    pixel_ratio: u32,
    polls: u32,
    library: bool,
    window: Option<Dimensions<u32>>,
    resize_events: bool,
    should_close: bool,
    pending: VecDeque<WindowEvent>,
    calls: Vec<PlatformCall>,
    graphics: Option<Rc<HeadlessGraphics>>,
}

/// Windowing platform that records instead of drawing
#[derive(Debug)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// Platform where every step succeeds and the window never closes by itself
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                fail_at: None,
                close_after_polls: None,
                pixel_ratio: 1,
                polls: 0,
                library: false,
                window: None,
                resize_events: false,
                should_close: false,
                pending: VecDeque::new(),
                calls: Vec::new(),
                graphics: None,
            })),
        }
    }

    /// Fail at the given step
    #[must_use]
    pub fn failing_at(self, point: FailurePoint) -> Self {
        self.state.borrow_mut().fail_at = Some(point);
        self
    }

    /// Report "should close" once `polls` event polls have happened
    #[must_use]
    pub fn closing_after(self, polls: u32) -> Self {
        self.state.borrow_mut().close_after_polls = Some(polls);
        self
    }

    /// Framebuffer pixels per screen coordinate, as on high-DPI displays
    #[must_use]
    pub fn with_pixel_ratio(self, ratio: u32) -> Self {
        self.state.borrow_mut().pixel_ratio = ratio.max(1);
        self
    }

    /// Handle for scripting and inspecting this platform after it is moved
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.state.borrow().fail_at == Some(point)
    }

    fn record(&self, call: PlatformCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Scripting and inspection side of a [`HeadlessPlatform`]
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    /// Queue an event for the next poll
    pub fn push_event(&self, event: WindowEvent) {
        self.state.borrow_mut().pending.push_back(event);
    }

    /// Simulate the user resizing the window
    ///
    /// Queues both the logical and the framebuffer resize, if resize events
    /// were enabled.
    pub fn resize(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        if state.window.is_none() {
            return;
        }
        state.window = Some(Dimensions::new(width, height));
        if state.resize_events {
            let ratio = state.pixel_ratio;
            state.pending.push_back(WindowEvent::Resized { width, height });
            state.pending.push_back(WindowEvent::FramebufferResized {
                width: width * ratio,
                height: height * ratio,
            });
        }
    }

    /// Every native step performed so far, oldest first
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded steps equal to `call`
    pub fn count(&self, call: &PlatformCall) -> usize {
        self.state.borrow().calls.iter().filter(|c| *c == call).count()
    }

    /// Whether the library is currently initialized
    pub fn library_initialized(&self) -> bool {
        self.state.borrow().library
    }

    /// Whether a window currently exists
    pub fn window_exists(&self) -> bool {
        self.state.borrow().window.is_some()
    }

    /// Graphics backend handed out by the last successful load
    pub fn graphics(&self) -> Option<Rc<HeadlessGraphics>> {
        self.state.borrow().graphics.clone()
    }
}

impl WindowPlatform for HeadlessPlatform {
    fn init_library(&mut self) -> Result<(), PlatformInitError> {
        self.record(PlatformCall::InitLibrary);
        if self.fails_at(FailurePoint::LibraryInit) {
            return Err(PlatformInitError("no display available".to_string()));
        }
        self.state.borrow_mut().library = true;
        Ok(())
    }

    fn terminate_library(&mut self) {
        self.record(PlatformCall::TerminateLibrary);
        self.state.borrow_mut().library = false;
    }

    fn create_window(&mut self, dimensions: Dimensions<u32>, title: &str) -> bool {
        self.record(PlatformCall::CreateWindow {
            dimensions,
            title: title.to_owned(),
        });
        if self.fails_at(FailurePoint::WindowCreation) {
            return false;
        }
        self.state.borrow_mut().window = Some(dimensions);
        true
    }

    fn destroy_window(&mut self) {
        self.record(PlatformCall::DestroyWindow);
        let mut state = self.state.borrow_mut();
        state.window = None;
        state.resize_events = false;
    }

    fn enable_resize_events(&mut self) {
        self.record(PlatformCall::EnableResizeEvents);
        self.state.borrow_mut().resize_events = true;
    }

    fn make_context_current(&mut self) {
        self.record(PlatformCall::MakeContextCurrent);
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.record(PlatformCall::SetSwapInterval(interval));
    }

    fn load_graphics_api(&mut self) -> Option<SharedGraphicsApi> {
        self.record(PlatformCall::LoadGraphicsApi);
        if self.fails_at(FailurePoint::GraphicsLoad) {
            return None;
        }
        let graphics = Rc::new(HeadlessGraphics::new());
        self.state.borrow_mut().graphics = Some(Rc::clone(&graphics));
        Some(graphics)
    }

    fn framebuffer_size(&self) -> Dimensions<u32> {
        let state = self.state.borrow();
        state.window.map_or_else(Dimensions::default, |size| {
            Dimensions::new(size.width * state.pixel_ratio, size.height * state.pixel_ratio)
        })
    }

    fn should_close(&self) -> bool {
        let state = self.state.borrow();
        state.should_close
            || state
                .close_after_polls
                .is_some_and(|limit| state.polls >= limit)
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.state.borrow_mut().should_close = should_close;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.record(PlatformCall::PollEvents);
        let mut state = self.state.borrow_mut();
        state.polls += 1;
        state.pending.drain(..).collect()
    }

    fn swap_buffers(&mut self) {
        self.record(PlatformCall::SwapBuffers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_after_polls() {
        let mut platform = HeadlessPlatform::new().closing_after(2);

        assert!(!platform.should_close());
        platform.poll_events();
        assert!(!platform.should_close());
        platform.poll_events();
        assert!(platform.should_close());
    }

    #[test]
    fn test_resize_queues_events_once_enabled() {
        let mut platform = HeadlessPlatform::new().with_pixel_ratio(2);
        let probe = platform.probe();
        platform.init_library().unwrap();
        assert!(platform.create_window(Dimensions::new(100, 50), "t"));

        probe.resize(10, 10);
        assert!(platform.poll_events().is_empty());

        platform.enable_resize_events();
        probe.resize(20, 10);
        assert_eq!(
            platform.poll_events(),
            vec![
                WindowEvent::Resized { width: 20, height: 10 },
                WindowEvent::FramebufferResized { width: 40, height: 20 },
            ]
        );
        assert_eq!(platform.framebuffer_size(), Dimensions::new(40, 20));
    }

    #[test]
    fn test_failure_points() {
        let mut platform = HeadlessPlatform::new().failing_at(FailurePoint::LibraryInit);
        assert!(platform.init_library().is_err());
        assert!(!platform.probe().library_initialized());

        let mut platform = HeadlessPlatform::new().failing_at(FailurePoint::GraphicsLoad);
        platform.init_library().unwrap();
        assert!(platform.create_window(Dimensions::new(1, 1), "t"));
        assert!(platform.load_graphics_api().is_none());
    }
}
