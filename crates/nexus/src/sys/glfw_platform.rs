//! GLFW implementation of [`WindowPlatform`]
//!
//! Requests an OpenGL 3.3 core context and loads its entry points through
//! [`OpenGl::load`]. Dropping the `glfw` crate's handles is what destroys the
//! window and terminates the library, so the unwind steps simply drop them.

use std::ffi::c_void;
use std::rc::Rc;

use glfw::Context;

use super::platform::{PlatformInitError, WindowEvent, WindowPlatform};
use crate::graphics::{OpenGl, SharedGraphicsApi};
use crate::math::Dimensions;

fn log_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error: {error:?} - {description}");
}

fn to_extent(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// GLFW window with an OpenGL context
#[derive(Default)]
pub struct GlfwPlatform {
    glfw: Option<glfw::Glfw>,
    window: Option<glfw::PWindow>,
    events: Option<glfw::GlfwReceiver<(f64, glfw::WindowEvent)>>,
}

impl GlfwPlatform {
    /// Create the platform; nothing native happens until `init_library`
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowPlatform for GlfwPlatform {
    fn init_library(&mut self) -> Result<(), PlatformInitError> {
        let glfw = glfw::init(log_glfw_error).map_err(|e| PlatformInitError(format!("{e:?}")))?;
        self.glfw = Some(glfw);
        Ok(())
    }

    fn terminate_library(&mut self) {
        self.events = None;
        self.window = None;
        self.glfw = None;
    }

    fn create_window(&mut self, dimensions: Dimensions<u32>, title: &str) -> bool {
        let Some(glfw) = self.glfw.as_mut() else {
            return false;
        };

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        #[cfg(target_os = "macos")]
        {
            glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
            glfw.window_hint(glfw::WindowHint::CocoaRetinaFramebuffer(true));
        }

        match glfw.create_window(
            dimensions.width,
            dimensions.height,
            title,
            glfw::WindowMode::Windowed,
        ) {
            Some((window, events)) => {
                self.window = Some(window);
                self.events = Some(events);
                true
            }
            None => false,
        }
    }

    fn destroy_window(&mut self) {
        self.events = None;
        self.window = None;
    }

    fn enable_resize_events(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.set_size_polling(true);
            window.set_framebuffer_size_polling(true);
            window.set_close_polling(true);
        }
    }

    fn make_context_current(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.make_current();
        }
    }

    fn set_swap_interval(&mut self, interval: u32) {
        if let Some(glfw) = self.glfw.as_mut() {
            let interval = if interval == 0 {
                glfw::SwapInterval::None
            } else {
                glfw::SwapInterval::Sync(interval)
            };
            glfw.set_swap_interval(interval);
        }
    }

    fn load_graphics_api(&mut self) -> Option<SharedGraphicsApi> {
        let window = self.window.as_mut()?;
        let api = OpenGl::load(|symbol| window.get_proc_address(symbol) as *const c_void)?;
        Some(Rc::new(api))
    }

    fn framebuffer_size(&self) -> Dimensions<u32> {
        self.window.as_ref().map_or_else(Dimensions::default, |window| {
            let (width, height) = window.get_framebuffer_size();
            Dimensions::new(to_extent(width), to_extent(height))
        })
    }

    fn should_close(&self) -> bool {
        self.window.as_ref().map_or(true, |window| window.should_close())
    }

    fn set_should_close(&mut self, should_close: bool) {
        if let Some(window) = self.window.as_mut() {
            window.set_should_close(should_close);
        }
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        if let Some(glfw) = self.glfw.as_mut() {
            glfw.poll_events();
        }
        let Some(events) = self.events.as_ref() else {
            return Vec::new();
        };

        glfw::flush_messages(events)
            .filter_map(|(_, event)| match event {
                glfw::WindowEvent::Size(width, height) => Some(WindowEvent::Resized {
                    width: to_extent(width),
                    height: to_extent(height),
                }),
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    Some(WindowEvent::FramebufferResized {
                        width: to_extent(width),
                        height: to_extent(height),
                    })
                }
                glfw::WindowEvent::Close => Some(WindowEvent::CloseRequested),
                _ => None,
            })
            .collect()
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.swap_buffers();
        }
    }
}
