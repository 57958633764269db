//! Process-level subsystems: logging and the window/context

pub mod glfw_platform;
pub mod headless;
pub mod log;
pub mod platform;
pub mod window;

pub use glfw_platform::GlfwPlatform;
pub use headless::{FailurePoint, HeadlessPlatform, HeadlessProbe, PlatformCall};
pub use log::{Logger, LoggerConfig, LoggerErrorCode};
pub use platform::{PlatformInitError, WindowEvent, WindowPlatform};
pub use window::{Window, WindowErrorCode, WindowSettings, WindowState};
