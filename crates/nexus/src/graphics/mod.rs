//! GPU resource wrappers
//!
//! [`Buffer`], [`Shader`] and [`VertexArray`] each own one native object name
//! and release it exactly once. They are created against a
//! [`SharedGraphicsApi`], normally obtained from
//! [`Window::graphics`](crate::sys::Window::graphics) after the window
//! subsystem is running.

pub mod api;
pub mod buffer;
pub mod headless;
pub mod opengl;
pub mod shader;
pub mod vertex_array;

pub use api::{GraphicsApi, OutOfMemory, SharedGraphicsApi};
pub use buffer::{Buffer, BufferErrorCode, BufferTarget, BufferUsage};
pub use headless::{GraphicsCall, HeadlessGraphics};
pub use opengl::OpenGl;
pub use shader::{Shader, ShaderErrorCode, ShaderKind};
pub use vertex_array::{DataType, VertexArray, VertexArrayErrorCode};
