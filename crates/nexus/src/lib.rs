//! # Nexus
//!
//! Owned GPU resources and process-level subsystems for small OpenGL
//! applications.
//!
//! ## Features
//!
//! - **Outcome**: coded, per-subsystem errors instead of exceptions or sentinels
//! - **Resource wrappers**: [`Buffer`](graphics::Buffer), [`Shader`](graphics::Shader)
//!   and [`VertexArray`](graphics::VertexArray) release their GPU object exactly once
//! - **Logger**: one process logger writing to stderr and a file
//! - **Window**: a GLFW window with an OpenGL 3.3 core context and a strict
//!   init/deinit lifecycle
//! - **Headless backends**: the same code paths without a display, for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nexus::prelude::*;
//!
//! fn main() -> Outcome<()> {
//!     Logger::init("demo", "demo.log")?;
//!     let mut window = Window::open(
//!         Box::new(GlfwPlatform::new()),
//!         &WindowSettings::new(800, 600, "demo"),
//!     )?;
//!
//!     let graphics = window.graphics();
//!     let vertices = [0.0_f32, 0.5, -0.5, -0.5, 0.5, -0.5];
//!     let mut buffer = Buffer::with_data(
//!         &graphics,
//!         BufferUsage::StaticDraw,
//!         BufferTarget::ArrayBuffer,
//!         &vertices,
//!     )?;
//!
//!     while !window.should_close() {
//!         window.poll_events();
//!         buffer.bind();
//!         window.swap_buffers();
//!     }
//!
//!     buffer.release();
//!     window.deinit();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod outcome;
pub mod assert;
pub mod config;
pub mod graphics;
pub mod math;
pub mod sys;

#[cfg(test)]
mod tests;

/// Common imports for nexus users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, NexusConfig},
        graphics::{
            Buffer, BufferErrorCode, BufferTarget, BufferUsage, DataType, GraphicsApi,
            SharedGraphicsApi, Shader, ShaderErrorCode, ShaderKind, VertexArray,
            VertexArrayErrorCode,
        },
        math::Dimensions,
        nexus_assert,
        outcome::{Error, ErrorCode, Outcome},
        sys::{
            GlfwPlatform, HeadlessPlatform, Logger, LoggerConfig, LoggerErrorCode, Window,
            WindowErrorCode, WindowEvent, WindowSettings, WindowState,
        },
    };
}
