//! Narrow interface to the native graphics API
//!
//! Resource wrappers never call OpenGL directly. They go through a shared
//! [`GraphicsApi`] handed out by the window subsystem once a context is current,
//! which keeps the ownership logic independent from the driver and lets it run
//! against the headless backend.

use std::rc::Rc;

use super::buffer::{BufferTarget, BufferUsage};
use super::shader::ShaderKind;
use super::vertex_array::DataType;

/// Storage allocation was refused by the driver (`GL_OUT_OF_MEMORY`)
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("graphics driver is out of memory")]
pub struct OutOfMemory;

/// Shared handle to the current context's graphics API
///
/// `Rc` keeps every wrapper on the context thread.
pub type SharedGraphicsApi = Rc<dyn GraphicsApi>;

/// Primitive calls consumed from the native graphics API
///
/// Object names are raw `u32` values where 0 means "no object". Generation
/// functions return 0 on failure.
pub trait GraphicsApi {
    /// Generate one buffer name
    fn gen_buffer(&self) -> u32;

    /// Delete a buffer name
    fn delete_buffer(&self, id: u32);

    /// Bind `id` to `target`; 0 unbinds
    fn bind_buffer(&self, target: BufferTarget, id: u32);

    /// (Re)allocate storage for the buffer bound to `target`
    ///
    /// When `data` is `Some`, it holds exactly `size` bytes.
    fn buffer_data(
        &self,
        target: BufferTarget,
        size: usize,
        data: Option<&[u8]>,
        usage: BufferUsage,
    ) -> Result<(), OutOfMemory>;

    /// Overwrite part of the storage of the buffer bound to `target`
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);

    /// Bind a range of `id` to an indexed binding point
    fn bind_buffer_range(
        &self,
        target: BufferTarget,
        binding_point: u32,
        id: u32,
        offset: usize,
        size: usize,
    );

    /// Bind the whole of `id` to an indexed binding point
    fn bind_buffer_base(&self, target: BufferTarget, binding_point: u32, id: u32);

    /// Create a shader object of the given stage
    fn create_shader(&self, kind: ShaderKind) -> u32;

    /// Replace the source of a shader object
    fn shader_source(&self, id: u32, source: &str);

    /// Compile a shader object
    fn compile_shader(&self, id: u32);

    /// Whether the last compile of `id` succeeded
    fn compile_status(&self, id: u32) -> bool;

    /// Info log of the last compile of `id`, empty when there is none
    fn shader_info_log(&self, id: u32) -> String;

    /// Delete a shader object
    fn delete_shader(&self, id: u32);

    /// Generate one vertex array name
    fn gen_vertex_array(&self) -> u32;

    /// Delete a vertex array name
    fn delete_vertex_array(&self, id: u32);

    /// Bind a vertex array; 0 unbinds
    fn bind_vertex_array(&self, id: u32);

    /// Enable a generic vertex attribute on the bound vertex array
    fn enable_vertex_attrib_array(&self, index: u32);

    /// Describe attribute `index`, sourced from the buffer bound to the array-buffer target
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        components: i32,
        data_type: DataType,
        normalized: bool,
        stride: i32,
        offset: usize,
    );

    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// Set the clear color
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);

    /// Clear the color buffer
    fn clear(&self);

    /// Buffers, shaders and vertex arrays generated and not yet deleted
    fn live_objects(&self) -> usize;
}
