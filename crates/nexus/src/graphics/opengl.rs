//! OpenGL implementation of [`GraphicsApi`]
//!
//! Entry points come from the `gl` crate and are resolved through the window
//! platform's loader once a context is current. Every call assumes that
//! context is still current on the calling thread; `OpenGl` is `!Send` to keep
//! it there.

use std::cell::Cell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;

use gl::types::{GLchar, GLint, GLintptr, GLsizeiptr};

use super::api::{GraphicsApi, OutOfMemory};
use super::buffer::{BufferTarget, BufferUsage};
use super::shader::ShaderKind;
use super::vertex_array::DataType;

/// Errors left over from earlier calls are drained before checking an allocation
const MAX_PENDING_ERRORS: usize = 16;

/// OpenGL 3.3 core entry points bound to the current context
#[derive(Debug)]
pub struct OpenGl {
    live: Cell<usize>,
    _context_thread: PhantomData<*const ()>,
}

impl OpenGl {
    /// Resolve entry points through `loader`
    ///
    /// Returns `None` when core entry points are missing, which is how a
    /// failed load shows up with the `gl` crate.
    pub fn load<F>(loader: F) -> Option<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let loaded = gl::GenBuffers::is_loaded()
            && gl::BufferData::is_loaded()
            && gl::BindBufferRange::is_loaded()
            && gl::CreateShader::is_loaded()
            && gl::GetShaderInfoLog::is_loaded()
            && gl::GenVertexArrays::is_loaded()
            && gl::VertexAttribPointer::is_loaded()
            && gl::Viewport::is_loaded()
            && gl::Clear::is_loaded();

        loaded.then_some(Self {
            live: Cell::new(0),
            _context_thread: PhantomData,
        })
    }

    fn generated(&self, id: u32) -> u32 {
        if id != 0 {
            self.live.set(self.live.get() + 1);
        }
        id
    }

    fn deleted(&self, id: u32) {
        if id != 0 {
            self.live.set(self.live.get().saturating_sub(1));
        }
    }
}

fn gl_size(size: usize) -> GLsizeiptr {
    GLsizeiptr::try_from(size).unwrap_or(GLsizeiptr::MAX)
}

fn gl_offset(offset: usize) -> GLintptr {
    GLintptr::try_from(offset).unwrap_or(GLintptr::MAX)
}

impl GraphicsApi for OpenGl {
    fn gen_buffer(&self) -> u32 {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        self.generated(id)
    }

    fn delete_buffer(&self, id: u32) {
        unsafe { gl::DeleteBuffers(1, &id) };
        self.deleted(id);
    }

    fn bind_buffer(&self, target: BufferTarget, id: u32) {
        unsafe { gl::BindBuffer(target.as_raw(), id) };
    }

    fn buffer_data(
        &self,
        target: BufferTarget,
        size: usize,
        data: Option<&[u8]>,
        usage: BufferUsage,
    ) -> Result<(), OutOfMemory> {
        let pointer = data.map_or(ptr::null(), |bytes| bytes.as_ptr().cast::<c_void>());
        unsafe {
            for _ in 0..MAX_PENDING_ERRORS {
                if gl::GetError() == gl::NO_ERROR {
                    break;
                }
            }
            gl::BufferData(target.as_raw(), gl_size(size), pointer, usage.as_raw());
            if gl::GetError() == gl::OUT_OF_MEMORY {
                return Err(OutOfMemory);
            }
        }
        Ok(())
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target.as_raw(),
                gl_offset(offset),
                gl_size(data.len()),
                data.as_ptr().cast::<c_void>(),
            );
        }
    }

    fn bind_buffer_range(
        &self,
        target: BufferTarget,
        binding_point: u32,
        id: u32,
        offset: usize,
        size: usize,
    ) {
        unsafe {
            gl::BindBufferRange(
                target.as_raw(),
                binding_point,
                id,
                gl_offset(offset),
                gl_size(size),
            );
        }
    }

    fn bind_buffer_base(&self, target: BufferTarget, binding_point: u32, id: u32) {
        unsafe { gl::BindBufferBase(target.as_raw(), binding_point, id) };
    }

    fn create_shader(&self, kind: ShaderKind) -> u32 {
        let id = unsafe { gl::CreateShader(kind.as_raw()) };
        self.generated(id)
    }

    fn shader_source(&self, id: u32, source: &str) {
        let pointer = source.as_ptr().cast::<GLchar>();
        let length = GLint::try_from(source.len()).unwrap_or(GLint::MAX);
        unsafe { gl::ShaderSource(id, 1, &pointer, &length) };
    }

    fn compile_shader(&self, id: u32) {
        unsafe { gl::CompileShader(id) };
    }

    fn compile_status(&self, id: u32) -> bool {
        let mut status = GLint::from(gl::FALSE);
        unsafe { gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut status) };
        status != GLint::from(gl::FALSE)
    }

    fn shader_info_log(&self, id: u32) -> String {
        let mut length: GLint = 0;
        unsafe { gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut length) };

        let Ok(capacity) = usize::try_from(length) else {
            return String::new();
        };
        if capacity == 0 {
            return String::new();
        }

        let mut log = vec![0_u8; capacity];
        let mut written: GLint = 0;
        unsafe {
            gl::GetShaderInfoLog(id, length, &mut written, log.as_mut_ptr().cast::<GLchar>());
        }
        log.truncate(usize::try_from(written).unwrap_or(0));
        String::from_utf8_lossy(&log).into_owned()
    }

    fn delete_shader(&self, id: u32) {
        unsafe { gl::DeleteShader(id) };
        self.deleted(id);
    }

    fn gen_vertex_array(&self) -> u32 {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        self.generated(id)
    }

    fn delete_vertex_array(&self, id: u32) {
        unsafe { gl::DeleteVertexArrays(1, &id) };
        self.deleted(id);
    }

    fn bind_vertex_array(&self, id: u32) {
        unsafe { gl::BindVertexArray(id) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        components: i32,
        data_type: DataType,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                data_type.as_raw(),
                normalized,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { gl::ClearColor(red, green, blue, alpha) };
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
    }

    fn live_objects(&self) -> usize {
        self.live.get()
    }
}
