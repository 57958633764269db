//! Software graphics backend without a driver
//!
//! [`HeadlessGraphics`] hands out object names, keeps buffer storage and
//! shader sources in memory, and journals every call it receives. Each kind of
//! driver failure can be switched on to exercise rollback paths. The
//! `forge --headless` mode and the test suites run on it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::api::{GraphicsApi, OutOfMemory};
use super::buffer::{BufferTarget, BufferUsage};
use super::shader::ShaderKind;
use super::vertex_array::DataType;

/// One call received by [`HeadlessGraphics`]
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GraphicsCall {
    GenBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer {
        target: BufferTarget,
        id: u32,
    },
    BufferData {
        target: BufferTarget,
        id: u32,
        size: usize,
        usage: BufferUsage,
    },
    BufferSubData {
        target: BufferTarget,
        id: u32,
        offset: usize,
        len: usize,
    },
    BindBufferRange {
        target: BufferTarget,
        binding_point: u32,
        id: u32,
        offset: usize,
        size: usize,
    },
    BindBufferBase {
        target: BufferTarget,
        binding_point: u32,
        id: u32,
    },
    CreateShader {
        kind: ShaderKind,
        id: u32,
    },
    ShaderSource {
        id: u32,
    },
    CompileShader(u32),
    DeleteShader(u32),
    GenVertexArray(u32),
    DeleteVertexArray(u32),
    BindVertexArray(u32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        components: i32,
        data_type: DataType,
        normalized: bool,
        stride: i32,
        offset: usize,
        /// Buffer bound to the array-buffer target when the call was made
        source_buffer: u32,
    },
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ClearColor([f32; 4]),
    Clear,
}

#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    buffer_generation: bool,
    allocation: bool,
    shader_creation: bool,
    compilation: bool,
    vertex_array_generation: bool,
}

#[derive(Debug)]
struct ShaderObject {
    source: String,
    info_log: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct State {
    last_id: u32,
    buffers: HashMap<u32, Vec<u8>>,
    bound_buffers: HashMap<BufferTarget, u32>,
    shaders: HashMap<u32, ShaderObject>,
    vertex_arrays: HashSet<u32>,
    viewport: Option<(i32, i32, i32, i32)>,
    calls: Vec<GraphicsCall>,
    failures: Failures,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.last_id += 1;
        self.last_id
    }

    fn bound(&self, target: BufferTarget) -> u32 {
        self.bound_buffers.get(&target).copied().unwrap_or(0)
    }
}

/// In-memory [`GraphicsApi`] implementation
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    state: RefCell<State>,
}

impl HeadlessGraphics {
    /// Create a backend with no objects and no scripted failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Make buffer name generation return 0
    pub fn fail_buffer_generation(&self, fail: bool) {
        self.state.borrow_mut().failures.buffer_generation = fail;
    }

    /// Make storage allocation report out-of-memory
    pub fn fail_allocation(&self, fail: bool) {
        self.state.borrow_mut().failures.allocation = fail;
    }

    /// Make shader creation return 0
    pub fn fail_shader_creation(&self, fail: bool) {
        self.state.borrow_mut().failures.shader_creation = fail;
    }

    /// Make every compile fail
    pub fn fail_compilation(&self, fail: bool) {
        self.state.borrow_mut().failures.compilation = fail;
    }

    /// Make vertex array name generation return 0
    pub fn fail_vertex_array_generation(&self, fail: bool) {
        self.state.borrow_mut().failures.vertex_array_generation = fail;
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<GraphicsCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of received calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&GraphicsCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of buffer names not yet deleted
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Number of shader objects not yet deleted
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Number of vertex array names not yet deleted
    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Storage of a live buffer
    pub fn buffer_contents(&self, id: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).cloned()
    }

    /// Source of a live shader
    pub fn shader_source_of(&self, id: u32) -> Option<String> {
        self.state.borrow().shaders.get(&id).map(|shader| shader.source.clone())
    }

    /// Last viewport set
    pub fn viewport_rect(&self) -> Option<(i32, i32, i32, i32)> {
        self.state.borrow().viewport
    }

    fn record(&self, call: GraphicsCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsApi for HeadlessGraphics {
    fn gen_buffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = if state.failures.buffer_generation {
            0
        } else {
            let id = state.next_id();
            state.buffers.insert(id, Vec::new());
            id
        };
        state.calls.push(GraphicsCall::GenBuffer(id));
        id
    }

    fn delete_buffer(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&id);
        state.bound_buffers.retain(|_, bound| *bound != id);
        state.calls.push(GraphicsCall::DeleteBuffer(id));
    }

    fn bind_buffer(&self, target: BufferTarget, id: u32) {
        let mut state = self.state.borrow_mut();
        state.bound_buffers.insert(target, id);
        state.calls.push(GraphicsCall::BindBuffer { target, id });
    }

    fn buffer_data(
        &self,
        target: BufferTarget,
        size: usize,
        data: Option<&[u8]>,
        usage: BufferUsage,
    ) -> Result<(), OutOfMemory> {
        let mut state = self.state.borrow_mut();
        let id = state.bound(target);
        state.calls.push(GraphicsCall::BufferData {
            target,
            id,
            size,
            usage,
        });

        if state.failures.allocation {
            return Err(OutOfMemory);
        }
        let contents = data.map_or_else(|| vec![0; size], <[u8]>::to_vec);
        if let Some(storage) = state.buffers.get_mut(&id) {
            *storage = contents;
        }
        Ok(())
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let id = state.bound(target);
        state.calls.push(GraphicsCall::BufferSubData {
            target,
            id,
            offset,
            len: data.len(),
        });
        if let Some(slot) = state
            .buffers
            .get_mut(&id)
            .and_then(|storage| storage.get_mut(offset..offset.saturating_add(data.len())))
        {
            slot.copy_from_slice(data);
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
        self.record(GraphicsCall::BindBufferRange {
            target,
            binding_point,
            id,
            offset,
            size,
        });
    }

    fn bind_buffer_base(&self, target: BufferTarget, binding_point: u32, id: u32) {
        self.record(GraphicsCall::BindBufferBase {
            target,
            binding_point,
            id,
        });
    }

    fn create_shader(&self, kind: ShaderKind) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = if state.failures.shader_creation {
            0
        } else {
            let id = state.next_id();
            state.shaders.insert(
                id,
                ShaderObject {
                    source: String::new(),
                    info_log: String::new(),
                    compiled: false,
                },
            );
            id
        };
        state.calls.push(GraphicsCall::CreateShader { kind, id });
        id
    }

    fn shader_source(&self, id: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(shader) = state.shaders.get_mut(&id) {
            shader.source = source.to_owned();
        }
        state.calls.push(GraphicsCall::ShaderSource { id });
    }

    fn compile_shader(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        let reject = state.failures.compilation;
        if let Some(shader) = state.shaders.get_mut(&id) {
            if shader.source.trim().is_empty() {
                shader.compiled = false;
                shader.info_log = "0:1(1): error: empty shader source\n".to_owned();
            } else if reject {
                shader.compiled = false;
                shader.info_log = "0:1(1): error: compilation rejected\n".to_owned();
            } else {
                shader.compiled = true;
                shader.info_log.clear();
            }
        }
        state.calls.push(GraphicsCall::CompileShader(id));
    }

    fn compile_status(&self, id: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&id)
            .is_some_and(|shader| shader.compiled)
    }

    fn shader_info_log(&self, id: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&id)
            .map(|shader| shader.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&id);
        state.calls.push(GraphicsCall::DeleteShader(id));
    }

    fn gen_vertex_array(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = if state.failures.vertex_array_generation {
            0
        } else {
            let id = state.next_id();
            state.vertex_arrays.insert(id);
            id
        };
        state.calls.push(GraphicsCall::GenVertexArray(id));
        id
    }

    fn delete_vertex_array(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&id);
        state.calls.push(GraphicsCall::DeleteVertexArray(id));
    }

    fn bind_vertex_array(&self, id: u32) {
        self.record(GraphicsCall::BindVertexArray(id));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GraphicsCall::EnableVertexAttribArray(index));
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
        let mut state = self.state.borrow_mut();
        let source_buffer = state.bound(BufferTarget::ArrayBuffer);
        state.calls.push(GraphicsCall::VertexAttribPointer {
            index,
            components,
            data_type,
            normalized,
            stride,
            offset,
            source_buffer,
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some((x, y, width, height));
        state.calls.push(GraphicsCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GraphicsCall::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self) {
        self.record(GraphicsCall::Clear);
    }

    fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.buffers.len() + state.shaders.len() + state.vertex_arrays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_non_zero() {
        let graphics = HeadlessGraphics::new();
        let buffer = graphics.gen_buffer();
        let vertex_array = graphics.gen_vertex_array();
        let shader = graphics.create_shader(ShaderKind::Vertex);

        assert_ne!(buffer, 0);
        assert_ne!(buffer, vertex_array);
        assert_ne!(vertex_array, shader);
    }

    #[test]
    fn test_sub_data_writes_into_bound_buffer() {
        let graphics = HeadlessGraphics::new();
        let id = graphics.gen_buffer();
        graphics.bind_buffer(BufferTarget::ArrayBuffer, id);
        graphics
            .buffer_data(BufferTarget::ArrayBuffer, 4, None, BufferUsage::DynamicDraw)
            .unwrap();
        graphics.buffer_sub_data(BufferTarget::ArrayBuffer, 2, &[9, 9]);

        assert_eq!(graphics.buffer_contents(id), Some(vec![0, 0, 9, 9]));
    }

    #[test]
    fn test_delete_unbinds() {
        let graphics = HeadlessGraphics::new();
        let id = graphics.gen_buffer();
        graphics.bind_buffer(BufferTarget::ArrayBuffer, id);
        graphics.delete_buffer(id);
        graphics.vertex_attrib_pointer(0, 2, DataType::Float, false, 8, 0);

        let last = graphics.calls().pop().unwrap();
        assert!(matches!(last, GraphicsCall::VertexAttribPointer { source_buffer: 0, .. }));
    }

    #[test]
    fn test_live_objects_counts_every_kind() {
        let graphics = HeadlessGraphics::new();
        let buffer = graphics.gen_buffer();
        let shader = graphics.create_shader(ShaderKind::Fragment);
        graphics.gen_vertex_array();
        assert_eq!(graphics.live_objects(), 3);

        graphics.delete_buffer(buffer);
        graphics.delete_shader(shader);
        assert_eq!(graphics.live_objects(), 1);
    }
}
