//! Owned GPU buffer objects
//!
//! A [`Buffer`] owns exactly one buffer name. It is created through
//! [`Buffer::create`], which never leaks the name on a failure path, and it is
//! released exactly once: either explicitly through [`Buffer::release`] or when
//! dropped.
//!
//! Two failure policies apply to an existing buffer:
//! - using a released buffer is a caller bug and trips a fatal assertion;
//! - writes or bind ranges that fall outside the tracked size are logged as
//!   warnings and ignored.

use std::fmt;
use std::mem;
use std::num::NonZeroU32;
use std::rc::Rc;

use super::api::{OutOfMemory, SharedGraphicsApi};
use crate::nexus_assert;
use crate::outcome::{Error, Outcome};

crate::error_codes! {
    /// Failure codes of [`Buffer::create`] and [`Buffer::set_data`]
    pub enum BufferErrorCode in "buffer" {
        /// The driver returned no buffer name
        FailedToGenerateBuffer = 1 => "failed to generate buffer",
        /// The driver could not allocate the requested storage
        FailedToAllocateStorage = 2 => "failed to allocate buffer storage",
        /// Initial data is shorter than the requested size
        InvalidInitialData = 3 => "initial data is shorter than the buffer size",
    }
}

/// Expected write pattern of the buffer's storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferUsage {
    /// Released buffer
    None = 0,
    #[allow(missing_docs)]
    StreamDraw = 0x88E0,
    #[allow(missing_docs)]
    StreamRead = 0x88E1,
    #[allow(missing_docs)]
    StreamCopy = 0x88E2,
    #[allow(missing_docs)]
    StaticDraw = 0x88E4,
    #[allow(missing_docs)]
    StaticRead = 0x88E5,
    #[allow(missing_docs)]
    StaticCopy = 0x88E6,
    #[allow(missing_docs)]
    DynamicDraw = 0x88E8,
    #[allow(missing_docs)]
    DynamicRead = 0x88E9,
    #[allow(missing_docs)]
    DynamicCopy = 0x88EA,
}

impl BufferUsage {
    /// Native enum value
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// Binding point kind of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferTarget {
    /// Released buffer
    None = 0,
    /// Vertex attribute source
    ArrayBuffer = 0x8892,
    /// Index source
    ElementArrayBuffer = 0x8893,
    /// Uniform block storage
    UniformBuffer = 0x8A11,
}

impl BufferTarget {
    /// Native enum value
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// A uniquely owned GPU buffer
///
/// Not `Clone`: the buffer name is a capability. Moving the value moves
/// ownership; [`Buffer::take`] moves it out of a `&mut` and leaves the source
/// released.
pub struct Buffer {
    api: SharedGraphicsApi,
    id: Option<NonZeroU32>,
    usage: BufferUsage,
    target: BufferTarget,
    size: usize,
}

impl Buffer {
    /// Create a buffer and allocate `size` bytes of storage
    ///
    /// When `data` is given, its first `size` bytes become the initial
    /// contents; otherwise the storage is left uninitialized.
    pub fn create(
        api: &SharedGraphicsApi,
        usage: BufferUsage,
        target: BufferTarget,
        size: usize,
        data: Option<&[u8]>,
    ) -> Outcome<Self> {
        if let Some(bytes) = data {
            if bytes.len() < size {
                return Err(Error::with_message(
                    BufferErrorCode::InvalidInitialData,
                    format!("{} bytes given for a {size} byte buffer", bytes.len()),
                ));
            }
        }

        let Some(id) = NonZeroU32::new(api.gen_buffer()) else {
            return Err(Error::new(BufferErrorCode::FailedToGenerateBuffer));
        };

        log::debug!("Created buffer with id: {id}");

        let mut buffer = Self {
            api: Rc::clone(api),
            id: Some(id),
            usage,
            target,
            size: 0,
        };

        // Dropping `buffer` on the error path deletes the name again
        buffer.set_data(size, data)?;
        Ok(buffer)
    }

    /// Create a buffer whose storage is exactly `data`
    pub fn with_data<T: bytemuck::Pod>(
        api: &SharedGraphicsApi,
        usage: BufferUsage,
        target: BufferTarget,
        data: &[T],
    ) -> Outcome<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        Self::create(api, usage, target, bytes.len(), Some(bytes))
    }

    /// Reallocate the storage to `size` bytes, optionally filling it
    ///
    /// Binds the buffer, specifies the storage, then unbinds it. Data shorter
    /// than `size` is rejected with a warning and leaves the buffer untouched.
    pub fn set_data(&mut self, size: usize, data: Option<&[u8]>) -> Outcome<()> {
        let id = self.live_id();

        let data = match data {
            Some(bytes) if bytes.len() < size => {
                log::warn!(
                    "Buffer::set_data called with {} bytes for a {size} byte store on buffer {id}.",
                    bytes.len()
                );
                return Ok(());
            }
            Some(bytes) => Some(&bytes[..size]),
            None => None,
        };

        self.bind();
        let result = self.api.buffer_data(self.target, size, data, self.usage);
        self.unbind();

        match result {
            Ok(()) => {
                self.size = size;
                Ok(())
            }
            Err(OutOfMemory) => {
                self.size = 0;
                Err(Error::with_message(
                    BufferErrorCode::FailedToAllocateStorage,
                    format!("{size} bytes for buffer {id}"),
                ))
            }
        }
    }

    /// Overwrite `data.len()` bytes starting at `offset`
    ///
    /// Writes that would end past the tracked size are ignored with a warning.
    pub fn set_sub_data(&mut self, offset: usize, data: &[u8]) {
        let id = self.live_id();

        if !self.range_fits(offset, data.len()) {
            log::warn!(
                "Buffer::set_sub_data called with invalid offset {offset} and size {} on buffer {id} of size {}.",
                data.len(),
                self.size
            );
            return;
        }

        self.bind();
        self.api.buffer_sub_data(self.target, offset, data);
        self.unbind();
    }

    /// Bind the buffer to its target
    pub fn bind(&self) {
        let id = self.live_id();
        self.api.bind_buffer(self.target, id.get());
    }

    /// Bind `size` bytes starting at `offset` to an indexed binding point
    ///
    /// Ranges that end past the tracked size are ignored with a warning.
    pub fn bind_range(&self, binding_point: u32, offset: usize, size: usize) {
        let id = self.live_id();

        if !self.range_fits(offset, size) {
            log::warn!(
                "Buffer::bind_range called with invalid offset {offset} and size {size} on buffer {id} of size {}.",
                self.size
            );
            return;
        }

        self.api
            .bind_buffer_range(self.target, binding_point, id.get(), offset, size);
    }

    /// Bind the whole buffer to an indexed binding point
    pub fn bind_base(&self, binding_point: u32) {
        let id = self.live_id();
        self.api.bind_buffer_base(self.target, binding_point, id.get());
    }

    /// Unbind whatever is bound to this buffer's target
    pub fn unbind(&self) {
        self.live_id();
        self.api.bind_buffer(self.target, 0);
    }

    /// Delete the buffer name; a no-op on a released buffer
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            log::debug!("Releasing buffer with id: {id}");

            self.api.delete_buffer(id.get());
            self.size = 0;
            self.usage = BufferUsage::None;
            self.target = BufferTarget::None;
        }
    }

    /// Move ownership out, leaving `self` released
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            api: Rc::clone(&self.api),
            id: self.id.take(),
            usage: mem::replace(&mut self.usage, BufferUsage::None),
            target: mem::replace(&mut self.target, BufferTarget::None),
            size: mem::take(&mut self.size),
        }
    }

    /// Native buffer name, 0 once released
    pub fn handle(&self) -> u32 {
        self.id.map_or(0, NonZeroU32::get)
    }

    /// Whether the buffer no longer owns a name
    pub const fn is_released(&self) -> bool {
        self.id.is_none()
    }

    /// Tracked storage size in bytes
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Usage hint, `None` once released
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Binding target, `None` once released
    pub const fn target(&self) -> BufferTarget {
        self.target
    }

    fn live_id(&self) -> NonZeroU32 {
        nexus_assert!(self.id.is_some(), "buffer used after release");
        self.id.unwrap_or(NonZeroU32::MIN)
    }

    fn range_fits(&self, offset: usize, len: usize) -> bool {
        offset.checked_add(len).is_some_and(|end| end <= self.size)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.handle())
            .field("usage", &self.usage)
            .field("target", &self.target)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::headless::{GraphicsCall, HeadlessGraphics};

    fn setup() -> (Rc<HeadlessGraphics>, SharedGraphicsApi) {
        let headless = Rc::new(HeadlessGraphics::new());
        let api: SharedGraphicsApi = headless.clone();
        (headless, api)
    }

    const TRIANGLE: [f32; 6] = [-0.5, -0.5, 0.5, -0.5, 0.0, 0.5];

    #[test]
    fn test_create_with_data() {
        let (headless, api) = setup();

        let buffer = Buffer::with_data(
            &api,
            BufferUsage::StaticDraw,
            BufferTarget::ArrayBuffer,
            &TRIANGLE,
        )
        .unwrap();

        assert_ne!(buffer.handle(), 0);
        assert_eq!(buffer.size(), 24);
        assert_eq!(buffer.usage(), BufferUsage::StaticDraw);
        assert_eq!(buffer.target(), BufferTarget::ArrayBuffer);
        assert_eq!(headless.buffer_contents(buffer.handle()).unwrap().len(), 24);
        assert_eq!(headless.live_buffers(), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let (headless, api) = setup();
        let mut buffer =
            Buffer::create(&api, BufferUsage::DynamicDraw, BufferTarget::ArrayBuffer, 64, None)
                .unwrap();

        buffer.release();
        buffer.release();

        assert!(buffer.is_released());
        assert_eq!(buffer.handle(), 0);
        assert_eq!(buffer.size(), 0);
        assert_eq!(buffer.usage(), BufferUsage::None);
        assert_eq!(buffer.target(), BufferTarget::None);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::DeleteBuffer(_))), 1);

        // Drop after release must not delete again
        drop(buffer);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::DeleteBuffer(_))), 1);
    }

    #[test]
    fn test_drop_releases_handle() {
        let (headless, api) = setup();
        {
            let _buffer =
                Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::UniformBuffer, 16, None)
                    .unwrap();
            assert_eq!(headless.live_buffers(), 1);
        }
        assert_eq!(headless.live_buffers(), 0);
    }

    #[test]
    fn test_take_transfers_handle_once() {
        let (headless, api) = setup();
        let mut source =
            Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, 8, None)
                .unwrap();
        let original = source.handle();

        let target = source.take();

        assert!(source.is_released());
        assert_eq!(source.size(), 0);
        assert_eq!(target.handle(), original);
        assert_eq!(target.size(), 8);

        drop(source);
        assert_eq!(headless.live_buffers(), 1);
        drop(target);
        assert_eq!(headless.live_buffers(), 0);
    }

    #[test]
    fn test_move_assignment_releases_previous_handle() {
        let (headless, api) = setup();
        let mut first =
            Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, 4, None)
                .unwrap();
        let mut second =
            Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, 4, None)
                .unwrap();
        let kept = second.handle();
        assert_ne!(first.handle(), kept);

        first = second.take();

        assert_eq!(first.handle(), kept);
        assert!(second.is_released());
        assert_eq!(headless.live_buffers(), 1);
    }

    #[test]
    fn test_generation_failure_has_no_side_effects() {
        let (headless, api) = setup();
        headless.fail_buffer_generation(true);

        let error =
            Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, 4, None)
                .unwrap_err();

        assert!(error.is(BufferErrorCode::FailedToGenerateBuffer));
        assert_eq!(headless.live_buffers(), 0);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::BufferData { .. })), 0);
    }

    #[test]
    fn test_allocation_failure_rolls_back_handle() {
        let (headless, api) = setup();
        headless.fail_allocation(true);

        let error = Buffer::with_data(
            &api,
            BufferUsage::StaticDraw,
            BufferTarget::ArrayBuffer,
            &TRIANGLE,
        )
        .unwrap_err();

        assert!(error.is(BufferErrorCode::FailedToAllocateStorage));
        assert!(error.has_message());
        assert_eq!(headless.live_buffers(), 0);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::DeleteBuffer(_))), 1);
    }

    #[test]
    fn test_short_initial_data_is_rejected_before_generation() {
        let (headless, api) = setup();

        let error = Buffer::create(
            &api,
            BufferUsage::StaticDraw,
            BufferTarget::ArrayBuffer,
            32,
            Some(&[0_u8; 8]),
        )
        .unwrap_err();

        assert!(error.is(BufferErrorCode::InvalidInitialData));
        assert!(headless.calls().is_empty());
    }

    #[test]
    fn test_sub_data_within_bounds() {
        let (headless, api) = setup();
        let mut buffer =
            Buffer::create(&api, BufferUsage::DynamicDraw, BufferTarget::ArrayBuffer, 8, None)
                .unwrap();

        buffer.set_sub_data(4, &[1, 2, 3, 4]);

        assert_eq!(
            headless.buffer_contents(buffer.handle()).unwrap(),
            vec![0, 0, 0, 0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_sub_data_out_of_bounds_is_ignored() {
        let (headless, api) = setup();
        let mut buffer =
            Buffer::create(&api, BufferUsage::DynamicDraw, BufferTarget::ArrayBuffer, 8, None)
                .unwrap();
        let calls_before = headless.calls().len();

        buffer.set_sub_data(6, &[1, 2, 3, 4]);
        buffer.set_sub_data(usize::MAX, &[1]);

        assert_eq!(headless.calls().len(), calls_before);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::BufferSubData { .. })), 0);
    }

    #[test]
    fn test_set_data_tracks_new_size() {
        let (_headless, api) = setup();
        let mut buffer =
            Buffer::create(&api, BufferUsage::DynamicDraw, BufferTarget::ArrayBuffer, 8, None)
                .unwrap();

        buffer.set_data(32, None).unwrap();
        assert_eq!(buffer.size(), 32);

        // Short data is a soft failure
        buffer.set_data(64, Some(&[0_u8; 4])).unwrap();
        assert_eq!(buffer.size(), 32);
    }

    #[test]
    fn test_bind_range_validates_size() {
        let (headless, api) = setup();
        let buffer =
            Buffer::create(&api, BufferUsage::DynamicDraw, BufferTarget::UniformBuffer, 64, None)
                .unwrap();

        buffer.bind_range(0, 0, 128);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::BindBufferRange { .. })), 0);

        buffer.bind_range(0, 16, 48);
        buffer.bind_base(1);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::BindBufferRange { .. })), 1);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::BindBufferBase { .. })), 1);
    }

    #[test]
    #[should_panic(expected = "buffer used after release")]
    fn test_bind_after_release_is_fatal() {
        let (_headless, api) = setup();
        let mut buffer =
            Buffer::create(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, 4, None)
                .unwrap();
        buffer.release();
        buffer.bind();
    }
}
