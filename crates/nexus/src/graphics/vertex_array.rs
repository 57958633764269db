//! Owned vertex array objects
//!
//! A [`VertexArray`] keeps no reference to the buffers its attributes read
//! from. [`VertexArray::array_attrib`] captures whichever buffer is bound to
//! the array-buffer target at call time, so bind the source [`Buffer`] first:
//!
//! ```ignore
//! vertex_array.bind();
//! buffer.bind();
//! vertex_array.array_attrib(0, 2, DataType::Float, 8, 0);
//! ```
//!
//! [`Buffer`]: super::Buffer

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use super::api::SharedGraphicsApi;
use crate::nexus_assert;
use crate::outcome::{Error, Outcome};

crate::error_codes! {
    /// Failure codes of [`VertexArray::create`]
    pub enum VertexArrayErrorCode in "vertex_array" {
        /// The driver returned no vertex array name
        FailedToGenerateVertexArray = 1 => "failed to generate vertex array",
    }
}

/// Component type of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum DataType {
    Byte = 0x1400,
    UnsignedByte = 0x1401,
    Short = 0x1402,
    UnsignedShort = 0x1403,
    Int = 0x1404,
    UnsignedInt = 0x1405,
    Float = 0x1406,
    Double = 0x140A,
}

impl DataType {
    /// Native enum value
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Size of one component in bytes
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
            Self::Double => 8,
        }
    }
}

/// A uniquely owned vertex array object
pub struct VertexArray {
    api: SharedGraphicsApi,
    id: Option<NonZeroU32>,
}

impl VertexArray {
    /// Generate a vertex array
    pub fn create(api: &SharedGraphicsApi) -> Outcome<Self> {
        let Some(id) = NonZeroU32::new(api.gen_vertex_array()) else {
            return Err(Error::new(VertexArrayErrorCode::FailedToGenerateVertexArray));
        };
        log::debug!("Created vertex array with id: {id}");
        Ok(Self {
            api: Rc::clone(api),
            id: Some(id),
        })
    }

    /// Bind the vertex array
    pub fn bind(&self) {
        let id = self.live_id();
        self.api.bind_vertex_array(id.get());
    }

    /// Unbind any vertex array
    pub fn unbind(&self) {
        self.live_id();
        self.api.bind_vertex_array(0);
    }

    /// Define attribute `index` as `components` values of `data_type`
    ///
    /// Binds this vertex array, enables the attribute and points it at
    /// `offset` bytes into the buffer currently bound to the array-buffer
    /// target. Values are not normalized.
    pub fn array_attrib(
        &self,
        index: u32,
        components: i32,
        data_type: DataType,
        stride: i32,
        offset: usize,
    ) {
        self.bind();
        self.api.enable_vertex_attrib_array(index);
        self.api
            .vertex_attrib_pointer(index, components, data_type, false, stride, offset);
    }

    /// Delete the vertex array; a no-op on a released one
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.api.delete_vertex_array(id.get());
            log::debug!("Deleted vertex array with id: {id}");
        }
    }

    /// Move ownership out, leaving `self` released
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            api: Rc::clone(&self.api),
            id: self.id.take(),
        }
    }

    /// Native vertex array name, 0 once released
    pub fn handle(&self) -> u32 {
        self.id.map_or(0, NonZeroU32::get)
    }

    /// Whether the vertex array no longer owns a name
    pub const fn is_released(&self) -> bool {
        self.id.is_none()
    }

    fn live_id(&self) -> NonZeroU32 {
        nexus_assert!(self.id.is_some(), "vertex array used after release");
        self.id.unwrap_or(NonZeroU32::MIN)
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexArray").field("id", &self.handle()).finish()
    }
}
