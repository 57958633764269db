//! Small value types shared by the window and graphics layers

use serde::{Deserialize, Serialize};

/// Width and height pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions<T> {
    /// Horizontal extent
    pub width: T,
    /// Vertical extent
    pub height: T,
}

impl<T> Dimensions<T> {
    /// Create dimensions from width and height
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl<T: Copy> Dimensions<T> {
    /// As a `(width, height)` tuple
    pub const fn as_tuple(&self) -> (T, T) {
        (self.width, self.height)
    }
}

impl<T> From<(T, T)> for Dimensions<T> {
    fn from((width, height): (T, T)) -> Self {
        Self { width, height }
    }
}
