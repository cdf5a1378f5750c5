//! Reading (and, where possible, moving) the desktop pointer.

use minifb::{MouseMode, Window};
use thiserror::Error;

use crate::physics::Point;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("the {0} pointer cannot be moved")]
    Unsupported(&'static str),
}

pub trait Pointer {
    /// Screen position, if the backend can see the pointer right now.
    fn position(&self) -> Option<Point>;

    fn warp(&mut self, to: Point) -> Result<(), PointerError>;
}

/// The pointer as seen by a minifb window: the window's screen origin plus
/// the window-relative mouse position.  minifb has no way to move the
/// pointer, so [`warp`](Pointer::warp) always fails.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowPointer {
    origin:   (isize, isize),
    relative: Option<(f32, f32)>,
}

impl WindowPointer {
    pub fn new(origin: (isize, isize), relative: Option<(f32, f32)>) -> Self {
        WindowPointer { origin, relative }
    }

    pub fn from_window(window: &Window) -> Self {
        WindowPointer::new(window.get_position(), window.get_mouse_pos(MouseMode::Pass))
    }
}

impl Pointer for WindowPointer {
    fn position(&self) -> Option<Point> {
        let (rx, ry) = self.relative?;
        Some(Point::new(self.origin.0 as f32 + rx, self.origin.1 as f32 + ry))
    }

    fn warp(&mut self, _to: Point) -> Result<(), PointerError> {
        Err(PointerError::Unsupported("minifb"))
    }
}
