//! Input abstraction layer.
//!
//! The host converts raw pointer events to tile coordinates through its
//! projection before handing them to the mode handlers, so every event here
//! is already in tile space.

use iso_core::model::Coords;

/// A normalized pointer event on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMove { tile: Coords },
    PointerDown { tile: Coords },
    PointerUp { tile: Coords },
}

impl InputEvent {
    /// Tile under the pointer.
    pub fn tile(&self) -> Coords {
        match self {
            Self::PointerMove { tile } | Self::PointerDown { tile } | Self::PointerUp { tile } => {
                *tile
            }
        }
    }
}
