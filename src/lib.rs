#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use controller::*;
pub use error::*;
pub use reveal::*;
pub use types::*;

mod board;
mod cell;
mod controller;
mod error;
mod reveal;
mod types;

/// Immutable game configuration, supplied by the embedding application at
/// construction time. There is no process-wide settings state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    pub lives: Lives,
}

impl GameConfig {
    pub const fn new(width: Coord, height: Coord, mines: CellCount, lives: Lives) -> Self {
        Self {
            width,
            height,
            mines,
            lives,
        }
    }

    /// Checks the invariants every board and controller relies on:
    /// positive dimensions, `0 < mines < width * height` (this bound is what
    /// keeps mine placement's rejection sampling finite), and at least one
    /// life.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::ZeroDimension);
        }
        if self.mines == 0 || self.mines >= self.total_cells() {
            return Err(GameError::MineCountOutOfRange);
        }
        if self.lives == 0 {
            return Err(GameError::ZeroLives);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.width, self.height)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}
