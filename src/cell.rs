use serde::{Deserialize, Serialize};

/// Classification of a cell, fixed once during board generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Mine,
    /// Non-mine cell annotated with the count of adjacent mines, in `0..=8`.
    Safe(u8),
}

impl CellKind {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Safe(0))
    }
}

impl Default for CellKind {
    fn default() -> Self {
        Self::Safe(0)
    }
}

/// Player-visible state of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) kind: CellKind,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) spent: bool,
}

impl Cell {
    pub const fn kind(self) -> CellKind {
        self.kind
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(self) -> bool {
        self.flagged
    }

    /// A mine that cost a life while the game continued.
    pub const fn is_spent(self) -> bool {
        self.spent
    }

    /// Reveals the cell; `revealed` never reverts and the flag is dropped.
    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
        self.flagged = false;
    }

    /// Toggles the flag on an unrevealed cell. Returns whether anything changed.
    pub(crate) fn toggle_flag(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.flagged = !self.flagged;
        true
    }

    pub(crate) fn mark_spent(&mut self) {
        self.spent = true;
    }
}
