use alloc::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Outcome of a single-cell reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealResult {
    /// The cell was already revealed or is flagged; nothing changed.
    Unchanged,
    /// The cell was revealed; carries its kind.
    Revealed(CellKind),
}

/// Reveals one cell. Idempotent: revealed and flagged cells are left alone.
pub fn reveal_single(board: &mut Board, pos: Pos) -> Result<RevealResult> {
    let pos = board.validate_pos(pos)?;
    let cell = board[pos];

    if cell.is_revealed() || cell.is_flagged() {
        return Ok(RevealResult::Unchanged);
    }

    board[pos].reveal();
    Ok(RevealResult::Revealed(cell.kind()))
}

/// Expands a reveal outward from a just-revealed blank cell.
///
/// Breadth-first over an explicit queue so stack depth stays constant no
/// matter the board size. Every unrevealed, unflagged neighbor reachable
/// through a chain of `Safe(0)` cells is revealed; non-zero cells form the
/// border and do not propagate. The `revealed` flag doubles as the visited
/// guard, so each cell is processed at most once. Mines are never adjacent to
/// a `Safe(0)` cell, so the expansion cannot touch one.
///
/// Returns the number of newly revealed cells.
pub fn reveal_connected(board: &mut Board, start: Pos) -> Result<CellCount> {
    let start = board.validate_pos(start)?;
    debug_assert!(board[start].kind().is_blank());

    let mut queue: VecDeque<Pos> = board.neighbors(start).collect();
    let mut opened: CellCount = 0;

    while let Some(pos) = queue.pop_front() {
        let cell = board[pos];
        if cell.is_revealed() || cell.is_flagged() {
            continue;
        }

        board[pos].reveal();
        opened += 1;

        if cell.kind().is_blank() {
            queue.extend(board.neighbors(pos));
        }
    }

    log::debug!("flood fill from {start:?} opened {opened} cells");
    Ok(opened)
}

/// End-of-game disclosure: reveals every mine, touching nothing else. Used for
/// both the win and lose endings.
pub fn reveal_all_mines(board: &mut Board) {
    for cell in board.cells_mut() {
        if cell.kind().is_mine() {
            cell.reveal();
        }
    }
}
