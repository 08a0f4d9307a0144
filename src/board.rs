use core::ops::{Index, IndexMut};

use hashbrown::HashSet;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular arena of cells. The board exclusively owns every cell; no cell
/// outlives it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Board {
    /// Generates a board for `config`, guaranteeing `exclude` is not a mine.
    ///
    /// Mines are rejection-sampled uniformly without replacement; the loop
    /// terminates because `validate` guarantees `mines < width * height`.
    /// Neighbor counts are derived in a second pass since a cell's
    /// classification depends on the final global mine layout.
    pub fn generate<R: Rng + ?Sized>(
        config: &GameConfig,
        exclude: Pos,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        if !exclude.in_bounds(config.width, config.height) {
            return Err(GameError::OutOfBounds);
        }

        let mut mines: HashSet<Pos> = HashSet::with_capacity(config.mines as usize);
        while mines.len() < config.mines as usize {
            let pos = Pos::new(
                rng.random_range(0..config.width),
                rng.random_range(0..config.height),
            );
            if pos == exclude {
                continue;
            }
            mines.insert(pos);
        }

        Ok(Self::from_mine_set(config.width, config.height, &mines))
    }

    /// Builds a board with an explicit mine layout. Deterministic counterpart
    /// of [`Board::generate`], mainly for tests and replay-style collaborators.
    pub fn from_mine_coords(width: Coord, height: Coord, mines: &[Pos]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::ZeroDimension);
        }

        let mut unique: HashSet<Pos> = HashSet::with_capacity(mines.len());
        for &pos in mines {
            if !pos.in_bounds(width, height) {
                return Err(GameError::OutOfBounds);
            }
            unique.insert(pos);
        }

        let mine_count = unique.len() as CellCount;
        if mine_count == 0 || mine_count >= area(width, height) {
            return Err(GameError::MineCountOutOfRange);
        }

        Ok(Self::from_mine_set(width, height, &unique))
    }

    fn from_mine_set(width: Coord, height: Coord, mines: &HashSet<Pos>) -> Self {
        let mut cells: Array2<Cell> =
            Array2::default([width as usize, height as usize]);

        for &pos in mines {
            cells[pos.nd()].kind = CellKind::Mine;
        }

        for col in 0..width {
            for row in 0..height {
                let pos = Pos::new(col, row);
                if cells[pos.nd()].kind.is_mine() {
                    continue;
                }
                let adjacent = NeighborIter::new(pos, width, height)
                    .filter(|&neighbor| cells[neighbor.nd()].kind.is_mine())
                    .count() as u8;
                cells[pos.nd()].kind = CellKind::Safe(adjacent);
            }
        }

        Self {
            cells,
            mine_count: mines.len() as CellCount,
        }
    }

    pub fn width(&self) -> Coord {
        self.cells.dim().0 as Coord
    }

    pub fn height(&self) -> Coord {
        self.cells.dim().1 as Coord
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    /// Checks `pos` against the board bounds; out-of-range coordinates are a
    /// caller bug and surface as an error rather than being clamped.
    pub fn validate_pos(&self, pos: Pos) -> Result<Pos> {
        if pos.in_bounds(self.width(), self.height()) {
            Ok(pos)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn cell_at(&self, pos: Pos) -> Result<Cell> {
        self.validate_pos(pos).map(|pos| self[pos])
    }

    /// The up-to-8 in-bounds neighbors of `pos`, in row-major order from the
    /// top-left.
    pub fn neighbors(&self, pos: Pos) -> NeighborIter {
        NeighborIter::new(pos, self.width(), self.height())
    }

    /// Total number of non-mine cells. Recomputed per query; boards are small
    /// enough that the scan beats carrying incremental counters.
    pub fn safe_cell_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| !cell.kind().is_mine())
            .count() as CellCount
    }

    /// Number of non-mine cells revealed so far.
    pub fn revealed_safe_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| !cell.kind().is_mine() && cell.is_revealed())
            .count() as CellCount
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}

impl Index<Pos> for Board {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos.nd()]
    }
}

impl IndexMut<Pos> for Board {
    fn index_mut(&mut self, pos: Pos) -> &mut Self::Output {
        &mut self.cells[pos.nd()]
    }
}
