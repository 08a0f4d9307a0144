use serde::{Deserialize, Serialize};

/// Single coordinate axis, used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Count type for remaining lives.
pub type Lives = u8;

/// Board coordinates `(column, row)`, with the origin in the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub col: Coord,
    pub row: Coord,
}

impl Pos {
    pub const fn new(col: Coord, row: Coord) -> Self {
        Self { col, row }
    }

    /// Index into an `ndarray` arena dimensioned `[width, height]`.
    pub(crate) const fn nd(self) -> [usize; 2] {
        [self.col as usize, self.row as usize]
    }

    pub(crate) const fn in_bounds(self, width: Coord, height: Coord) -> bool {
        self.col < width && self.row < height
    }
}

impl From<(Coord, Coord)> for Pos {
    fn from((col, row): (Coord, Coord)) -> Self {
        Self::new(col, row)
    }
}

pub(crate) const fn area(width: Coord, height: Coord) -> CellCount {
    (width as CellCount).saturating_mul(height as CellCount)
}

// Row-major from the top-left, so neighbor order is deterministic.
const DISPLACEMENTS: [(i16, i16); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn apply_delta(pos: Pos, delta: (i16, i16), width: Coord, height: Coord) -> Option<Pos> {
    let col = (pos.col as i16) + delta.0;
    let row = (pos.row as i16) + delta.1;

    if col < 0 || col >= width as i16 || row < 0 || row >= height as i16 {
        return None;
    }

    Some(Pos::new(col as Coord, row as Coord))
}

/// Iterator over the up-to-8 in-bounds neighbors of a position.
#[derive(Debug)]
pub struct NeighborIter {
    center: Pos,
    width: Coord,
    height: Coord,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Pos, width: Coord, height: Coord) -> Self {
        Self {
            center,
            width,
            height,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while usize::from(self.index) < DISPLACEMENTS.len() {
            let delta = DISPLACEMENTS[self.index as usize];
            self.index += 1;

            if let Some(pos) = apply_delta(self.center, delta, self.width, self.height) {
                return Some(pos);
            }
        }
        None
    }
}
