#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Snake,
    Food,
}

/// Fixed-size occupancy map. Coordinates are expected to be wrapped by the
/// caller before lookup; the grid itself does not wrap.
pub struct CellGrid {
    rows: u16,
    cols: u16,
    cells: Vec<CellKind>,
}

impl CellGrid {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellKind::Empty; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn set(&mut self, row: u16, col: u16, kind: CellKind) {
        let idx = self.index(row, col);
        self.cells[idx] = kind;
    }

    pub fn get(&self, row: u16, col: u16) -> CellKind {
        self.cells[self.index(row, col)]
    }

    /// Row-major scan over every `Empty` coordinate. The order is
    /// deterministic for a given occupancy state.
    pub fn empty_cells(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, kind)| {
            (*kind == CellKind::Empty)
                .then(|| ((i / self.cols as usize) as u16, (i % self.cols as usize) as u16))
        })
    }

    fn index(&self, row: u16, col: u16) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row as usize * self.cols as usize + col as usize
    }
}
