use std::fmt;
use thiserror::Error;

/// Number of columns (days per week) in a month page
pub const COLUMN_COUNT: u8 = 7;

/// Number of rows (weeks) in a month page
pub const ROW_COUNT: u8 = 6;

/// Number of cells in a month page
pub const CELL_COUNT: u8 = COLUMN_COUNT * ROW_COUNT;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CellError {
    #[error("cell index {0} is outside of the 7x6 grid")]
    Index(i64),
    #[error("grid position ({x}, {y}) is outside of the 7x6 grid")]
    Position { x: u8, y: u8 },
    #[error("week index {0} is outside of 0..6")]
    Week(u8),
    #[error("cell range starts at {start} after it ends at {end}")]
    Reversed { start: Cell, end: Cell },
}

/// One of the 42 positions of a month page, numbered row by row from the top
/// left
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cell(u8);

impl Cell {
    pub const FIRST: Cell = Cell(0);
    pub const LAST: Cell = Cell(CELL_COUNT - 1);

    pub fn new(index: u8) -> Result<Cell, CellError> {
        if index < CELL_COUNT {
            Ok(Cell(index))
        } else {
            Err(CellError::Index(i64::from(index)))
        }
    }

    pub fn from_grid(x: u8, y: u8) -> Result<Cell, CellError> {
        if x < COLUMN_COUNT && y < ROW_COUNT {
            Ok(Cell(y * COLUMN_COUNT + x))
        } else {
            Err(CellError::Position { x, y })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Column of the cell, `0..7`
    pub fn grid_x(self) -> u8 {
        self.0 % COLUMN_COUNT
    }

    /// Row of the cell, `0..6`
    pub fn grid_y(self) -> u8 {
        self.0 / COLUMN_COUNT
    }

    pub fn same_x(self, other: Cell) -> bool {
        self.grid_x() == other.grid_x()
    }

    pub fn same_y(self, other: Cell) -> bool {
        self.grid_y() == other.grid_y()
    }

    pub fn is_first_on_row(self) -> bool {
        self.grid_x() == 0
    }

    pub fn is_last_on_row(self) -> bool {
        self.grid_x() == COLUMN_COUNT - 1
    }

    /// The cell `delta` positions away in reading order, if there is one
    pub fn offset(self, delta: i64) -> Option<Cell> {
        let index = i64::from(self.0).checked_add(delta)?;
        u8::try_from(index).ok().and_then(|i| Cell::new(i).ok())
    }

    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT).map(Cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell.0
    }
}

impl TryFrom<u8> for Cell {
    type Error = CellError;

    fn try_from(index: u8) -> Result<Cell, CellError> {
        Cell::new(index)
    }
}

/// An inclusive span of cells in reading order.  A range that selects
/// nothing is represented by `Option<CellRange>::None` at use sites; a
/// `CellRange` value always has `start <= end`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CellRange {
    start: Cell,
    end: Cell,
}

impl CellRange {
    /// The whole page
    pub const ALL: CellRange = CellRange {
        start: Cell::FIRST,
        end: Cell::LAST,
    };

    pub fn new(start: Cell, end: Cell) -> Result<CellRange, CellError> {
        if start > end {
            Err(CellError::Reversed { start, end })
        } else {
            Ok(CellRange { start, end })
        }
    }

    pub fn from_indices(start: u8, end: u8) -> Result<CellRange, CellError> {
        CellRange::new(Cell::new(start)?, Cell::new(end)?)
    }

    pub fn single(cell: Cell) -> CellRange {
        CellRange {
            start: cell,
            end: cell,
        }
    }

    /// Builds a range from two endpoints given in either order, as happens
    /// while dragging backwards
    pub fn normalized(a: Cell, b: Cell) -> CellRange {
        CellRange {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// The seven cells of row `index`
    pub fn week(index: u8) -> Result<CellRange, CellError> {
        if index < ROW_COUNT {
            let start = index * COLUMN_COUNT;
            Ok(CellRange {
                start: Cell(start),
                end: Cell(start + COLUMN_COUNT - 1),
            })
        } else {
            Err(CellError::Week(index))
        }
    }

    /// The full row that `cell` is on
    pub fn row_of(cell: Cell) -> CellRange {
        let start = cell.grid_y() * COLUMN_COUNT;
        CellRange {
            start: Cell(start),
            end: Cell(start + COLUMN_COUNT - 1),
        }
    }

    pub fn start(self) -> Cell {
        self.start
    }

    pub fn end(self) -> Cell {
        self.end
    }

    pub fn is_single_cell(self) -> bool {
        self.start == self.end
    }

    pub fn is_on_one_row(self) -> bool {
        self.start.same_y(self.end)
    }

    pub fn cell_count(self) -> u8 {
        self.end.0 - self.start.0 + 1
    }

    pub fn contains(self, cell: Cell) -> bool {
        self.start <= cell && cell <= self.end
    }

    pub fn contains_range(self, other: CellRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn has_intersection_with(self, other: CellRange) -> bool {
        !(other.start > self.end || self.start > other.end)
    }

    pub fn intersection_with(self, other: CellRange) -> Option<CellRange> {
        self.has_intersection_with(other).then(|| CellRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (self.start.0..=self.end.0).map(Cell)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
