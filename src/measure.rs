use crate::cell::{Cell, COLUMN_COUNT, ROW_COUNT};
use std::fmt;

pub fn lerp(start: f32, end: f32, fraction: f32) -> f32 {
    start + (end - start) * fraction
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub fn new(x: f32, y: f32) -> PointF {
        PointF { x, y }
    }

    pub fn distance_squared(self, other: PointF) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> RectF {
        RectF {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> PointF {
        PointF::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    pub fn contains(&self, p: PointF) -> bool {
        self.left <= p.x && p.x <= self.right && self.top <= p.y && p.y <= self.bottom
    }

    pub fn union(&self, other: &RectF) -> RectF {
        RectF {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Whether coordinates passed to [`CellMeasureManager::cell_at`] are relative
/// to the whole calendar view or to the top-left corner of the cell grid
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CoordinateRelativity {
    View,
    Grid,
}

/// Converts cells into geometry.  Everything that draws or animates a
/// selection goes through this, so the selection logic never needs to know
/// how large the calendar is or where it sits.
///
/// Implementations must keep `cell_distance` strictly increasing in cell
/// index, and `cell_and_point_at_distance` must be its inverse: for every
/// cell, `cell_and_point_at_distance(cell_distance(cell))` returns that cell
/// together with its left-top corner.
pub trait CellMeasureManager: fmt::Debug {
    fn cell_width(&self) -> f32;

    fn cell_height(&self) -> f32;

    fn round_radius(&self) -> f32;

    /// X coordinate of the left edge of `cell`
    fn cell_left(&self, cell: Cell) -> f32;

    /// Y coordinate of the top edge of `cell`
    fn cell_top(&self, cell: Cell) -> f32;

    /// Position of `cell` along the grid read row after row, as a length
    fn cell_distance(&self, cell: Cell) -> f32;

    /// The cell lying at `distance` along the grid and the point at that
    /// distance on the cell's top edge
    fn cell_and_point_at_distance(&self, distance: f32) -> (Cell, PointF);

    fn cell_at(&self, x: f32, y: f32, relativity: CoordinateRelativity) -> Option<Cell>;

    fn cell_right(&self, cell: Cell) -> f32 {
        self.cell_left(cell) + self.cell_width()
    }

    fn cell_bottom(&self, cell: Cell) -> f32 {
        self.cell_top(cell) + self.cell_height()
    }

    fn cell_bounds(&self, cell: Cell) -> RectF {
        RectF::new(
            self.cell_left(cell),
            self.cell_top(cell),
            self.cell_right(cell),
            self.cell_bottom(cell),
        )
    }

    /// Left edge of the first column
    fn row_left(&self) -> f32 {
        self.cell_left(Cell::FIRST)
    }

    /// Right edge of the last column
    fn row_right(&self) -> f32 {
        self.cell_right(Cell::from_grid(COLUMN_COUNT - 1, 0).unwrap_or(Cell::LAST))
    }
}

/// Cells of one size laid out edge to edge horizontally, with an optional
/// gap between rows
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformCellMeasure {
    origin: PointF,
    cell_width: f32,
    cell_height: f32,
    row_gap: f32,
    round_radius: f32,
}

impl UniformCellMeasure {
    pub fn new(cell_width: f32, cell_height: f32) -> UniformCellMeasure {
        UniformCellMeasure {
            origin: PointF::default(),
            cell_width,
            cell_height,
            row_gap: 0.0,
            round_radius: cell_width.min(cell_height) * 0.5,
        }
    }

    /// Position of the grid's top-left corner within the view
    pub fn origin(mut self, x: f32, y: f32) -> Self {
        self.origin = PointF::new(x, y);
        self
    }

    pub fn row_gap(mut self, gap: f32) -> Self {
        self.row_gap = gap;
        self
    }

    pub fn with_round_radius(mut self, radius: f32) -> Self {
        self.round_radius = radius;
        self
    }

    fn row_width(&self) -> f32 {
        self.cell_width * f32::from(COLUMN_COUNT)
    }

    fn row_pitch(&self) -> f32 {
        self.cell_height + self.row_gap
    }

    fn row_top(&self, row: u8) -> f32 {
        self.origin.y + f32::from(row) * self.row_pitch()
    }

    fn grid_height(&self) -> f32 {
        f32::from(ROW_COUNT) * self.row_pitch() - self.row_gap
    }
}

/// Index of the band of width `step` that `value` falls in, clamped to
/// `0..count`
fn band(value: f32, step: f32, count: u8) -> u8 {
    let mut i = 0;
    while i + 1 < count && value >= f32::from(i + 1) * step {
        i += 1;
    }
    i
}

impl CellMeasureManager for UniformCellMeasure {
    fn cell_width(&self) -> f32 {
        self.cell_width
    }

    fn cell_height(&self) -> f32 {
        self.cell_height
    }

    fn round_radius(&self) -> f32 {
        self.round_radius
    }

    fn cell_left(&self, cell: Cell) -> f32 {
        self.origin.x + f32::from(cell.grid_x()) * self.cell_width
    }

    fn cell_top(&self, cell: Cell) -> f32 {
        self.row_top(cell.grid_y())
    }

    fn cell_distance(&self, cell: Cell) -> f32 {
        f32::from(cell.grid_y()) * self.row_width() + f32::from(cell.grid_x()) * self.cell_width
    }

    fn cell_and_point_at_distance(&self, distance: f32) -> (Cell, PointF) {
        let row_width = self.row_width();
        let distance = distance.max(0.0);
        let grid_y = band(distance, row_width, ROW_COUNT);
        let x_on_row = (distance - f32::from(grid_y) * row_width).min(row_width);
        let grid_x = band(x_on_row, self.cell_width, COLUMN_COUNT);
        let cell = Cell::from_grid(grid_x, grid_y).unwrap_or(Cell::LAST);
        (
            cell,
            PointF::new(self.origin.x + x_on_row, self.row_top(grid_y)),
        )
    }

    fn cell_at(&self, x: f32, y: f32, relativity: CoordinateRelativity) -> Option<Cell> {
        let (x, y) = match relativity {
            CoordinateRelativity::View => (x - self.origin.x, y - self.origin.y),
            CoordinateRelativity::Grid => (x, y),
        };
        if !(0.0..self.row_width()).contains(&x) || !(0.0..self.grid_height()).contains(&y) {
            return None;
        }
        let grid_y = band(y, self.row_pitch(), ROW_COUNT);
        if y - f32::from(grid_y) * self.row_pitch() >= self.cell_height {
            // In the gap between two rows
            return None;
        }
        let grid_x = band(x, self.cell_width, COLUMN_COUNT);
        Cell::from_grid(grid_x, grid_y).ok()
    }
}
