use crate::cell::{Cell, CellRange};
use crate::measure::{CellMeasureManager, PointF, RectF};

/// Radius of each corner of a rounded rectangle; 0 leaves the corner square
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadii {
    pub left_top: f32,
    pub right_top: f32,
    pub right_bottom: f32,
    pub left_bottom: f32,
}

impl CornerRadii {
    pub fn uniform(radius: f32) -> CornerRadii {
        CornerRadii {
            left_top: radius,
            right_top: radius,
            right_bottom: radius,
            left_bottom: radius,
        }
    }

    /// Rounds exactly the corners whose flag is set
    pub fn select(radius: f32, lt: bool, rt: bool, rb: bool, lb: bool) -> CornerRadii {
        let pick = |on: bool| if on { radius } else { 0.0 };
        CornerRadii {
            left_top: pick(lt),
            right_top: pick(rt),
            right_bottom: pick(rb),
            left_bottom: pick(lb),
        }
    }

    pub fn is_rounded(&self) -> [bool; 4] {
        [
            self.left_top > 0.0,
            self.right_top > 0.0,
            self.right_bottom > 0.0,
            self.left_bottom > 0.0,
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoundRect {
    pub rect: RectF,
    pub radii: CornerRadii,
}

impl RoundRect {
    pub fn new(rect: RectF, radii: CornerRadii) -> RoundRect {
        RoundRect { rect, radii }
    }

    pub fn contains(&self, p: PointF) -> bool {
        let r = &self.rect;
        if !r.contains(p) || r.is_empty() {
            return false;
        }
        let max_radius = (r.width() * 0.5).min(r.height() * 0.5);
        let corners = [
            (self.radii.left_top, r.left, r.top, 1.0, 1.0),
            (self.radii.right_top, r.right, r.top, -1.0, 1.0),
            (self.radii.right_bottom, r.right, r.bottom, -1.0, -1.0),
            (self.radii.left_bottom, r.left, r.bottom, 1.0, -1.0),
        ];
        corners.into_iter().all(|(radius, x, y, dx, dy)| {
            let radius = radius.min(max_radius);
            if radius <= 0.0 {
                return true;
            }
            let center = PointF::new(x + dx * radius, y + dy * radius);
            let in_corner_box = (p.x - center.x) * dx < 0.0 && (p.y - center.y) * dy < 0.0;
            !in_corner_box || p.distance_squared(center) <= radius * radius
        })
    }
}

/// The filled region of a selection: one to three rounded rectangles that
/// together form a single outline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionShape {
    pieces: Vec<RoundRect>,
    bounds: RectF,
}

impl SelectionShape {
    pub fn round_rect(rect: RectF, radius: f32) -> SelectionShape {
        SelectionShape {
            pieces: vec![RoundRect::new(rect, CornerRadii::uniform(radius))],
            bounds: rect,
        }
    }

    fn from_pieces(pieces: Vec<RoundRect>) -> SelectionShape {
        let bounds = pieces
            .iter()
            .map(|p| p.rect)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        SelectionShape { pieces, bounds }
    }

    pub fn pieces(&self) -> &[RoundRect] {
        &self.pieces
    }

    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    pub fn contains(&self, p: PointF) -> bool {
        self.bounds.contains(p) && self.pieces.iter().any(|piece| piece.contains(p))
    }
}

/// Geometry of a range selection: where its first and last cells sit and
/// how wide a row is.  Intermediate frames of animations produce outlines
/// whose edges lie between cell boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeOutline {
    pub range: CellRange,
    pub row_left: f32,
    pub row_right: f32,
    pub start_left: f32,
    pub start_top: f32,
    pub end_right: f32,
    pub end_top: f32,
    pub cell_height: f32,
    pub radius: f32,
}

impl RangeOutline {
    pub fn new<M: CellMeasureManager + ?Sized>(range: CellRange, measure: &M) -> RangeOutline {
        RangeOutline {
            range,
            row_left: measure.row_left(),
            row_right: measure.row_right(),
            start_left: measure.cell_left(range.start()),
            start_top: measure.cell_top(range.start()),
            end_right: measure.cell_right(range.end()),
            end_top: measure.cell_top(range.end()),
            cell_height: measure.cell_height(),
            radius: measure.round_radius(),
        }
    }

    pub fn start_cell(&self) -> Cell {
        self.range.start()
    }

    pub fn end_cell(&self) -> Cell {
        self.range.end()
    }

    /// Bounds of the part of the outline on the start row, or of the whole
    /// outline if it fits on one row
    pub fn start_row_rect(&self) -> RectF {
        let right = if self.range.is_on_one_row() {
            self.end_right
        } else {
            self.row_right
        };
        RectF::new(
            self.start_left,
            self.start_top,
            right,
            self.start_top + self.cell_height,
        )
    }

    /// Builds the outline's shape.  A range on one row is a single rounded
    /// rectangle.  Otherwise the start row, the end row and any rows in
    /// between become separate pieces, and corners where one piece continues
    /// into the next are left square.
    pub fn shape(&self) -> SelectionShape {
        let (start, end) = (self.range.start(), self.range.end());
        if start.same_y(end) {
            return SelectionShape::round_rect(self.start_row_rect(), self.radius);
        }
        let start_bottom = self.start_top + self.cell_height;
        let end_bottom = self.end_top + self.cell_height;
        let adjacent_rows = end.grid_y() - start.grid_y() == 1;
        let starts_mid_row = !start.is_first_on_row();
        let ends_mid_row = !end.is_last_on_row();
        let mut pieces = Vec::with_capacity(3);
        pieces.push(RoundRect::new(
            RectF::new(self.start_left, self.start_top, self.row_right, start_bottom),
            CornerRadii::select(
                self.radius,
                true,
                true,
                adjacent_rows && ends_mid_row,
                starts_mid_row,
            ),
        ));
        pieces.push(RoundRect::new(
            RectF::new(
                self.row_left,
                if adjacent_rows {
                    start_bottom
                } else {
                    self.end_top
                },
                self.end_right,
                end_bottom,
            ),
            CornerRadii::select(
                self.radius,
                adjacent_rows && starts_mid_row,
                ends_mid_row,
                true,
                true,
            ),
        ));
        if !adjacent_rows {
            pieces.push(RoundRect::new(
                RectF::new(self.row_left, start_bottom, self.row_right, self.end_top),
                CornerRadii::select(self.radius, starts_mid_row, false, ends_mid_row, false),
            ));
        }
        SelectionShape::from_pieces(pieces)
    }
}
