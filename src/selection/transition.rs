use super::shape::{RangeOutline, SelectionShape};
use super::visual::VisualState;
use super::SelectionState;
use crate::cell::{Cell, CellRange};
use crate::measure::{lerp, CellMeasureManager, PointF, RectF};
use log::trace;
use std::fmt;

/// How a transition moves from one selection to the next
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransitionKind {
    /// Nothing was selected; the new selection fades in (a week grows out of
    /// the middle of its row instead)
    Appear,
    /// The reverse of `Appear`
    Disappear,
    /// One cell slides along its row to another
    SlideHorizontal,
    /// One cell slides along its column to another
    SlideVertical,
    /// The same cell moves to where the current layout puts it
    Move,
    /// The old selection fades out while the new one fades in
    CrossFade,
    /// A cell stretches into the week around it
    CellToWeek,
    /// A week shrinks into one of its own cells
    WeekToCell,
    /// A cell fades out while a week on another row grows from its middle
    CellFadeIntoWeek,
    /// The reverse of `CellFadeIntoWeek`
    WeekFadeIntoCell,
    /// One week shrinks into its middle while another grows from its own
    WeekCrossFade,
    /// A circle grows from a cell until it fills the month
    CellToMonth,
    /// The reverse of `CellToMonth`
    MonthToCell,
    /// The start and end of one range travel along the grid to the start and
    /// end of another
    RangeToRange,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionKind::Appear => "appear",
            TransitionKind::Disappear => "disappear",
            TransitionKind::SlideHorizontal => "horizontal slide",
            TransitionKind::SlideVertical => "vertical slide",
            TransitionKind::Move => "move",
            TransitionKind::CrossFade => "cross-fade",
            TransitionKind::CellToWeek => "cell to week",
            TransitionKind::WeekToCell => "week to cell",
            TransitionKind::CellFadeIntoWeek => "cell fading into week",
            TransitionKind::WeekFadeIntoCell => "week fading into cell",
            TransitionKind::WeekCrossFade => "week cross-fade",
            TransitionKind::CellToMonth => "cell to month",
            TransitionKind::MonthToCell => "month to cell",
            TransitionKind::RangeToRange => "range to range",
        };
        f.write_str(s)
    }
}

/// A single drawing instruction
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill `shape` with the selection color at `alpha` (0 to 1)
    Shape { shape: SelectionShape, alpha: f32 },
    /// Fill the part of a circle that lies inside `clip`, fully opaque
    ClippedCircle {
        center: PointF,
        radius: f32,
        clip: SelectionShape,
    },
}

/// Everything to draw for one frame of a selection, in order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionFrame {
    pub ops: Vec<DrawOp>,
}

impl SelectionFrame {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn fill(&mut self, shape: SelectionShape, alpha: f32) {
        if alpha > 0.0 && !shape.bounds().is_empty() {
            self.ops.push(DrawOp::Shape {
                shape,
                alpha: alpha.min(1.0),
            });
        }
    }

    fn fill_state(&mut self, state: &VisualState, alpha: f32) {
        if let Some(shape) = state.shape() {
            self.fill(shape, alpha);
        }
    }

    /// A one-row selection growing out of the middle of its row as
    /// `fraction` goes from 0 to 1
    fn fill_from_center(&mut self, state: &VisualState, fraction: f32) {
        let Some(outline) = state.outline() else {
            return;
        };
        let rect = outline.start_row_rect();
        let center = rect.center().x;
        let rect = RectF::new(
            lerp(center, rect.left, fraction),
            rect.top,
            lerp(center, rect.right, fraction),
            rect.bottom,
        );
        self.fill(SelectionShape::round_rect(rect, outline.radius), 1.0);
    }

    fn fill_clipped_circle(&mut self, center: PointF, radius: f32, clip: SelectionShape) {
        if radius.is_finite() && radius > 0.0 {
            self.ops.push(DrawOp::ClippedCircle {
                center,
                radius,
                clip,
            });
        }
    }
}

/// An interpolation between two selection states.  `frame(0.0)` draws the
/// old state and `frame(1.0)` the new one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    from: VisualState,
    to: VisualState,
    kind: TransitionKind,
}

impl Transition {
    /// Returns `None` when there is nothing to animate, i.e. when neither
    /// state selects anything
    pub fn new(from: VisualState, to: VisualState) -> Option<Transition> {
        let kind = choose_kind(from.state(), to.state())?;
        trace!("Transition from {} to {}: {kind}", from.state(), to.state());
        Some(Transition { from, to, kind })
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn previous(&self) -> &VisualState {
        &self.from
    }

    pub fn current(&self) -> &VisualState {
        &self.to
    }

    pub fn frame<M: CellMeasureManager + ?Sized>(&self, fraction: f32, measure: &M) -> SelectionFrame {
        let f = fraction.clamp(0.0, 1.0);
        let mut frame = SelectionFrame::default();
        match self.kind {
            TransitionKind::Appear => appear(&mut frame, &self.to, f),
            TransitionKind::Disappear => appear(&mut frame, &self.from, 1.0 - f),
            TransitionKind::SlideHorizontal => self.slide(&mut frame, f, 1.0),
            TransitionKind::SlideVertical => self.slide(&mut frame, 1.0, f),
            TransitionKind::Move => self.slide(&mut frame, f, f),
            TransitionKind::CrossFade => {
                frame.fill_state(&self.to, f);
                frame.fill_state(&self.from, 1.0 - f);
            }
            TransitionKind::CellToWeek
            | TransitionKind::WeekToCell
            | TransitionKind::RangeToRange => {
                if let (Some(a), Some(b)) = (self.from.state().range(), self.to.state().range()) {
                    frame.fill(range_to_range(a, b, f, measure), 1.0);
                }
            }
            TransitionKind::CellFadeIntoWeek => {
                frame.fill_state(&self.from, 1.0 - f);
                frame.fill_from_center(&self.to, f);
            }
            TransitionKind::WeekFadeIntoCell => {
                frame.fill_state(&self.to, f);
                frame.fill_from_center(&self.from, 1.0 - f);
            }
            TransitionKind::WeekCrossFade => {
                frame.fill_from_center(&self.from, 1.0 - f);
                frame.fill_from_center(&self.to, f);
            }
            TransitionKind::CellToMonth => cell_to_month(&mut frame, &self.from, &self.to, f, measure),
            TransitionKind::MonthToCell => {
                cell_to_month(&mut frame, &self.to, &self.from, 1.0 - f, measure);
            }
        }
        frame
    }

    fn slide(&self, frame: &mut SelectionFrame, x_fraction: f32, y_fraction: f32) {
        let (Some(a), Some(b)) = (self.from.row_rect(), self.to.row_rect()) else {
            return;
        };
        let left = lerp(a.left, b.left, x_fraction);
        let top = lerp(a.top, b.top, y_fraction);
        let rect = RectF::new(left, top, left + b.width(), top + b.height());
        let radius = self.to.outline().map_or(0.0, |o| o.radius);
        frame.fill(SelectionShape::round_rect(rect, radius), 1.0);
    }
}

fn choose_kind(from: SelectionState, to: SelectionState) -> Option<TransitionKind> {
    use SelectionState as S;
    let kind = match (from, to) {
        (S::None, S::None) => return None,
        (S::None, _) => TransitionKind::Appear,
        (_, S::None) => TransitionKind::Disappear,
        (S::Cell(a), S::Cell(b)) => {
            if a == b {
                TransitionKind::Move
            } else if a.same_y(b) {
                TransitionKind::SlideHorizontal
            } else if a.same_x(b) {
                TransitionKind::SlideVertical
            } else {
                TransitionKind::CrossFade
            }
        }
        (S::Cell(cell), S::Week(week)) => {
            if cell.same_y(week.start()) {
                TransitionKind::CellToWeek
            } else {
                TransitionKind::CellFadeIntoWeek
            }
        }
        (S::Week(week), S::Cell(cell)) => {
            if cell.same_y(week.start()) {
                TransitionKind::WeekToCell
            } else {
                TransitionKind::WeekFadeIntoCell
            }
        }
        (S::Week(_), S::Week(_)) => TransitionKind::WeekCrossFade,
        (S::Cell(_), S::Month(_)) => TransitionKind::CellToMonth,
        (S::Month(_), S::Cell(_)) => TransitionKind::MonthToCell,
        (S::Cell(cell), S::Custom(range)) | (S::Custom(range), S::Cell(cell)) => {
            if range.contains(cell) {
                TransitionKind::RangeToRange
            } else {
                TransitionKind::CrossFade
            }
        }
        _ => TransitionKind::RangeToRange,
    };
    Some(kind)
}

fn appear(frame: &mut SelectionFrame, state: &VisualState, fraction: f32) {
    if matches!(state.state(), SelectionState::Week(_)) {
        frame.fill_from_center(state, fraction);
    } else {
        frame.fill_state(state, fraction);
    }
}

/// The outline lying `fraction` of the way from range `a` to range `b`, with
/// each end travelling along the grid in reading order
fn range_to_range<M: CellMeasureManager + ?Sized>(
    a: CellRange,
    b: CellRange,
    fraction: f32,
    measure: &M,
) -> SelectionShape {
    let start_distance = lerp(
        measure.cell_distance(a.start()),
        measure.cell_distance(b.start()),
        fraction,
    );
    let end_distance = lerp(
        measure.cell_distance(a.end()),
        measure.cell_distance(b.end()),
        fraction,
    );
    let (start_cell, start_point) = measure.cell_and_point_at_distance(start_distance);
    let (end_cell, end_point) = measure.cell_and_point_at_distance(end_distance);
    let row_right = measure.row_right();
    let outline = RangeOutline {
        range: CellRange::normalized(start_cell, end_cell),
        row_left: measure.row_left(),
        row_right,
        start_left: start_point.x,
        start_top: start_point.y,
        end_right: (end_point.x + measure.cell_width()).min(row_right),
        end_top: end_point.y,
        cell_height: measure.cell_height(),
        radius: measure.round_radius(),
    };
    outline.shape()
}

fn cell_to_month<M: CellMeasureManager + ?Sized>(
    frame: &mut SelectionFrame,
    cell: &VisualState,
    month: &VisualState,
    fraction: f32,
    measure: &M,
) {
    let (Some(cell_rect), Some(outline)) = (cell.row_rect(), month.outline()) else {
        return;
    };
    let center = cell_rect.center();
    let start_radius = cell_rect.width().min(cell_rect.height()) * 0.5;
    let end_radius = month_cover_radius(outline, center, measure);
    frame.fill_clipped_circle(
        center,
        lerp(start_radius, end_radius, fraction),
        outline.shape(),
    );
}

/// Radius of the smallest circle around `center` that covers the whole
/// month outline
fn month_cover_radius<M: CellMeasureManager + ?Sized>(
    outline: &RangeOutline,
    center: PointF,
    measure: &M,
) -> f32 {
    let grid_top = measure.cell_top(Cell::FIRST);
    let grid_bottom = measure.cell_bottom(Cell::LAST);
    let to_start = center.distance_squared(PointF::new(outline.start_left, outline.start_top));
    let to_end = center.distance_squared(PointF::new(
        outline.end_right,
        outline.end_top + outline.cell_height,
    ));
    [
        center.x - outline.row_left,
        outline.row_right - center.x,
        center.y - grid_top,
        grid_bottom - center.y,
        to_start.max(to_end).sqrt(),
    ]
    .into_iter()
    .fold(f32::NAN, f32::max)
}
