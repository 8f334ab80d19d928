use super::shape::{RangeOutline, SelectionShape};
use super::SelectionState;
use crate::measure::{CellMeasureManager, RectF};

/// A selection state together with the geometry it had when it was set, so
/// that a transition keeps drawing the old state where it was even if the
/// layout changes meanwhile
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisualState {
    state: SelectionState,
    outline: Option<RangeOutline>,
}

impl VisualState {
    pub fn none() -> VisualState {
        VisualState::default()
    }

    pub fn new<M: CellMeasureManager + ?Sized>(state: SelectionState, measure: &M) -> VisualState {
        VisualState {
            state,
            outline: state.range().map(|range| RangeOutline::new(range, measure)),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn outline(&self) -> Option<&RangeOutline> {
        self.outline.as_ref()
    }

    pub fn is_none(&self) -> bool {
        self.state.is_none()
    }

    /// Bounds of the selected cell, or of the first row of the selection
    pub fn row_rect(&self) -> Option<RectF> {
        self.outline.map(|o| o.start_row_rect())
    }

    pub fn shape(&self) -> Option<SelectionShape> {
        self.outline.map(|o| o.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellRange};
    use crate::measure::UniformCellMeasure;

    #[test]
    fn test_visual_state_geometry() {
        let m = UniformCellMeasure::new(10.0, 10.0);
        let none = VisualState::new(SelectionState::None, &m);
        assert!(none.is_none());
        assert_eq!(none.shape(), None);
        let cell = VisualState::new(SelectionState::Cell(Cell::new(9).unwrap()), &m);
        assert_eq!(cell.row_rect(), Some(RectF::new(20.0, 10.0, 30.0, 20.0)));
        let week = VisualState::new(SelectionState::Week(CellRange::week(1).unwrap()), &m);
        assert_eq!(week.row_rect(), Some(RectF::new(0.0, 10.0, 70.0, 20.0)));
        assert_eq!(week.shape().map(|s| s.pieces().len()), Some(1));
    }
}
