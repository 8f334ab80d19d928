use super::shape::SelectionShape;
use super::transition::{DrawOp, SelectionFrame, Transition};
use super::visual::VisualState;
use super::SelectionState;
use crate::measure::{CellMeasureManager, PointF};
use std::fmt;

/// A drawing surface for selections
pub trait Canvas {
    /// Fills `shape` with the selection color at `alpha`, from 0 (invisible)
    /// to 1
    fn fill_shape(&mut self, shape: &SelectionShape, alpha: f32);

    /// Fills the part of the circle that lies within `clip`
    fn fill_clipped_circle(&mut self, center: PointF, radius: f32, clip: &SelectionShape);

    /// Fills the highlight of the cell under the pointer.  Canvases that
    /// show no hover highlight can leave this alone.
    fn fill_hover(&mut self, _shape: &SelectionShape, _alpha: f32) {}
}

impl SelectionFrame {
    pub fn draw_on(&self, canvas: &mut dyn Canvas) {
        for op in &self.ops {
            match op {
                DrawOp::Shape { shape, alpha } => canvas.fill_shape(shape, *alpha),
                DrawOp::ClippedCircle {
                    center,
                    radius,
                    clip,
                } => canvas.fill_clipped_circle(*center, *radius, clip),
            }
        }
    }
}

/// Draws a page's selection and the transitions between selections.  A page
/// calls `set_state` whenever its selection changes, then either
/// `create_transition` followed by `draw_transition` on every frame, or just
/// `draw`.
pub trait SelectionRenderer: fmt::Debug {
    fn previous_state(&self) -> SelectionState;

    fn current_state(&self) -> SelectionState;

    fn set_state(&mut self, state: SelectionState, measure: &dyn CellMeasureManager);

    /// Called when the cell geometry changes; the current state is measured
    /// again and the old geometry becomes the previous state
    fn update_configuration(&mut self, measure: &dyn CellMeasureManager);

    /// Whether there is anything to animate between the previous and the
    /// current state
    fn has_transition(&self) -> bool;

    /// Prepares the transition from the previous to the current state.
    /// Returns `false` if there is none.
    fn create_transition(&mut self) -> bool;

    /// Drops a finished transition
    fn finish_transition(&mut self);

    fn draw(&self, canvas: &mut dyn Canvas, alpha: f32);

    fn draw_transition(
        &self,
        canvas: &mut dyn Canvas,
        fraction: f32,
        measure: &dyn CellMeasureManager,
    );
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefaultSelectionRenderer {
    previous: VisualState,
    current: VisualState,
    transition: Option<Transition>,
}

impl DefaultSelectionRenderer {
    pub fn new() -> DefaultSelectionRenderer {
        DefaultSelectionRenderer::default()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn replace(&mut self, state: VisualState) {
        self.previous = std::mem::replace(&mut self.current, state);
    }
}

impl SelectionRenderer for DefaultSelectionRenderer {
    fn previous_state(&self) -> SelectionState {
        self.previous.state()
    }

    fn current_state(&self) -> SelectionState {
        self.current.state()
    }

    fn set_state(&mut self, state: SelectionState, measure: &dyn CellMeasureManager) {
        self.replace(VisualState::new(state, measure));
    }

    fn update_configuration(&mut self, measure: &dyn CellMeasureManager) {
        self.replace(VisualState::new(self.current.state(), measure));
    }

    fn has_transition(&self) -> bool {
        !(self.previous.is_none() && self.current.is_none())
    }

    fn create_transition(&mut self) -> bool {
        self.transition = Transition::new(self.previous, self.current);
        self.transition.is_some()
    }

    fn finish_transition(&mut self) {
        self.transition = None;
        self.previous = self.current;
    }

    fn draw(&self, canvas: &mut dyn Canvas, alpha: f32) {
        if alpha > 0.0 {
            if let Some(shape) = self.current.shape() {
                canvas.fill_shape(&shape, alpha.min(1.0));
            }
        }
    }

    fn draw_transition(
        &self,
        canvas: &mut dyn Canvas,
        fraction: f32,
        measure: &dyn CellMeasureManager,
    ) {
        match &self.transition {
            Some(t) => t.frame(fraction, measure).draw_on(canvas),
            None => self.draw(canvas, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellRange};
    use crate::measure::{RectF, UniformCellMeasure};
    use crate::selection::TransitionKind;

    /// Records what was drawn
    #[derive(Debug, Default)]
    struct Recorder {
        shapes: Vec<(RectF, f32)>,
        circles: Vec<(PointF, f32)>,
    }

    impl Canvas for Recorder {
        fn fill_shape(&mut self, shape: &SelectionShape, alpha: f32) {
            self.shapes.push((shape.bounds(), alpha));
        }

        fn fill_clipped_circle(&mut self, center: PointF, radius: f32, _clip: &SelectionShape) {
            self.circles.push((center, radius));
        }
    }

    #[test]
    fn test_state_tracking() {
        let m = UniformCellMeasure::new(10.0, 10.0);
        let mut r = DefaultSelectionRenderer::new();
        assert!(!r.has_transition());
        assert!(!r.create_transition());
        r.set_state(SelectionState::Cell(Cell::new(5).unwrap()), &m);
        assert!(r.has_transition());
        r.set_state(SelectionState::Week(CellRange::week(0).unwrap()), &m);
        assert_eq!(r.previous_state(), SelectionState::Cell(Cell::new(5).unwrap()));
        assert!(r.create_transition());
        assert_eq!(
            r.transition().map(Transition::kind),
            Some(TransitionKind::CellToWeek)
        );
        r.finish_transition();
        assert_eq!(r.previous_state(), r.current_state());
        assert!(r.transition().is_none());
    }

    #[test]
    fn test_draw() {
        let m = UniformCellMeasure::new(10.0, 10.0);
        let mut r = DefaultSelectionRenderer::new();
        r.set_state(SelectionState::Cell(Cell::new(9).unwrap()), &m);
        let mut canvas = Recorder::default();
        r.draw(&mut canvas, 1.0);
        r.draw(&mut canvas, 0.0);
        assert_eq!(canvas.shapes, [(RectF::new(20.0, 10.0, 30.0, 20.0), 1.0)]);
        assert!(canvas.circles.is_empty());
    }

    #[test]
    fn test_draw_transition_halfway() {
        let m = UniformCellMeasure::new(10.0, 10.0);
        let mut r = DefaultSelectionRenderer::new();
        r.set_state(SelectionState::Cell(Cell::new(9).unwrap()), &m);
        assert!(r.create_transition());
        let mut canvas = Recorder::default();
        r.draw_transition(&mut canvas, 0.5, &m);
        assert_eq!(canvas.shapes, [(RectF::new(20.0, 10.0, 30.0, 20.0), 0.5)]);
    }

    #[test]
    fn test_configuration_change_moves_cell() {
        let mut r = DefaultSelectionRenderer::new();
        r.set_state(
            SelectionState::Cell(Cell::new(9).unwrap()),
            &UniformCellMeasure::new(10.0, 10.0),
        );
        r.finish_transition();
        let wider = UniformCellMeasure::new(20.0, 10.0);
        r.update_configuration(&wider);
        assert!(r.create_transition());
        assert_eq!(r.transition().map(Transition::kind), Some(TransitionKind::Move));
        let mut canvas = Recorder::default();
        r.draw_transition(&mut canvas, 1.0, &wider);
        assert_eq!(canvas.shapes, [(RectF::new(40.0, 10.0, 60.0, 20.0), 1.0)]);
    }
}
