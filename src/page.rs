use crate::animation::{AnimationKind, Animator, Interpolator};
use crate::cell::{Cell, CellError, CellRange};
use crate::date::PackedDate;
use crate::grid::YearMonthGridInfo;
use crate::measure::CellMeasureManager;
use crate::selection::{
    AcceptanceStatus, Canvas, CellGate, CellSelectionEvent, ClickOnCellBehavior,
    DefaultSelectionRenderer, RejectedBehavior, RequestContext, SelectionBounds, SelectionGesture,
    SelectionManager, SelectionRenderer, SelectionShape, SelectionState,
};
use log::{debug, trace};
use std::rc::Rc;
use std::time::Duration;

/// How a request to a page should be carried out
#[derive(Clone, Copy)]
pub struct Request<'a> {
    pub gate: &'a dyn CellGate,
    pub on_reject: RejectedBehavior,
    pub animate: bool,
}

impl std::fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("on_reject", &self.on_reject)
            .field("animate", &self.animate)
            .finish_non_exhaustive()
    }
}

/// Timing of a page's animations
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageTiming {
    pub selection: Duration,
    pub hover: Duration,
    pub interpolator: Interpolator,
}

/// One month of the calendar: its grid, its selection and everything needed
/// to draw the selection at any point of an animation
#[derive(Debug)]
pub struct CalendarPage {
    grid: YearMonthGridInfo,
    bounds: SelectionBounds,
    selection: SelectionManager,
    renderer: Box<dyn SelectionRenderer>,
    measure: Rc<dyn CellMeasureManager>,
    animator: Animator,
    timing: PageTiming,
    hover: Option<Cell>,
    /// The cell whose hover highlight is fading out
    fading_hover: Option<Cell>,
}

impl CalendarPage {
    pub fn new(
        grid: YearMonthGridInfo,
        (min_date, max_date): (PackedDate, PackedDate),
        show_adjacent_months: bool,
        click_on_cell: ClickOnCellBehavior,
        measure: Rc<dyn CellMeasureManager>,
        timing: PageTiming,
    ) -> CalendarPage {
        CalendarPage {
            grid,
            bounds: SelectionBounds {
                enabled: grid.enabled_range(min_date, max_date),
                in_month: grid.in_month_range(),
                show_adjacent_months,
            },
            selection: SelectionManager::new(click_on_cell),
            renderer: Box::new(DefaultSelectionRenderer::new()),
            measure,
            animator: Animator::new(timing.interpolator),
            timing,
            hover: None,
            fading_hover: None,
        }
    }

    /// Replaces the renderer; the current selection is handed to the new one
    /// without animation
    pub fn set_renderer(&mut self, mut renderer: Box<dyn SelectionRenderer>) {
        self.end_selection_animation();
        renderer.set_state(self.selection.current(), &*self.measure);
        renderer.finish_transition();
        self.renderer = renderer;
    }

    pub fn grid(&self) -> &YearMonthGridInfo {
        &self.grid
    }

    pub fn bounds(&self) -> SelectionBounds {
        self.bounds
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.current()
    }

    pub fn renderer(&self) -> &dyn SelectionRenderer {
        &*self.renderer
    }

    pub fn measure(&self) -> &dyn CellMeasureManager {
        &*self.measure
    }

    pub fn hover(&self) -> Option<Cell> {
        self.hover
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    pub fn is_cell_enabled(&self, cell: Cell) -> bool {
        self.bounds.allows_cell(cell)
    }

    pub fn select_cell(
        &mut self,
        cell: Cell,
        gesture: SelectionGesture,
        req: &Request<'_>,
    ) -> AcceptanceStatus {
        let status = self.selection.select_cell(cell, gesture, &self.context(req));
        self.sync(req.animate);
        status
    }

    pub fn select_week(
        &mut self,
        index: u8,
        req: &Request<'_>,
    ) -> Result<AcceptanceStatus, CellError> {
        let status = self.selection.select_week(index, &self.context(req))?;
        self.sync(req.animate);
        Ok(status)
    }

    pub fn select_month(&mut self, req: &Request<'_>) -> AcceptanceStatus {
        let status = self.selection.select_month(&self.context(req));
        self.sync(req.animate);
        status
    }

    pub fn select_custom(
        &mut self,
        range: CellRange,
        gesture: SelectionGesture,
        req: &Request<'_>,
    ) -> AcceptanceStatus {
        let status = self
            .selection
            .select_custom(range, gesture, &self.context(req));
        self.sync(req.animate);
        status
    }

    pub fn clear_selection(&mut self, animate: bool) -> bool {
        let cleared = self.selection.clear();
        self.sync(animate);
        cleared
    }

    /// Applies new minimum and maximum dates, dropping or shrinking the
    /// selection if it no longer fits
    pub fn set_enabled_dates(
        &mut self,
        (min_date, max_date): (PackedDate, PackedDate),
        gate: &dyn CellGate,
    ) -> AcceptanceStatus {
        self.bounds.enabled = self.grid.enabled_range(min_date, max_date);
        self.revalidate(gate)
    }

    pub fn set_show_adjacent_months(&mut self, show: bool, gate: &dyn CellGate) -> AcceptanceStatus {
        self.bounds.show_adjacent_months = show;
        self.revalidate(gate)
    }

    pub fn set_click_on_cell(&mut self, behavior: ClickOnCellBehavior) {
        self.selection.set_click_on_cell(behavior);
    }

    pub fn set_timing(&mut self, timing: PageTiming) {
        self.timing = timing;
        self.animator.set_interpolator(timing.interpolator);
    }

    /// Requests the current selection again, e.g. after the gate changed its
    /// mind
    pub fn revalidate(&mut self, gate: &dyn CellGate) -> AcceptanceStatus {
        let req = Request {
            gate,
            on_reject: RejectedBehavior::ClearCurrent,
            animate: false,
        };
        let status = self.selection.revalidate(&self.context(&req));
        self.sync(false);
        status
    }

    /// Switches to new cell geometry; a selection slides to where the new
    /// geometry puts it
    pub fn set_measure(&mut self, measure: Rc<dyn CellMeasureManager>, animate: bool) {
        self.measure = measure;
        self.renderer.update_configuration(&*self.measure);
        self.start_selection_transition(animate);
    }

    /// Highlights `cell` as being under the pointer.  Returns `false` if the
    /// cell cannot be hovered.
    pub fn set_hover(&mut self, cell: Cell) -> bool {
        if self.hover == Some(cell)
            || self.selection.current() == SelectionState::Cell(cell)
            || !self.bounds.allows_cell(cell)
        {
            return false;
        }
        trace!("Hovering {cell}");
        self.hover = Some(cell);
        self.fading_hover = None;
        let interrupted = self
            .animator
            .start(AnimationKind::Hover, false, self.timing.hover);
        self.complete(interrupted);
        true
    }

    pub fn clear_hover(&mut self, animate: bool) {
        let Some(cell) = self.hover.take() else {
            return;
        };
        if animate {
            self.fading_hover = Some(cell);
            let interrupted = self
                .animator
                .start(AnimationKind::Hover, true, self.timing.hover);
            self.complete(interrupted);
        } else if self.animator.running_kind() == Some(AnimationKind::Hover) {
            self.animator.end();
        }
    }

    /// The hovered cell and the opacity of its highlight
    pub fn hover_highlight(&self) -> Option<(Cell, f32)> {
        let cell = self.hover.or(self.fading_hover)?;
        let alpha = self.animator.value(AnimationKind::Hover).unwrap_or(1.0);
        Some((cell, alpha))
    }

    /// Advances animations by `dt`.  Returns `true` while anything is still
    /// animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if let Some(kind) = self.animator.tick(dt) {
            self.complete(Some(kind));
        }
        self.animator.is_running()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        match self.animator.value(AnimationKind::Selection) {
            Some(fraction) => self
                .renderer
                .draw_transition(canvas, fraction, &*self.measure),
            None => self.renderer.draw(canvas, 1.0),
        }
        if let Some((cell, alpha)) = self.hover_highlight() {
            let shape = SelectionShape::round_rect(
                self.measure.cell_bounds(cell),
                self.measure.round_radius(),
            );
            canvas.fill_hover(&shape, alpha);
        }
    }

    pub fn drain_events(&mut self) -> Vec<CellSelectionEvent> {
        self.selection.drain_events()
    }

    fn context<'a>(&self, req: &Request<'a>) -> RequestContext<'a> {
        RequestContext {
            bounds: self.bounds,
            gate: req.gate,
            on_reject: req.on_reject,
        }
    }

    /// Hands a changed selection to the renderer and starts animating it
    fn sync(&mut self, animate: bool) {
        let Some((previous, current)) = self.selection.take_transition() else {
            return;
        };
        debug!(
            "Page {}: {previous} -> {current}",
            self.grid.year_month()
        );
        if !current.is_none() {
            // The hover highlight gives way to the new selection
            self.hover = None;
            self.fading_hover = None;
        }
        self.renderer.set_state(current, &*self.measure);
        self.start_selection_transition(animate);
    }

    fn start_selection_transition(&mut self, animate: bool) {
        if animate && self.renderer.has_transition() && self.renderer.create_transition() {
            let interrupted =
                self.animator
                    .start(AnimationKind::Selection, false, self.timing.selection);
            if interrupted == Some(AnimationKind::Hover) {
                self.fading_hover = None;
            }
        } else {
            self.end_selection_animation();
            self.renderer.finish_transition();
        }
    }

    fn end_selection_animation(&mut self) {
        if self.animator.running_kind() == Some(AnimationKind::Selection) {
            self.animator.end();
        }
    }

    /// Applies the final state of an animation that has ended
    fn complete(&mut self, kind: Option<AnimationKind>) {
        match kind {
            Some(AnimationKind::Selection) => self.renderer.finish_transition(),
            Some(AnimationKind::Hover) => self.fading_hover = None,
            None => (),
        }
    }
}
