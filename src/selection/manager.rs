use super::{
    AcceptanceStatus, CellGate, ClickOnCellBehavior, RejectedBehavior, SelectionGesture,
    SelectionState, SelectionType,
};
use crate::cell::{Cell, CellError, CellRange};
use log::debug;
use std::fmt;

/// The cells a page currently lets the user select
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SelectionBounds {
    /// Cells whose dates are within the configured minimum and maximum, or
    /// `None` if the whole page is out of range
    pub enabled: Option<CellRange>,
    pub in_month: CellRange,
    pub show_adjacent_months: bool,
}

impl SelectionBounds {
    pub fn unrestricted() -> SelectionBounds {
        SelectionBounds {
            enabled: Some(CellRange::ALL),
            in_month: CellRange::ALL,
            show_adjacent_months: true,
        }
    }

    /// The part of `range` that may be selected
    pub fn narrow(&self, range: CellRange) -> Option<CellRange> {
        let range = range.intersection_with(self.enabled?)?;
        if self.show_adjacent_months {
            Some(range)
        } else {
            range.intersection_with(self.in_month)
        }
    }

    pub fn allows_cell(&self, cell: Cell) -> bool {
        self.narrow(CellRange::single(cell)).is_some()
    }
}

/// Everything a selection request is checked against besides the current
/// selection
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub bounds: SelectionBounds,
    pub gate: &'a dyn CellGate,
    pub on_reject: RejectedBehavior,
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("bounds", &self.bounds)
            .field("on_reject", &self.on_reject)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellSelectionEvent {
    Selected(SelectionState),
    Cleared,
    /// A drag selection has begun; hosts typically answer with a short
    /// haptic pulse
    DragStarted,
}

/// Holds a page's current selection and decides what each request does to
/// it
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionManager {
    current: SelectionState,
    previous: SelectionState,
    click_on_cell: ClickOnCellBehavior,
    transition_pending: bool,
    events: Vec<CellSelectionEvent>,
}

impl SelectionManager {
    pub fn new(click_on_cell: ClickOnCellBehavior) -> SelectionManager {
        SelectionManager {
            click_on_cell,
            ..SelectionManager::default()
        }
    }

    pub fn current(&self) -> SelectionState {
        self.current
    }

    /// The state the current one replaced; only meaningful while the
    /// transition between them has not been taken
    pub fn previous(&self) -> SelectionState {
        self.previous
    }

    pub fn click_on_cell(&self) -> ClickOnCellBehavior {
        self.click_on_cell
    }

    pub fn set_click_on_cell(&mut self, behavior: ClickOnCellBehavior) {
        self.click_on_cell = behavior;
    }

    pub fn select_cell(
        &mut self,
        cell: Cell,
        gesture: SelectionGesture,
        cx: &RequestContext<'_>,
    ) -> AcceptanceStatus {
        if !cx.bounds.allows_cell(cell) {
            debug!("Cell {cell} is not selectable");
            return self.reject(cx.on_reject);
        }
        if self.current.range() == Some(CellRange::single(cell)) {
            // Clicking the selected cell again is decided without consulting
            // the gate
            if gesture == SelectionGesture::Click
                && self.click_on_cell == ClickOnCellBehavior::Clear
            {
                self.clear();
                return AcceptanceStatus::Rejected;
            }
            return AcceptanceStatus::AcceptedSameRange;
        }
        if !cx.gate.allows(SelectionType::Cell, CellRange::single(cell)) {
            debug!("Gate refused cell {cell}");
            return self.reject(cx.on_reject);
        }
        self.accept(SelectionState::Cell(cell))
    }

    pub fn select_week(
        &mut self,
        index: u8,
        cx: &RequestContext<'_>,
    ) -> Result<AcceptanceStatus, CellError> {
        Ok(self.select_row(CellRange::week(index)?, cx))
    }

    fn select_row(&mut self, week: CellRange, cx: &RequestContext<'_>) -> AcceptanceStatus {
        let Some(range) = cx.bounds.narrow(week) else {
            debug!("Week {week} has no selectable cells");
            return self.reject(cx.on_reject);
        };
        if range.is_single_cell() {
            return self.select_cell(range.start(), SelectionGesture::Other, cx);
        }
        if !cx.gate.allows(SelectionType::Week, range) {
            debug!("Gate refused week {range}");
            return self.reject(cx.on_reject);
        }
        self.accept(SelectionState::Week(range))
    }

    pub fn select_month(&mut self, cx: &RequestContext<'_>) -> AcceptanceStatus {
        let Some(range) = cx.bounds.narrow(cx.bounds.in_month) else {
            debug!("Month has no selectable cells");
            return self.reject(cx.on_reject);
        };
        if !cx.gate.allows(SelectionType::Month, range) {
            debug!("Gate refused month {range}");
            return self.reject(cx.on_reject);
        }
        self.accept(SelectionState::Month(range))
    }

    /// Selects an arbitrary range.  `SelectionGesture::LongPress` marks the
    /// request that starts a drag and queues a
    /// [`CellSelectionEvent::DragStarted`] unless the request is rejected.
    pub fn select_custom(
        &mut self,
        range: CellRange,
        gesture: SelectionGesture,
        cx: &RequestContext<'_>,
    ) -> AcceptanceStatus {
        let Some(narrowed) = cx.bounds.narrow(range) else {
            debug!("Range {range} has no selectable cells");
            return self.reject(cx.on_reject);
        };
        if !cx.gate.allows(SelectionType::Custom, narrowed) {
            debug!("Gate refused range {narrowed}");
            return self.reject(cx.on_reject);
        }
        if gesture == SelectionGesture::LongPress {
            self.events.push(CellSelectionEvent::DragStarted);
        }
        self.accept(SelectionState::Custom(narrowed))
    }

    /// Removes the selection.  Returns `false` if nothing was selected.
    pub fn clear(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        debug!("Clearing {}", self.current);
        self.replace(SelectionState::None);
        self.events.push(CellSelectionEvent::Cleared);
        true
    }

    /// Requests the current selection again under new bounds, clearing it if
    /// it no longer fits
    pub fn revalidate(&mut self, cx: &RequestContext<'_>) -> AcceptanceStatus {
        let cx = RequestContext {
            on_reject: RejectedBehavior::ClearCurrent,
            ..*cx
        };
        match self.current {
            SelectionState::None => AcceptanceStatus::AcceptedSameRange,
            SelectionState::Cell(cell) => self.select_cell(cell, SelectionGesture::Other, &cx),
            SelectionState::Week(range) => {
                self.select_row(CellRange::row_of(range.start()), &cx)
            }
            SelectionState::Month(_) => self.select_month(&cx),
            SelectionState::Custom(range) => {
                self.select_custom(range, SelectionGesture::Other, &cx)
            }
        }
    }

    /// Returns the states to animate between if the selection changed since
    /// the last call
    pub fn take_transition(&mut self) -> Option<(SelectionState, SelectionState)> {
        std::mem::take(&mut self.transition_pending).then_some((self.previous, self.current))
    }

    pub fn drain_events(&mut self) -> Vec<CellSelectionEvent> {
        std::mem::take(&mut self.events)
    }

    /// A request covering the cells already selected keeps the current
    /// selection, whatever kind it was made as
    fn accept(&mut self, state: SelectionState) -> AcceptanceStatus {
        if state.range() == self.current.range() {
            return AcceptanceStatus::AcceptedSameRange;
        }
        debug!("Selected {state}");
        self.replace(state);
        self.events.push(CellSelectionEvent::Selected(state));
        AcceptanceStatus::Accepted
    }

    fn reject(&mut self, behavior: RejectedBehavior) -> AcceptanceStatus {
        if behavior == RejectedBehavior::ClearCurrent {
            self.clear();
        }
        AcceptanceStatus::Rejected
    }

    fn replace(&mut self, state: SelectionState) {
        self.previous = std::mem::replace(&mut self.current, state);
        self.transition_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::AllowAllCells;

    fn cell(i: u8) -> Cell {
        Cell::new(i).unwrap()
    }

    fn range(start: u8, end: u8) -> CellRange {
        CellRange::from_indices(start, end).unwrap()
    }

    /// February 2024 with Monday-first weeks: days of the month are cells
    /// 3 through 31
    fn bounds(enabled: Option<CellRange>) -> SelectionBounds {
        SelectionBounds {
            enabled,
            in_month: range(3, 31),
            show_adjacent_months: true,
        }
    }

    fn cx(bounds: SelectionBounds, on_reject: RejectedBehavior) -> RequestContext<'static> {
        RequestContext {
            bounds,
            gate: &AllowAllCells,
            on_reject,
        }
    }

    #[test]
    fn test_select_cell() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        assert_eq!(
            mgr.select_cell(cell(5), SelectionGesture::Click, &cx),
            AcceptanceStatus::Accepted
        );
        assert_eq!(mgr.current(), SelectionState::Cell(cell(5)));
        assert_eq!(
            mgr.take_transition(),
            Some((SelectionState::None, SelectionState::Cell(cell(5))))
        );
        assert_eq!(mgr.take_transition(), None);
        assert_eq!(
            mgr.drain_events(),
            [CellSelectionEvent::Selected(SelectionState::Cell(cell(5)))]
        );
    }

    #[test]
    fn test_cell_outside_enabled_range_preserve() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(10, 20))), RejectedBehavior::PreserveCurrent);
        mgr.select_cell(cell(12), SelectionGesture::Click, &cx);
        mgr.take_transition();
        for outside in [0, 9, 21, 41] {
            assert_eq!(
                mgr.select_cell(cell(outside), SelectionGesture::Click, &cx),
                AcceptanceStatus::Rejected
            );
            assert_eq!(mgr.current(), SelectionState::Cell(cell(12)));
        }
        assert_eq!(mgr.take_transition(), None);
    }

    #[test]
    fn test_cell_outside_enabled_range_clear() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(10, 20))), RejectedBehavior::ClearCurrent);
        mgr.select_cell(cell(12), SelectionGesture::Click, &cx);
        assert_eq!(
            mgr.select_cell(cell(25), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.current(), SelectionState::None);
        assert_eq!(
            mgr.drain_events(),
            [
                CellSelectionEvent::Selected(SelectionState::Cell(cell(12))),
                CellSelectionEvent::Cleared
            ]
        );
        // Rejecting with nothing selected stays at none
        assert_eq!(
            mgr.select_cell(cell(30), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.current(), SelectionState::None);
    }

    #[test]
    fn test_whole_page_disabled() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(None), RejectedBehavior::PreserveCurrent);
        assert_eq!(
            mgr.select_cell(cell(12), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.select_month(&cx), AcceptanceStatus::Rejected);
    }

    #[test]
    fn test_click_again_clears() {
        let mut mgr = SelectionManager::new(ClickOnCellBehavior::Clear);
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_cell(cell(8), SelectionGesture::Click, &cx);
        mgr.take_transition();
        assert_eq!(
            mgr.select_cell(cell(8), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.current(), SelectionState::None);
        assert_eq!(
            mgr.take_transition(),
            Some((SelectionState::Cell(cell(8)), SelectionState::None))
        );
    }

    #[test]
    fn test_click_again_in_code_does_not_clear() {
        let mut mgr = SelectionManager::new(ClickOnCellBehavior::Clear);
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_cell(cell(8), SelectionGesture::Click, &cx);
        assert_eq!(
            mgr.select_cell(cell(8), SelectionGesture::Other, &cx),
            AcceptanceStatus::AcceptedSameRange
        );
        assert_eq!(mgr.current(), SelectionState::Cell(cell(8)));
    }

    #[test]
    fn test_click_again_ignored() {
        let mut mgr = SelectionManager::new(ClickOnCellBehavior::Ignore);
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_cell(cell(8), SelectionGesture::Click, &cx);
        mgr.take_transition();
        mgr.drain_events();
        assert_eq!(
            mgr.select_cell(cell(8), SelectionGesture::Click, &cx),
            AcceptanceStatus::AcceptedSameRange
        );
        assert_eq!(mgr.current(), SelectionState::Cell(cell(8)));
        assert_eq!(mgr.take_transition(), None);
        assert!(mgr.drain_events().is_empty());
    }

    #[test]
    fn test_selected_cell_skips_gate() {
        let mut mgr = SelectionManager::new(ClickOnCellBehavior::Ignore);
        let open = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::ClearCurrent);
        mgr.select_cell(cell(8), SelectionGesture::Click, &open);
        let refuse_all = |_: SelectionType, _: CellRange| false;
        let closed = RequestContext {
            gate: &refuse_all,
            ..open
        };
        assert_eq!(
            mgr.select_cell(cell(8), SelectionGesture::Click, &closed),
            AcceptanceStatus::AcceptedSameRange
        );
        assert_eq!(
            mgr.select_cell(cell(9), SelectionGesture::Click, &closed),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.current(), SelectionState::None);
    }

    #[test]
    fn test_hidden_adjacent_months() {
        let mut mgr = SelectionManager::default();
        let mut b = bounds(Some(CellRange::ALL));
        b.show_adjacent_months = false;
        let cx = cx(b, RejectedBehavior::PreserveCurrent);
        assert_eq!(
            mgr.select_cell(cell(1), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.select_week(0, &cx), Ok(AcceptanceStatus::Accepted));
        assert_eq!(mgr.current(), SelectionState::Week(range(3, 6)));
    }

    #[test]
    fn test_select_week() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        assert_eq!(mgr.select_week(0, &cx), Ok(AcceptanceStatus::Accepted));
        assert_eq!(mgr.current(), SelectionState::Week(range(0, 6)));
        assert_eq!(mgr.select_week(0, &cx), Ok(AcceptanceStatus::AcceptedSameRange));
        assert_eq!(mgr.select_week(6, &cx), Err(CellError::Week(6)));
    }

    #[test]
    fn test_week_collapsing_to_one_cell() {
        // Only the last day of the second row is enabled
        let cx = cx(bounds(Some(range(13, 30))), RejectedBehavior::PreserveCurrent);
        let mut by_week = SelectionManager::default();
        let mut by_cell = SelectionManager::default();
        assert_eq!(by_week.select_week(1, &cx), Ok(AcceptanceStatus::Accepted));
        assert_eq!(
            by_cell.select_cell(cell(13), SelectionGesture::Other, &cx),
            AcceptanceStatus::Accepted
        );
        assert_eq!(by_week.current(), by_cell.current());
        assert_eq!(by_week.current(), SelectionState::Cell(cell(13)));
    }

    #[test]
    fn test_week_outside_enabled_range() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(13, 30))), RejectedBehavior::ClearCurrent);
        mgr.select_cell(cell(20), SelectionGesture::Click, &cx);
        assert_eq!(mgr.select_week(5, &cx), Ok(AcceptanceStatus::Rejected));
        assert_eq!(mgr.current(), SelectionState::None);
    }

    #[test]
    fn test_same_cells_as_another_kind() {
        let mut mgr = SelectionManager::new(ClickOnCellBehavior::Clear);
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_custom(range(14, 20), SelectionGesture::Other, &cx);
        mgr.take_transition();
        mgr.drain_events();
        assert_eq!(mgr.select_week(2, &cx), Ok(AcceptanceStatus::AcceptedSameRange));
        assert_eq!(mgr.current(), SelectionState::Custom(range(14, 20)));
        assert_eq!(mgr.take_transition(), None);
        assert!(mgr.drain_events().is_empty());
        // A one-cell range counts as the selected cell when clicked again
        mgr.select_custom(range(9, 9), SelectionGesture::Other, &cx);
        assert_eq!(
            mgr.select_cell(cell(9), SelectionGesture::Other, &cx),
            AcceptanceStatus::AcceptedSameRange
        );
        assert_eq!(
            mgr.select_cell(cell(9), SelectionGesture::Click, &cx),
            AcceptanceStatus::Rejected
        );
        assert_eq!(mgr.current(), SelectionState::None);
    }

    #[test]
    fn test_select_month() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(10, 41))), RejectedBehavior::PreserveCurrent);
        assert_eq!(mgr.select_month(&cx), AcceptanceStatus::Accepted);
        assert_eq!(mgr.current(), SelectionState::Month(range(10, 31)));
        assert_eq!(mgr.select_month(&cx), AcceptanceStatus::AcceptedSameRange);
    }

    #[test]
    fn test_gate_rejects_week() {
        let mut mgr = SelectionManager::default();
        let no_weeks = |kind: SelectionType, _: CellRange| kind != SelectionType::Week;
        let cx = RequestContext {
            bounds: bounds(Some(CellRange::ALL)),
            gate: &no_weeks,
            on_reject: RejectedBehavior::PreserveCurrent,
        };
        mgr.select_cell(cell(4), SelectionGesture::Click, &cx);
        assert_eq!(mgr.select_week(2, &cx), Ok(AcceptanceStatus::Rejected));
        assert_eq!(mgr.current(), SelectionState::Cell(cell(4)));
    }

    #[test]
    fn test_custom_drag_start() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(0, 30))), RejectedBehavior::PreserveCurrent);
        assert_eq!(
            mgr.select_custom(range(10, 10), SelectionGesture::LongPress, &cx),
            AcceptanceStatus::Accepted
        );
        assert_eq!(
            mgr.select_custom(range(10, 35), SelectionGesture::Other, &cx),
            AcceptanceStatus::Accepted
        );
        assert_eq!(mgr.current(), SelectionState::Custom(range(10, 30)));
        assert_eq!(
            mgr.drain_events(),
            [
                CellSelectionEvent::DragStarted,
                CellSelectionEvent::Selected(SelectionState::Custom(range(10, 10))),
                CellSelectionEvent::Selected(SelectionState::Custom(range(10, 30))),
            ]
        );
    }

    #[test]
    fn test_rejected_drag_start_has_no_pulse() {
        let mut mgr = SelectionManager::default();
        let cx = cx(bounds(Some(range(0, 5))), RejectedBehavior::PreserveCurrent);
        assert_eq!(
            mgr.select_custom(range(10, 12), SelectionGesture::LongPress, &cx),
            AcceptanceStatus::Rejected
        );
        assert!(mgr.drain_events().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut mgr = SelectionManager::default();
        assert!(!mgr.clear());
        assert_eq!(mgr.take_transition(), None);
        let cx = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_month(&cx);
        assert!(mgr.clear());
        assert_eq!(mgr.current(), SelectionState::None);
        assert_eq!(mgr.previous(), SelectionState::Month(range(3, 31)));
    }

    #[test]
    fn test_revalidate() {
        let mut mgr = SelectionManager::default();
        let wide = cx(bounds(Some(CellRange::ALL)), RejectedBehavior::PreserveCurrent);
        mgr.select_week(2, &wide).unwrap();
        let narrow = cx(bounds(Some(range(16, 41))), RejectedBehavior::PreserveCurrent);
        assert_eq!(mgr.revalidate(&narrow), AcceptanceStatus::Accepted);
        assert_eq!(mgr.current(), SelectionState::Week(range(16, 20)));
        // Widening again restores the whole row
        assert_eq!(mgr.revalidate(&wide), AcceptanceStatus::Accepted);
        assert_eq!(mgr.current(), SelectionState::Week(range(14, 20)));
        let gone = cx(bounds(Some(range(30, 41))), RejectedBehavior::PreserveCurrent);
        assert_eq!(mgr.revalidate(&gone), AcceptanceStatus::Rejected);
        assert_eq!(mgr.current(), SelectionState::None);
    }
}
