//! A calendar made of month pages, only one of which holds a selection at a
//! time.
//!
//! [`RangeCalendar`] creates a [`CalendarPage`] for each month it is asked
//! about, resolves every selection request to dates before consulting the
//! host's [`SelectionGate`], and reports what happened as
//! [`SelectionEvent`]s carrying dates rather than cells.
use crate::cell::{Cell, CellError, CellRange};
use crate::config::{AllowedSelectionTypes, CalendarConfig, ConfigError};
use crate::date::{PackedDate, PackedDateRange};
use crate::grid::YearMonthGridInfo;
use crate::measure::CellMeasureManager;
use crate::page::{CalendarPage, PageTiming, Request};
use crate::saved::{SavedSelection, SavedState};
use crate::selection::{
    AcceptanceStatus, Canvas, CellGate, CellSelectionEvent, ClickOnCellBehavior,
    RejectedBehavior, SelectionGesture, SelectionState, SelectionType,
};
use crate::yearmonth::YearMonth;
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use time::Weekday;

/// The host's veto over selection requests.  Every method sees the request
/// resolved to dates; the defaults allow everything.
pub trait SelectionGate {
    fn cell(&self, _date: PackedDate) -> bool {
        true
    }

    /// `index` is the row of the page the week occupies
    fn week(&self, _index: u8, _range: PackedDateRange) -> bool {
        true
    }

    fn month(&self, _year_month: YearMonth) -> bool {
        true
    }

    fn custom(&self, _range: PackedDateRange) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AllowAll;

impl SelectionGate for AllowAll {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionEvent {
    Selected {
        kind: SelectionType,
        range: PackedDateRange,
    },
    Cleared,
    /// A drag selection has begun
    DragStarted,
}

/// Turns cell requests on one page into date requests for a
/// [`SelectionGate`]
struct PageGate<'a, G> {
    gate: &'a G,
    grid: YearMonthGridInfo,
    allowed: AllowedSelectionTypes,
}

impl<G: SelectionGate> CellGate for PageGate<'_, G> {
    fn allows(&self, kind: SelectionType, range: CellRange) -> bool {
        if !self.allowed.allows(kind) {
            debug!("{kind} selections are disabled");
            return false;
        }
        let dates = self.grid.date_range_for_cell_range(range);
        match kind {
            SelectionType::None => true,
            SelectionType::Cell => self.gate.cell(dates.start()),
            SelectionType::Week => self.gate.week(range.start().grid_y(), dates),
            SelectionType::Month => self.gate.month(self.grid.year_month()),
            SelectionType::Custom => self.gate.custom(dates),
        }
    }
}

pub struct RangeCalendar<G = AllowAll> {
    config: CalendarConfig,
    gate: G,
    measure: Rc<dyn CellMeasureManager>,
    pages: BTreeMap<YearMonth, CalendarPage>,
    current: YearMonth,
    /// The page holding the selection
    selected: Option<YearMonth>,
    drag_anchor: Option<Cell>,
    events: Vec<SelectionEvent>,
}

impl<G> fmt::Debug for RangeCalendar<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeCalendar")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl RangeCalendar {
    pub fn new(
        config: CalendarConfig,
        measure: Rc<dyn CellMeasureManager>,
        year_month: YearMonth,
    ) -> Result<RangeCalendar, ConfigError> {
        RangeCalendar::with_gate(config, measure, year_month, AllowAll)
    }
}

impl<G: SelectionGate> RangeCalendar<G> {
    pub fn with_gate(
        config: CalendarConfig,
        measure: Rc<dyn CellMeasureManager>,
        year_month: YearMonth,
        gate: G,
    ) -> Result<RangeCalendar<G>, ConfigError> {
        config.validate()?;
        config.check_month(year_month)?;
        let mut pages = BTreeMap::new();
        pages.insert(year_month, build_page(&config, &measure, year_month)?);
        Ok(RangeCalendar {
            config,
            gate,
            measure,
            pages,
            current: year_month,
            selected: None,
            drag_anchor: None,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn year_month(&self) -> YearMonth {
        self.current
    }

    pub fn current_page(&self) -> &CalendarPage {
        match self.pages.get(&self.current) {
            Some(page) => page,
            None => unreachable!("the current month should always have a page"),
        }
    }

    pub fn page(&self, year_month: YearMonth) -> Option<&CalendarPage> {
        self.pages.get(&year_month)
    }

    /// The current selection resolved to dates, with the kind of selection
    pub fn selection(&self) -> Option<(SelectionType, PackedDateRange)> {
        let page = self.pages.get(&self.selected?)?;
        let state = page.selection();
        let range = state.range()?;
        Some((state.kind(), page.grid().date_range_for_cell_range(range)))
    }

    pub fn selected_month(&self) -> Option<YearMonth> {
        self.selected
    }

    /// Switches the page on display.  Pages that are neither displayed nor
    /// selected nor animating are dropped.
    pub fn set_year_month(&mut self, year_month: YearMonth) -> Result<(), ConfigError> {
        self.page_mut(year_month)?;
        if year_month == self.current {
            return Ok(());
        }
        if let Some(page) = self.pages.get_mut(&self.current) {
            page.clear_hover(false);
        }
        debug!("Showing {year_month}");
        self.current = year_month;
        self.drag_anchor = None;
        let selected = self.selected;
        self.pages.retain(|&ym, page| {
            ym == year_month || Some(ym) == selected || page.is_animating()
        });
        Ok(())
    }

    pub fn next_month(&mut self) -> Result<(), ConfigError> {
        self.set_year_month(self.current.plus_months(1)?)
    }

    pub fn previous_month(&mut self) -> Result<(), ConfigError> {
        self.set_year_month(self.current.plus_months(-1)?)
    }

    /// Selects a single day, switching to its month if the selection is
    /// accepted
    pub fn select_day(&mut self, date: PackedDate, on_reject: RejectedBehavior) -> AcceptanceStatus {
        let ym = date.year_month();
        let animate = self.config.selection_animated;
        let status = self.with_page(ym, on_reject, animate, |page, req| {
            match page.grid().cell_for_date(date) {
                Some(cell) => page.select_cell(cell, SelectionGesture::Other, req),
                None => unreachable!("every day of a month has a cell on its page"),
            }
        });
        self.finish_request(ym, status, on_reject)
    }

    pub fn select_week(
        &mut self,
        year_month: YearMonth,
        index: u8,
        on_reject: RejectedBehavior,
    ) -> Result<AcceptanceStatus, CellError> {
        CellRange::week(index)?;
        let animate = self.config.selection_animated;
        let status = self.with_page(year_month, on_reject, animate, |page, req| {
            page.select_week(index, req)
        });
        let status = match status {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(e)) => return Err(e),
            Err(e) => Err(e),
        };
        Ok(self.finish_request(year_month, status, on_reject))
    }

    pub fn select_month(
        &mut self,
        year_month: YearMonth,
        on_reject: RejectedBehavior,
    ) -> AcceptanceStatus {
        let animate = self.config.selection_animated;
        let status = self.with_page(year_month, on_reject, animate, |page, req| {
            page.select_month(req)
        });
        self.finish_request(year_month, status, on_reject)
    }

    /// Selects the part of `range` shown on the page of the month `range`
    /// starts in
    pub fn select_custom(
        &mut self,
        range: PackedDateRange,
        on_reject: RejectedBehavior,
    ) -> AcceptanceStatus {
        let ym = range.start().year_month();
        let animate = self.config.selection_animated;
        let status = self.with_page(ym, on_reject, animate, |page, req| {
            match page.grid().cell_range_for_date_range(range) {
                Some(cells) => page.select_custom(cells, SelectionGesture::Other, req),
                None => unreachable!("a range starting in a month is shown on its page"),
            }
        });
        self.finish_request(ym, status, on_reject)
    }

    /// A click on a cell of the displayed page
    pub fn click_cell(&mut self, cell: Cell) -> AcceptanceStatus {
        self.on_current_page(|page, req| page.select_cell(cell, SelectionGesture::Click, req))
    }

    /// Starts selecting a range by dragging from `cell`
    pub fn start_drag(&mut self, cell: Cell) -> AcceptanceStatus {
        let status = self.on_current_page(|page, req| {
            page.select_custom(CellRange::single(cell), SelectionGesture::LongPress, req)
        });
        self.drag_anchor = status.is_accepted().then_some(cell);
        status
    }

    /// Extends the range being dragged out to `cell`.  Returns `None` if no
    /// drag is in progress.
    pub fn drag_to(&mut self, cell: Cell) -> Option<AcceptanceStatus> {
        let anchor = self.drag_anchor?;
        Some(self.on_current_page(|page, req| {
            page.select_custom(
                CellRange::normalized(anchor, cell),
                SelectionGesture::Other,
                req,
            )
        }))
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Removes the selection from whichever page holds it.  Returns `false`
    /// if nothing was selected.
    pub fn clear_selection(&mut self) -> bool {
        let Some(ym) = self.selected else {
            return false;
        };
        let animate = self.config.selection_animated;
        let cleared = self
            .pages
            .get_mut(&ym)
            .is_some_and(|page| page.clear_selection(animate));
        self.collect_events(ym);
        cleared
    }

    pub fn set_hover(&mut self, cell: Cell) -> bool {
        self.current_page_mut().set_hover(cell)
    }

    pub fn clear_hover(&mut self) {
        self.current_page_mut().clear_hover(true);
    }

    /// Enables or disables kinds of selection.  A selection whose kind is no
    /// longer allowed is cleared.
    pub fn set_allowed_types(&mut self, allowed: AllowedSelectionTypes) {
        self.config.allowed_types = allowed;
        if let Some((kind, _)) = self.selection() {
            if !allowed.allows(kind) {
                debug!("{kind} selections were disabled");
                self.clear_selection();
            }
        }
    }

    /// Changes the dates that may be selected.  Every page asks for its
    /// selection again and drops whatever no longer fits.  If the displayed
    /// month falls outside the new range, the nearest month within it is
    /// shown instead.
    pub fn set_enabled_range(&mut self, min: PackedDate, max: PackedDate) -> Result<(), ConfigError> {
        let config = self.config.min_date(min).max_date(max);
        config.validate()?;
        let (min_month, max_month) = config.month_bounds();
        let moved = if self.current < min_month || self.current > max_month {
            let ym = self.current.clamp(min_month, max_month);
            let page = if self.pages.contains_key(&ym) {
                None
            } else {
                Some(build_page(&config, &self.measure, ym)?)
            };
            Some((ym, page))
        } else {
            None
        };
        self.config = config;
        if let Some((ym, page)) = moved {
            debug!("Showing {ym}");
            if let Some(page) = page {
                self.pages.insert(ym, page);
            }
            self.current = ym;
            self.drag_anchor = None;
        }
        self.revalidate_pages(|page, gate| page.set_enabled_dates((min, max), gate));
        Ok(())
    }

    pub fn set_show_adjacent_months(&mut self, show: bool) {
        self.config.show_adjacent_months = show;
        self.revalidate_pages(|page, gate| page.set_show_adjacent_months(show, gate));
    }

    pub fn set_click_on_selected_cell(&mut self, behavior: ClickOnCellBehavior) {
        self.config.click_on_selected_cell = behavior;
        for page in self.pages.values_mut() {
            page.set_click_on_cell(behavior);
        }
    }

    /// Lays the pages out again with weeks starting on `weekday`.  The
    /// selection is kept; a week selection becomes the row holding its first
    /// day.
    pub fn set_first_day_of_week(&mut self, weekday: Weekday) -> Result<(), ConfigError> {
        if weekday == self.config.first_day_of_week {
            return Ok(());
        }
        let saved = self.saved_state();
        let config = self.config.first_day_of_week(weekday);
        let page = build_page(&config, &self.measure, self.current)?;
        self.config = config;
        self.pages.clear();
        self.pages.insert(self.current, page);
        self.selected = None;
        self.drag_anchor = None;
        self.restore(&saved)?;
        Ok(())
    }

    pub fn set_timing(&mut self, selection: Duration, hover: Duration) {
        self.config.selection_animation_duration = selection;
        self.config.hover_animation_duration = hover;
        let timing = page_timing(&self.config);
        for page in self.pages.values_mut() {
            page.set_timing(timing);
        }
    }

    /// Switches to new cell geometry
    pub fn set_measure(&mut self, measure: Rc<dyn CellMeasureManager>) {
        let animate = self.config.selection_animated;
        for page in self.pages.values_mut() {
            page.set_measure(Rc::clone(&measure), animate);
        }
        self.measure = measure;
    }

    /// Advances every page's animations by `dt`.  Returns `true` while
    /// anything is still animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut running = false;
        for page in self.pages.values_mut() {
            running |= page.tick(dt);
        }
        running
    }

    pub fn is_animating(&self) -> bool {
        self.pages.values().any(CalendarPage::is_animating)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.current_page().draw(canvas);
    }

    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn saved_state(&self) -> SavedState {
        let selection = self.selected.and_then(|year_month| {
            let (kind, range) = self.selection()?;
            Some(SavedSelection {
                year_month,
                kind,
                start: range.start(),
                end: range.end(),
            })
        });
        SavedState {
            year_month: self.current,
            selection,
        }
    }

    /// Returns to a saved month and selection.  The selection goes through
    /// the usual checks without animating and without reporting events.
    pub fn restore(&mut self, state: &SavedState) -> Result<AcceptanceStatus, ConfigError> {
        self.set_year_month(state.year_month)?;
        let Some(saved) = state.selection else {
            return Ok(AcceptanceStatus::AcceptedSameRange);
        };
        let range = saved.range()?;
        let on_reject = RejectedBehavior::PreserveCurrent;
        let status = self.with_page(saved.year_month, on_reject, false, |page, req| {
            let grid = *page.grid();
            let Some(cells) = grid.cell_range_for_date_range(range) else {
                return AcceptanceStatus::Rejected;
            };
            match saved.kind {
                SelectionType::None => AcceptanceStatus::AcceptedSameRange,
                SelectionType::Cell => page.select_cell(cells.start(), SelectionGesture::Other, req),
                SelectionType::Week => page
                    .select_week(cells.start().grid_y(), req)
                    .unwrap_or(AcceptanceStatus::Rejected),
                SelectionType::Month => page.select_month(req),
                SelectionType::Custom => page.select_custom(cells, SelectionGesture::Other, req),
            }
        })?;
        debug!("Restored {} selection: {status:?}", saved.kind);
        self.events.clear();
        Ok(status)
    }

    fn current_page_mut(&mut self) -> &mut CalendarPage {
        match self.pages.get_mut(&self.current) {
            Some(page) => page,
            None => unreachable!("the current month should always have a page"),
        }
    }

    fn page_mut(&mut self, year_month: YearMonth) -> Result<&mut CalendarPage, ConfigError> {
        self.config.check_month(year_month)?;
        let page = match self.pages.entry(year_month) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                e.insert(build_page(&self.config, &self.measure, year_month)?)
            }
        };
        Ok(page)
    }

    /// Runs a request against the page for `year_month`, creating the page
    /// if needed, then turns the page's events into calendar events
    fn with_page<R, F>(
        &mut self,
        year_month: YearMonth,
        on_reject: RejectedBehavior,
        animate: bool,
        f: F,
    ) -> Result<R, ConfigError>
    where
        F: FnOnce(&mut CalendarPage, &Request<'_>) -> R,
    {
        self.page_mut(year_month)?;
        let Some(page) = self.pages.get_mut(&year_month) else {
            unreachable!("page was just created");
        };
        let gate = PageGate {
            gate: &self.gate,
            grid: *page.grid(),
            allowed: self.config.allowed_types,
        };
        let req = Request {
            gate: &gate,
            on_reject,
            animate,
        };
        let r = f(page, &req);
        self.collect_events(year_month);
        Ok(r)
    }

    fn on_current_page<F>(&mut self, f: F) -> AcceptanceStatus
    where
        F: FnOnce(&mut CalendarPage, &Request<'_>) -> AcceptanceStatus,
    {
        let animate = self.config.selection_animated;
        let ym = self.current;
        self.with_page(ym, RejectedBehavior::PreserveCurrent, animate, f)
            .unwrap_or_else(|e| unreachable!("current month {ym} should be valid: {e}"))
    }

    /// Handles a request for a month that may have been unavailable
    fn finish_request(
        &mut self,
        year_month: YearMonth,
        status: Result<AcceptanceStatus, ConfigError>,
        on_reject: RejectedBehavior,
    ) -> AcceptanceStatus {
        match status {
            Ok(status) => {
                if status == AcceptanceStatus::Accepted && self.selected == Some(year_month) {
                    if let Err(e) = self.set_year_month(year_month) {
                        unreachable!("selected month {year_month} should be valid: {e}");
                    }
                } else if status == AcceptanceStatus::Rejected
                    && on_reject == RejectedBehavior::ClearCurrent
                    && self.selected != Some(year_month)
                {
                    // The page that refused only cleared its own, empty, selection
                    self.clear_selection();
                }
                status
            }
            Err(e) => {
                debug!("Rejecting request for {year_month}: {e}");
                if on_reject == RejectedBehavior::ClearCurrent {
                    self.clear_selection();
                }
                AcceptanceStatus::Rejected
            }
        }
    }

    fn revalidate_pages<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut CalendarPage, &dyn CellGate) -> AcceptanceStatus,
    {
        let mut touched = Vec::with_capacity(self.pages.len());
        for (&ym, page) in &mut self.pages {
            let gate = PageGate {
                gate: &self.gate,
                grid: *page.grid(),
                allowed: self.config.allowed_types,
            };
            f(page, &gate);
            touched.push(ym);
        }
        for ym in touched {
            self.collect_events(ym);
        }
    }

    fn collect_events(&mut self, year_month: YearMonth) {
        let Some(page) = self.pages.get_mut(&year_month) else {
            return;
        };
        let grid = *page.grid();
        for event in page.drain_events() {
            match event {
                CellSelectionEvent::Selected(state) => self.on_selected(year_month, grid, state),
                CellSelectionEvent::Cleared => {
                    if self.selected == Some(year_month) {
                        self.selected = None;
                    }
                    self.events.push(SelectionEvent::Cleared);
                }
                CellSelectionEvent::DragStarted => self.events.push(SelectionEvent::DragStarted),
            }
        }
    }

    fn on_selected(&mut self, year_month: YearMonth, grid: YearMonthGridInfo, state: SelectionState) {
        if let Some(other) = self.selected.filter(|&ym| ym != year_month) {
            if let Some(page) = self.pages.get_mut(&other) {
                debug!("Dropping selection on {other}");
                page.clear_selection(false);
                page.drain_events();
            }
        }
        self.selected = Some(year_month);
        if let Some(range) = state.range() {
            self.events.push(SelectionEvent::Selected {
                kind: state.kind(),
                range: grid.date_range_for_cell_range(range),
            });
        }
    }
}

fn page_timing(config: &CalendarConfig) -> PageTiming {
    PageTiming {
        selection: config.selection_animation_duration,
        hover: config.hover_animation_duration,
        interpolator: config.interpolator,
    }
}

fn build_page(
    config: &CalendarConfig,
    measure: &Rc<dyn CellMeasureManager>,
    year_month: YearMonth,
) -> Result<CalendarPage, ConfigError> {
    let grid = YearMonthGridInfo::new(year_month, config.first_day_of_week)?;
    Ok(CalendarPage::new(
        grid,
        (config.min_date, config.max_date),
        config.show_adjacent_months,
        config.click_on_selected_cell,
        Rc::clone(measure),
        page_timing(config),
    ))
}
