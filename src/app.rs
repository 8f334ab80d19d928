use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::theme::BASE_STYLE;
use crate::widget::MonthView;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use log::debug;
use rangecal::calendar::{RangeCalendar, SelectionEvent};
use rangecal::cell::{Cell, COLUMN_COUNT};
use rangecal::date::PackedDate;
use rangecal::saved::SavedState;
use rangecal::selection::RejectedBehavior;
use rangecal::yearmonth::YearMonth;
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How long to wait for input between frames while something is animating
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub(crate) struct App {
    calendar: RangeCalendar,
    cursor: Cell,
    today: PackedDate,
    state: AppState,
}

impl App {
    pub(crate) fn new(calendar: RangeCalendar, today: PackedDate) -> App {
        let grid = calendar.current_page().grid();
        let cursor = if grid.year_month().contains(today) {
            grid.cell_for_date(today)
                .unwrap_or_else(|| grid.first_cell_in_month())
        } else {
            grid.first_cell_in_month()
        };
        let mut app = App {
            calendar,
            cursor,
            today,
            state: AppState::Calendar,
        };
        app.follow_cursor();
        app
    }

    /// Runs the event loop until the user quits, then returns the state to
    /// save
    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<SavedState> {
        let mut last = Instant::now();
        while !self.quitting() {
            self.draw(&mut terminal)?;
            let event = self.next_event()?;
            let now = Instant::now();
            self.calendar.tick(now.duration_since(last));
            last = now;
            if let Some(event) = event {
                self.handle_event(&event)?;
            }
        }
        Ok(self.calendar.saved_state())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    /// Blocks for input, unless something is animating, in which case
    /// `None` is returned once a frame has passed without any
    fn next_event(&self) -> io::Result<Option<Event>> {
        if self.calendar.is_animating() && !poll(FRAME)? {
            return Ok(None);
        }
        read().map(Some)
    }

    fn handle_event(&mut self, event: &Event) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        self.flush_events()
    }

    fn flush_events(&mut self) -> io::Result<()> {
        for event in self.calendar.drain_events() {
            match event {
                SelectionEvent::Selected { kind, range } => debug!("Now selected: {kind} {range}"),
                SelectionEvent::Cleared => debug!("Selection cleared"),
                SelectionEvent::DragStarted => {
                    debug!("Drag started");
                    self.beep()?;
                }
            }
        }
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        let week = i64::from(COLUMN_COUNT);
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-week),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(week),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if self.calendar.is_dragging() {
                        self.calendar.end_drag();
                        true
                    } else {
                        // Clicking the selected day may clear it, which is
                        // reported as a rejection
                        let before = self.calendar.selection();
                        self.calendar.click_cell(self.cursor).is_accepted()
                            || self.calendar.selection() != before
                    }
                }
                KeyCode::Char('w') => self
                    .calendar
                    .select_week(
                        self.calendar.year_month(),
                        self.cursor.grid_y(),
                        RejectedBehavior::PreserveCurrent,
                    )
                    .is_ok_and(|status| status.is_accepted()),
                KeyCode::Char('m') => self
                    .calendar
                    .select_month(self.calendar.year_month(), RejectedBehavior::PreserveCurrent)
                    .is_accepted(),
                KeyCode::Char('v') => {
                    if self.calendar.is_dragging() {
                        self.calendar.end_drag();
                        true
                    } else {
                        self.calendar.start_drag(self.cursor).is_accepted()
                    }
                }
                KeyCode::Char('c') => self.calendar.clear_selection(),
                KeyCode::Char('n') | KeyCode::PageDown => self.step_month(1),
                KeyCode::Char('p') | KeyCode::PageUp => self.step_month(-1),
                KeyCode::Char('t') | KeyCode::Home => self.go_to_today(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Esc => {
                    if self.calendar.is_dragging() {
                        self.calendar.end_drag();
                    } else {
                        self.state = AppState::Quitting;
                    }
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok())
                        {
                            Some(d) => state.handle_input(JumpToInput::Digit(d)),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(ym) => {
                            self.state = AppState::Calendar;
                            self.show_month(ym)
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn move_cursor(&mut self, delta: i64) -> bool {
        let Some(cell) = self.cursor.offset(delta) else {
            return false;
        };
        self.cursor = cell;
        self.follow_cursor()
    }

    /// Extends a drag in progress to the cursor, or else hovers over it.
    /// Returns `false` if the drag could not be extended.
    fn follow_cursor(&mut self) -> bool {
        match self.calendar.drag_to(self.cursor) {
            Some(status) => status.is_accepted(),
            None => {
                if !self.calendar.set_hover(self.cursor) {
                    self.calendar.clear_hover();
                }
                true
            }
        }
    }

    fn step_month(&mut self, delta: i32) -> bool {
        self.calendar
            .year_month()
            .plus_months(delta)
            .is_ok_and(|ym| self.show_month(ym))
    }

    fn show_month(&mut self, year_month: YearMonth) -> bool {
        if let Err(e) = self.calendar.set_year_month(year_month) {
            debug!("Cannot show {year_month}: {e}");
            return false;
        }
        self.follow_cursor();
        true
    }

    fn go_to_today(&mut self) -> bool {
        if !self.show_month(self.today.year_month()) {
            return false;
        }
        if let Some(cell) = self.calendar.current_page().grid().cell_for_date(self.today) {
            self.cursor = cell;
        }
        self.follow_cursor();
        true
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        MonthView::new(&self.calendar, self.cursor, self.today).render(area, buf);
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::grid_measure;
    use rangecal::config::CalendarConfig;
    use rangecal::date::PackedDateRange;
    use rangecal::selection::SelectionType;
    use std::rc::Rc;

    fn ymd(year: i32, month: u8, day: u8) -> PackedDate {
        PackedDate::new(year, month, day).unwrap()
    }

    fn app(config: CalendarConfig) -> App {
        let calendar = RangeCalendar::new(
            config.selection_animated(false),
            Rc::new(grid_measure()),
            YearMonth::new(2024, 2).unwrap(),
        )
        .unwrap();
        App::new(calendar, ymd(2024, 2, 22))
    }

    fn render(app: &mut App) -> Vec<String> {
        let area = Rect::new(0, 0, 42, 16);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        (0..16)
            .map(|y| (0..42).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_cursor_starts_on_today() {
        let mut app = app(CalendarConfig::new());
        assert_eq!(app.cursor, Cell::new(24).unwrap());
        let lines = render(&mut app);
        assert_eq!(lines[0], "              February 2024               ");
        assert_eq!(lines[9], "  19    20    21   [22]   23    24    25  ");
        assert_eq!(lines[15].trim_end(), "Nothing selected");
    }

    #[test]
    fn test_selecting_with_keys() {
        let mut app = app(CalendarConfig::new());
        assert!(app.handle_key(KeyCode::Char('l')));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(
            app.calendar.selection(),
            Some((SelectionType::Cell, PackedDateRange::single(ymd(2024, 2, 23))))
        );
        assert!(app.handle_key(KeyCode::Char('w')));
        assert_eq!(
            app.calendar.selection(),
            Some((
                SelectionType::Week,
                PackedDateRange::new(ymd(2024, 2, 19), ymd(2024, 2, 25)).unwrap()
            ))
        );
        assert!(app.handle_key(KeyCode::Char('m')));
        assert_eq!(
            app.calendar.selection(),
            Some((
                SelectionType::Month,
                PackedDateRange::new(ymd(2024, 2, 1), ymd(2024, 2, 29)).unwrap()
            ))
        );
        let lines = render(&mut app);
        assert_eq!(
            lines[15].trim_end(),
            "Selected month: 2024-02-01 .. 2024-02-29"
        );
        assert!(app.handle_key(KeyCode::Char('c')));
        assert_eq!(app.calendar.selection(), None);
        assert!(!app.handle_key(KeyCode::Char('c')));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn test_drag_selection() {
        let mut app = app(CalendarConfig::new());
        assert!(app.handle_key(KeyCode::Char('v')));
        assert!(app.calendar.is_dragging());
        assert_eq!(
            app.calendar.drain_events(),
            [
                SelectionEvent::DragStarted,
                SelectionEvent::Selected {
                    kind: SelectionType::Custom,
                    range: PackedDateRange::single(ymd(2024, 2, 22)),
                },
            ]
        );
        assert!(app.handle_key(KeyCode::Char('j')));
        assert!(app.handle_key(KeyCode::Char('l')));
        assert_eq!(
            app.calendar.selection(),
            Some((
                SelectionType::Custom,
                PackedDateRange::new(ymd(2024, 2, 22), ymd(2024, 3, 1)).unwrap()
            ))
        );
        let lines = render(&mut app);
        assert!(lines[15].starts_with("Selected custom: 2024-02-22 .. 2024-03-01"));
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.calendar.is_dragging());
        assert!(!app.quitting());
        assert!(app.handle_key(KeyCode::Esc));
        assert!(app.quitting());
    }

    #[test]
    fn test_month_navigation() {
        let mut app = app(CalendarConfig::new().min_date(ymd(2024, 1, 15)));
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.calendar.year_month(), YearMonth::new(2024, 3).unwrap());
        assert!(app.handle_key(KeyCode::PageUp));
        assert!(app.handle_key(KeyCode::Char('p')));
        assert_eq!(app.calendar.year_month(), YearMonth::new(2024, 1).unwrap());
        assert!(!app.handle_key(KeyCode::Char('p')));
        assert_eq!(app.calendar.year_month(), YearMonth::new(2024, 1).unwrap());
        assert!(app.handle_key(KeyCode::Char('k')));
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.calendar.year_month(), YearMonth::new(2024, 2).unwrap());
        assert_eq!(app.cursor, Cell::new(24).unwrap());
    }

    #[test]
    fn test_jump_to_month() {
        let mut app = app(CalendarConfig::new());
        assert!(app.handle_key(KeyCode::Char('g')));
        for c in "202312".chars() {
            assert!(app.handle_key(KeyCode::Char(c)));
        }
        assert!(!app.handle_key(KeyCode::Char('5')));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.calendar.year_month(), YearMonth::new(2023, 12).unwrap());
        let lines = render(&mut app);
        assert_eq!(lines[0], "              December 2023               ");
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = app(CalendarConfig::new());
        assert!(app.handle_key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(app.handle_key(KeyCode::Char('z')));
        assert_eq!(app.state, AppState::Calendar);
    }
}
