use crate::theme::{
    ADJACENT_STYLE, BASE_STYLE, DISABLED_STYLE, FADING_SELECTION_STYLE, HOVER_STYLE, MONTH_STYLE,
    SELECTION_STYLE, STATUS_STYLE, TODAY_STYLE, WEEKDAY_STYLE,
};
use rangecal::calendar::RangeCalendar;
use rangecal::cell::{Cell, COLUMN_COUNT, ROW_COUNT};
use rangecal::date::PackedDate;
use rangecal::measure::{PointF, UniformCellMeasure};
use rangecal::selection::{Canvas, SelectionShape};
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Paragraph, Widget},
};
use time::{Month, Weekday};

/// Number of columns per day
const DAY_WIDTH: u16 = 6;

/// Number of lines taken up by each week, counting the blank line below it
const WEEK_LINES: u16 = 2;

/// Number of lines above the first week: the month title, the weekday names
/// and a rule
const HEADER_LINES: u16 = 3;

const GRID_WIDTH: u16 = DAY_WIDTH * COLUMN_COUNT as u16;

const GRID_HEIGHT: u16 = WEEK_LINES * ROW_COUNT as u16 - 1;

/// Line on which the current selection is described
const STATUS_LINE: u16 = HEADER_LINES + GRID_HEIGHT + 1;

const ACS_HLINE: char = '─';

/// Where the cells of a page lie, measured in terminal cells from the
/// top-left corner of the grid
pub(crate) fn grid_measure() -> UniformCellMeasure {
    UniformCellMeasure::new(f32::from(DAY_WIDTH), 1.0).row_gap(f32::from(WEEK_LINES - 1))
}

/// The displayed page of a [`RangeCalendar`] together with its selection
#[derive(Clone, Copy, Debug)]
pub(crate) struct MonthView<'a> {
    calendar: &'a RangeCalendar,
    cursor: Cell,
    today: PackedDate,
}

impl<'a> MonthView<'a> {
    pub(crate) fn new(calendar: &'a RangeCalendar, cursor: Cell, today: PackedDate) -> Self {
        MonthView {
            calendar,
            cursor,
            today,
        }
    }

    fn status(&self) -> String {
        let mut s = match self.calendar.selection() {
            Some((kind, range)) => format!("Selected {kind}: {range}"),
            None => String::from("Nothing selected"),
        };
        if self.calendar.is_dragging() {
            s.push_str(" (dragging)");
        }
        s
    }
}

impl Widget for MonthView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [area] = Layout::horizontal([GRID_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let page = self.calendar.current_page();
        let grid = page.grid();
        let bounds = page.bounds();
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(grid.year_month().year(), grid.year_month().month());
        canvas.draw_header(grid.first_day_of_week());
        for (cell, day) in std::iter::zip(Cell::all(), grid.day_numbers()) {
            let in_month = grid.is_in_month(cell);
            let is_cursor = cell == self.cursor;
            if !in_month && !bounds.show_adjacent_months {
                if is_cursor {
                    canvas.draw_day(cell, String::from("[  ]"), BASE_STYLE);
                }
                continue;
            }
            let mut style = if !bounds.enabled.is_some_and(|r| r.contains(cell)) {
                DISABLED_STYLE
            } else if in_month {
                BASE_STYLE
            } else {
                ADJACENT_STYLE
            };
            if grid.date_for_cell(cell) == self.today {
                style = style.patch(TODAY_STYLE);
            }
            let text = if is_cursor {
                format!("[{day:2}]")
            } else {
                format!(" {day:2} ")
            };
            canvas.draw_day(cell, text, style);
        }
        self.calendar.draw(&mut canvas);
        canvas.mvprint(STATUS_LINE, 0, self.status(), Some(STATUS_STYLE));
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, year: i32, month: u8) {
        let title = match Month::try_from(month) {
            Ok(m) => format!("{m} {year}"),
            Err(_) => format!("{year}-{month:02}"),
        };
        if self.area.height > 0 {
            Line::styled(title, MONTH_STYLE).centered().render(
                Rect {
                    height: 1,
                    ..self.area
                },
                self.buf,
            );
        }
    }

    fn draw_header(&mut self, first_day_of_week: Weekday) {
        let mut wd = first_day_of_week;
        for col in 0..u16::from(COLUMN_COUNT) {
            self.mvprint(1, col * DAY_WIDTH + 2, weekday_abbrev(wd), Some(WEEKDAY_STYLE));
            wd = wd.next();
        }
        self.hline(2, 0, ACS_HLINE, GRID_WIDTH);
    }

    fn draw_day(&mut self, cell: Cell, text: String, style: Style) {
        let y = HEADER_LINES + u16::from(cell.grid_y()) * WEEK_LINES;
        let x = u16::from(cell.grid_x()) * DAY_WIDTH + 1;
        self.mvprint(y, x, text, Some(style));
    }

    /// Applies `style` to every terminal cell of the grid whose center lies
    /// inside the region
    fn paint<F: Fn(PointF) -> bool>(&mut self, style: Style, inside: F) {
        let height = GRID_HEIGHT.min(self.area.height.saturating_sub(HEADER_LINES));
        let width = GRID_WIDTH.min(self.area.width);
        for y in 0..height {
            for x in 0..width {
                let p = PointF::new(f32::from(x) + 0.5, f32::from(y) + 0.5);
                if !inside(p) {
                    continue;
                }
                let pos = (self.area.x + x, self.area.y + HEADER_LINES + y);
                if let Some(cell) = self.buf.cell_mut(pos) {
                    // A fading shape never dims a fully selected one
                    if style == FADING_SELECTION_STYLE && Some(cell.bg) == SELECTION_STYLE.bg {
                        continue;
                    }
                    cell.set_style(style);
                }
            }
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

/// Terminal cells cannot be partly transparent, so opacity is shown in
/// steps
fn selection_style(alpha: f32) -> Option<Style> {
    if alpha >= 0.75 {
        Some(SELECTION_STYLE)
    } else if alpha >= 0.25 {
        Some(FADING_SELECTION_STYLE)
    } else {
        None
    }
}

impl Canvas for BufferCanvas<'_> {
    fn fill_shape(&mut self, shape: &SelectionShape, alpha: f32) {
        if let Some(style) = selection_style(alpha) {
            self.paint(style, |p| shape.contains(p));
        }
    }

    fn fill_clipped_circle(&mut self, center: PointF, radius: f32, clip: &SelectionShape) {
        let r2 = radius * radius;
        self.paint(SELECTION_STYLE, |p| {
            p.distance_squared(center) <= r2 && clip.contains(p)
        });
    }

    fn fill_hover(&mut self, shape: &SelectionShape, alpha: f32) {
        if alpha >= 0.5 {
            self.paint(HOVER_STYLE, |p| shape.contains(p));
        }
    }
}

fn weekday_abbrev(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Monday => "Mo",
        Weekday::Tuesday => "Tu",
        Weekday::Wednesday => "We",
        Weekday::Thursday => "Th",
        Weekday::Friday => "Fr",
        Weekday::Saturday => "Sa",
        Weekday::Sunday => "Su",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangecal::config::CalendarConfig;
    use rangecal::selection::RejectedBehavior;
    use rangecal::yearmonth::YearMonth;
    use ratatui::style::Color;
    use std::rc::Rc;
    use std::time::Duration;

    fn february(config: CalendarConfig) -> RangeCalendar {
        RangeCalendar::new(
            config,
            Rc::new(grid_measure()),
            YearMonth::new(2024, 2).unwrap(),
        )
        .unwrap()
    }

    fn today() -> PackedDate {
        PackedDate::new(2024, 2, 22).unwrap()
    }

    fn render(calendar: &RangeCalendar, cursor: u8) -> Buffer {
        let area = Rect::new(0, 0, 42, 16);
        let mut buffer = Buffer::empty(area);
        MonthView::new(calendar, Cell::new(cursor).unwrap(), today()).render(area, &mut buffer);
        buffer
    }

    #[test]
    fn test_week_selection() {
        let mut cal = february(CalendarConfig::new().selection_animated(false));
        cal.select_week(
            YearMonth::new(2024, 2).unwrap(),
            2,
            RejectedBehavior::PreserveCurrent,
        )
        .unwrap();
        let buffer = render(&cal, 12);
        let mut expected = Buffer::with_lines([
            "              February 2024               ",
            "  Mo    Tu    We    Th    Fr    Sa    Su  ",
            "──────────────────────────────────────────",
            "  29    30    31     1     2     3     4  ",
            "                                          ",
            "   5     6     7     8     9   [10]   11  ",
            "                                          ",
            "  12    13    14    15    16    17    18  ",
            "                                          ",
            "  19    20    21    22    23    24    25  ",
            "                                          ",
            "  26    27    28    29     1     2     3  ",
            "                                          ",
            "   4     5     6     7     8     9    10  ",
            "                                          ",
            "Selected week: 2024-02-12 .. 2024-02-18   ",
        ]);
        // Only the symbols are compared here; styles are checked below
        for pos in expected.area.positions() {
            expected[pos].set_style(buffer[pos].style());
        }
        assert_eq!(buffer, expected);
        for x in 0..42 {
            assert_eq!(buffer[(x, 7)].bg, Color::LightCyan);
            assert_ne!(buffer[(x, 5)].bg, Color::LightCyan);
            assert_ne!(buffer[(x, 8)].bg, Color::LightCyan);
        }
        assert_eq!(buffer[(2, 3)].fg, Color::Gray);
        assert_eq!(buffer[(20, 3)].fg, Color::White);
        assert!(buffer[(20, 9)].modifier.contains(ratatui::style::Modifier::BOLD));
    }

    #[test]
    fn test_selection_fading_in() {
        let mut cal = february(CalendarConfig::new());
        cal.click_cell(Cell::new(12).unwrap());
        cal.tick(Duration::from_millis(125));
        let buffer = render(&cal, 12);
        for x in 30..36 {
            assert_eq!(buffer[(x, 5)].bg, Color::Blue);
        }
        assert_ne!(buffer[(29, 5)].bg, Color::Blue);
        cal.tick(Duration::from_millis(125));
        let buffer = render(&cal, 12);
        assert_eq!(buffer[(30, 5)].bg, Color::LightCyan);
    }

    #[test]
    fn test_hidden_adjacent_and_disabled_days() {
        let config = CalendarConfig::new()
            .show_adjacent_months(false)
            .min_date(PackedDate::new(2024, 2, 5).unwrap());
        let cal = february(config);
        let buffer = render(&cal, 0);
        let line = |y: u16| {
            (0..42)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        };
        assert_eq!(line(3), " [  ]                1     2     3     4  ");
        assert_eq!(buffer[(20, 3)].fg, Color::DarkGray);
        assert_eq!(buffer[(2, 5)].fg, Color::White);
        assert_eq!(line(15).trim_end(), "Nothing selected");
    }

    #[test]
    fn test_hover_highlight() {
        let mut cal = february(
            CalendarConfig::new().hover_animation_duration(Duration::ZERO),
        );
        assert!(cal.set_hover(Cell::new(16).unwrap()));
        cal.tick(Duration::ZERO);
        let buffer = render(&cal, 16);
        assert_eq!(buffer[(12, 7)].bg, Color::DarkGray);
        assert_ne!(buffer[(11, 7)].bg, Color::DarkGray);
    }
}
