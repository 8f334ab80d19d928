use crate::cell::{Cell, CellError, CellRange, CELL_COUNT};
use crate::date::{DateError, PackedDate, PackedDateRange};
use crate::yearmonth::YearMonth;
use time::Weekday;

/// How the dates of one month are laid out over the 42 cells of a page,
/// including the trailing days of the previous month and the leading days of
/// the next one
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct YearMonthGridInfo {
    year_month: YearMonth,
    first_day_of_week: Weekday,
    first_cell_in_month: u8,
    days_in_month: u8,
    first_cell_date: PackedDate,
    last_cell_date: PackedDate,
}

impl YearMonthGridInfo {
    /// Fails if the page would need a date outside the supported range,
    /// which only happens for the very first and last months.
    pub fn new(
        year_month: YearMonth,
        first_day_of_week: Weekday,
    ) -> Result<YearMonthGridInfo, DateError> {
        let first = year_month.first_date();
        let first_cell_in_month = (first.day_of_week() + 7
            - first_day_of_week.number_days_from_monday())
            % 7;
        let first_cell_date = first.plus_days(-i64::from(first_cell_in_month))?;
        let last_cell_date = first_cell_date.plus_days(i64::from(CELL_COUNT - 1))?;
        Ok(YearMonthGridInfo {
            year_month,
            first_day_of_week,
            first_cell_in_month,
            days_in_month: year_month.days_in_month(),
            first_cell_date,
            last_cell_date,
        })
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    /// The cell on which day 1 of the month falls
    pub fn first_cell_in_month(&self) -> Cell {
        self.cell_at(self.first_cell_in_month)
    }

    pub fn days_in_month(&self) -> u8 {
        self.days_in_month
    }

    pub fn first_cell_date(&self) -> PackedDate {
        self.first_cell_date
    }

    pub fn last_cell_date(&self) -> PackedDate {
        self.last_cell_date
    }

    /// Cells that show days of the month itself rather than of its
    /// neighbours
    pub fn in_month_range(&self) -> CellRange {
        CellRange::normalized(
            self.cell_at(self.first_cell_in_month),
            self.cell_at(self.first_cell_in_month + self.days_in_month - 1),
        )
    }

    pub fn cell_for_date(&self, date: PackedDate) -> Option<Cell> {
        let offset = self.first_cell_date.days_until(date);
        u8::try_from(offset).ok().and_then(|i| Cell::new(i).ok())
    }

    pub fn date_for_cell(&self, cell: Cell) -> PackedDate {
        let index = cell.index();
        let first = self.first_cell_in_month;
        if index < first {
            // first_cell_date lies in the previous month, so its year and
            // month are the ones needed here
            let prev = self.first_cell_date;
            PackedDate::from_parts(
                prev.year(),
                prev.month(),
                prev.days_in_month() - (first - index) + 1,
            )
        } else if index < first + self.days_in_month {
            PackedDate::from_parts(
                self.year_month.year(),
                self.year_month.month(),
                index - first + 1,
            )
        } else {
            let next = self.last_cell_date;
            PackedDate::from_parts(
                next.year(),
                next.month(),
                index - first - self.days_in_month + 1,
            )
        }
    }

    pub fn day_number(&self, cell: Cell) -> u8 {
        self.date_for_cell(cell).day()
    }

    /// The day-of-month number shown in each cell
    pub fn day_numbers(&self) -> [u8; CELL_COUNT as usize] {
        let mut days = [0; CELL_COUNT as usize];
        for (slot, cell) in days.iter_mut().zip(Cell::all()) {
            *slot = self.day_number(cell);
        }
        days
    }

    pub fn week_range(&self, index: u8) -> Result<CellRange, CellError> {
        CellRange::week(index)
    }

    /// Cells covering the part of `range` that falls on this page, if any
    pub fn cell_range_for_date_range(&self, range: PackedDateRange) -> Option<CellRange> {
        if range.end() < self.first_cell_date || range.start() > self.last_cell_date {
            return None;
        }
        let start = self.cell_for_date(range.start().max(self.first_cell_date))?;
        let end = self.cell_for_date(range.end().min(self.last_cell_date))?;
        Some(CellRange::normalized(start, end))
    }

    pub fn date_range_for_cell_range(&self, range: CellRange) -> PackedDateRange {
        let start = self.date_for_cell(range.start());
        let end = self.date_for_cell(range.end());
        PackedDateRange::new(start, end).unwrap_or_else(|_| PackedDateRange::single(start))
    }

    /// Cells whose dates lie within `min..=max`, or `None` if the page is
    /// entirely outside of that range
    pub fn enabled_range(&self, min: PackedDate, max: PackedDate) -> Option<CellRange> {
        if max < self.first_cell_date || min > self.last_cell_date || min > max {
            return None;
        }
        let start = if min > self.first_cell_date {
            self.cell_for_date(min)?
        } else {
            Cell::FIRST
        };
        let end = if max < self.last_cell_date {
            self.cell_for_date(max)?
        } else {
            Cell::LAST
        };
        Some(CellRange::normalized(start, end))
    }

    pub fn is_in_month(&self, cell: Cell) -> bool {
        self.in_month_range().contains(cell)
    }

    fn cell_at(&self, index: u8) -> Cell {
        match Cell::new(index) {
            Ok(cell) => cell,
            Err(_) => unreachable!("month days should always fit within the grid"),
        }
    }
}
