use crate::cell::CellRange;
use crate::grid::YearMonthGridInfo;
use crate::yearmonth::YearMonth;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::{Date, Month, Weekday};

/// Number of days from 0000-01-01 to 1970-01-01 in the proleptic Gregorian
/// calendar
const DAYS_0000_TO_1970: i64 = 719_528;

/// Number of days in a 400-year Gregorian cycle
const DAYS_PER_CYCLE: i64 = 146_097;

pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 65535;

/// Epoch day of 0000-01-01
pub const MIN_DATE_EPOCH: i64 = -DAYS_0000_TO_1970;

/// Epoch day of 65535-12-31
pub const MAX_DATE_EPOCH: i64 = 23_217_003;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in the given month of the given year.  `month`
/// is expected to be in `1..=12`; any other value yields 0.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DateError {
    #[error("year {0} is outside the supported range {MIN_YEAR}..={MAX_YEAR}")]
    Year(i64),
    #[error("month {0} is not between 1 and 12")]
    Month(u8),
    #[error("day {day} is not valid in a month with {days_in_month} days")]
    Day { day: u8, days_in_month: u8 },
    #[error("epoch day {0} is outside the supported range {MIN_DATE_EPOCH}..={MAX_DATE_EPOCH}")]
    EpochDay(i64),
    #[error("week {0} is not between 0 and 5")]
    Week(u8),
    #[error("date range starts at {start} after it ends at {end}")]
    ReversedRange { start: PackedDate, end: PackedDate },
}

/// A proleptic Gregorian calendar date with a year in `0..=65535`, stored as
/// `year << 16 | month << 8 | day` so that comparing the packed values
/// compares the dates.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PackedDate(u32);

impl PackedDate {
    pub const MIN: PackedDate = PackedDate::from_parts(0, 1, 1);
    pub const MAX: PackedDate = PackedDate::from_parts(65535, 12, 31);

    pub fn new(year: i32, month: u8, day: u8) -> Result<PackedDate, DateError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateError::Year(i64::from(year)));
        }
        if !(1..=12).contains(&month) {
            return Err(DateError::Month(month));
        }
        let dim = days_in_month(year, month);
        if day == 0 || day > dim {
            return Err(DateError::Day {
                day,
                days_in_month: dim,
            });
        }
        Ok(PackedDate::from_parts(year, month, day))
    }

    /// Packs already-validated components.  Callers must guarantee that the
    /// date exists and that `year` is within `MIN_YEAR..=MAX_YEAR`.
    pub(crate) const fn from_parts(year: i32, month: u8, day: u8) -> PackedDate {
        #[allow(clippy::cast_sign_loss)]
        let year = (year as u32) & 0xFFFF;
        PackedDate((year << 16) | ((month as u32) << 8) | (day as u32))
    }

    pub fn year(self) -> i32 {
        let [hi, lo, _, _] = self.0.to_be_bytes();
        i32::from(u16::from_be_bytes([hi, lo]))
    }

    pub fn month(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    pub fn day(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    pub fn to_bits(self) -> u32 {
        self.0
    }

    pub fn year_month(self) -> YearMonth {
        YearMonth::for_date(self)
    }

    pub fn to_epoch_day(self) -> i64 {
        let y = i64::from(self.year());
        let m = i64::from(self.month());
        let mut total = 365 * y;
        total += (y + 3) / 4 - (y + 99) / 100 + (y + 399) / 400;
        total += (367 * m - 362) / 12;
        total += i64::from(self.day()) - 1;
        if m > 2 {
            total -= 1;
            if !is_leap_year(self.year()) {
                total -= 1;
            }
        }
        total - DAYS_0000_TO_1970
    }

    pub fn from_epoch_day(epoch_day: i64) -> Result<PackedDate, DateError> {
        if !(MIN_DATE_EPOCH..=MAX_DATE_EPOCH).contains(&epoch_day) {
            return Err(DateError::EpochDay(epoch_day));
        }
        // Work in a calendar whose years start on March 1 so that the leap
        // day is the last day of the year.
        let mut zero_day = epoch_day + DAYS_0000_TO_1970 - 60;
        let mut adjust = 0;
        if zero_day < 0 {
            let adjust_cycles = (zero_day + 1) / DAYS_PER_CYCLE - 1;
            adjust = adjust_cycles * 400;
            zero_day -= adjust_cycles * DAYS_PER_CYCLE;
        }
        let mut year_est = (400 * zero_day + 591) / DAYS_PER_CYCLE;
        let mut doy_est = zero_day - days_before_march_year(year_est);
        if doy_est < 0 {
            year_est -= 1;
            doy_est = zero_day - days_before_march_year(year_est);
        }
        year_est += adjust;
        let march_month0 = (doy_est * 5 + 2) / 153;
        let month = (march_month0 + 2) % 12 + 1;
        let day = doy_est - (march_month0 * 306 + 5) / 10 + 1;
        let year = year_est + march_month0 / 10;
        let year = i32::try_from(year).map_err(|_| DateError::Year(year))?;
        let month = u8::try_from(month).map_err(|_| DateError::EpochDay(epoch_day))?;
        let day = u8::try_from(day).map_err(|_| DateError::EpochDay(epoch_day))?;
        PackedDate::new(year, month, day)
    }

    /// Zero-based day of the week, with Monday as 0 and Sunday as 6
    pub fn day_of_week(self) -> u8 {
        self.weekday().number_days_from_monday()
    }

    pub fn weekday(self) -> Weekday {
        match (self.to_epoch_day() + 3).rem_euclid(7) {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }

    pub fn days_in_month(self) -> u8 {
        days_in_month(self.year(), self.month())
    }

    /// Adds a signed number of days.  Offsets that stay within the current
    /// month or land in one of the two adjacent months are resolved without
    /// going through the epoch-day conversion.
    pub fn plus_days(self, days: i64) -> Result<PackedDate, DateError> {
        match self.plus_days_nearby(days) {
            Some(date) => Ok(date),
            None => self.plus_days_by_epoch(days),
        }
    }

    fn plus_days_nearby(self, days: i64) -> Option<PackedDate> {
        let ym = self.year_month();
        let day = i64::from(self.day()).checked_add(days)?;
        let dim = i64::from(ym.days_in_month());
        let (ym, day) = if (1..=dim).contains(&day) {
            (ym, day)
        } else if day > dim && day <= dim + 28 {
            (ym.plus_months(1).ok()?, day - dim)
        } else if day <= 0 && day > -28 {
            let prev = ym.plus_months(-1).ok()?;
            (prev, day + i64::from(prev.days_in_month()))
        } else {
            return None;
        };
        ym.date(u8::try_from(day).ok()?).ok()
    }

    pub(crate) fn plus_days_by_epoch(self, days: i64) -> Result<PackedDate, DateError> {
        PackedDate::from_epoch_day(self.to_epoch_day().saturating_add(days))
    }

    pub fn days_until(self, other: PackedDate) -> i64 {
        other.to_epoch_day() - self.to_epoch_day()
    }
}

fn days_before_march_year(year: i64) -> i64 {
    365 * year + year / 4 - year / 100 + year / 400
}

impl fmt::Display for PackedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl From<PackedDate> for u32 {
    fn from(date: PackedDate) -> u32 {
        date.0
    }
}

impl TryFrom<u32> for PackedDate {
    type Error = DateError;

    fn try_from(bits: u32) -> Result<PackedDate, DateError> {
        let [hi, lo, month, day] = bits.to_be_bytes();
        PackedDate::new(i32::from(u16::from_be_bytes([hi, lo])), month, day)
    }
}

impl TryFrom<Date> for PackedDate {
    type Error = DateError;

    fn try_from(date: Date) -> Result<PackedDate, DateError> {
        PackedDate::new(date.year(), u8::from(date.month()), date.day())
    }
}

impl TryFrom<PackedDate> for Date {
    type Error = time::error::ComponentRange;

    fn try_from(date: PackedDate) -> Result<Date, Self::Error> {
        Date::from_calendar_date(date.year(), Month::try_from(date.month())?, date.day())
    }
}

/// An inclusive range of dates
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct PackedDateRange {
    start: PackedDate,
    end: PackedDate,
}

impl PackedDateRange {
    pub fn new(start: PackedDate, end: PackedDate) -> Result<PackedDateRange, DateError> {
        if start > end {
            Err(DateError::ReversedRange { start, end })
        } else {
            Ok(PackedDateRange { start, end })
        }
    }

    pub fn single(date: PackedDate) -> PackedDateRange {
        PackedDateRange {
            start: date,
            end: date,
        }
    }

    /// The first through last day of a month
    pub fn month(ym: YearMonth) -> PackedDateRange {
        PackedDateRange {
            start: ym.first_date(),
            end: ym.last_date(),
        }
    }

    /// The seven days shown on row `index` of the page for `ym`, which may
    /// reach into the neighbouring months
    pub fn week(
        ym: YearMonth,
        index: u8,
        first_day_of_week: Weekday,
    ) -> Result<PackedDateRange, DateError> {
        let info = YearMonthGridInfo::new(ym, first_day_of_week)?;
        let week = CellRange::week(index).map_err(|_| DateError::Week(index))?;
        Ok(info.date_range_for_cell_range(week))
    }

    pub fn start(self) -> PackedDate {
        self.start
    }

    pub fn end(self) -> PackedDate {
        self.end
    }

    pub fn contains(self, date: PackedDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_single_day(self) -> bool {
        self.start == self.end
    }

    pub fn intersection_with(self, other: PackedDateRange) -> Option<PackedDateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(PackedDateRange { start, end })
    }
}

impl fmt::Display for PackedDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} .. {}", self.start, self.end)
        }
    }
}
