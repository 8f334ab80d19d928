use crate::date::{days_in_month, DateError, PackedDate, MAX_YEAR, MIN_YEAR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, stored as the number of months since January of year 0
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct YearMonth(i32);

impl YearMonth {
    pub const MIN: YearMonth = YearMonth(MIN_YEAR * 12);
    pub const MAX: YearMonth = YearMonth(MAX_YEAR * 12 + 11);

    pub fn new(year: i32, month: u8) -> Result<YearMonth, DateError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateError::Year(i64::from(year)));
        }
        if !(1..=12).contains(&month) {
            return Err(DateError::Month(month));
        }
        Ok(YearMonth(year * 12 + i32::from(month) - 1))
    }

    pub fn for_date(date: PackedDate) -> YearMonth {
        YearMonth(date.year() * 12 + i32::from(date.month()) - 1)
    }

    pub fn from_total_months(total: i32) -> Result<YearMonth, DateError> {
        let ym = YearMonth(total);
        if (YearMonth::MIN..=YearMonth::MAX).contains(&ym) {
            Ok(ym)
        } else {
            Err(DateError::Year(i64::from(total.div_euclid(12))))
        }
    }

    pub fn total_months(self) -> i32 {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0 / 12
    }

    pub fn month(self) -> u8 {
        match u8::try_from(self.0 % 12) {
            Ok(m) => m + 1,
            Err(_) => unreachable!("month index of a non-negative total should be in 0..12"),
        }
    }

    pub fn plus_months(self, months: i32) -> Result<YearMonth, DateError> {
        match self.0.checked_add(months) {
            Some(total) => YearMonth::from_total_months(total),
            None => Err(DateError::Year(
                i64::from(self.0).saturating_add(i64::from(months)) / 12,
            )),
        }
    }

    /// Number of months from `self` to `other`; negative if `other` is
    /// earlier.
    pub fn months_until(self, other: YearMonth) -> i32 {
        other.0 - self.0
    }

    pub fn days_in_month(self) -> u8 {
        days_in_month(self.year(), self.month())
    }

    pub fn date(self, day: u8) -> Result<PackedDate, DateError> {
        PackedDate::new(self.year(), self.month(), day)
    }

    pub fn first_date(self) -> PackedDate {
        PackedDate::from_parts(self.year(), self.month(), 1)
    }

    pub fn last_date(self) -> PackedDate {
        PackedDate::from_parts(self.year(), self.month(), self.days_in_month())
    }

    pub fn contains(self, date: PackedDate) -> bool {
        YearMonth::for_date(date) == self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl From<YearMonth> for i32 {
    fn from(ym: YearMonth) -> i32 {
        ym.0
    }
}

impl TryFrom<i32> for YearMonth {
    type Error = DateError;

    fn try_from(total: i32) -> Result<YearMonth, DateError> {
        YearMonth::from_total_months(total)
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseYearMonthError {
    #[error("expected a month in the form YYYY-MM, got {0:?}")]
    Syntax(String),
    #[error(transparent)]
    Range(#[from] DateError),
}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<YearMonth, ParseYearMonthError> {
        let syntax = || ParseYearMonthError::Syntax(s.to_owned());
        let (year, month) = s.split_once('-').ok_or_else(syntax)?;
        if year.is_empty()
            || month.len() != 2
            || !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(syntax());
        }
        let year = year.parse::<i32>().map_err(|_| syntax())?;
        let month = month.parse::<u8>().map_err(|_| syntax())?;
        Ok(YearMonth::new(year, month)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let ym = YearMonth::new(2024, 2).unwrap();
        assert_eq!(ym.year(), 2024);
        assert_eq!(ym.month(), 2);
        assert_eq!(ym.total_months(), 2024 * 12 + 1);
        assert_eq!(ym.days_in_month(), 29);
        assert_eq!(ym.to_string(), "2024-02");
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(YearMonth::new(2024, 0), Err(DateError::Month(0)));
        assert_eq!(YearMonth::new(2024, 13), Err(DateError::Month(13)));
        assert_eq!(YearMonth::new(-5, 1), Err(DateError::Year(-5)));
        assert_eq!(YearMonth::new(65536, 1), Err(DateError::Year(65536)));
    }

    #[test]
    fn test_plus_months() {
        let ym = YearMonth::new(2024, 11).unwrap();
        assert_eq!(ym.plus_months(1), YearMonth::new(2024, 12));
        assert_eq!(ym.plus_months(2), YearMonth::new(2025, 1));
        assert_eq!(ym.plus_months(-11), YearMonth::new(2023, 12));
        assert_eq!(ym.plus_months(-23), YearMonth::new(2022, 12));
        assert!(YearMonth::MIN.plus_months(-1).is_err());
        assert!(YearMonth::MAX.plus_months(1).is_err());
        assert!(ym.plus_months(i32::MAX).is_err());
    }

    #[test]
    fn test_months_until() {
        let a = YearMonth::new(2023, 11).unwrap();
        let b = YearMonth::new(2024, 2).unwrap();
        assert_eq!(a.months_until(b), 3);
        assert_eq!(b.months_until(a), -3);
        assert!(a < b);
    }

    #[test]
    fn test_dates() {
        let ym = YearMonth::new(2023, 2).unwrap();
        assert_eq!(ym.first_date(), PackedDate::new(2023, 2, 1).unwrap());
        assert_eq!(ym.last_date(), PackedDate::new(2023, 2, 28).unwrap());
        assert!(ym.date(29).is_err());
        assert!(ym.contains(PackedDate::new(2023, 2, 14).unwrap()));
        assert!(!ym.contains(PackedDate::new(2024, 2, 14).unwrap()));
        assert_eq!(YearMonth::for_date(ym.last_date()), ym);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2024-02".parse::<YearMonth>(), Ok(YearMonth::new(2024, 2).unwrap()));
        assert_eq!("0987-12".parse::<YearMonth>(), Ok(YearMonth::new(987, 12).unwrap()));
        assert_eq!(
            "2024-2".parse::<YearMonth>(),
            Err(ParseYearMonthError::Syntax(String::from("2024-2")))
        );
        assert_eq!(
            "2024-13".parse::<YearMonth>(),
            Err(ParseYearMonthError::Range(DateError::Month(13)))
        );
        assert!("-2024-01".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
    }
}
