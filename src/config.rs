use crate::animation::{Interpolator, DEFAULT_HOVER_DURATION, DEFAULT_SELECTION_DURATION};
use crate::date::{DateError, PackedDate};
use crate::selection::{ClickOnCellBehavior, SelectionType};
use crate::yearmonth::YearMonth;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use time::Weekday;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    #[error("minimum date {min} is after maximum date {max}")]
    MinAfterMax { min: PackedDate, max: PackedDate },
    #[error("month {month} is outside the enabled months {min} through {max}")]
    MonthOutOfRange {
        month: YearMonth,
        min: YearMonth,
        max: YearMonth,
    },
    #[error("month cannot be laid out: {0}")]
    EdgeOfTime(#[from] DateError),
}

/// Which kinds of selection the user may make
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct AllowedSelectionTypes {
    pub cell: bool,
    pub week: bool,
    pub month: bool,
    pub custom: bool,
}

impl AllowedSelectionTypes {
    pub const ALL: AllowedSelectionTypes = AllowedSelectionTypes {
        cell: true,
        week: true,
        month: true,
        custom: true,
    };

    pub const NONE: AllowedSelectionTypes = AllowedSelectionTypes {
        cell: false,
        week: false,
        month: false,
        custom: false,
    };

    pub fn allows(&self, kind: SelectionType) -> bool {
        match kind {
            SelectionType::None => true,
            SelectionType::Cell => self.cell,
            SelectionType::Week => self.week,
            SelectionType::Month => self.month,
            SelectionType::Custom => self.custom,
        }
    }

    #[must_use]
    pub fn with(mut self, kind: SelectionType, allowed: bool) -> Self {
        match kind {
            SelectionType::None => (),
            SelectionType::Cell => self.cell = allowed,
            SelectionType::Week => self.week = allowed,
            SelectionType::Month => self.month = allowed,
            SelectionType::Custom => self.custom = allowed,
        }
        self
    }
}

impl Default for AllowedSelectionTypes {
    fn default() -> AllowedSelectionTypes {
        AllowedSelectionTypes::ALL
    }
}

/// Settings shared by every page of a [`RangeCalendar`](crate::calendar::RangeCalendar)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CalendarConfig {
    pub min_date: PackedDate,
    pub max_date: PackedDate,
    pub show_adjacent_months: bool,
    pub first_day_of_week: Weekday,
    pub click_on_selected_cell: ClickOnCellBehavior,
    pub allowed_types: AllowedSelectionTypes,
    /// Whether selection changes made through the calendar animate
    pub selection_animated: bool,
    pub selection_animation_duration: Duration,
    pub hover_animation_duration: Duration,
    pub interpolator: Interpolator,
}

impl Default for CalendarConfig {
    fn default() -> CalendarConfig {
        CalendarConfig {
            min_date: PackedDate::MIN,
            max_date: PackedDate::MAX,
            show_adjacent_months: true,
            first_day_of_week: Weekday::Monday,
            click_on_selected_cell: ClickOnCellBehavior::default(),
            allowed_types: AllowedSelectionTypes::ALL,
            selection_animated: true,
            selection_animation_duration: DEFAULT_SELECTION_DURATION,
            hover_animation_duration: DEFAULT_HOVER_DURATION,
            interpolator: Interpolator::default(),
        }
    }
}

impl CalendarConfig {
    pub fn new() -> CalendarConfig {
        CalendarConfig::default()
    }

    pub fn min_date(mut self, date: PackedDate) -> Self {
        self.min_date = date;
        self
    }

    pub fn max_date(mut self, date: PackedDate) -> Self {
        self.max_date = date;
        self
    }

    pub fn show_adjacent_months(mut self, show: bool) -> Self {
        self.show_adjacent_months = show;
        self
    }

    pub fn first_day_of_week(mut self, weekday: Weekday) -> Self {
        self.first_day_of_week = weekday;
        self
    }

    pub fn click_on_selected_cell(mut self, behavior: ClickOnCellBehavior) -> Self {
        self.click_on_selected_cell = behavior;
        self
    }

    pub fn allowed_types(mut self, allowed: AllowedSelectionTypes) -> Self {
        self.allowed_types = allowed;
        self
    }

    pub fn selection_animated(mut self, animated: bool) -> Self {
        self.selection_animated = animated;
        self
    }

    pub fn selection_animation_duration(mut self, duration: Duration) -> Self {
        self.selection_animation_duration = duration;
        self
    }

    pub fn hover_animation_duration(mut self, duration: Duration) -> Self {
        self.hover_animation_duration = duration;
        self
    }

    pub fn interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_date > self.max_date {
            return Err(ConfigError::MinAfterMax {
                min: self.min_date,
                max: self.max_date,
            });
        }
        Ok(())
    }

    /// The first and last months containing enabled dates
    pub fn month_bounds(&self) -> (YearMonth, YearMonth) {
        (self.min_date.year_month(), self.max_date.year_month())
    }

    pub fn check_month(&self, month: YearMonth) -> Result<(), ConfigError> {
        let (min, max) = self.month_bounds();
        if month < min || month > max {
            Err(ConfigError::MonthOutOfRange { month, min, max })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u8, day: u8) -> PackedDate {
        PackedDate::new(year, month, day).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = CalendarConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.first_day_of_week, Weekday::Monday);
        assert_eq!(config.selection_animation_duration, Duration::from_millis(250));
        assert_eq!(config.hover_animation_duration, Duration::from_millis(100));
        assert_eq!(config.allowed_types, AllowedSelectionTypes::ALL);
        assert!(config.show_adjacent_months);
    }

    #[test]
    fn test_min_after_max() {
        let config = CalendarConfig::new()
            .min_date(ymd(2024, 3, 1))
            .max_date(ymd(2024, 2, 1));
        assert_eq!(
            config.validate(),
            Err(ConfigError::MinAfterMax {
                min: ymd(2024, 3, 1),
                max: ymd(2024, 2, 1)
            })
        );
    }

    #[test]
    fn test_check_month() {
        let config = CalendarConfig::new()
            .min_date(ymd(2024, 1, 15))
            .max_date(ymd(2024, 6, 1));
        assert!(config.check_month(YearMonth::new(2024, 1).unwrap()).is_ok());
        assert!(config.check_month(YearMonth::new(2024, 6).unwrap()).is_ok());
        assert!(config.check_month(YearMonth::new(2023, 12).unwrap()).is_err());
        assert!(config.check_month(YearMonth::new(2024, 7).unwrap()).is_err());
    }

    #[test]
    fn test_allowed_types() {
        let allowed = AllowedSelectionTypes::ALL.with(SelectionType::Week, false);
        assert!(allowed.allows(SelectionType::Cell));
        assert!(!allowed.allows(SelectionType::Week));
        assert!(allowed.allows(SelectionType::None));
        assert!(!AllowedSelectionTypes::NONE.allows(SelectionType::Custom));
        let json = serde_json::to_string(&allowed).unwrap();
        assert_eq!(
            json,
            r#"{"cell":true,"week":false,"month":true,"custom":true}"#
        );
    }
}
