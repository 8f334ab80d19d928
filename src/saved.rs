use crate::date::{DateError, PackedDate, PackedDateRange};
use crate::selection::SelectionType;
use crate::yearmonth::YearMonth;
use serde::{Deserialize, Serialize};

/// What a [`RangeCalendar`](crate::calendar::RangeCalendar) needs to come
/// back to where it was: the month on display and the selection, if any
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SavedState {
    pub year_month: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SavedSelection>,
}

/// A selection resolved to dates.  The dates are stored as their packed
/// `u32` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SavedSelection {
    /// The month whose page holds the selection
    pub year_month: YearMonth,
    pub kind: SelectionType,
    pub start: PackedDate,
    pub end: PackedDate,
}

impl SavedSelection {
    pub fn range(&self) -> Result<PackedDateRange, DateError> {
        PackedDateRange::new(self.start, self.end)
    }
}
