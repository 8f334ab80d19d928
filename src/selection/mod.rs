pub mod manager;
pub mod renderer;
pub mod shape;
pub mod transition;
pub mod visual;
pub use self::manager::{CellSelectionEvent, RequestContext, SelectionBounds, SelectionManager};
pub use self::renderer::{Canvas, DefaultSelectionRenderer, SelectionRenderer};
pub use self::shape::{CornerRadii, RangeOutline, RoundRect, SelectionShape};
pub use self::transition::{DrawOp, SelectionFrame, Transition, TransitionKind};
pub use self::visual::VisualState;
use crate::cell::{Cell, CellRange};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    #[default]
    None,
    Cell,
    Week,
    Month,
    Custom,
}

impl fmt::Display for SelectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectionType::None => "none",
            SelectionType::Cell => "cell",
            SelectionType::Week => "week",
            SelectionType::Month => "month",
            SelectionType::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// What a page currently has selected, in cells
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectionState {
    #[default]
    None,
    Cell(Cell),
    /// Part of one row; narrower than seven cells when some of the row is
    /// disabled
    Week(CellRange),
    Month(CellRange),
    Custom(CellRange),
}

impl SelectionState {
    /// Builds a state of the given kind covering `range`.  A cell state takes
    /// the start of the range.
    pub fn new(kind: SelectionType, range: CellRange) -> SelectionState {
        match kind {
            SelectionType::None => SelectionState::None,
            SelectionType::Cell => SelectionState::Cell(range.start()),
            SelectionType::Week => SelectionState::Week(range),
            SelectionType::Month => SelectionState::Month(range),
            SelectionType::Custom => SelectionState::Custom(range),
        }
    }

    pub fn kind(&self) -> SelectionType {
        match self {
            SelectionState::None => SelectionType::None,
            SelectionState::Cell(_) => SelectionType::Cell,
            SelectionState::Week(_) => SelectionType::Week,
            SelectionState::Month(_) => SelectionType::Month,
            SelectionState::Custom(_) => SelectionType::Custom,
        }
    }

    pub fn range(&self) -> Option<CellRange> {
        match *self {
            SelectionState::None => None,
            SelectionState::Cell(cell) => Some(CellRange::single(cell)),
            SelectionState::Week(range)
            | SelectionState::Month(range)
            | SelectionState::Custom(range) => Some(range),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SelectionState::None)
    }
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionState::None => write!(f, "none"),
            SelectionState::Cell(cell) => write!(f, "cell {cell}"),
            other => match other.range() {
                Some(range) => write!(f, "{} {range}", other.kind()),
                None => write!(f, "{}", other.kind()),
            },
        }
    }
}

/// Outcome of a selection request
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AcceptanceStatus {
    /// The selection changed
    Accepted,
    /// The request resolved to exactly what was already selected
    AcceptedSameRange,
    Rejected,
}

impl AcceptanceStatus {
    pub fn is_accepted(self) -> bool {
        self != AcceptanceStatus::Rejected
    }
}

/// What happens when the user clicks the cell that is already selected
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum ClickOnCellBehavior {
    #[default]
    Ignore,
    Clear,
}

/// What happens to the existing selection when a request is rejected
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum RejectedBehavior {
    #[default]
    PreserveCurrent,
    ClearCurrent,
}

/// How a selection request came about
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectionGesture {
    /// A single click or tap on a cell
    Click,
    /// The long press that starts selecting a range by dragging
    LongPress,
    /// Dragging after a long press, or a request made in code
    #[default]
    Other,
}

/// A veto over selection requests, expressed in cells.  Closures taking the
/// kind and range can be used directly.
pub trait CellGate {
    fn allows(&self, kind: SelectionType, range: CellRange) -> bool;
}

impl<F: Fn(SelectionType, CellRange) -> bool> CellGate for F {
    fn allows(&self, kind: SelectionType, range: CellRange) -> bool {
        self(kind, range)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AllowAllCells;

impl CellGate for AllowAllCells {
    fn allows(&self, _kind: SelectionType, _range: CellRange) -> bool {
        true
    }
}
