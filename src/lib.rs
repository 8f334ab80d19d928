//! Month pages with range selection: bit-packed dates, a 7x6 cell grid, a
//! selection state machine that answers every request with an
//! [`AcceptanceStatus`](selection::AcceptanceStatus), and the geometry and
//! transitions needed to draw a selection as it changes.
pub mod animation;
pub mod calendar;
pub mod cell;
pub mod config;
pub mod date;
pub mod grid;
pub mod measure;
pub mod page;
pub mod saved;
pub mod selection;
pub mod yearmonth;
