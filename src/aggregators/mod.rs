//! Grouped reductions and layout behind the dashboard views.
//!
//! Every function here is a pure function of a [`Dataset`](crate::dataset::Dataset):
//! weekday shares per year, monthly and yearly totals, municipality
//! rankings, year-over-year weekday deltas and the synthetic placement of
//! the label cloud and map views.

pub mod aggregate;
pub mod placement;
pub mod report;
pub mod types;
pub mod utility;
