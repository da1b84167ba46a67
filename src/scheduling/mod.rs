//! Scheduling core: week windows, slot occupancy and block reconciliation.
//!
//! Everything here is pure and synchronous. Remote calls, caching and
//! logging live in `services`.

pub mod occupancy;
pub mod reconcile;
pub mod week;

pub use occupancy::{GridFilter, SlotOccupancy, WeekGrid};
pub use reconcile::{find_overlaps, reconcile, summarize_weekdays, ReconcilePlan};
pub use week::{monday_on_or_before, WeekDay, WeekWindow};
