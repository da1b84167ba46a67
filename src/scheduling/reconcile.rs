//! Reconciliation of a barber's weekly schedule blocks.
//!
//! Identity is the persisted id and nothing else:
//! - persisted blocks whose id is absent from the desired set are deleted,
//! - desired blocks without an id are created,
//! - desired blocks with an id are updated, changed or not.
//!
//! This is a set-membership diff, not a content diff. Applying the plan
//! once converges storage to the desired set.

use std::collections::{BTreeSet, HashSet};

use crate::models::{ScheduleBlock, Weekday};

/// Label used when a barber has no blocks
pub const EMPTY_SUMMARY: &str = "Sin horario";

/// Number of weekdays listed in full before truncating the summary
const SUMMARY_FULL_LIMIT: usize = 3;

/// Partitioned operations that converge persisted blocks to the desired set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_create: Vec<ScheduleBlock>,
    pub to_update: Vec<ScheduleBlock>,
    pub to_delete: Vec<ScheduleBlock>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Compute the create/update/delete partition for one barber.
///
/// Persisted entries without an id cannot be addressed in storage and are
/// ignored on the delete side.
pub fn reconcile(persisted: &[ScheduleBlock], desired: &[ScheduleBlock]) -> ReconcilePlan {
    let kept_ids: HashSet<i32> = desired.iter().filter_map(|b| b.id).collect();

    let to_delete = persisted
        .iter()
        .filter(|b| matches!(b.id, Some(id) if !kept_ids.contains(&id)))
        .cloned()
        .collect();

    let (to_update, to_create): (Vec<_>, Vec<_>) =
        desired.iter().cloned().partition(|b| b.is_persisted());

    ReconcilePlan {
        to_create,
        to_update,
        to_delete,
    }
}

/// Index pairs of active blocks that overlap on the same weekday
pub fn find_overlaps(blocks: &[ScheduleBlock]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in blocks.iter().enumerate() {
        if !a.active {
            continue;
        }
        for (j, b) in blocks.iter().enumerate().skip(i + 1) {
            if b.active && a.overlaps(b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Short label for the distinct weekdays of a block set.
///
/// Up to three weekdays are listed in full; beyond that the first two are
/// shown followed by the remaining count.
pub fn summarize_weekdays(blocks: &[ScheduleBlock]) -> String {
    let days: Vec<Weekday> = blocks
        .iter()
        .map(|b| b.weekday)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if days.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    if days.len() <= SUMMARY_FULL_LIMIT {
        return days.iter().map(|d| d.label()).collect::<Vec<_>>().join(", ");
    }

    format!("{}, {} +{} más", days[0].label(), days[1].label(), days.len() - 2)
}
