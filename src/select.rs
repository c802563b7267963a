//! Stale selector: age filter, ignore exclusion, oldest-first ordering.

use chrono::{DateTime, Utc};

use crate::ignore::IgnoreSet;
use crate::model::BranchRef;

/// Pick the branches to close: inactive strictly longer than the grace
/// period and not protected by any ignore pattern, sorted ascending by
/// last activity so the run works from the most clearly abandoned branch
/// toward the threshold. The current branch gets no special treatment; if
/// it is stale and unignored it is a candidate like any other.
pub fn select_stale(
  heads: &[BranchRef],
  ignores: &IgnoreSet,
  grace_days: u32,
  now: DateTime<Utc>,
) -> Vec<BranchRef> {
  let threshold_secs = i64::from(grace_days) * 86_400;
  let mut stale: Vec<BranchRef> = heads
    .iter()
    .filter(|b| now.timestamp() - b.last_activity > threshold_secs)
    .filter(|b| !ignores.is_ignored(&b.name))
    .cloned()
    .collect();
  stale.sort_by_key(|b| b.last_activity);
  stale
}
