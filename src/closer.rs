// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Close selected branches (or report them in dry-run) and restore the starting state
// role: processing/orchestrator
// inputs: EffectiveConfig, CurrentBranch snapshot, ordered stale candidates, effective now
// outputs: CloseReport with one record per candidate and the restoration outcome
// side_effects: hg update/branch/commit per candidate; renames subrepo tracking files aside and back
// invariants:
// - dry-run performs zero mutating hg invocations
// - one candidate's failure never aborts the batch
// - restoration of the original branch is attempted regardless of per-branch outcomes
// errors: per-step failures become warnings + skipped records, never process errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::EffectiveConfig;
use crate::hgio;
use crate::model::{BranchRef, CloseOutcome, CloseRecord, CloseStep, CurrentBranch};
use crate::util;

pub struct CloseReport {
  pub records: Vec<CloseRecord>,
  /// None in dry-run; Some(false) when the original branch or the
  /// renamed-aside files could not be put back.
  pub restored: Option<bool>,
}

/// Committing with "exclude everything" would rewrite these if a subrepo
/// is configured; they are moved aside for the duration of the closing
/// phase.
const SUBREPO_FILES: [&str; 2] = [".hgsub", ".hgsubstate"];

pub fn close_branches(
  cfg: &EffectiveConfig,
  current: &CurrentBranch,
  candidates: &[BranchRef],
  now: DateTime<Utc>,
) -> CloseReport {
  if !cfg.perform_changes {
    let records = candidates
      .iter()
      .map(|b| record(b, now, CloseOutcome::WouldClose, None, None))
      .collect();
    return CloseReport { records, restored: None };
  }

  let stashed = stash_subrepo_state(Path::new(&cfg.repo_root));

  let mut records = Vec::with_capacity(candidates.len());
  for branch in candidates {
    records.push(close_one(&cfg.repo_root, branch, now));
  }

  let mut restored = restore_current(&cfg.repo_root, current);
  if !unstash_subrepo_state(&stashed) {
    restored = false;
  }

  CloseReport { records, restored: Some(restored) }
}

fn close_one(repo: &str, branch: &BranchRef, now: DateTime<Utc>) -> CloseRecord {
  if let Err(e) = hgio::update_to(repo, &branch.node) {
    eprintln!("[close] update to {} ('{}') failed: {:#}", branch.node, branch.name, e);
    return record(branch, now, CloseOutcome::Skipped, Some(CloseStep::Update), Some(e));
  }

  if let Err(e) = hgio::mark_branch(repo, &branch.name) {
    eprintln!("[close] re-declaring branch '{}' failed: {:#}", branch.name, e);
    return record(branch, now, CloseOutcome::Skipped, Some(CloseStep::MarkBranch), Some(e));
  }

  let message = format!(
    "The branch was not used for {} days and closed automatically.",
    util::age_days(now, branch.last_activity)
  );
  if let Err(e) = hgio::close_commit(repo, &message) {
    eprintln!("[close] closing commit on '{}' failed: {:#}", branch.name, e);
    return record(branch, now, CloseOutcome::Skipped, Some(CloseStep::Commit), Some(e));
  }

  record(branch, now, CloseOutcome::Closed, None, None)
}

fn record(
  branch: &BranchRef,
  now: DateTime<Utc>,
  outcome: CloseOutcome,
  failed_step: Option<CloseStep>,
  error: Option<anyhow::Error>,
) -> CloseRecord {
  CloseRecord {
    branch: branch.name.clone(),
    node: branch.node.clone(),
    last_activity: util::iso_utc(branch.last_activity),
    age_days: util::age_days(now, branch.last_activity),
    outcome,
    failed_step,
    error: error.map(|e| format!("{:#}", e)),
  }
}

/// Put the working directory back on the branch that was active when the
/// run started. Failure leaves the repository needing manual correction,
/// so it is surfaced loudly.
fn restore_current(repo: &str, current: &CurrentBranch) -> bool {
  let mut ok = true;
  if let Err(e) = hgio::update_to(repo, &current.node) {
    eprintln!(
      "[restore] could not update back to {} ('{}'): {:#}",
      current.node, current.name, e
    );
    ok = false;
  }
  if let Err(e) = hgio::mark_branch(repo, &current.name) {
    eprintln!("[restore] could not re-declare branch '{}': {:#}", current.name, e);
    ok = false;
  }
  if !ok {
    eprintln!("[restore] repository left on an unexpected branch; fix it manually with 'hg update'");
  }
  ok
}

fn stash_subrepo_state(root: &Path) -> Vec<(PathBuf, PathBuf)> {
  let mut moved = Vec::new();
  for name in SUBREPO_FILES {
    let orig = root.join(name);
    if !orig.exists() {
      continue;
    }
    let aside = root.join(format!("{name}.tmp"));
    match std::fs::rename(&orig, &aside) {
      Ok(()) => moved.push((orig, aside)),
      Err(e) => eprintln!("[close] could not move {} aside: {}", orig.display(), e),
    }
  }
  moved
}

fn unstash_subrepo_state(moved: &[(PathBuf, PathBuf)]) -> bool {
  let mut ok = true;
  for (orig, aside) in moved {
    if let Err(e) = std::fs::rename(aside, orig) {
      eprintln!(
        "[restore] could not move {} back to {}: {}",
        aside.display(),
        orig.display(),
        e
      );
      ok = false;
    }
  }
  ok
}
