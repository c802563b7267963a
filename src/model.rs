// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the data model (branch heads, close records, pattern diagnostics, run summary)
// role: model/types
// outputs: Serializable structs with stable field names and optional failure fields
// invariants: BranchRef is never mutated after the scan; optional fields are skipped when absent
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// One branch head as reported by the scan. Multiple heads may share a
/// branch name; each head is its own record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BranchRef {
  pub name: String,
  pub node: String,
  /// Unix epoch seconds of the head commit.
  pub last_activity: i64,
}

/// Snapshot of the active branch taken before any mutation. The closer
/// restores exactly this at the end of an apply run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentBranch {
  pub name: String,
  pub node: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CloseStep {
  Update,
  MarkBranch,
  Commit,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CloseOutcome {
  WouldClose,
  Closed,
  Skipped,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CloseRecord {
  pub branch: String,
  pub node: String,
  pub last_activity: String,
  pub age_days: i64,
  pub outcome: CloseOutcome,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failed_step: Option<CloseStep>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PatternDiag {
  pub pattern: String,
  pub source: String,
  pub matches: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
  pub repo: String,
  pub mode: String,
  pub grace_days: u32,
  pub heads_scanned: usize,
  pub patterns: Vec<PatternDiag>,
  pub candidates: Vec<CloseRecord>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub restored: Option<bool>,
}
