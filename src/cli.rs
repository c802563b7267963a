use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "close-old-branches",
    version,
    about = "Close stale Mercurial branches after a grace period (dry-run by default)",
    long_about = None
)]
pub struct Cli {
  /// Directory to start repository discovery from (default: current dir)
  #[arg(long, default_value = ".")]
  pub repo: PathBuf,

  /// Actually close branches; without this flag the run only reports
  #[arg(short = 'p', long = "perform-changes", alias = "performChanges")]
  pub perform_changes: bool,

  /// Glob pattern for branch names that must never be closed (repeatable)
  #[arg(
    short = 'i',
    long = "ignore-branches",
    alias = "ignoreBranches",
    value_name = "PATTERN"
  )]
  pub ignore_branches: Vec<String>,

  /// Days a branch may stay inactive before it counts as stale
  #[arg(
    short = 'g',
    long = "grace-days",
    alias = "graceDays",
    value_name = "DAYS",
    default_value_t = 60,
    value_parser = clap::value_parser!(u32).range(1..=65536)
  )]
  pub grace_days: u32,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for staleness checks (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

/// Everything downstream phases need, resolved up front. The scanner and
/// closer receive this explicitly instead of reading ambient process
/// state.
#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub repo_root: String, // absolute path for stability
  pub perform_changes: bool,
  pub ignore_branches: Vec<String>,
  pub grace_days: u32,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let repo_root = util::find_repo_root(&cli.repo)?;

  Ok(EffectiveConfig {
    repo_root: util::canonicalize_lossy(&repo_root),
    perform_changes: cli.perform_changes,
    ignore_branches: cli.ignore_branches,
    grace_days: cli.grace_days,
    now_override: cli.now_override,
  })
}
