use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod closer;
mod decode;
mod hgio;
mod ignore;
mod model;
mod select;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI, locate the repository, probe the tool
  let cfg = normalize(cli)?;
  hgio::version(&cfg.repo_root).context("checking the hg executable (is Mercurial installed?)")?;

  // Phase 2: scan the current branch and every branch head
  let now = util::effective_now(util::parse_now_override(cfg.now_override.as_deref()));
  let current = hgio::current_branch(&cfg.repo_root)?;
  let heads = hgio::branch_heads(&cfg.repo_root)?;

  // Phase 3: resolve ignore patterns and pick the stale candidates
  let ignores = ignore::IgnoreSet::build(&cfg.ignore_branches, std::path::Path::new(&cfg.repo_root))?;
  let names: Vec<&str> = heads.iter().map(|b| b.name.as_str()).collect();
  let patterns = ignores.diagnostics(&names);
  let candidates = select::select_stale(&heads, &ignores, cfg.grace_days, now);

  // Phase 4: close (or report) and restore the starting branch
  let report = closer::close_branches(&cfg, &current, &candidates, now);

  let summary = model::RunSummary {
    repo: cfg.repo_root.clone(),
    mode: if cfg.perform_changes { "apply".into() } else { "dry-run".into() },
    grace_days: cfg.grace_days,
    heads_scanned: heads.len(),
    patterns,
    candidates: report.records,
    restored: report.restored,
  };
  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}
