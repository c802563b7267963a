//! Ignore filter: protects branches whose names match operator-supplied
//! glob patterns from ever being closed.
//!
//! Patterns come from three sources, appended in order and never
//! deduplicated: CLI arguments, an optional `.close_old_branches_ignore`
//! next to the executable, and an optional one at the repository root.
//! Files hold one pattern per line; blank lines are skipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::PatternDiag;

pub const IGNORE_FILE_NAME: &str = ".close_old_branches_ignore";

#[derive(Debug)]
struct IgnorePattern {
  raw: String,
  source: &'static str,
  re: Regex,
}

#[derive(Debug, Default)]
pub struct IgnoreSet {
  patterns: Vec<IgnorePattern>,
}

impl IgnoreSet {
  pub fn build(cli_patterns: &[String], repo_root: &Path) -> Result<IgnoreSet> {
    let mut set = IgnoreSet::default();
    for p in cli_patterns {
      set.push(p, "cli")?;
    }
    if let Some(dir) = tool_dir() {
      set.load_file(&dir.join(IGNORE_FILE_NAME), "tool-dir file")?;
    }
    set.load_file(&repo_root.join(IGNORE_FILE_NAME), "repo file")?;
    Ok(set)
  }

  fn push(&mut self, raw: &str, source: &'static str) -> Result<()> {
    let re = glob_to_regex(raw).with_context(|| format!("compiling ignore pattern {:?}", raw))?;
    self.patterns.push(IgnorePattern { raw: raw.to_string(), source, re });
    Ok(())
  }

  fn load_file(&mut self, path: &Path, source: &'static str) -> Result<()> {
    let Ok(text) = std::fs::read_to_string(path) else {
      return Ok(());
    };
    for line in text.lines() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      self.push(line, source)?;
    }
    Ok(())
  }

  /// A branch is excluded when its name matches any pattern.
  pub fn is_ignored(&self, name: &str) -> bool {
    self.patterns.iter().any(|p| p.re.is_match(name))
  }

  pub fn len(&self) -> usize {
    self.patterns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  /// Match counts per pattern against the scanned branch names. A pattern
  /// matching nothing is usually a typo or a stale config entry; warn,
  /// but keep going.
  pub fn diagnostics(&self, names: &[&str]) -> Vec<PatternDiag> {
    self
      .patterns
      .iter()
      .map(|p| {
        let matches = names.iter().filter(|n| p.re.is_match(n)).count();
        if matches == 0 {
          eprintln!("[ignore] pattern {:?} ({}) matched no branch", p.raw, p.source);
        }
        PatternDiag {
          pattern: p.raw.clone(),
          source: p.source.to_string(),
          matches,
        }
      })
      .collect()
  }
}

fn tool_dir() -> Option<PathBuf> {
  std::env::current_exe().ok()?.parent().map(Path::to_path_buf)
}

/// Compile a glob into an anchored, case-sensitive regex: `*` matches any
/// run of characters, `?` exactly one, everything else is literal.
fn glob_to_regex(glob: &str) -> Result<Regex> {
  let mut re = String::with_capacity(glob.len() + 8);
  re.push('^');
  for ch in glob.chars() {
    match ch {
      '*' => re.push_str(".*"),
      '?' => re.push('.'),
      _ => re.push_str(&regex::escape(&ch.to_string())),
    }
  }
  re.push('$');
  Ok(Regex::new(&re)?)
}
