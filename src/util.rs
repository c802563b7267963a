// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for subprocess invocation, path handling, time arithmetic, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, repository roots, truncated ages, man page text
// side_effects: run_hg invokes subprocesses
// invariants:
// - find_repo_root ascends at most MAX_ASCENT levels and never recurses
// - age_days truncates toward zero, never rounds up
// - escape_quotes leaves quote-free names unchanged
// errors: run_hg surfaces command + stderr; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

pub fn run_hg(repo: &str, args: &[String]) -> Result<String> {
  let out = Command::new("hg")
    .args(args)
    .current_dir(repo)
    .output()
    .with_context(|| format!("spawning hg {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("hg {:?} failed: {}", args, stderr)
  }
}

/// Upper bound on the ascent toward `.hg`; malformed filesystem layouts
/// (cyclic bind mounts and the like) must not walk forever.
const MAX_ASCENT: usize = 64;

/// Locate the repository root at or above `start`.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
  let start = std::fs::canonicalize(start)
    .with_context(|| format!("repository search root {:?} is not accessible", start))?;
  let mut dir = start.clone();
  for _ in 0..MAX_ASCENT {
    if dir.join(".hg").is_dir() {
      return Ok(dir);
    }
    match dir.parent() {
      Some(parent) => dir = parent.to_path_buf(),
      None => break,
    }
  }
  anyhow::bail!("no Mercurial repository found at or above {}", start.display())
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise the
/// current time is used. Centralizes our handling of test determinism
/// without sprinkling `Utc::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Parse a `--now-override` string.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`, read as UTC.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Utc>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .map(|ndt| Utc.from_utc_datetime(&ndt))
      })
  })
}

/// Whole days of inactivity, truncated: 61 days 23 hours is 61.
pub fn age_days(now: DateTime<Utc>, epoch: i64) -> i64 {
  (now.timestamp() - epoch) / 86_400
}

/// Escape quote characters in a branch name before it travels into hg.
pub fn escape_quotes(name: &str) -> String {
  name.replace('"', "\\\"")
}

/// Formats a Unix epoch timestamp into an RFC3339 string in UTC.
pub fn iso_utc(epoch: i64) -> String {
  match Utc.timestamp_opt(epoch, 0).single() {
    Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    None => epoch.to_string(),
  }
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn canonicalize_returns_abs_path() {
    let abs = canonicalize_lossy(".");
    assert!(abs.starts_with('/'));
  }

  #[test]
  fn run_hg_failure_is_error() {
    let err = run_hg(".", &["definitely-not-a-real-subcommand".into()]).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("hg"));
  }

  #[test]
  fn find_repo_root_ascends_to_dot_hg() {
    let td = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(td.path().join(".hg")).unwrap();
    let nested = td.path().join("a/b/c");
    std::fs::create_dir_all(&nested).unwrap();
    let root = find_repo_root(&nested).expect("root");
    assert_eq!(root, std::fs::canonicalize(td.path()).unwrap());
  }

  #[test]
  fn find_repo_root_fails_without_dot_hg() {
    let td = tempfile::TempDir::new().unwrap();
    let err = find_repo_root(td.path()).unwrap_err();
    assert!(format!("{err}").contains("no Mercurial repository"));
  }

  #[test]
  fn age_days_truncates() {
    let now = Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).single().unwrap();
    // 61 days and 23 hours ago
    let epoch = now.timestamp() - (61 * 86_400 + 23 * 3_600);
    assert_eq!(age_days(now, epoch), 61);
    // exactly 200 days
    assert_eq!(age_days(now, now.timestamp() - 200 * 86_400), 200);
  }

  #[test]
  fn escape_quotes_only_touches_quotes() {
    assert_eq!(escape_quotes("release-1.0"), "release-1.0");
    assert_eq!(escape_quotes("oddly \"named\""), "oddly \\\"named\\\"");
  }

  #[test]
  fn parse_now_override_accepts_both_shapes() {
    let a = parse_now_override(Some("2025-08-15T12:00:00Z")).unwrap();
    let b = parse_now_override(Some("2025-08-15T12:00:00")).unwrap();
    assert_eq!(a.timestamp(), b.timestamp());
    assert!(parse_now_override(Some("not a date")).is_none());
    assert!(parse_now_override(None).is_none());
  }

  #[test]
  fn iso_utc_formats_epoch() {
    assert_eq!(iso_utc(0), "1970-01-01T00:00:00Z");
  }

  #[derive(Parser, Debug)]
  #[command(name = "dummy", version, about = "Dummy CLI", long_about = None)]
  struct DummyCli;

  #[test]
  fn render_man_page_produces_troff_text() {
    let page = render_man_page::<DummyCli>().expect("render manpage");
    assert!(page.contains(".TH"));
    assert!(page.to_lowercase().contains("dummy"));
  }
}
