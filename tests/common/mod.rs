use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Pinned "now" for deterministic staleness: 2025-08-15T12:00:00Z.
#[allow(dead_code)]
pub const NOW: &str = "2025-08-15T12:00:00Z";
#[allow(dead_code)]
pub const NOW_EPOCH: i64 = 1_755_259_200;

const STUB_HG: &str = r#"#!/bin/sh
if [ -n "$HG_LOG" ]; then
  printf 'hg %s\n' "$*" >> "$HG_LOG"
fi
case "$1" in
  --version|version)
    echo "Mercurial Distributed SCM (version 6.5.1)"
    ;;
  identify)
    cat "$HG_FIXTURES/ident.txt"
    ;;
  heads)
    cat "$HG_FIXTURES/heads.txt"
    ;;
  update|branch|commit)
    if [ "${HG_MUTATE_EXIT:-0}" -ne 0 ]; then
      echo "stub: forced failure" >&2
      exit "${HG_MUTATE_EXIT}"
    fi
    ;;
esac
exit 0
"#;

/// A fake Mercurial setup: a repo directory with `.hg`, a stub `hg`
/// executable that serves canned fixture output and logs every invocation,
/// and helpers to drive the binary against it.
pub struct StubRepo {
  #[allow(dead_code)]
  root: tempfile::TempDir,
  pub repo: PathBuf,
  pub bin: PathBuf,
  pub fixtures: PathBuf,
  pub log: PathBuf,
}

#[allow(dead_code)]
impl StubRepo {
  /// Fresh fixture with the default scan: current branch `default` at
  /// `ffffffffffff`, heads old1 (90d), recent (10d), old2 (200d).
  pub fn new() -> StubRepo {
    let root = tempfile::TempDir::new().unwrap();
    let repo = root.path().join("repo");
    let bin = root.path().join("bin");
    let fixtures = root.path().join("fixtures");
    let log = root.path().join("hg-invocations.log");

    std::fs::create_dir_all(repo.join(".hg")).unwrap();
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::create_dir_all(&fixtures).unwrap();

    let hg = bin.join("hg");
    std::fs::write(&hg, STUB_HG).unwrap();
    std::fs::set_permissions(&hg, std::fs::Permissions::from_mode(0o755)).unwrap();

    let fixture = StubRepo { root, repo, bin, fixtures, log };
    fixture.write_ident("ffffffffffff", "default");
    fixture.write_heads(&[("old1", 90, "aaaaaaaaaaaa"), ("recent", 10, "bbbbbbbbbbbb"), ("old2", 200, "cccccccccccc")]);
    fixture
  }

  /// Heads fixture as (name, whole days of inactivity, node).
  pub fn write_heads(&self, entries: &[(&str, i64, &str)]) {
    let mut text = String::new();
    for (name, days_ago, node) in entries {
      let epoch = NOW_EPOCH - days_ago * 86_400;
      text.push_str(&format!("{epoch} 0|{node}|{name}\n"));
    }
    self.write_heads_raw(&text);
  }

  pub fn write_heads_raw(&self, text: &str) {
    std::fs::write(self.fixtures.join("heads.txt"), text).unwrap();
  }

  pub fn write_ident(&self, node: &str, branch: &str) {
    std::fs::write(self.fixtures.join("ident.txt"), format!("{node} {branch}\n")).unwrap();
  }

  pub fn cmd(&self) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("close-old-branches").unwrap();
    let path = format!(
      "{}:{}",
      self.bin.display(),
      std::env::var("PATH").unwrap_or_default()
    );
    c.env("PATH", path)
      .env("HG_LOG", &self.log)
      .env("HG_FIXTURES", &self.fixtures)
      .arg("--repo")
      .arg(&self.repo)
      .arg("--now-override")
      .arg(NOW);
    c
  }

  pub fn log_lines(&self) -> Vec<String> {
    match std::fs::read_to_string(&self.log) {
      Ok(text) => text.lines().map(str::to_string).collect(),
      Err(_) => vec![],
    }
  }

  /// Only the state-mutating invocations, in order.
  pub fn mutation_lines(&self) -> Vec<String> {
    self
      .log_lines()
      .into_iter()
      .filter(|l| {
        l.starts_with("hg update") || l.starts_with("hg branch") || l.starts_with("hg commit")
      })
      .collect()
  }
}

#[allow(dead_code)]
pub fn stdout_json(output: &[u8]) -> serde_json::Value {
  serde_json::from_slice(output).expect("summary JSON on stdout")
}
