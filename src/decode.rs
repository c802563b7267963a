//! Decoder for hg output consumed by the scanner.
//!
//! Field grammar:
//! - heads lines: `date|node|name` (the name is the final field and may
//!   contain further `|` characters)
//! - identify output: `node<space>branch` (a trailing `+` dirty marker on
//!   the node is tolerated and stripped)
//!
//! Dates arrive either in Mercurial's numeric `hgdate` form
//! (`epoch offset`) or as an ISO-8601 timestamp. Anything that does not
//! decode into the expected fields is an error carrying the offending
//! line; a malformed head is never silently dropped.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BranchRef, CurrentBranch};

static HGDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)(?:\.\d+)?\s+-?\d+$").unwrap());

pub fn parse_heads(out: &str) -> Result<Vec<BranchRef>> {
  let mut heads = Vec::new();
  for line in out.lines() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    heads.push(parse_heads_line(line)?);
  }
  Ok(heads)
}

fn parse_heads_line(line: &str) -> Result<BranchRef> {
  let mut fields = line.splitn(3, '|');
  let (date, node, name) = match (fields.next(), fields.next(), fields.next()) {
    (Some(d), Some(n), Some(b)) => (d.trim(), n.trim(), b.trim()),
    _ => bail!("unparsable heads line (expected date|node|name): {:?}", line),
  };
  if node.is_empty() || !node.chars().all(|c| c.is_ascii_hexdigit()) {
    bail!("unparsable node in heads line: {:?}", line);
  }
  if name.is_empty() {
    bail!("missing branch name in heads line: {:?}", line);
  }
  Ok(BranchRef {
    name: name.to_string(),
    node: node.to_string(),
    last_activity: parse_date(date)?,
  })
}

/// Decode a head-commit date field: `hgdate` numeric or ISO-8601.
pub fn parse_date(field: &str) -> Result<i64> {
  if let Some(caps) = HGDATE.captures(field) {
    if let Ok(epoch) = caps[1].parse::<i64>() {
      return Ok(epoch);
    }
  }
  if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(field) {
    return Ok(dt.timestamp());
  }
  // hg's isodate rendering: "2025-08-01 12:00 +0200"
  if let Ok(dt) = chrono::DateTime::parse_from_str(field, "%Y-%m-%d %H:%M %z") {
    return Ok(dt.timestamp());
  }
  bail!("undecodable date field: {:?}", field)
}

pub fn parse_ident(out: &str) -> Result<CurrentBranch> {
  let line = out.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
  let Some((node, name)) = line.split_once(' ') else {
    bail!("unparsable identify output (expected node branch): {:?}", line);
  };
  let node = node.trim_end_matches('+');
  let name = name.trim();
  if node.is_empty() || !node.chars().all(|c| c.is_ascii_hexdigit()) {
    bail!("unparsable node in identify output: {:?}", line);
  }
  if name.is_empty() {
    bail!("missing branch name in identify output: {:?}", line);
  }
  Ok(CurrentBranch { name: name.to_string(), node: node.to_string() })
}
