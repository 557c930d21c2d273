// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Hold the three entity lists of one repository and load them from an offline JSON file
// role: model/dataset
// inputs: JSON file { repository?, commits, pull_requests, issues } or lists fetched from GitHub
// outputs: Dataset with span/window/cap helpers
// invariants:
// - every entity went through its validating constructor (directly or via serde try_from)
// - within() keeps commits by timestamp and PRs/issues by created_at, half-open [start, end)
// errors: File IO and JSON/validation failures carry the path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Commit, Issue, PullRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
  #[serde(default)]
  pub commits: Vec<Commit>,
  #[serde(default)]
  pub pull_requests: Vec<PullRequest>,
  #[serde(default)]
  pub issues: Vec<Issue>,
}

impl Dataset {
  pub fn from_path(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading dataset {}", path.display()))?;
    Self::from_json(&raw).with_context(|| format!("parsing dataset {}", path.display()))
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }

  pub fn is_empty(&self) -> bool {
    self.commits.is_empty() && self.pull_requests.is_empty() && self.issues.is_empty()
  }

  /// Earliest and latest activity instants (commit time, PR/issue creation and closing).
  pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let stamps = self
      .commits
      .iter()
      .map(|c| c.timestamp)
      .chain(self.pull_requests.iter().flat_map(|pr| {
        std::iter::once(pr.created_at).chain(pr.merged_at).chain(pr.closed_at)
      }))
      .chain(self.issues.iter().flat_map(|i| std::iter::once(i.created_at).chain(i.closed_at)));

    let (mut lo, mut hi): (Option<DateTime<Utc>>, Option<DateTime<Utc>>) = (None, None);
    for ts in stamps {
      lo = Some(lo.map_or(ts, |cur| cur.min(ts)));
      hi = Some(hi.map_or(ts, |cur| cur.max(ts)));
    }
    lo.zip(hi)
  }

  /// Keep only activity that started inside `[start, end)`.
  pub fn within(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    let inside = |ts: DateTime<Utc>| ts >= start && ts < end;
    self.commits.retain(|c| inside(c.timestamp));
    self.pull_requests.retain(|pr| inside(pr.created_at));
    self.issues.retain(|i| inside(i.created_at));
    self
  }

  /// Truncate each list to at most `max` entries.
  pub fn cap(mut self, max: usize) -> Self {
    self.commits.truncate(max);
    self.pull_requests.truncate(max);
    self.issues.truncate(max);
    self
  }
}
