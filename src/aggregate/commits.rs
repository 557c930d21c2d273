// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn a commit list into frequency tables, size averages, and the most active hours of day
// role: aggregation/commits
// inputs: &[Commit] (may be empty)
// outputs: CommitMetrics
// invariants:
// - each frequency table sums to total_commits
// - most_active_hours has at most 3 entries; equal counts keep first-encountered order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};

use crate::aggregate::{average, total};
use crate::error::Result;
use crate::metrics::{CommitFrequency, CommitMetrics};
use crate::model::Commit;

const TOP_HOURS: usize = 3;

pub fn calculate_commit_metrics(commits: &[Commit]) -> Result<CommitMetrics> {
  if commits.is_empty() {
    return Ok(CommitMetrics::default());
  }

  let count = commits.len();
  let additions = total(commits.iter().map(|c| c.additions));
  let deletions = total(commits.iter().map(|c| c.deletions));
  let files_changed = total(commits.iter().map(|c| c.files_changed));
  let message_chars = total(commits.iter().map(|c| c.message.chars().count() as u64));

  let metrics = CommitMetrics {
    total_commits: count as u64,
    commit_frequency: commit_frequency(commits),
    average_additions: average(additions, count),
    average_deletions: average(deletions, count),
    average_files_changed: average(files_changed, count),
    most_active_hours: most_active_hours(commits, TOP_HOURS),
    commit_message_length_avg: average(message_chars, count),
  };
  metrics.validate()?;

  Ok(metrics)
}

/// Count commits per day, ISO week, month and hour of day.
///
/// Weekly keys pair the calendar year with the ISO week number, so the first
/// days of January and the last days of December can land in the same key.
pub fn commit_frequency(commits: &[Commit]) -> CommitFrequency {
  let mut freq = CommitFrequency::default();

  for commit in commits {
    let ts = commit.timestamp;
    bump(&mut freq.daily, ts.format("%Y-%m-%d").to_string());
    bump(&mut freq.weekly, format!("{}-W{:02}", ts.year(), ts.iso_week().week()));
    bump(&mut freq.monthly, ts.format("%Y-%m").to_string());
    bump(&mut freq.hourly, ts.hour().to_string());
  }

  freq
}

fn bump(table: &mut BTreeMap<String, u64>, key: String) {
  *table.entry(key).or_insert(0) += 1;
}

/// Top `n` hours of day by commit count, most active first.
pub fn most_active_hours(commits: &[Commit], n: usize) -> Vec<u32> {
  // (hour, count) in first-seen order so the stable sort below keeps ties in that order
  let mut counts: Vec<(u32, u64)> = Vec::new();

  for commit in commits {
    let hour = commit.timestamp.hour();
    match counts.iter_mut().find(|(h, _)| *h == hour) {
      Some((_, c)) => *c += 1,
      None => counts.push((hour, 1)),
    }
  }

  counts.sort_by(|a, b| b.1.cmp(&a.1));
  counts.into_iter().take(n).map(|(hour, _)| hour).collect()
}
