// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Issue resolution counts, close latency, and per-label / per-assignee resolution breakdowns
// role: aggregation/issues
// inputs: &[Issue]; optional target author
// outputs: IssueMetrics; IssuePatterns
// invariants:
// - total/closed/open always describe the full list; target_author only narrows created/assigned
// - closed + open == total
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{mean, percent};
use crate::error::Result;
use crate::metrics::IssueMetrics;
use crate::model::Issue;

pub fn calculate_issue_metrics(issues: &[Issue], target_author: Option<&str>) -> Result<IssueMetrics> {
  if issues.is_empty() {
    return Ok(IssueMetrics::default());
  }

  let total = issues.len();
  let closed = issues.iter().filter(|i| i.is_closed()).count();

  let close_hours: Vec<f64> = issues
    .iter()
    .filter(|i| i.is_closed())
    .filter_map(|i| i.time_to_close())
    .map(|h| h as f64)
    .collect();

  let (created, assigned) = match target_author {
    Some(author) => (
      issues.iter().filter(|i| i.author == author).count(),
      issues.iter().filter(|i| i.assignee.as_deref() == Some(author)).count(),
    ),
    None => (total, issues.iter().filter(|i| i.assignee.is_some()).count()),
  };

  let metrics = IssueMetrics {
    total_issues: total as u64,
    closed_issues: closed as u64,
    open_issues: (total - closed) as u64,
    average_time_to_close: mean(&close_hours),
    resolution_rate: percent(closed, total),
    issues_created: created as u64,
    issues_assigned: assigned as u64,
  };
  metrics.validate()?;

  Ok(metrics)
}

// --- Pattern analysis ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
  pub total_issues: u64,
  pub closed_issues: u64,
  pub resolution_rate: f64,
  /// Hours; `None` when no issue in the group closed after a positive delay.
  pub average_resolution_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePatterns {
  pub label_analysis: BTreeMap<String, ResolutionStats>,
  pub assignee_analysis: BTreeMap<String, ResolutionStats>,
  pub total_labels: u64,
  pub total_assignees: u64,
}

#[derive(Default)]
struct Group {
  total: usize,
  closed: usize,
  resolution_hours: Vec<f64>,
}

impl Group {
  fn add(&mut self, issue: &Issue) {
    self.total += 1;
    if issue.is_closed() {
      self.closed += 1;
      // same-hour closes carry no resolution time
      if let Some(hours) = issue.time_to_close().filter(|h| *h > 0) {
        self.resolution_hours.push(hours as f64);
      }
    }
  }

  fn stats(&self) -> ResolutionStats {
    ResolutionStats {
      total_issues: self.total as u64,
      closed_issues: self.closed as u64,
      resolution_rate: percent(self.closed, self.total),
      average_resolution_time: mean(&self.resolution_hours),
    }
  }
}

fn summarize(groups: BTreeMap<&str, Group>) -> BTreeMap<String, ResolutionStats> {
  groups.into_iter().map(|(k, g)| (k.to_string(), g.stats())).collect()
}

/// Resolution breakdown grouped by each label and by assignee; `None` for no issues.
///
/// An issue with several labels counts once under each of them. Unassigned
/// issues are left out of the assignee table.
pub fn analyze_issue_patterns(issues: &[Issue]) -> Option<IssuePatterns> {
  if issues.is_empty() {
    return None;
  }

  let mut by_label: BTreeMap<&str, Group> = BTreeMap::new();
  let mut by_assignee: BTreeMap<&str, Group> = BTreeMap::new();

  for issue in issues {
    for label in &issue.labels {
      by_label.entry(label.as_str()).or_default().add(issue);
    }
    if let Some(assignee) = issue.assignee.as_deref() {
      by_assignee.entry(assignee).or_default().add(issue);
    }
  }

  let total_labels = by_label.len() as u64;
  let total_assignees = by_assignee.len() as u64;

  Some(IssuePatterns {
    label_analysis: summarize(by_label),
    assignee_analysis: summarize(by_assignee),
    total_labels,
    total_assignees,
  })
}
