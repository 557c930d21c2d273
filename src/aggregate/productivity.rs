// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compose commit/PR/review/issue metrics, the velocity series and an effort estimate into one ProductivityMetrics snapshot
// role: aggregation/builder
// inputs: entity slices, Period, MetricsOptions (target author, granularity, cost model)
// outputs: ProductivityMetrics; Vec<AuthorMetrics> for per-author breakdowns
// invariants:
// - each sub-aggregator sees only the raw inputs, never another aggregator's output
// - time distribution is an estimate from per-item costs and is flagged as such
// - author breakdown is ordered by author handle regardless of thread scheduling
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::commits::calculate_commit_metrics;
use crate::aggregate::issues::calculate_issue_metrics;
use crate::aggregate::pull_requests::calculate_pr_metrics;
use crate::aggregate::reviews::calculate_review_metrics;
use crate::aggregate::timeseries::generate_time_series;
use crate::error::Result;
use crate::metrics::{IssueMetrics, MetricPeriod, Period, ProductivityMetrics, ReviewMetrics, TimeDistribution};
use crate::model::{Commit, Issue, PullRequest};

/// Assumed effort per unit of activity, in hours.
pub trait TimeCostModel: fmt::Debug + Send + Sync {
  fn commit_hours(&self) -> f64;
  fn pull_request_hours(&self) -> f64;
}

/// Flat per-item costs: half an hour per commit, two hours per pull request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCostModel {
  pub per_commit: f64,
  pub per_pull_request: f64,
}

impl Default for FixedCostModel {
  fn default() -> Self {
    Self { per_commit: 0.5, per_pull_request: 2.0 }
  }
}

impl TimeCostModel for FixedCostModel {
  fn commit_hours(&self) -> f64 {
    self.per_commit
  }

  fn pull_request_hours(&self) -> f64 {
    self.per_pull_request
  }
}

/// Split estimated effort between coding and review.
///
/// Shares are percentages of the weighted total. With no weighted activity every
/// share is 0.0. `other` is reserved for activity the model cannot see.
pub fn time_distribution(commits: usize, pull_requests: usize, model: &dyn TimeCostModel) -> TimeDistribution {
  let coding = commits as f64 * model.commit_hours();
  let review = pull_requests as f64 * model.pull_request_hours();
  let total = coding + review;

  if total <= 0.0 {
    return TimeDistribution { estimated: true, ..Default::default() };
  }

  TimeDistribution {
    coding: coding / total * 100.0,
    code_review: review / total * 100.0,
    other: 0.0,
    estimated: true,
  }
}

/// Knobs for a single snapshot build.
#[derive(Debug, Clone)]
pub struct MetricsOptions {
  /// Narrows review and issue metrics to one person.
  pub target_author: Option<String>,
  pub granularity: MetricPeriod,
  pub cost_model: Arc<dyn TimeCostModel>,
}

impl Default for MetricsOptions {
  fn default() -> Self {
    Self { target_author: None, granularity: MetricPeriod::default(), cost_model: Arc::new(FixedCostModel::default()) }
  }
}

pub fn calculate_productivity_metrics(
  commits: &[Commit],
  pull_requests: &[PullRequest],
  issues: &[Issue],
  period: Period,
  options: &MetricsOptions,
) -> Result<ProductivityMetrics> {
  let author = options.target_author.as_deref();

  ProductivityMetrics::new(
    period,
    calculate_commit_metrics(commits)?,
    calculate_pr_metrics(pull_requests)?,
    calculate_review_metrics(pull_requests, author)?,
    calculate_issue_metrics(issues, author)?,
    generate_time_series(commits, pull_requests, issues, options.granularity),
    time_distribution(commits.len(), pull_requests.len(), options.cost_model.as_ref()),
  )
}

// --- Per-author breakdown ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorMetrics {
  pub author: String,
  pub commits: u64,
  pub review_metrics: ReviewMetrics,
  pub issue_metrics: IssueMetrics,
}

/// Every handle that appears as commit author, PR author, reviewer, issue author or assignee.
pub fn distinct_authors(commits: &[Commit], pull_requests: &[PullRequest], issues: &[Issue]) -> BTreeSet<String> {
  let mut authors = BTreeSet::new();
  authors.extend(commits.iter().map(|c| c.author.clone()));
  for pr in pull_requests {
    authors.insert(pr.author.clone());
    authors.extend(pr.reviews.iter().map(|r| r.reviewer.clone()));
  }
  for issue in issues {
    authors.insert(issue.author.clone());
    authors.extend(issue.assignee.iter().cloned());
  }
  authors
}

/// Review and issue metrics per person, computed in parallel.
pub fn author_breakdown(commits: &[Commit], pull_requests: &[PullRequest], issues: &[Issue]) -> Result<Vec<AuthorMetrics>> {
  let authors: Vec<String> = distinct_authors(commits, pull_requests, issues).into_iter().collect();

  authors
    .into_par_iter()
    .map(|author| -> Result<AuthorMetrics> {
      let commit_count = commits.iter().filter(|c| c.author == author).count() as u64;
      Ok(AuthorMetrics {
        commits: commit_count,
        review_metrics: calculate_review_metrics(pull_requests, Some(author.as_str()))?,
        issue_metrics: calculate_issue_metrics(issues, Some(author.as_str()))?,
        author,
      })
    })
    .collect()
}
