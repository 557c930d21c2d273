// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Aggregate metric records produced by the aggregators and the root ProductivityMetrics snapshot
// role: model/metrics
// outputs: Serializable, self-validating metric records; VelocityPoint series; Period bounds
// invariants:
// - counts are unsigned; sub-counts sum to totals; percentages stay within [0, 100]
// - Period end is strictly after start
// - ProductivityMetrics is never mutated after construction; refresh builds a new one
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{check_non_negative, check_rate, MetricsError, Result};

/// Bucket granularity for velocity series.
///
/// Monthly and quarterly buckets are fixed 30/90-day windows, not calendar months.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum MetricPeriod {
  #[default]
  Daily,
  Weekly,
  Monthly,
  Quarterly,
}

impl MetricPeriod {
  pub fn bucket_width(&self) -> Duration {
    match self {
      MetricPeriod::Daily => Duration::days(1),
      MetricPeriod::Weekly => Duration::weeks(1),
      MetricPeriod::Monthly => Duration::days(30),
      MetricPeriod::Quarterly => Duration::days(90),
    }
  }
}

/// Analysis window; `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl Period {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
    if end <= start {
      return Err(MetricsError::InvalidPeriod { start, end });
    }
    Ok(Self { start, end })
  }

  /// Whole days covered by the period.
  pub fn days(&self) -> i64 {
    (self.end - self.start).num_days()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityPoint {
  /// Bucket start.
  pub timestamp: DateTime<Utc>,
  pub commits: u64,
  pub additions: u64,
  pub deletions: u64,
  pub pull_requests: u64,
  pub issues_closed: u64,
}

impl VelocityPoint {
  pub fn total_changes(&self) -> u64 {
    self.additions.saturating_add(self.deletions)
  }
}

/// Commit counts keyed by formatted timestamp, one table per grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFrequency {
  /// `YYYY-MM-DD`
  pub daily: BTreeMap<String, u64>,
  /// `YYYY-Www`: calendar year with the ISO week number. Early January and late
  /// December can share a key (2023-01-01 and 2023-12-31 are both `2023-W52`).
  pub weekly: BTreeMap<String, u64>,
  /// `YYYY-MM`
  pub monthly: BTreeMap<String, u64>,
  /// `"0"`..`"23"`
  pub hourly: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitMetrics {
  pub total_commits: u64,
  pub commit_frequency: CommitFrequency,
  pub average_additions: f64,
  pub average_deletions: f64,
  pub average_files_changed: f64,
  /// Hours of day, most active first (at most three).
  pub most_active_hours: Vec<u32>,
  pub commit_message_length_avg: f64,
}

impl CommitMetrics {
  pub fn validate(&self) -> Result<()> {
    check_non_negative("average additions", self.average_additions)?;
    check_non_negative("average deletions", self.average_deletions)?;
    check_non_negative("average files changed", self.average_files_changed)?;
    check_non_negative("commit message length average", self.commit_message_length_avg)?;

    for (what, table) in [
      ("daily commit frequency", &self.commit_frequency.daily),
      ("weekly commit frequency", &self.commit_frequency.weekly),
      ("monthly commit frequency", &self.commit_frequency.monthly),
      ("hourly commit frequency", &self.commit_frequency.hourly),
    ] {
      let parts: u64 = table.values().sum();
      if parts != self.total_commits {
        return Err(MetricsError::CountMismatch { what, parts, total: self.total_commits });
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrMetrics {
  pub total_prs: u64,
  pub merged_prs: u64,
  pub closed_prs: u64,
  pub open_prs: u64,
  /// Hours; `None` when nothing merged.
  pub average_time_to_merge: Option<f64>,
  pub average_additions: f64,
  pub average_deletions: f64,
  pub average_commits_per_pr: f64,
  pub merge_rate: f64,
}

impl PrMetrics {
  pub fn validate(&self) -> Result<()> {
    let parts = self.merged_prs + self.closed_prs + self.open_prs;
    if parts != self.total_prs {
      return Err(MetricsError::CountMismatch { what: "PR", parts, total: self.total_prs });
    }
    check_rate("merge rate", self.merge_rate)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetrics {
  pub total_reviews_given: u64,
  pub total_reviews_received: u64,
  /// Hours from PR creation to review submission.
  pub average_review_time: Option<f64>,
  pub approval_rate: f64,
  pub change_request_rate: f64,
  pub review_participation_rate: f64,
}

impl ReviewMetrics {
  pub fn validate(&self) -> Result<()> {
    check_rate("approval rate", self.approval_rate)?;
    check_rate("change request rate", self.change_request_rate)?;
    check_rate("review participation rate", self.review_participation_rate)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueMetrics {
  pub total_issues: u64,
  pub closed_issues: u64,
  pub open_issues: u64,
  pub average_time_to_close: Option<f64>,
  pub resolution_rate: f64,
  pub issues_created: u64,
  pub issues_assigned: u64,
}

impl IssueMetrics {
  pub fn validate(&self) -> Result<()> {
    let parts = self.closed_issues + self.open_issues;
    if parts != self.total_issues {
      return Err(MetricsError::CountMismatch { what: "issue", parts, total: self.total_issues });
    }
    check_rate("resolution rate", self.resolution_rate)
  }
}

/// Estimated share of effort per activity, in percent.
///
/// Derived from fixed per-item costs rather than measured time; `estimated` is
/// always set so consumers can label it accordingly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDistribution {
  pub coding: f64,
  pub code_review: f64,
  pub other: f64,
  pub estimated: bool,
}

impl TimeDistribution {
  pub fn entries(&self) -> [(&'static str, f64); 3] {
    [("coding", self.coding), ("code_review", self.code_review), ("other", self.other)]
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductivityRecord")]
pub struct ProductivityMetrics {
  pub period_start: DateTime<Utc>,
  pub period_end: DateTime<Utc>,
  pub commit_metrics: CommitMetrics,
  pub pr_metrics: PrMetrics,
  pub review_metrics: ReviewMetrics,
  pub issue_metrics: IssueMetrics,
  pub velocity_trends: Vec<VelocityPoint>,
  pub time_distribution: TimeDistribution,
}

#[derive(Deserialize)]
struct ProductivityRecord {
  period_start: DateTime<Utc>,
  period_end: DateTime<Utc>,
  commit_metrics: CommitMetrics,
  pr_metrics: PrMetrics,
  review_metrics: ReviewMetrics,
  issue_metrics: IssueMetrics,
  #[serde(default)]
  velocity_trends: Vec<VelocityPoint>,
  #[serde(default)]
  time_distribution: TimeDistribution,
}

impl TryFrom<ProductivityRecord> for ProductivityMetrics {
  type Error = MetricsError;

  fn try_from(r: ProductivityRecord) -> Result<Self> {
    ProductivityMetrics::new(
      Period::new(r.period_start, r.period_end)?,
      r.commit_metrics,
      r.pr_metrics,
      r.review_metrics,
      r.issue_metrics,
      r.velocity_trends,
      r.time_distribution,
    )
  }
}

impl ProductivityMetrics {
  pub fn new(
    period: Period,
    commit_metrics: CommitMetrics,
    pr_metrics: PrMetrics,
    review_metrics: ReviewMetrics,
    issue_metrics: IssueMetrics,
    velocity_trends: Vec<VelocityPoint>,
    time_distribution: TimeDistribution,
  ) -> Result<Self> {
    commit_metrics.validate()?;
    pr_metrics.validate()?;
    review_metrics.validate()?;
    issue_metrics.validate()?;

    Ok(Self {
      period_start: period.start,
      period_end: period.end,
      commit_metrics,
      pr_metrics,
      review_metrics,
      issue_metrics,
      velocity_trends,
      time_distribution,
    })
  }

  pub fn period(&self) -> Period {
    Period { start: self.period_start, end: self.period_end }
  }

  pub fn period_days(&self) -> i64 {
    self.period().days()
  }

  /// Commits per whole day of the period; 0.0 for sub-day periods.
  pub fn daily_commit_average(&self) -> f64 {
    let days = self.period_days();
    if days == 0 {
      return 0.0;
    }
    self.commit_metrics.total_commits as f64 / days as f64
  }
}
