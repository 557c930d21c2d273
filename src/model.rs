// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the GitHub entity model (commits, pull requests, reviews, issues) consumed by the aggregators
// role: model/types
// outputs: Immutable value types with validating constructors and derived read-only properties
// invariants:
// - sha/author/title/reviewer are non-empty; PR and issue numbers are positive
// - line and file counts are unsigned, so non-negativity holds by type
// - deserialization runs the same validation as the constructors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Err(MetricsError::EmptyField { entity, field });
  }
  Ok(())
}

fn require_positive(entity: &'static str, number: i64) -> Result<()> {
  if number <= 0 {
    return Err(MetricsError::NonPositiveNumber { entity, number });
  }
  Ok(())
}

/// Whole hours between two instants, truncated toward zero.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
  (to - from).num_hours()
}

// --- Commit ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CommitRecord")]
pub struct Commit {
  pub sha: String,
  pub author: String,
  pub timestamp: DateTime<Utc>,
  pub message: String,
  pub additions: u64,
  pub deletions: u64,
  pub files_changed: u64,
}

#[derive(Deserialize)]
struct CommitRecord {
  sha: String,
  author: String,
  timestamp: DateTime<Utc>,
  #[serde(default)]
  message: String,
  #[serde(default)]
  additions: u64,
  #[serde(default)]
  deletions: u64,
  #[serde(default)]
  files_changed: u64,
}

impl TryFrom<CommitRecord> for Commit {
  type Error = MetricsError;

  fn try_from(r: CommitRecord) -> Result<Self> {
    Commit::new(r.sha, r.author, r.timestamp, r.message, r.additions, r.deletions, r.files_changed)
  }
}

impl Commit {
  pub fn new(
    sha: impl Into<String>,
    author: impl Into<String>,
    timestamp: DateTime<Utc>,
    message: impl Into<String>,
    additions: u64,
    deletions: u64,
    files_changed: u64,
  ) -> Result<Self> {
    let commit = Self {
      sha: sha.into(),
      author: author.into(),
      timestamp,
      message: message.into(),
      additions,
      deletions,
      files_changed,
    };

    require("commit", "sha", &commit.sha)?;
    require("commit", "author", &commit.author)?;

    Ok(commit)
  }

  /// Net lines changed (additions - deletions).
  pub fn net_changes(&self) -> i128 {
    i128::from(self.additions) - i128::from(self.deletions)
  }

  pub fn total_changes(&self) -> u64 {
    self.additions.saturating_add(self.deletions)
  }
}

// --- Review ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
  Approved,
  ChangesRequested,
  Commented,
}

impl ReviewState {
  pub fn as_str(&self) -> &'static str {
    match self {
      ReviewState::Approved => "APPROVED",
      ReviewState::ChangesRequested => "CHANGES_REQUESTED",
      ReviewState::Commented => "COMMENTED",
    }
  }
}

impl FromStr for ReviewState {
  type Err = MetricsError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "APPROVED" => Ok(ReviewState::Approved),
      "CHANGES_REQUESTED" => Ok(ReviewState::ChangesRequested),
      "COMMENTED" => Ok(ReviewState::Commented),
      other => Err(MetricsError::InvalidReviewState(other.to_string())),
    }
  }
}

impl fmt::Display for ReviewState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReviewRecord")]
pub struct Review {
  pub reviewer: String,
  pub state: ReviewState,
  pub submitted_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

#[derive(Deserialize)]
struct ReviewRecord {
  reviewer: String,
  state: String,
  submitted_at: DateTime<Utc>,
  #[serde(default)]
  body: Option<String>,
}

impl TryFrom<ReviewRecord> for Review {
  type Error = MetricsError;

  fn try_from(r: ReviewRecord) -> Result<Self> {
    let state = r.state.parse::<ReviewState>()?;
    Ok(Review::new(r.reviewer, state, r.submitted_at)?.with_body(r.body))
  }
}

impl Review {
  pub fn new(reviewer: impl Into<String>, state: ReviewState, submitted_at: DateTime<Utc>) -> Result<Self> {
    let reviewer = reviewer.into();
    require("review", "reviewer", &reviewer)?;

    Ok(Self { reviewer, state, submitted_at, body: None })
  }

  pub fn with_body(mut self, body: Option<String>) -> Self {
    self.body = body;
    self
  }
}

// --- Pull request ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
  Open,
  Closed,
  Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PullRequestRecord")]
pub struct PullRequest {
  pub number: i64,
  pub title: String,
  pub author: String,
  pub created_at: DateTime<Utc>,
  pub state: PullRequestState,
  pub merged_at: Option<DateTime<Utc>>,
  pub closed_at: Option<DateTime<Utc>>,
  pub additions: u64,
  pub deletions: u64,
  pub commits: u64,
  pub reviews: Vec<Review>,
}

#[derive(Deserialize)]
struct PullRequestRecord {
  number: i64,
  title: String,
  author: String,
  created_at: DateTime<Utc>,
  state: PullRequestState,
  #[serde(default)]
  merged_at: Option<DateTime<Utc>>,
  #[serde(default)]
  closed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  additions: u64,
  #[serde(default)]
  deletions: u64,
  #[serde(default)]
  commits: u64,
  #[serde(default)]
  reviews: Vec<Review>,
}

impl TryFrom<PullRequestRecord> for PullRequest {
  type Error = MetricsError;

  fn try_from(r: PullRequestRecord) -> Result<Self> {
    Ok(
      PullRequest::new(r.number, r.title, r.author, r.created_at, r.state)?
        .with_merged_at(r.merged_at)
        .with_closed_at(r.closed_at)
        .with_changes(r.additions, r.deletions, r.commits)
        .with_reviews(r.reviews),
    )
  }
}

impl PullRequest {
  pub fn new(
    number: i64,
    title: impl Into<String>,
    author: impl Into<String>,
    created_at: DateTime<Utc>,
    state: PullRequestState,
  ) -> Result<Self> {
    let pr = Self {
      number,
      title: title.into(),
      author: author.into(),
      created_at,
      state,
      merged_at: None,
      closed_at: None,
      additions: 0,
      deletions: 0,
      commits: 0,
      reviews: Vec::new(),
    };

    require_positive("pull request", pr.number)?;
    require("pull request", "title", &pr.title)?;
    require("pull request", "author", &pr.author)?;

    Ok(pr)
  }

  pub fn with_merged_at(mut self, merged_at: Option<DateTime<Utc>>) -> Self {
    self.merged_at = merged_at;
    self
  }

  pub fn with_closed_at(mut self, closed_at: Option<DateTime<Utc>>) -> Self {
    self.closed_at = closed_at;
    self
  }

  pub fn with_changes(mut self, additions: u64, deletions: u64, commits: u64) -> Self {
    self.additions = additions;
    self.deletions = deletions;
    self.commits = commits;
    self
  }

  pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
    self.reviews = reviews;
    self
  }

  pub fn is_merged(&self) -> bool {
    self.state == PullRequestState::Merged && self.merged_at.is_some()
  }

  /// Hours from creation to merge; `None` while unmerged.
  pub fn time_to_merge(&self) -> Option<i64> {
    self.merged_at.map(|merged| elapsed_hours(self.created_at, merged))
  }

  pub fn review_count(&self) -> usize {
    self.reviews.len()
  }
}

// --- Issue ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
  Open,
  Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IssueRecord")]
pub struct Issue {
  pub number: i64,
  pub title: String,
  pub author: String,
  pub created_at: DateTime<Utc>,
  pub state: IssueState,
  pub closed_at: Option<DateTime<Utc>>,
  pub assignee: Option<String>,
  pub labels: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

#[derive(Deserialize)]
struct IssueRecord {
  number: i64,
  title: String,
  author: String,
  created_at: DateTime<Utc>,
  state: IssueState,
  #[serde(default)]
  closed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  assignee: Option<String>,
  #[serde(default)]
  labels: Vec<String>,
  #[serde(default)]
  body: Option<String>,
}

impl TryFrom<IssueRecord> for Issue {
  type Error = MetricsError;

  fn try_from(r: IssueRecord) -> Result<Self> {
    Ok(
      Issue::new(r.number, r.title, r.author, r.created_at, r.state)?
        .with_closed_at(r.closed_at)
        .with_assignee(r.assignee)
        .with_labels(r.labels)
        .with_body(r.body),
    )
  }
}

impl Issue {
  pub fn new(
    number: i64,
    title: impl Into<String>,
    author: impl Into<String>,
    created_at: DateTime<Utc>,
    state: IssueState,
  ) -> Result<Self> {
    let issue = Self {
      number,
      title: title.into(),
      author: author.into(),
      created_at,
      state,
      closed_at: None,
      assignee: None,
      labels: Vec::new(),
      body: None,
    };

    require_positive("issue", issue.number)?;
    require("issue", "title", &issue.title)?;
    require("issue", "author", &issue.author)?;

    Ok(issue)
  }

  pub fn with_closed_at(mut self, closed_at: Option<DateTime<Utc>>) -> Self {
    self.closed_at = closed_at;
    self
  }

  pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
    self.assignee = assignee.filter(|a| !a.is_empty());
    self
  }

  pub fn with_labels(mut self, labels: Vec<String>) -> Self {
    self.labels = labels;
    self
  }

  pub fn with_body(mut self, body: Option<String>) -> Self {
    self.body = body;
    self
  }

  pub fn is_closed(&self) -> bool {
    self.state == IssueState::Closed && self.closed_at.is_some()
  }

  /// Hours from creation to close; `None` while open.
  pub fn time_to_close(&self) -> Option<i64> {
    self.closed_at.map(|closed| elapsed_hours(self.created_at, closed))
  }
}
