// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Review participation, approval/change-request rates and response times, for the team or one author
// role: aggregation/reviews
// inputs: &[PullRequest] (reviews live inside each PR); optional target author
// outputs: ReviewMetrics; ReviewPatterns per-reviewer drill-down
// invariants:
// - without a target author, given == received == every review on every PR
// - participation with a target author only counts PRs the author did not open; no candidates => 0.0
// - rates are 0.0 (never NaN) for empty pools
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::aggregate::{mean, median, percent};
use crate::error::Result;
use crate::metrics::ReviewMetrics;
use crate::model::{PullRequest, Review, ReviewState};

const TOP_REVIEWERS: usize = 5;

/// Hours between PR creation and review submission (fractional).
fn response_hours(pr: &PullRequest, review: &Review) -> f64 {
  (review.submitted_at - pr.created_at).num_seconds() as f64 / 3600.0
}

fn share(reviews: &[(&PullRequest, &Review)], state: ReviewState) -> f64 {
  let hits = reviews.iter().filter(|(_, r)| r.state == state).count();
  percent(hits, reviews.len())
}

/// Review metrics for the whole team, or for `target_author` when given.
///
/// With a target author, "given" is every review they submitted and "received"
/// is every review left on PRs they opened. Rates and response time are taken
/// over the given pool.
pub fn calculate_review_metrics(pull_requests: &[PullRequest], target_author: Option<&str>) -> Result<ReviewMetrics> {
  if pull_requests.is_empty() {
    return Ok(ReviewMetrics::default());
  }

  let all: Vec<(&PullRequest, &Review)> = pull_requests
    .iter()
    .flat_map(|pr| pr.reviews.iter().map(move |r| (pr, r)))
    .collect();

  let (given, received_count) = match target_author {
    Some(author) => {
      let given: Vec<(&PullRequest, &Review)> = all.iter().copied().filter(|(_, r)| r.reviewer == author).collect();
      let received = all.iter().filter(|(pr, _)| pr.author == author).count();
      (given, received)
    }
    None => {
      let received = all.len();
      (all, received)
    }
  };

  let response_times: Vec<f64> = given.iter().map(|(pr, r)| response_hours(pr, r)).collect();

  let metrics = ReviewMetrics {
    total_reviews_given: given.len() as u64,
    total_reviews_received: received_count as u64,
    average_review_time: mean(&response_times),
    approval_rate: share(&given, ReviewState::Approved),
    change_request_rate: share(&given, ReviewState::ChangesRequested),
    review_participation_rate: participation_rate(pull_requests, target_author),
  };
  metrics.validate()?;

  Ok(metrics)
}

/// Percentage of eligible PRs that received at least one review.
///
/// Team-wide every PR is eligible; for one author only PRs opened by someone
/// else are, and participation means the author reviewed it.
pub fn participation_rate(pull_requests: &[PullRequest], target_author: Option<&str>) -> f64 {
  match target_author {
    Some(author) => {
      let reviewable: Vec<&PullRequest> = pull_requests.iter().filter(|pr| pr.author != author).collect();
      let participated = reviewable
        .iter()
        .filter(|pr| pr.reviews.iter().any(|r| r.reviewer == author))
        .count();
      percent(participated, reviewable.len())
    }
    None => {
      let reviewed = pull_requests.iter().filter(|pr| !pr.reviews.is_empty()).count();
      percent(reviewed, pull_requests.len())
    }
  }
}

// --- Pattern analysis ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerStats {
  pub total_reviews: u64,
  pub approval_rate: f64,
  pub change_request_rate: f64,
  pub comment_rate: f64,
  pub average_response_time: Option<f64>,
  pub median_response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerCount {
  pub reviewer: String,
  pub review_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerSpeed {
  pub reviewer: String,
  pub average_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPatterns {
  pub reviewer_analysis: BTreeMap<String, ReviewerStats>,
  pub total_reviewers: u64,
  pub most_active_reviewers: Vec<ReviewerCount>,
  pub fastest_reviewers: Vec<ReviewerSpeed>,
}

#[derive(Default)]
struct Tally {
  approvals: usize,
  change_requests: usize,
  comments: usize,
  response_times: Vec<f64>,
}

impl Tally {
  fn total(&self) -> usize {
    self.response_times.len()
  }
}

/// Per-reviewer breakdown; `None` when there are no pull requests.
pub fn analyze_review_patterns(pull_requests: &[PullRequest]) -> Option<ReviewPatterns> {
  if pull_requests.is_empty() {
    return None;
  }

  // first-seen order drives tie-breaking in the rankings
  let mut order: Vec<&str> = Vec::new();
  let mut tallies: HashMap<&str, Tally> = HashMap::new();

  for pr in pull_requests {
    for review in &pr.reviews {
      let name = review.reviewer.as_str();
      let tally = tallies.entry(name).or_insert_with(|| {
        order.push(name);
        Tally::default()
      });

      match review.state {
        ReviewState::Approved => tally.approvals += 1,
        ReviewState::ChangesRequested => tally.change_requests += 1,
        ReviewState::Commented => tally.comments += 1,
      }
      tally.response_times.push(response_hours(pr, review));
    }
  }

  let mut reviewer_analysis = BTreeMap::new();
  let mut counts: Vec<ReviewerCount> = Vec::with_capacity(order.len());
  let mut speeds: Vec<ReviewerSpeed> = Vec::with_capacity(order.len());

  for name in &order {
    let Some(t) = tallies.get(name) else { continue };
    let total = t.total();
    let average_response_time = mean(&t.response_times);

    reviewer_analysis.insert(
      name.to_string(),
      ReviewerStats {
        total_reviews: total as u64,
        approval_rate: percent(t.approvals, total),
        change_request_rate: percent(t.change_requests, total),
        comment_rate: percent(t.comments, total),
        average_response_time,
        median_response_time: median(&t.response_times),
      },
    );

    counts.push(ReviewerCount { reviewer: name.to_string(), review_count: total as u64 });

    if let Some(avg) = average_response_time {
      speeds.push(ReviewerSpeed { reviewer: name.to_string(), average_response_time: avg });
    }
  }

  counts.sort_by(|a, b| b.review_count.cmp(&a.review_count));
  counts.truncate(TOP_REVIEWERS);
  speeds.sort_by(|a, b| a.average_response_time.total_cmp(&b.average_response_time));
  speeds.truncate(TOP_REVIEWERS);

  Some(ReviewPatterns {
    reviewer_analysis,
    total_reviewers: order.len() as u64,
    most_active_reviewers: counts,
    fastest_reviewers: speeds,
  })
}
