// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn a pull request list into merge/close counts, merge rate, and size/latency averages
// role: aggregation/pull-requests
// inputs: &[PullRequest] (may be empty)
// outputs: PrMetrics
// invariants:
// - merged + closed + open == total, else CountMismatch (MERGED without merged_at fits no bucket)
// - average_time_to_merge covers merged PRs only; None when none merged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::aggregate::{average, mean, percent, total};
use crate::error::Result;
use crate::metrics::PrMetrics;
use crate::model::{PullRequest, PullRequestState};

pub fn calculate_pr_metrics(pull_requests: &[PullRequest]) -> Result<PrMetrics> {
  if pull_requests.is_empty() {
    return Ok(PrMetrics::default());
  }

  let count = pull_requests.len();
  let merged = pull_requests.iter().filter(|pr| pr.is_merged()).count();
  let closed = pull_requests
    .iter()
    .filter(|pr| pr.state == PullRequestState::Closed && !pr.is_merged())
    .count();
  let open = pull_requests.iter().filter(|pr| pr.state == PullRequestState::Open).count();

  let merge_hours: Vec<f64> = pull_requests
    .iter()
    .filter(|pr| pr.is_merged())
    .filter_map(|pr| pr.time_to_merge())
    .map(|h| h as f64)
    .collect();

  let additions = total(pull_requests.iter().map(|pr| pr.additions));
  let deletions = total(pull_requests.iter().map(|pr| pr.deletions));
  let commits = total(pull_requests.iter().map(|pr| pr.commits));

  let metrics = PrMetrics {
    total_prs: count as u64,
    merged_prs: merged as u64,
    closed_prs: closed as u64,
    open_prs: open as u64,
    average_time_to_merge: mean(&merge_hours),
    average_additions: average(additions, count),
    average_deletions: average(deletions, count),
    average_commits_per_pr: average(commits, count),
    merge_rate: percent(merged, count),
  };
  metrics.validate()?;

  Ok(metrics)
}
