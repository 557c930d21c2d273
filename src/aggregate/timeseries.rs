// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Bucket commits, PR openings and issue closings into an ordered velocity series
// role: aggregation/timeseries
// inputs: &[Commit], &[PullRequest], &[Issue], MetricPeriod
// outputs: Vec<VelocityPoint> ordered by bucket start
// invariants:
// - span = [midnight of earliest day, midnight after latest day) over commit/PR/issue creation times
// - buckets are half-open [start, start + width); the last one is clipped to the span end
// - every commit lands in exactly one bucket, so commit counts sum to commits.len()
// - issue closings after the span end are not counted; line totals saturate at u64::MAX
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::metrics::{MetricPeriod, VelocityPoint};
use crate::model::{Commit, Issue, PullRequest};

fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
  ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Bucket grid over a fixed span.
struct Grid {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  width: Duration,
}

impl Grid {
  fn len(&self) -> usize {
    let span = (self.end - self.start).num_seconds();
    let width = self.width.num_seconds();
    ((span + width - 1) / width) as usize
  }

  fn bucket_start(&self, idx: usize) -> DateTime<Utc> {
    self.start + self.width * idx as i32
  }

  /// Index of the bucket holding `ts`, if it falls inside the span.
  fn index_of(&self, ts: DateTime<Utc>) -> Option<usize> {
    if ts < self.start || ts >= self.end {
      return None;
    }
    let offset = (ts - self.start).num_seconds();
    Some((offset / self.width.num_seconds()) as usize)
  }
}

pub fn generate_time_series(
  commits: &[Commit],
  pull_requests: &[PullRequest],
  issues: &[Issue],
  period: MetricPeriod,
) -> Vec<VelocityPoint> {
  let anchors = commits
    .iter()
    .map(|c| c.timestamp)
    .chain(pull_requests.iter().map(|pr| pr.created_at))
    .chain(issues.iter().map(|i| i.created_at));

  let (Some(earliest), Some(latest)) = (anchors.clone().min(), anchors.max()) else {
    return Vec::new();
  };

  let grid = Grid {
    start: start_of_day(earliest),
    end: start_of_day(latest) + Duration::days(1),
    width: period.bucket_width(),
  };

  let mut points: Vec<VelocityPoint> = (0..grid.len())
    .map(|idx| VelocityPoint {
      timestamp: grid.bucket_start(idx),
      commits: 0,
      additions: 0,
      deletions: 0,
      pull_requests: 0,
      issues_closed: 0,
    })
    .collect();

  for commit in commits {
    if let Some(p) = grid.index_of(commit.timestamp).and_then(|i| points.get_mut(i)) {
      p.commits += 1;
      p.additions = p.additions.saturating_add(commit.additions);
      p.deletions = p.deletions.saturating_add(commit.deletions);
    }
  }

  for pr in pull_requests {
    if let Some(p) = grid.index_of(pr.created_at).and_then(|i| points.get_mut(i)) {
      p.pull_requests += 1;
    }
  }

  // closings outside the creation-time span are dropped
  for closed_at in issues.iter().filter_map(|i| i.closed_at) {
    if let Some(p) = grid.index_of(closed_at).and_then(|i| points.get_mut(i)) {
      p.issues_closed += 1;
    }
  }

  points
}
