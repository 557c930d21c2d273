// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for the pure aggregation pipeline (commits, PRs, reviews, issues, velocity, snapshot)
// role: aggregation/namespace
// outputs: Public submodules, each a pure function of its input slices
// invariants: No IO, no logging, no shared mutable state; empty inputs yield defined empty results
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod commits;
pub mod issues;
pub mod productivity;
pub mod pull_requests;
pub mod reviews;
pub mod timeseries;

/// Arithmetic mean; `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of unsorted values (mean of the two middle values for even lengths).
pub(crate) fn median(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let mut sorted = values.to_vec();
  sorted.sort_by(|a, b| a.total_cmp(b));

  let mid = sorted.len() / 2;
  if sorted.len() % 2 == 0 {
    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
  } else {
    Some(sorted[mid])
  }
}

/// `part / whole * 100`, or 0.0 when `whole` is zero.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  part as f64 / whole as f64 * 100.0
}

/// Sum of unsigned counts, widened so that any slice of `u64` values fits.
pub(crate) fn total(values: impl Iterator<Item = u64>) -> u128 {
  values.map(u128::from).sum()
}

/// Mean of `total` over `count` items, or 0.0 for no items.
pub(crate) fn average(total: u128, count: usize) -> f64 {
  if count == 0 {
    return 0.0;
  }
  total as f64 / count as f64
}
