// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed invariant-violation errors raised by entity and metric constructors
// role: errors
// outputs: MetricsError enum and Result alias used by the aggregation core
// invariants: Errors are raised at construction and propagated unchanged; the core never swallows them
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
  /// A required text field was empty.
  #[error("{entity} {field} cannot be empty")]
  EmptyField { entity: &'static str, field: &'static str },

  /// Pull request and issue numbers start at 1.
  #[error("{entity} number must be positive (got {number})")]
  NonPositiveNumber { entity: &'static str, number: i64 },

  #[error("review state must be one of APPROVED, CHANGES_REQUESTED, COMMENTED (got {0:?})")]
  InvalidReviewState(String),

  /// Sub-counts did not add up to the stated total.
  #[error("{what} counts must sum to total ({parts} != {total})")]
  CountMismatch { what: &'static str, parts: u64, total: u64 },

  #[error("{what} must be between 0 and 100 (got {value})")]
  RateOutOfRange { what: &'static str, value: f64 },

  #[error("{what} must be non-negative (got {value})")]
  NegativeAverage { what: &'static str, value: f64 },

  #[error("period end {end} must be after period start {start}")]
  InvalidPeriod { start: DateTime<Utc>, end: DateTime<Utc> },
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Fail with `RateOutOfRange` unless `value` is a percentage in [0, 100].
pub(crate) fn check_rate(what: &'static str, value: f64) -> Result<()> {
  if (0.0..=100.0).contains(&value) {
    Ok(())
  } else {
    Err(MetricsError::RateOutOfRange { what, value })
  }
}

pub(crate) fn check_non_negative(what: &'static str, value: f64) -> Result<()> {
  if value >= 0.0 {
    Ok(())
  } else {
    Err(MetricsError::NegativeAverage { what, value })
  }
}
