// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the analysis window (calendar month, trailing period, explicit bounds) to UTC instants
// role: cli/windows
// inputs: WindowSpec; optional `now` override
// outputs: (since, until) as DateTime<Utc>, since strictly before until
// invariants:
// - month windows run from the 1st 00:00 UTC to the 1st of the next month
// - trailing windows end at `now` and span a fixed number of days
// - bare dates (YYYY-MM-DD) mean midnight UTC
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Trailing analysis period, counted back from now.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
pub enum AnalysisPeriod {
  #[value(name = "7d")]
  #[serde(rename = "7d")]
  Week,
  #[value(name = "30d")]
  #[serde(rename = "30d")]
  Month,
  #[value(name = "90d")]
  #[serde(rename = "90d")]
  Quarter,
  #[value(name = "6m")]
  #[serde(rename = "6m")]
  HalfYear,
  #[value(name = "1y")]
  #[serde(rename = "1y")]
  Year,
}

impl AnalysisPeriod {
  pub fn days(&self) -> i64 {
    match self {
      AnalysisPeriod::Week => 7,
      AnalysisPeriod::Month => 30,
      AnalysisPeriod::Quarter => 90,
      AnalysisPeriod::HalfYear => 182,
      AnalysisPeriod::Year => 365,
    }
  }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum WindowSpec {
  Month { ym: String },
  Last(AnalysisPeriod),
  SinceUntil { since: String, until: String },
}

pub fn month_bounds(year_month: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
  let (y, m) = year_month.split_once('-').context("invalid --month, expected YYYY-MM")?;
  let y: i32 = y.parse().context("parsing year in --month")?;
  let m: u32 = m.parse().context("parsing month in --month")?;

  if !(1..=12).contains(&m) {
    bail!("invalid month in --month: {}", m);
  }
  let (next_y, next_m) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };

  let start = NaiveDate::from_ymd_opt(y, m, 1).context("invalid --month")?;
  let end = NaiveDate::from_ymd_opt(next_y, next_m, 1).context("invalid --month")?;
  Ok((midnight(start), midnight(end)))
}

fn midnight(d: NaiveDate) -> DateTime<Utc> {
  d.and_time(NaiveTime::MIN).and_utc()
}

/// Parse an RFC3339 instant, a naive `YYYY-MM-DDTHH:MM:SS` (UTC) or a bare date (midnight UTC).
pub fn parse_time_bound(raw: &str) -> Result<DateTime<Utc>> {
  let s = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
    return Ok(ndt.and_utc());
  }
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(midnight(d));
  }
  bail!("unrecognised time '{}': expected RFC3339 or YYYY-MM-DD", raw)
}

/// Parse a `--now-override` value; unparsable input is ignored.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Utc>> {
  s.and_then(|raw| parse_time_bound(raw).ok())
}

/// Compute `(since, until)` for a window; `now` defaults to the wall clock.
pub fn resolve_window(window: &WindowSpec, now: Option<DateTime<Utc>>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
  let (since, until) = match window {
    WindowSpec::Month { ym } => month_bounds(ym)?,
    WindowSpec::Last(period) => {
      let now = crate::util::effective_now(now);
      (now - Duration::days(period.days()), now)
    }
    WindowSpec::SinceUntil { since, until } => (
      parse_time_bound(since).context("parsing --since")?,
      parse_time_bound(until).context("parsing --until")?,
    ),
  };

  if until <= since {
    bail!("window end {} must be after start {}", until, since);
  }
  Ok((since, until))
}
