// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serialize a ProductivityMetrics snapshot (plus optional drill-downs) as JSON, a text summary, or CSV
// role: rendering/report
// inputs: Report (metrics, derived figures, optional review/issue patterns and per-author rows); OutputFormat
// outputs: Rendered report text
// invariants:
// - JSON is pretty-printed and omits absent optional sections
// - CSV opens with `metric,value` rows; velocity and author tables follow after a blank line
// - time distribution is labelled as an estimate in text output
// errors: Serialization and text formatting failures propagate via anyhow
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::issues::IssuePatterns;
use crate::aggregate::productivity::AuthorMetrics;
use crate::aggregate::reviews::ReviewPatterns;
use crate::metrics::{MetricPeriod, ProductivityMetrics};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Json,
  Text,
  Csv,
}

/// Figures computed from the snapshot rather than stored in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
  pub period_days: i64,
  pub daily_commit_average: f64,
  pub granularity: MetricPeriod,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target_author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
  pub metrics: ProductivityMetrics,
  pub derived: Derived,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub review_patterns: Option<ReviewPatterns>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issue_patterns: Option<IssuePatterns>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub authors: Option<Vec<AuthorMetrics>>,
}

impl Report {
  pub fn new(
    repository: Option<String>,
    metrics: ProductivityMetrics,
    granularity: MetricPeriod,
    target_author: Option<String>,
  ) -> Self {
    let derived = Derived {
      period_days: metrics.period_days(),
      daily_commit_average: metrics.daily_commit_average(),
      granularity,
      target_author,
    };
    Self { repository, metrics, derived, review_patterns: None, issue_patterns: None, authors: None }
  }

  pub fn with_patterns(mut self, reviews: Option<ReviewPatterns>, issues: Option<IssuePatterns>) -> Self {
    self.review_patterns = reviews;
    self.issue_patterns = issues;
    self
  }

  pub fn with_authors(mut self, authors: Vec<AuthorMetrics>) -> Self {
    self.authors = Some(authors);
    self
  }
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
  match format {
    OutputFormat::Json => serde_json::to_string_pretty(report).context("serializing report to JSON"),
    OutputFormat::Text => {
      let mut out = String::new();
      write_text(report, &mut out).context("formatting text report")?;
      Ok(out)
    }
    OutputFormat::Csv => render_csv(report),
  }
}

// --- text ---

fn hours(v: Option<f64>) -> String {
  v.map_or_else(|| "n/a".to_string(), |h| format!("{:.1}h", h))
}

fn write_text(r: &Report, out: &mut impl Write) -> fmt::Result {
  let m = &r.metrics;
  let c = &m.commit_metrics;
  let p = &m.pr_metrics;
  let rv = &m.review_metrics;
  let i = &m.issue_metrics;

  writeln!(out, "Productivity report{}", r.repository.as_deref().map(|s| format!(" for {}", s)).unwrap_or_default())?;
  writeln!(
    out,
    "Period: {} .. {} ({} days)",
    m.period_start.format("%Y-%m-%d"),
    m.period_end.format("%Y-%m-%d"),
    r.derived.period_days
  )?;
  if let Some(author) = &r.derived.target_author {
    writeln!(out, "Author: {}", author)?;
  }

  writeln!(out, "\nCommits")?;
  writeln!(out, "  total: {} ({:.2}/day)", c.total_commits, r.derived.daily_commit_average)?;
  writeln!(out, "  avg +{:.1} / -{:.1} lines, {:.1} files", c.average_additions, c.average_deletions, c.average_files_changed)?;
  let hours_list: Vec<String> = c.most_active_hours.iter().map(|h| format!("{:02}:00", h)).collect();
  writeln!(out, "  most active hours: {}", if hours_list.is_empty() { "n/a".into() } else { hours_list.join(", ") })?;

  writeln!(out, "\nPull requests")?;
  writeln!(out, "  total: {} (merged {}, closed {}, open {})", p.total_prs, p.merged_prs, p.closed_prs, p.open_prs)?;
  writeln!(out, "  merge rate: {:.1}%, time to merge: {}", p.merge_rate, hours(p.average_time_to_merge))?;

  writeln!(out, "\nReviews")?;
  writeln!(out, "  given: {}, received: {}", rv.total_reviews_given, rv.total_reviews_received)?;
  writeln!(
    out,
    "  approval {:.1}%, changes requested {:.1}%, participation {:.1}%",
    rv.approval_rate, rv.change_request_rate, rv.review_participation_rate
  )?;
  writeln!(out, "  avg review time: {}", hours(rv.average_review_time))?;

  writeln!(out, "\nIssues")?;
  writeln!(out, "  total: {} (closed {}, open {})", i.total_issues, i.closed_issues, i.open_issues)?;
  writeln!(out, "  resolution rate: {:.1}%, time to close: {}", i.resolution_rate, hours(i.average_time_to_close))?;
  writeln!(out, "  created: {}, assigned: {}", i.issues_created, i.issues_assigned)?;

  writeln!(out, "\nTime distribution (estimated)")?;
  for (label, share) in m.time_distribution.entries() {
    writeln!(out, "  {}: {:.1}%", label, share)?;
  }

  if let Some(rp) = &r.review_patterns {
    writeln!(out, "\nMost active reviewers")?;
    for row in &rp.most_active_reviewers {
      writeln!(out, "  {}: {}", row.reviewer, row.review_count)?;
    }
  }

  if let Some(ip) = &r.issue_patterns {
    writeln!(out, "\nIssue labels")?;
    for (label, stats) in &ip.label_analysis {
      writeln!(out, "  {}: {} issues, {:.1}% resolved", label, stats.total_issues, stats.resolution_rate)?;
    }
  }

  if let Some(authors) = &r.authors {
    writeln!(out, "\nAuthors")?;
    for a in authors {
      writeln!(
        out,
        "  {}: {} commits, {} reviews given, {} issues created",
        a.author, a.commits, a.review_metrics.total_reviews_given, a.issue_metrics.issues_created
      )?;
    }
  }

  Ok(())
}

// --- csv ---

/// Flatten scalars into dotted keys; arrays of scalars are `;`-joined, arrays of objects skipped.
fn flatten(prefix: &str, v: &Value, rows: &mut Vec<(String, String)>) {
  let key = |k: &str| if prefix.is_empty() { k.to_string() } else { format!("{}.{}", prefix, k) };
  match v {
    Value::Object(map) => {
      for (k, child) in map {
        flatten(&key(k), child, rows);
      }
    }
    Value::Array(items) if items.iter().all(|x| !x.is_object() && !x.is_array()) => {
      let joined: Vec<String> = items.iter().map(scalar).collect();
      rows.push((prefix.to_string(), joined.join(";")));
    }
    Value::Array(_) => {}
    other => rows.push((prefix.to_string(), scalar(other))),
  }
}

fn scalar(v: &Value) -> String {
  match v {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn render_csv(r: &Report) -> Result<String> {
  let mut doc = serde_json::to_value(r).context("serializing report for CSV")?;
  if let Some(metrics) = doc.get_mut("metrics").and_then(Value::as_object_mut) {
    metrics.remove("velocity_trends");
  }
  if let Some(obj) = doc.as_object_mut() {
    obj.remove("authors");
  }

  let mut rows = Vec::new();
  flatten("", &doc, &mut rows);

  let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
  w.write_record(["metric", "value"])?;
  for (k, v) in &rows {
    w.write_record([k, v])?;
  }
  let mut out = into_string(w)?;

  if !r.metrics.velocity_trends.is_empty() {
    let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
    for point in &r.metrics.velocity_trends {
      w.serialize(point)?;
    }
    out.push('\n');
    out.push_str(&into_string(w)?);
  }

  if let Some(authors) = &r.authors {
    let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
    w.write_record([
      "author",
      "commits",
      "reviews_given",
      "reviews_received",
      "review_participation_rate",
      "issues_created",
      "issues_assigned",
    ])?;
    for a in authors {
      w.write_record([
        a.author.clone(),
        a.commits.to_string(),
        a.review_metrics.total_reviews_given.to_string(),
        a.review_metrics.total_reviews_received.to_string(),
        format!("{:.2}", a.review_metrics.review_participation_rate),
        a.issue_metrics.issues_created.to_string(),
        a.issue_metrics.issues_assigned.to_string(),
      ])?;
    }
    out.push('\n');
    out.push_str(&into_string(w)?);
  }

  Ok(out)
}

fn into_string(w: csv::Writer<Vec<u8>>) -> Result<String> {
  let bytes = w.into_inner().map_err(|e| anyhow::anyhow!("flushing CSV: {}", e))?;
  String::from_utf8(bytes).context("CSV output is not UTF-8")
}
