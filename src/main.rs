use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use clap::Parser;
use tracing::{debug, info};

use gh_productivity_report::aggregate::issues::analyze_issue_patterns;
use gh_productivity_report::aggregate::productivity::{author_breakdown, calculate_productivity_metrics, MetricsOptions};
use gh_productivity_report::aggregate::reviews::analyze_review_patterns;
use gh_productivity_report::cli::{normalize, Cli, EffectiveConfig, Source};
use gh_productivity_report::dataset::Dataset;
use gh_productivity_report::github::{build_api, fetch_dataset, get_github_token, parse_repo_slug};
use gh_productivity_report::metrics::Period;
use gh_productivity_report::render::{render, Report};
use gh_productivity_report::window::{parse_now_override, resolve_window};
use gh_productivity_report::{logging, util};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  logging::init(cfg.verbose, cfg.quiet);
  debug!(config = ?cfg, "effective configuration");

  // Phase 2: resolve the window and load activity
  let now = parse_now_override(cfg.now_override.as_deref());
  let window = cfg.window.as_ref().map(|w| resolve_window(w, now)).transpose()?;
  let dataset = load_dataset(&cfg, window)?;
  info!(
    commits = dataset.commits.len(),
    pull_requests = dataset.pull_requests.len(),
    issues = dataset.issues.len(),
    "dataset loaded"
  );

  let period = match window {
    Some((since, until)) => Period::new(since, until)?,
    None => default_period(&dataset)?,
  };

  // Phase 3: aggregate and render
  let options =
    MetricsOptions { target_author: cfg.author.clone(), granularity: cfg.granularity, ..Default::default() };
  let metrics =
    calculate_productivity_metrics(&dataset.commits, &dataset.pull_requests, &dataset.issues, period, &options)?;

  let mut report = Report::new(dataset.repository.clone(), metrics, cfg.granularity, cfg.author.clone());
  if cfg.patterns {
    report = report.with_patterns(
      analyze_review_patterns(&dataset.pull_requests),
      analyze_issue_patterns(&dataset.issues),
    );
  }
  if cfg.by_author {
    let authors = author_breakdown(&dataset.commits, &dataset.pull_requests, &dataset.issues)?;
    info!(authors = authors.len(), "per-author breakdown computed");
    report = report.with_authors(authors);
  }

  let content = render(&report, cfg.format)?;
  util::write_output(&cfg.out, &content)?;
  info!(out = %cfg.out, "report written");
  Ok(())
}

fn load_dataset(cfg: &EffectiveConfig, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Result<Dataset> {
  match &cfg.source {
    Source::File { path } => {
      let mut dataset = Dataset::from_path(std::path::Path::new(path))?;
      if let Some((since, until)) = window {
        dataset = dataset.within(since, until);
      }
      if let Some(max) = cfg.max_items {
        dataset = dataset.cap(max);
      }
      Ok(dataset)
    }
    Source::Github { slug } => {
      let (owner, name) =
        parse_repo_slug(slug).with_context(|| format!("unrecognised repository '{}', expected owner/name", slug))?;
      let (since, until) = window.context("GitHub source requires a window")?;
      let api = build_api(get_github_token())?;
      info!(repo = %format!("{}/{}", owner, name), %since, %until, "fetching from GitHub");
      fetch_dataset(api.as_ref(), &owner, &name, since, until, cfg.max_items)
    }
  }
}

/// Whole days covering every activity instant in the dataset.
fn default_period(dataset: &Dataset) -> Result<Period> {
  let Some((lo, hi)) = dataset.span() else {
    bail!("dataset is empty; pass --month, --last or --since/--until to report on an empty window");
  };
  let start = lo.date_naive().and_time(NaiveTime::MIN).and_utc();
  let end = hi.date_naive().and_time(NaiveTime::MIN).and_utc() + Duration::days(1);
  Ok(Period::new(start, end)?)
}
