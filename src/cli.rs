// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Command-line surface and normalization into an EffectiveConfig
// role: cli/config
// inputs: argv (clap derive)
// outputs: EffectiveConfig (data source, optional window, metric options, output settings)
// invariants:
// - exactly one data source: --input or --github-repo
// - at most one window selection; the GitHub source requires one
// - --since and --until come as a pair
// errors: Invalid combinations bail with a message naming the flags
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricPeriod;
use crate::render::OutputFormat;
use crate::window::{AnalysisPeriod, WindowSpec};

#[derive(Parser, Debug)]
#[command(
  name = "gh-productivity-report",
  version,
  about = "Aggregate GitHub repository activity into productivity metrics",
  long_about = None
)]
pub struct Cli {
  /// Read commits, pull requests and issues from a JSON dataset file
  #[arg(long)]
  pub input: Option<PathBuf>,

  /// Fetch activity from GitHub: owner/name or a github.com URL
  #[arg(long)]
  pub github_repo: Option<String>,

  /// Calendar month, e.g. 2025-08
  #[arg(long)]
  pub month: Option<String>,

  /// Trailing window ending now: 7d, 30d, 90d, 6m or 1y
  #[arg(long, value_enum)]
  pub last: Option<AnalysisPeriod>,

  /// Window start (RFC3339 or YYYY-MM-DD); must be paired with --until
  #[arg(long)]
  pub since: Option<String>,

  /// Window end, exclusive; must be paired with --since
  #[arg(long)]
  pub until: Option<String>,

  /// Narrow review and issue metrics to one GitHub login
  #[arg(long)]
  pub author: Option<String>,

  /// Bucket width for velocity trends
  #[arg(long, value_enum, default_value_t = MetricPeriod::Daily)]
  pub granularity: MetricPeriod,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
  pub format: OutputFormat,

  /// Output file path (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Include reviewer and issue label/assignee breakdowns
  #[arg(long)]
  pub patterns: bool,

  /// Include review and issue metrics for every participant
  #[arg(long)]
  pub by_author: bool,

  /// Cap each entity list at this many items
  #[arg(long)]
  pub max_items: Option<usize>,

  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,

  /// Only log errors
  #[arg(short, long)]
  pub quiet: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for trailing windows (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
  File { path: String },
  Github { slug: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub source: Source,
  pub window: Option<WindowSpec>,
  pub author: Option<String>,
  pub granularity: MetricPeriod,
  pub format: OutputFormat,
  pub out: String,
  pub patterns: bool,
  pub by_author: bool,
  pub max_items: Option<usize>,
  pub verbose: u8,
  pub quiet: bool,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let source = match (&cli.input, &cli.github_repo) {
    (Some(p), None) => Source::File { path: p.to_string_lossy().into_owned() },
    (None, Some(slug)) => Source::Github { slug: slug.trim().to_string() },
    (None, None) => bail!("Provide a data source: --input <file> or --github-repo <owner/name>"),
    _ => bail!("Ambiguous data source: choose only one of --input | --github-repo"),
  };

  let window = match (&cli.month, &cli.last, &cli.since, &cli.until) {
    (Some(ym), None, None, None) => Some(WindowSpec::Month { ym: ym.clone() }),
    (None, Some(p), None, None) => Some(WindowSpec::Last(*p)),
    (None, None, Some(s), Some(u)) => Some(WindowSpec::SinceUntil { since: s.clone(), until: u.clone() }),
    (None, None, None, None) => None,
    (None, None, Some(_), None) | (None, None, None, Some(_)) => bail!("--since and --until must be given together"),
    _ => bail!("Ambiguous time selection: choose only one of --month | --last | --since/--until"),
  };

  if window.is_none() && matches!(source, Source::Github { .. }) {
    bail!("--github-repo needs a window: --month, --last, or (--since AND --until)");
  }

  if cli.max_items == Some(0) {
    bail!("--max-items must be at least 1");
  }

  let author = cli.author.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());

  Ok(EffectiveConfig {
    source,
    window,
    author,
    granularity: cli.granularity,
    format: cli.format,
    out: cli.out,
    patterns: cli.patterns,
    by_author: cli.by_author,
    max_items: cli.max_items,
    verbose: cli.verbose,
    quiet: cli.quiet,
    now_override: cli.now_override,
  })
}
