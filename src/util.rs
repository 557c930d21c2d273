// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small CLI helpers: output sink selection, deterministic "now", man page rendering
// role: utilities/helpers
// inputs: Output path ("-" = stdout); optional now override; clap CommandFactory
// outputs: Written report text; DateTime<Utc>; man page text
// side_effects: write_output creates parent directories and writes files or stdout
// errors: IO errors bubble with the target path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::CommandFactory;

/// Returns the override when set, the wall clock otherwise.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Write `content` to stdout when `out` is "-", otherwise to the file at `out`.
pub fn write_output(out: &str, content: &str) -> Result<()> {
  if out == "-" {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes()).context("writing report to stdout")?;
    if !content.ends_with('\n') {
      stdout.write_all(b"\n").context("writing report to stdout")?;
    }
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, content).with_context(|| format!("writing report to {}", path.display()))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let man = clap_mangen::Man::new(T::command());
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
