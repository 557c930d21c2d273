// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Configure the global tracing subscriber for the CLI
// role: observability/logging
// inputs: -v count, -q flag, RUST_LOG
// outputs: fmt subscriber writing to stderr
// invariants: RUST_LOG wins over flags; stdout stays reserved for the report
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive implied by the verbosity flags.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
  if quiet {
    return "error";
  }
  match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

/// Install the subscriber; a second call is a no-op.
pub fn init(verbose: u8, quiet: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
  let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}
