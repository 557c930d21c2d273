// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library surface for GitHub productivity aggregation (entities, aggregators, sources, rendering)
// role: crate/root
// outputs: Public modules consumed by the binary and integration tests
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod aggregate;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod ext;
pub mod github;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod render;
pub mod util;
pub mod window;
