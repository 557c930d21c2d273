// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Upstream data source: GitHub REST access and mapping into entity lists
// role: github/namespace
// outputs: api (trait seam + backends), ingest (fetch_dataset)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod ingest;

pub use api::{build_api, get_github_token, parse_repo_slug, GithubApi};
pub use ingest::fetch_dataset;
