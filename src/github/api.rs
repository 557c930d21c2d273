// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub REST access behind a trait seam (HTTP, env fixtures, per-run cache) plus token discovery and slug parsing
// role: github/api
// inputs: owner/name, optional since/until bounds; env GITHUB_TOKEN/GH_TOKEN; optional `gh` CLI; GHP_TEST_* fixtures
// outputs: Raw JSON values for commits, pulls, reviews and issues
// side_effects: Network calls to api.github.com; spawns `gh` subprocess for token fallback; sleeps on rate limits
// invariants:
// - list endpoints page with per_page=100 until a short page (or, for pulls, until older than `since`)
// - 403/429 responses are retried a bounded number of times, honouring Retry-After / x-ratelimit-reset
// - token discovery prefers GITHUB_TOKEN, then GH_TOKEN, then `gh auth token`
// - any GHP_TEST_* variable switches to the fixture backend
// errors: List calls propagate with URL context; single-item detail calls are best-effort (None)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ext::serde_json::JsonFetch;

const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 100;
const MAX_RETRIES: u32 = 3;
const MAX_BACKOFF_SECS: u64 = 60;
const USER_AGENT: &str = concat!("gh-productivity-report/", env!("CARGO_PKG_VERSION"));

/// Split `owner/name`, `https://github.com/owner/name(.git)` or `git@github.com:owner/name(.git)`.
pub fn parse_repo_slug(input: &str) -> Option<(String, String)> {
  static RE_SLUG: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?:git@github\.com:|https?://github\.com/)?([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$").ok()
  });

  let caps = RE_SLUG.as_ref()?.captures(input.trim())?;
  let owner = caps.get(1)?.as_str().to_string();
  let name = caps.get(2)?.as_str().to_string();
  Some((owner, name))
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  let output = std::process::Command::new("gh").args(["auth", "token"]).output().ok()?;
  if !output.status.success() {
    return None;
  }
  let t = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!t.is_empty()).then_some(t)
}

fn iso(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// --- Trait seam for GitHub API ---

pub trait GithubApi {
  fn list_commits_json(&self, owner: &str, name: &str, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Value>>;
  fn get_commit_json(&self, owner: &str, name: &str, sha: &str) -> Option<Value>;
  /// All pulls (any state), newest first, stopping once creation predates `since`.
  fn list_pulls_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>>;
  fn list_reviews_for_pull_json(&self, owner: &str, name: &str, number: i64) -> Option<Vec<Value>>;
  fn get_pull_details_json(&self, owner: &str, name: &str, number: i64) -> Option<Value>;
  /// Issues (any state) updated since `since`; pull requests included, as GitHub returns them.
  fn list_issues_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>>;
}

// --- Lightweight in-memory caching wrapper ---

struct GithubCachedApi {
  inner: Box<dyn GithubApi>,
  commit_json: RefCell<HashMap<String, Option<Value>>>,
  pull_details_json: RefCell<HashMap<String, Option<Value>>>,
  pull_reviews_json: RefCell<HashMap<String, Option<Vec<Value>>>>,
}

impl GithubCachedApi {
  fn new(inner: Box<dyn GithubApi>) -> Self {
    Self {
      inner,
      commit_json: RefCell::new(HashMap::new()),
      pull_details_json: RefCell::new(HashMap::new()),
      pull_reviews_json: RefCell::new(HashMap::new()),
    }
  }

  fn key(owner: &str, name: &str, item: impl std::fmt::Display) -> String {
    format!("{}/{}:{}", owner, name, item)
  }

  fn memo<T: Clone>(cache: &RefCell<HashMap<String, T>>, key: String, load: impl FnOnce() -> T) -> T {
    if let Some(v) = cache.borrow().get(&key).cloned() {
      return v;
    }
    let v = load();
    cache.borrow_mut().insert(key, v.clone());
    v
  }
}

impl GithubApi for GithubCachedApi {
  fn list_commits_json(&self, owner: &str, name: &str, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Value>> {
    self.inner.list_commits_json(owner, name, since, until)
  }

  fn get_commit_json(&self, owner: &str, name: &str, sha: &str) -> Option<Value> {
    Self::memo(&self.commit_json, Self::key(owner, name, sha), || self.inner.get_commit_json(owner, name, sha))
  }

  fn list_pulls_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>> {
    self.inner.list_pulls_json(owner, name, since)
  }

  fn list_reviews_for_pull_json(&self, owner: &str, name: &str, number: i64) -> Option<Vec<Value>> {
    Self::memo(&self.pull_reviews_json, Self::key(owner, name, number), || {
      self.inner.list_reviews_for_pull_json(owner, name, number)
    })
  }

  fn get_pull_details_json(&self, owner: &str, name: &str, number: i64) -> Option<Value> {
    Self::memo(&self.pull_details_json, Self::key(owner, name, number), || {
      self.inner.get_pull_details_json(owner, name, number)
    })
  }

  fn list_issues_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>> {
    self.inner.list_issues_json(owner, name, since)
  }
}

// --- HTTP backend ---

struct GithubHttpApi {
  agent: ureq::Agent,
  token: String,
}

impl GithubHttpApi {
  fn new(token: String) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(StdDuration::from_secs(30)).build();
    Self { agent, token }
  }

  /// GET one URL, retrying on rate limiting.
  fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
    let mut attempt = 0;
    loop {
      let mut req = self
        .agent
        .get(url)
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", USER_AGENT)
        .set("Authorization", &format!("Bearer {}", self.token));
      for (k, v) in query {
        req = req.query(k, v);
      }

      match req.call() {
        Ok(resp) => return resp.into_json::<Value>().with_context(|| format!("decoding JSON from {}", url)),
        Err(ureq::Error::Status(code, resp)) if (code == 403 || code == 429) && attempt < MAX_RETRIES => {
          let wait = backoff_secs(
            resp.header("retry-after"),
            resp.header("x-ratelimit-reset"),
            Utc::now().timestamp(),
            attempt,
          );
          warn!(url, code, wait_secs = wait, "rate limited by GitHub; retrying");
          std::thread::sleep(StdDuration::from_secs(wait));
          attempt += 1;
        }
        Err(ureq::Error::Status(code, _)) => bail!("GitHub returned HTTP {} for {}", code, url),
        Err(e) => return Err(e).with_context(|| format!("requesting {}", url)),
      }
    }
  }

  /// Follow `page=N` until a short page, or until `stop` says the page is past the window.
  fn get_paged(&self, url: &str, query: &[(&str, String)], stop: impl Fn(&[Value]) -> bool) -> Result<Vec<Value>> {
    let mut out = Vec::new();

    for page in 1..=MAX_PAGES {
      let mut q = query.to_vec();
      q.push(("per_page", PER_PAGE.to_string()));
      q.push(("page", page.to_string()));

      let body = self.get_json(url, &q)?;
      let Value::Array(items) = body else {
        bail!("expected a JSON array from {}", url);
      };
      let done = items.len() < PER_PAGE || stop(&items);
      debug!(url, page, count = items.len(), "fetched page");
      out.extend(items);
      if done {
        break;
      }
    }

    Ok(out)
  }
}

/// Seconds to wait before retrying a rate-limited request.
fn backoff_secs(retry_after: Option<&str>, reset_epoch: Option<&str>, now_epoch: i64, attempt: u32) -> u64 {
  let hinted = retry_after
    .and_then(|s| s.trim().parse::<u64>().ok())
    .or_else(|| reset_epoch.and_then(|s| s.trim().parse::<i64>().ok()).map(|reset| (reset - now_epoch).max(1) as u64));

  hinted.unwrap_or(2u64.pow(attempt + 1)).min(MAX_BACKOFF_SECS)
}

impl GithubApi for GithubHttpApi {
  fn list_commits_json(&self, owner: &str, name: &str, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Value>> {
    let url = format!("{}/repos/{}/{}/commits", API_ROOT, owner, name);
    self.get_paged(&url, &[("since", iso(since)), ("until", iso(until))], |_| false)
  }

  fn get_commit_json(&self, owner: &str, name: &str, sha: &str) -> Option<Value> {
    let url = format!("{}/repos/{}/{}/commits/{}", API_ROOT, owner, name, sha);
    self.get_json(&url, &[]).map_err(|e| debug!(error = %e, "commit details unavailable")).ok()
  }

  fn list_pulls_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>> {
    let url = format!("{}/repos/{}/{}/pulls", API_ROOT, owner, name);
    let query = [("state", "all".to_string()), ("sort", "created".to_string()), ("direction", "desc".to_string())];
    self.get_paged(&url, &query, |page| {
      page.last().and_then(|pr| pr.fetch("created_at").datetime()).is_some_and(|created| created < since)
    })
  }

  fn list_reviews_for_pull_json(&self, owner: &str, name: &str, number: i64) -> Option<Vec<Value>> {
    let url = format!("{}/repos/{}/{}/pulls/{}/reviews", API_ROOT, owner, name, number);
    self.get_paged(&url, &[], |_| false).map_err(|e| debug!(error = %e, "reviews unavailable")).ok()
  }

  fn get_pull_details_json(&self, owner: &str, name: &str, number: i64) -> Option<Value> {
    let url = format!("{}/repos/{}/{}/pulls/{}", API_ROOT, owner, name, number);
    self.get_json(&url, &[]).map_err(|e| debug!(error = %e, "pull details unavailable")).ok()
  }

  fn list_issues_json(&self, owner: &str, name: &str, since: DateTime<Utc>) -> Result<Vec<Value>> {
    let url = format!("{}/repos/{}/{}/issues", API_ROOT, owner, name);
    self.get_paged(&url, &[("state", "all".to_string()), ("since", iso(since))], |_| false)
  }
}

// --- Env fixture backend ---

struct GithubEnvApi;

fn env_json(var: &str) -> Option<Value> {
  let raw = std::env::var(var).ok()?;
  serde_json::from_str::<Value>(&raw)
    .map_err(|e| warn!(var, error = %e, "ignoring unparsable fixture"))
    .ok()
}

fn env_array(var: &str) -> Vec<Value> {
  match env_json(var) {
    Some(Value::Array(items)) => items,
    _ => Vec::new(),
  }
}

/// Look up `key` in a JSON object stored in `var`.
fn env_keyed(var: &str, key: &str) -> Option<Value> {
  env_json(var)?.get(key).cloned()
}

impl GithubApi for GithubEnvApi {
  fn list_commits_json(&self, _owner: &str, _name: &str, _since: DateTime<Utc>, _until: DateTime<Utc>) -> Result<Vec<Value>> {
    Ok(env_array("GHP_TEST_COMMITS_JSON"))
  }

  fn get_commit_json(&self, _owner: &str, _name: &str, sha: &str) -> Option<Value> {
    env_keyed("GHP_TEST_COMMIT_DETAILS_JSON", sha)
  }

  fn list_pulls_json(&self, _owner: &str, _name: &str, _since: DateTime<Utc>) -> Result<Vec<Value>> {
    Ok(env_array("GHP_TEST_PULLS_JSON"))
  }

  fn list_reviews_for_pull_json(&self, _owner: &str, _name: &str, number: i64) -> Option<Vec<Value>> {
    match env_keyed("GHP_TEST_PR_REVIEWS_JSON", &number.to_string())? {
      Value::Array(items) => Some(items),
      _ => None,
    }
  }

  fn get_pull_details_json(&self, _owner: &str, _name: &str, number: i64) -> Option<Value> {
    env_keyed("GHP_TEST_PULL_DETAILS_JSON", &number.to_string())
  }

  fn list_issues_json(&self, _owner: &str, _name: &str, _since: DateTime<Utc>) -> Result<Vec<Value>> {
    Ok(env_array("GHP_TEST_ISSUES_JSON"))
  }
}

pub fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("GHP_TEST_"))
}

/// Pick the backend for this run: fixtures when requested, otherwise HTTP with a discovered token.
pub fn build_api(token: Option<String>) -> Result<Box<dyn GithubApi>> {
  let inner: Box<dyn GithubApi> = if env_wants_mock() {
    debug!("using GHP_TEST_* fixture backend");
    Box::new(GithubEnvApi)
  } else if let Some(t) = token {
    Box::new(GithubHttpApi::new(t))
  } else {
    bail!("no GitHub token found; set GITHUB_TOKEN or GH_TOKEN, or log in with `gh auth login`");
  };

  Ok(Box::new(GithubCachedApi::new(inner)))
}
