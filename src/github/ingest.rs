// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map GitHub REST payloads into validated Commit / PullRequest / Issue lists for one window
// role: github/ingest
// inputs: &dyn GithubApi, owner/name, [since, until), optional per-list cap
// outputs: Dataset
// side_effects: Issues API calls through the given backend
// invariants:
// - issues endpoint entries carrying `pull_request` are skipped
// - PR state is merged whenever merged_at is set
// - PRs and issues are kept only when created inside [since, until)
// - records failing validation are skipped with a warning, never abort the fetch
// errors: List-endpoint failures propagate; per-item detail lookups degrade to zero counts
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::model::{Commit, Issue, IssueState, PullRequest, PullRequestState, Review, ReviewState};

/// Fetch commits, pull requests (with reviews) and issues active in `[since, until)`.
pub fn fetch_dataset(
  api: &dyn GithubApi,
  owner: &str,
  name: &str,
  since: DateTime<Utc>,
  until: DateTime<Utc>,
  max_items: Option<usize>,
) -> Result<Dataset> {
  let cap = max_items.unwrap_or(usize::MAX);
  let inside = |ts: DateTime<Utc>| ts >= since && ts < until;

  let commit_json = api.list_commits_json(owner, name, since, until)?;
  info!(count = commit_json.len(), "listed commits");
  let commits: Vec<Commit> = commit_json
    .iter()
    .take(cap)
    .filter_map(|c| commit_from_json(api, owner, name, c))
    .collect();

  let pull_json = api.list_pulls_json(owner, name, since)?;
  info!(count = pull_json.len(), "listed pull requests");
  let pull_requests: Vec<PullRequest> = pull_json
    .iter()
    .filter(|p| p.fetch("created_at").datetime().is_some_and(inside))
    .take(cap)
    .filter_map(|p| pull_from_json(api, owner, name, p))
    .collect();

  let issue_json = api.list_issues_json(owner, name, since)?;
  info!(count = issue_json.len(), "listed issues");
  let issues: Vec<Issue> = issue_json
    .iter()
    .filter(|i| !i.fetch("pull_request").is_present())
    .filter(|i| i.fetch("created_at").datetime().is_some_and(inside))
    .take(cap)
    .filter_map(issue_from_json)
    .collect();

  Ok(Dataset { repository: Some(format!("{}/{}", owner, name)), commits, pull_requests, issues })
}

fn commit_from_json(api: &dyn GithubApi, owner: &str, name: &str, item: &Value) -> Option<Commit> {
  let sha = item.fetch("sha").to_or_default::<String>();
  let author = item
    .fetch("author.login")
    .to::<String>()
    .or_else(|| item.fetch("commit.author.name").to::<String>())
    .unwrap_or_default();
  let Some(timestamp) = item.fetch("commit.author.date").datetime() else {
    warn!(sha = %sha, "commit without author date; skipping");
    return None;
  };
  let message = item.fetch("commit.message").to_or_default::<String>();

  // the list endpoint omits stats; the single-commit endpoint carries them
  let details = if item.fetch("stats").is_present() { Some(item.clone()) } else { api.get_commit_json(owner, name, &sha) };
  let (additions, deletions, files_changed) = match &details {
    Some(d) => (
      d.fetch("stats.additions").to_or_default::<u64>(),
      d.fetch("stats.deletions").to_or_default::<u64>(),
      d.fetch("files").to::<Vec<Value>>().map_or(0, |f| f.len() as u64),
    ),
    None => {
      debug!(sha = %sha, "no commit details; counting zero changes");
      (0, 0, 0)
    }
  };

  Commit::new(sha.clone(), author, timestamp, message, additions, deletions, files_changed)
    .map_err(|e| warn!(sha = %sha, error = %e, "skipping invalid commit"))
    .ok()
}

fn review_from_json(item: &Value) -> Option<Review> {
  let reviewer = item.fetch("user.login").to_or_default::<String>();
  let state_raw = item.fetch("state").to_or_default::<String>();
  // PENDING and DISMISSED reviews are not part of the model
  let state = state_raw.parse::<ReviewState>().ok()?;
  let submitted_at = item.fetch("submitted_at").datetime()?;

  Review::new(reviewer, state, submitted_at)
    .map_err(|e| debug!(error = %e, "skipping review"))
    .ok()
    .map(|r| r.with_body(item.fetch("body").to::<String>().filter(|b| !b.is_empty())))
}

fn pull_from_json(api: &dyn GithubApi, owner: &str, name: &str, item: &Value) -> Option<PullRequest> {
  let number = item.fetch("number").to::<i64>().unwrap_or(0);
  let created_at = item.fetch("created_at").datetime()?;
  let merged_at = item.fetch("merged_at").datetime();
  let closed_at = item.fetch("closed_at").datetime();

  let state = if merged_at.is_some() {
    PullRequestState::Merged
  } else if item.fetch("state").to_or_default::<String>().eq_ignore_ascii_case("closed") {
    PullRequestState::Closed
  } else {
    PullRequestState::Open
  };

  let details = api.get_pull_details_json(owner, name, number);
  let count = |field: &str| details.as_ref().map_or(0, |d| d.fetch(field).to_or_default::<u64>());

  let reviews: Vec<Review> = api
    .list_reviews_for_pull_json(owner, name, number)
    .unwrap_or_default()
    .iter()
    .filter_map(review_from_json)
    .collect();

  let pr = PullRequest::new(
    number,
    item.fetch("title").to_or_default::<String>(),
    item.fetch("user.login").to_or_default::<String>(),
    created_at,
    state,
  );

  match pr {
    Ok(pr) => Some(
      pr.with_merged_at(merged_at)
        .with_closed_at(closed_at)
        .with_changes(count("additions"), count("deletions"), count("commits"))
        .with_reviews(reviews),
    ),
    Err(e) => {
      warn!(number, error = %e, "skipping invalid pull request");
      None
    }
  }
}

fn issue_from_json(item: &Value) -> Option<Issue> {
  let number = item.fetch("number").to::<i64>().unwrap_or(0);
  let created_at = item.fetch("created_at").datetime()?;
  let state = if item.fetch("state").to_or_default::<String>().eq_ignore_ascii_case("closed") {
    IssueState::Closed
  } else {
    IssueState::Open
  };
  let labels: Vec<String> = item
    .fetch("labels")
    .to::<Vec<Value>>()
    .unwrap_or_default()
    .iter()
    .filter_map(|l| l.fetch("name").to::<String>())
    .collect();

  let issue = Issue::new(
    number,
    item.fetch("title").to_or_default::<String>(),
    item.fetch("user.login").to_or_default::<String>(),
    created_at,
    state,
  );

  match issue {
    Ok(issue) => Some(
      issue
        .with_closed_at(item.fetch("closed_at").datetime())
        .with_assignee(item.fetch("assignee.login").to::<String>())
        .with_labels(labels)
        .with_body(item.fetch("body").to::<String>()),
    ),
    Err(e) => {
      warn!(number, error = %e, "skipping invalid issue");
      None
    }
  }
}
