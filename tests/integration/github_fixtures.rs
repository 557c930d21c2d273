use predicates::prelude::*;
use serde_json::{json, Value};
use serial_test::serial;
use test_support;

fn payloads() -> Vec<(&'static str, Value)> {
  vec![
    (
      "COMMITS_JSON",
      json!([
        {
          "sha": "aaa111",
          "author": { "login": "octo" },
          "commit": { "author": { "name": "Octo Cat", "date": "2024-03-04T10:00:00Z" }, "message": "feat: widgets" },
          "stats": { "additions": 12, "deletions": 3 },
          "files": [{ "filename": "src/lib.rs" }, { "filename": "README.md" }]
        },
        {
          "sha": "bbb222",
          "author": null,
          "commit": { "author": { "name": "Drive By", "date": "2024-03-05T11:00:00Z" }, "message": "fix" }
        }
      ]),
    ),
    ("COMMIT_DETAILS_JSON", json!({ "bbb222": { "stats": { "additions": 1, "deletions": 1 }, "files": [{}] } })),
    (
      "PULLS_JSON",
      json!([
        {
          "number": 7, "title": "Widgets", "state": "closed", "user": { "login": "octo" },
          "created_at": "2024-03-04T12:00:00Z", "merged_at": "2024-03-04T18:00:00Z", "closed_at": "2024-03-04T18:00:00Z"
        },
        {
          "number": 3, "title": "Old work", "state": "open", "user": { "login": "octo" },
          "created_at": "2024-02-01T12:00:00Z"
        }
      ]),
    ),
    (
      "PR_REVIEWS_JSON",
      json!({ "7": [
        { "state": "APPROVED", "user": { "login": "hubot" }, "submitted_at": "2024-03-04T13:30:00Z" },
        { "state": "PENDING", "user": { "login": "hubot" } }
      ] }),
    ),
    ("PULL_DETAILS_JSON", json!({ "7": { "additions": 40, "deletions": 10, "commits": 2 } })),
    (
      "ISSUES_JSON",
      json!([
        {
          "number": 9, "title": "Broken widget", "state": "closed", "user": { "login": "hubot" },
          "created_at": "2024-03-04T09:00:00Z", "closed_at": "2024-03-05T09:00:00Z",
          "assignee": { "login": "octo" }, "labels": [{ "name": "bug" }]
        },
        {
          "number": 7, "title": "Widgets", "state": "closed", "user": { "login": "octo" },
          "created_at": "2024-03-04T12:00:00Z", "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/7" }
        }
      ]),
    ),
  ]
}

#[test]
#[serial]
fn github_source_maps_fixture_payloads() {
  let _env = test_support::with_github_fixtures(&payloads());

  let mut cmd = test_support::cmd_bin("gh-productivity-report");
  let out = cmd
    .args(["--github-repo", "https://github.com/acme/widgets", "--month", "2024-03", "--author", "octo"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v: Value = serde_json::from_slice(&out.stdout).unwrap();

  assert_eq!(v["repository"], "acme/widgets");
  assert_eq!(v["derived"]["period_days"], 31);

  let c = &v["metrics"]["commit_metrics"];
  assert_eq!(c["total_commits"], 2);
  assert_eq!(c["average_additions"], 6.5);
  assert_eq!(c["average_files_changed"], 1.5);

  let p = &v["metrics"]["pr_metrics"];
  assert_eq!(p["total_prs"], 1);
  assert_eq!(p["merged_prs"], 1);
  assert_eq!(p["average_time_to_merge"], 6.0);
  assert_eq!(p["average_additions"], 40.0);

  let r = &v["metrics"]["review_metrics"];
  assert_eq!(r["total_reviews_given"], 0);
  assert_eq!(r["total_reviews_received"], 1);

  let i = &v["metrics"]["issue_metrics"];
  assert_eq!(i["total_issues"], 1);
  assert_eq!(i["issues_assigned"], 1);
  assert_eq!(i["issues_created"], 0);
}

#[test]
#[serial]
fn github_source_without_token_or_fixtures_fails() {
  let _env = test_support::EnvGuard::unset_many(&["GITHUB_TOKEN", "GH_TOKEN", "PATH"]);
  let stray: Vec<String> = std::env::vars().map(|(k, _)| k).filter(|k| k.starts_with(test_support::GITHUB_FIXTURE_PREFIX)).collect();
  let _cleared = test_support::EnvGuard::unset_many(&stray.iter().map(String::as_str).collect::<Vec<_>>());

  test_support::cmd_bin("gh-productivity-report")
    .args(["--github-repo", "acme/widgets", "--last", "7d"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no GitHub token found"));
}

#[test]
fn github_source_rejects_bad_slug() {
  test_support::cmd_bin("gh-productivity-report")
    .args(["--github-repo", "not a repo", "--last", "30d"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unrecognised repository"));
}
