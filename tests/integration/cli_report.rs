use predicates::prelude::*;
use serde_json::Value;
use test_support;

fn run_json(extra: &[&str]) -> Value {
  let dataset = test_support::fixture_path("dataset.json");
  let mut cmd = test_support::cmd_bin("gh-productivity-report");
  let out = cmd.arg("--input").arg(&dataset).args(extra).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn dataset_without_window_spans_whole_days() {
  let v = run_json(&[]);
  assert_eq!(v["repository"], "acme/widgets");
  assert_eq!(v["metrics"]["period_start"], "2024-03-04T00:00:00Z");
  assert_eq!(v["metrics"]["period_end"], "2024-03-07T00:00:00Z");
  assert_eq!(v["derived"]["period_days"], 3);
  assert_eq!(v["derived"]["granularity"], "daily");
}

#[test]
fn team_metrics_from_dataset() {
  let v = run_json(&[]);
  let m = &v["metrics"];

  assert_eq!(m["commit_metrics"]["total_commits"], 4);
  assert_eq!(m["commit_metrics"]["average_additions"], 50.0);
  assert_eq!(m["commit_metrics"]["most_active_hours"], serde_json::json!([9, 14, 16]));
  assert_eq!(m["commit_metrics"]["commit_frequency"]["daily"]["2024-03-04"], 2);

  assert_eq!(m["pr_metrics"]["total_prs"], 3);
  assert_eq!(m["pr_metrics"]["merged_prs"], 1);
  assert_eq!(m["pr_metrics"]["closed_prs"], 1);
  assert_eq!(m["pr_metrics"]["open_prs"], 1);
  assert_eq!(m["pr_metrics"]["average_time_to_merge"], 24.0);

  assert_eq!(m["review_metrics"]["total_reviews_given"], 3);
  assert_eq!(m["review_metrics"]["total_reviews_received"], 3);

  assert_eq!(m["issue_metrics"]["total_issues"], 3);
  assert_eq!(m["issue_metrics"]["closed_issues"], 2);
  assert_eq!(m["issue_metrics"]["average_time_to_close"], 18.0);
  assert_eq!(m["issue_metrics"]["issues_assigned"], 2);

  assert_eq!(m["time_distribution"]["estimated"], true);
  assert!(v.get("authors").is_none());
}

#[test]
fn author_flag_narrows_reviews_and_issues() {
  let v = run_json(&["--author", "alice"]);
  let r = &v["metrics"]["review_metrics"];
  assert_eq!(r["total_reviews_given"], 1);
  assert_eq!(r["total_reviews_received"], 2);
  assert_eq!(r["change_request_rate"], 100.0);
  assert_eq!(r["average_review_time"], 4.0);
  assert_eq!(r["review_participation_rate"], 50.0);

  let i = &v["metrics"]["issue_metrics"];
  assert_eq!(i["issues_created"], 1);
  assert_eq!(i["issues_assigned"], 1);
  assert_eq!(i["total_issues"], 3);

  // commit metrics stay team-wide
  assert_eq!(v["metrics"]["commit_metrics"]["total_commits"], 4);
  assert_eq!(v["derived"]["target_author"], "alice");
}

#[test]
fn explicit_window_filters_by_start_time() {
  let v = run_json(&["--since", "2024-03-05", "--until", "2024-03-06"]);
  let m = &v["metrics"];
  assert_eq!(m["period_start"], "2024-03-05T00:00:00Z");
  assert_eq!(m["commit_metrics"]["total_commits"], 1);
  assert_eq!(m["pr_metrics"]["total_prs"], 1);
  assert_eq!(m["issue_metrics"]["total_issues"], 1);
  assert_eq!(v["derived"]["daily_commit_average"], 1.0);
}

#[test]
fn patterns_and_breakdown_are_opt_in() {
  let v = run_json(&["--patterns", "--by-author"]);

  let rp = &v["review_patterns"];
  assert_eq!(rp["total_reviewers"], 3);
  assert_eq!(rp["fastest_reviewers"][0]["reviewer"], "carol");

  let ip = &v["issue_patterns"];
  assert_eq!(ip["label_analysis"]["bug"]["total_issues"], 2);
  assert_eq!(ip["label_analysis"]["bug"]["closed_issues"], 2);
  assert_eq!(ip["total_assignees"], 2);

  let authors: Vec<&str> = v["authors"].as_array().unwrap().iter().map(|a| a["author"].as_str().unwrap()).collect();
  assert_eq!(authors, vec!["alice", "bob", "carol"]);
  assert_eq!(v["authors"][0]["commits"], 2);
}

#[test]
fn out_flag_writes_file() {
  let td = test_support::tempdir();
  let target = td.path().join("reports/march.json");
  let mut cmd = test_support::cmd_bin("gh-productivity-report");
  cmd
    .arg("--input")
    .arg(test_support::fixture_path("dataset.json"))
    .arg("--out")
    .arg(&target)
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let v: Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
  assert_eq!(v["metrics"]["commit_metrics"]["total_commits"], 4);
}

#[test]
fn empty_dataset_needs_a_window() {
  let empty = test_support::fixture_path("empty.json");

  test_support::cmd_bin("gh-productivity-report")
    .arg("--input")
    .arg(&empty)
    .assert()
    .failure()
    .stderr(predicate::str::contains("dataset is empty"));

  let out = test_support::cmd_bin("gh-productivity-report")
    .arg("--input")
    .arg(&empty)
    .args(["--month", "2024-02"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let v: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["metrics"]["commit_metrics"]["total_commits"], 0);
  assert_eq!(v["metrics"]["pr_metrics"]["average_time_to_merge"], Value::Null);
  assert_eq!(v["derived"]["period_days"], 29);
  assert_eq!(v["metrics"]["velocity_trends"], serde_json::json!([]));
}

#[test]
fn invalid_records_fail_with_context() {
  test_support::cmd_bin("gh-productivity-report")
    .arg("--input")
    .arg(test_support::fixture_path("invalid_pr.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("parsing dataset"));
}

#[test]
fn conflicting_sources_are_rejected() {
  test_support::cmd_bin("gh-productivity-report")
    .arg("--input")
    .arg(test_support::fixture_path("dataset.json"))
    .args(["--github-repo", "acme/widgets", "--last", "7d"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Ambiguous data source"));
}
