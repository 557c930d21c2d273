use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use gh_productivity_report::aggregate::commits::calculate_commit_metrics;
use gh_productivity_report::aggregate::issues::calculate_issue_metrics;
use gh_productivity_report::aggregate::pull_requests::calculate_pr_metrics;
use gh_productivity_report::aggregate::reviews::calculate_review_metrics;
use gh_productivity_report::aggregate::timeseries::generate_time_series;
use gh_productivity_report::metrics::MetricPeriod;
use gh_productivity_report::model::{
  Commit, Issue, IssueState, PullRequest, PullRequestState, Review, ReviewState,
};

const PEOPLE: [&str; 3] = ["alice", "bob", "carol"];

fn base() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn arb_commit() -> impl Strategy<Value = Commit> {
  (0usize..3, 0i64..60 * 24 * 60, 0u64..500, 0u64..500, 0u64..20).prop_map(|(who, minutes, add, del, files)| {
    Commit::new(format!("sha{minutes}"), PEOPLE[who], base() + Duration::minutes(minutes), "msg", add, del, files).unwrap()
  })
}

fn arb_review() -> impl Strategy<Value = (usize, u8, i64)> {
  (0usize..3, 0u8..3, 0i64..72)
}

fn arb_pull() -> impl Strategy<Value = PullRequest> {
  (1i64..10_000, 0usize..3, 0i64..60 * 24, 0u8..3, 1i64..200, prop::collection::vec(arb_review(), 0..4)).prop_map(
    |(number, who, hours, state, lag, reviews)| {
      let created = base() + Duration::hours(hours);
      let state = match state {
        0 => PullRequestState::Open,
        1 => PullRequestState::Closed,
        _ => PullRequestState::Merged,
      };
      let merged_at = (state == PullRequestState::Merged).then(|| created + Duration::hours(lag));
      let reviews = reviews
        .into_iter()
        .map(|(r, s, after)| {
          let s = match s {
            0 => ReviewState::Approved,
            1 => ReviewState::ChangesRequested,
            _ => ReviewState::Commented,
          };
          Review::new(PEOPLE[r], s, created + Duration::hours(after)).unwrap()
        })
        .collect();
      PullRequest::new(number, "pr", PEOPLE[who], created, state).unwrap().with_merged_at(merged_at).with_reviews(reviews)
    },
  )
}

fn arb_issue() -> impl Strategy<Value = Issue> {
  (1i64..10_000, 0usize..3, 0i64..60 * 24, prop::option::of(0i64..500), prop::option::of(0usize..3)).prop_map(
    |(number, who, hours, closed_after, assignee)| {
      let created = base() + Duration::hours(hours);
      let state = if closed_after.is_some() { IssueState::Closed } else { IssueState::Open };
      Issue::new(number, "issue", PEOPLE[who], created, state)
        .unwrap()
        .with_closed_at(closed_after.map(|h| created + Duration::hours(h)))
        .with_assignee(assignee.map(|a| PEOPLE[a].to_string()))
    },
  )
}

fn arb_granularity() -> impl Strategy<Value = MetricPeriod> {
  prop_oneof![
    Just(MetricPeriod::Daily),
    Just(MetricPeriod::Weekly),
    Just(MetricPeriod::Monthly),
    Just(MetricPeriod::Quarterly),
  ]
}

proptest! {
  #[test]
  fn frequency_tables_cover_every_commit(commits in prop::collection::vec(arb_commit(), 0..40)) {
    let m = calculate_commit_metrics(&commits).unwrap();
    let total = commits.len() as u64;
    prop_assert_eq!(m.total_commits, total);
    prop_assert_eq!(m.commit_frequency.daily.values().sum::<u64>(), total);
    prop_assert_eq!(m.commit_frequency.weekly.values().sum::<u64>(), total);
    prop_assert_eq!(m.commit_frequency.monthly.values().sum::<u64>(), total);
    prop_assert_eq!(m.commit_frequency.hourly.values().sum::<u64>(), total);
    prop_assert!(m.most_active_hours.len() <= 3);
  }

  #[test]
  fn time_series_buckets_every_commit_once(
    commits in prop::collection::vec(arb_commit(), 0..40),
    pulls in prop::collection::vec(arb_pull(), 0..10),
    granularity in arb_granularity(),
  ) {
    let series = generate_time_series(&commits, &pulls, &[], granularity);
    prop_assert_eq!(series.iter().map(|p| p.commits).sum::<u64>(), commits.len() as u64);
    prop_assert_eq!(series.iter().map(|p| p.pull_requests).sum::<u64>(), pulls.len() as u64);
    prop_assert_eq!(
      series.iter().map(|p| p.additions).sum::<u64>(),
      commits.iter().map(|c| c.additions).sum::<u64>()
    );
    prop_assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
  }

  #[test]
  fn review_rates_stay_in_range(pulls in prop::collection::vec(arb_pull(), 0..10), who in prop::option::of(0usize..3)) {
    let target = who.map(|i| PEOPLE[i]);
    let m = calculate_review_metrics(&pulls, target).unwrap();
    for rate in [m.approval_rate, m.change_request_rate, m.review_participation_rate] {
      prop_assert!((0.0..=100.0).contains(&rate));
    }
    if target.is_none() {
      prop_assert_eq!(m.total_reviews_given, m.total_reviews_received);
    }
  }

  #[test]
  fn pr_counts_partition_total(pulls in prop::collection::vec(arb_pull(), 0..15)) {
    let m = calculate_pr_metrics(&pulls).unwrap();
    prop_assert_eq!(m.merged_prs + m.closed_prs + m.open_prs, m.total_prs);
    prop_assert!((0.0..=100.0).contains(&m.merge_rate));
  }

  #[test]
  fn issue_counts_partition_total(issues in prop::collection::vec(arb_issue(), 0..20), who in prop::option::of(0usize..3)) {
    let m = calculate_issue_metrics(&issues, who.map(|i| PEOPLE[i])).unwrap();
    prop_assert_eq!(m.closed_issues + m.open_issues, m.total_issues);
    prop_assert_eq!(m.total_issues, issues.len() as u64);
    prop_assert!(m.issues_created <= m.total_issues);
    prop_assert!((0.0..=100.0).contains(&m.resolution_rate));
  }

  #[test]
  fn aggregators_are_idempotent(
    commits in prop::collection::vec(arb_commit(), 0..20),
    pulls in prop::collection::vec(arb_pull(), 0..8),
    issues in prop::collection::vec(arb_issue(), 0..8),
  ) {
    prop_assert_eq!(calculate_commit_metrics(&commits).unwrap(), calculate_commit_metrics(&commits).unwrap());
    prop_assert_eq!(calculate_pr_metrics(&pulls).unwrap(), calculate_pr_metrics(&pulls).unwrap());
    prop_assert_eq!(calculate_issue_metrics(&issues, None).unwrap(), calculate_issue_metrics(&issues, None).unwrap());
    prop_assert_eq!(
      generate_time_series(&commits, &pulls, &issues, MetricPeriod::Weekly),
      generate_time_series(&commits, &pulls, &issues, MetricPeriod::Weekly)
    );
  }

  #[test]
  fn closing_an_issue_never_lowers_resolution_rate(issues in prop::collection::vec(arb_issue(), 1..20), pick in 0usize..20) {
    let before = calculate_issue_metrics(&issues, None).unwrap().resolution_rate;
    let mut after_issues = issues.clone();
    let idx = pick % after_issues.len();
    let target = after_issues[idx].clone();
    if !target.is_closed() {
      after_issues[idx] = Issue::new(target.number, "issue", target.author, target.created_at, IssueState::Closed)
        .unwrap()
        .with_closed_at(Some(target.created_at + Duration::hours(1)));
    }
    let after = calculate_issue_metrics(&after_issues, None).unwrap().resolution_rate;
    prop_assert!(after >= before);
  }
}
