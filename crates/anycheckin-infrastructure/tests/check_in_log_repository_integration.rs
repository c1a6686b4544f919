use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use anycheckin_domain::check_in::{CheckInLog, CheckInLogRepository, CheckInOutcome};
use anycheckin_domain::shared::AccountId;
use anycheckin_infrastructure::persistence::repositories::SqliteCheckInLogRepository;

mod test_helpers;

fn log_at(account: i64, success: bool, at: chrono::DateTime<Utc>) -> CheckInLog {
    let outcome = if success {
        CheckInOutcome::from_response(r#"{"success":true,"message":"签到成功"}"#.into())
    } else {
        CheckInOutcome::failure("request failed")
    };
    CheckInLog::new(AccountId::new(account), &outcome, at)
}

#[tokio::test]
async fn check_in_log_append_assigns_ids() {
    let (pool, _) = test_helpers::setup_in_memory_db().await;
    let repo = SqliteCheckInLogRepository::new(Arc::new(pool.clone()));

    let now = Utc::now();
    let first = repo.append(&log_at(1, true, now)).await.expect("Append");
    let second = repo.append(&log_at(1, false, now)).await.expect("Append");

    assert!(first.id().value() > 0);
    assert!(second.id().value() > first.id().value());
    assert!(first.is_success());
    assert_eq!(second.message(), "request failed");
}

#[tokio::test]
async fn check_in_log_recent_is_newest_first() {
    let (pool, _) = test_helpers::setup_in_memory_db().await;
    let repo = SqliteCheckInLogRepository::new(Arc::new(pool.clone()));

    let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    for minutes in 0..5 {
        repo.append(&log_at(minutes % 2 + 1, true, base + Duration::minutes(minutes)))
            .await
            .expect("Append");
    }

    let recent = repo.list_recent(3).await.expect("List recent");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].created_at(), base + Duration::minutes(4));
    assert_eq!(recent[2].created_at(), base + Duration::minutes(2));

    let by_account = repo
        .list_by_account(AccountId::new(2), 10)
        .await
        .expect("List by account");
    assert_eq!(by_account.len(), 2);
    assert!(by_account.iter().all(|l| l.account_id() == AccountId::new(2)));
}

#[tokio::test]
async fn check_in_log_counts_distinct_successful_accounts() {
    let (pool, _) = test_helpers::setup_in_memory_db().await;
    let repo = SqliteCheckInLogRepository::new(Arc::new(pool.clone()));

    let day = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    let next_day = day + Duration::days(1);

    // Account 1 twice, account 2 once, account 3 only failed, account 4 yesterday
    repo.append(&log_at(1, true, day + Duration::hours(8))).await.expect("Append");
    repo.append(&log_at(1, true, day + Duration::hours(9))).await.expect("Append");
    repo.append(&log_at(2, true, day + Duration::hours(10))).await.expect("Append");
    repo.append(&log_at(3, false, day + Duration::hours(11))).await.expect("Append");
    repo.append(&log_at(4, true, day - Duration::minutes(1))).await.expect("Append");

    let count = repo
        .count_successful_accounts_between(day, next_day)
        .await
        .expect("Count");
    assert_eq!(count, 2);
}

#[tokio::test]
async fn check_in_log_latest_successful() {
    let (pool, _) = test_helpers::setup_in_memory_db().await;
    let repo = SqliteCheckInLogRepository::new(Arc::new(pool.clone()));

    assert!(repo.find_latest_successful().await.expect("Query").is_none());

    let now = Utc::now();
    repo.append(&log_at(1, true, now)).await.expect("Append");
    let newest = repo.append(&log_at(2, true, now)).await.expect("Append");
    repo.append(&log_at(3, false, now)).await.expect("Append");

    let latest = repo
        .find_latest_successful()
        .await
        .expect("Query")
        .expect("A successful log exists");
    assert_eq!(latest.id(), newest.id());
    assert_eq!(latest.account_id(), AccountId::new(2));
}
