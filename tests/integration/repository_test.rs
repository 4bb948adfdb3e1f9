// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_db;
use chrono::{Duration, Utc};
use serptrack::domain::models::check::{CheckPhase, CheckRequest, CheckStatus, RankCheck};
use serptrack::domain::models::ranking::RankingRecord;
use serptrack::domain::repositories::check_repository::CheckRepository;
use serptrack::domain::repositories::ranking_repository::RankingRepository;
use serptrack::domain::services::rank_extractor::RankPlacement;
use serptrack::infrastructure::repositories::{CheckRepositoryImpl, RankingRepositoryImpl};
use uuid::Uuid;

fn sample_check(keyword_id: i64) -> RankCheck {
    RankCheck::new(CheckRequest {
        keyword_id,
        query: "buy shoes".to_string(),
        target_url: "example.com/shoes".to_string(),
        region: "RU".to_string(),
    })
}

#[tokio::test]
async fn test_create_and_find_round_trip() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let mut check = sample_check(42);
    check.begin_polling("op-77".to_string(), Utc::now());
    repo.create(&check).await.unwrap();

    let found = repo.find_by_id(check.id).await.unwrap().unwrap();
    assert_eq!(found.keyword_id, 42);
    assert_eq!(found.query, "buy shoes");
    assert_eq!(found.region, "RU");
    assert_eq!(found.status, CheckStatus::Queued);
    // 阶段经 JSON 列持久化后原样恢复
    match found.phase {
        CheckPhase::Poll {
            ref operation_id,
            polls_done,
        } => {
            assert_eq!(operation_id, "op-77");
            assert_eq!(polls_done, 0);
        }
        ref other => panic!("unexpected phase: {:?}", other),
    }
}

#[tokio::test]
async fn test_find_missing_check_returns_none() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let found = repo.find_by_id(Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_acquire_next_claims_oldest_due_check() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let mut older = sample_check(1);
    older.created_at = (Utc::now() - Duration::minutes(5)).into();
    let mut newer = sample_check(2);
    newer.created_at = Utc::now().into();

    repo.create(&newer).await.unwrap();
    repo.create(&older).await.unwrap();

    let worker_id = Uuid::new_v4();
    let acquired = repo.acquire_next(worker_id).await.unwrap().unwrap();

    assert_eq!(acquired.id, older.id, "FIFO by creation time");
    assert_eq!(acquired.status, CheckStatus::Active);
    assert_eq!(acquired.lock_token, Some(worker_id));
    assert!(acquired.lock_expires_at.is_some());
    assert!(acquired.started_at.is_some());
}

#[tokio::test]
async fn test_acquire_next_skips_future_scheduled_check() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let mut check = sample_check(1);
    check.scheduled_at = Some((Utc::now() + Duration::minutes(10)).into());
    repo.create(&check).await.unwrap();

    let acquired = repo.acquire_next(Uuid::new_v4()).await.unwrap();
    assert!(acquired.is_none(), "check is not due yet");
}

#[tokio::test]
async fn test_acquire_next_picks_up_due_scheduled_check() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let mut check = sample_check(1);
    check.scheduled_at = Some((Utc::now() - Duration::seconds(1)).into());
    repo.create(&check).await.unwrap();

    let acquired = repo.acquire_next(Uuid::new_v4()).await.unwrap();
    assert!(acquired.is_some());
}

#[tokio::test]
async fn test_acquired_check_cannot_be_claimed_twice() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    repo.create(&sample_check(1)).await.unwrap();

    let first = repo.acquire_next(Uuid::new_v4()).await.unwrap();
    assert!(first.is_some());

    let second = repo.acquire_next(Uuid::new_v4()).await.unwrap();
    assert!(second.is_none(), "active check must not be claimed again");
}

#[tokio::test]
async fn test_empty_queue_returns_none() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let acquired = repo.acquire_next(Uuid::new_v4()).await.unwrap();
    assert!(acquired.is_none());
}

#[tokio::test]
async fn test_update_persists_phase_transition() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    let check = sample_check(1);
    repo.create(&check).await.unwrap();

    let mut polling = check.clone();
    polling.begin_polling("op-5".to_string(), Utc::now());
    polling.continue_polling(Utc::now()).unwrap();
    repo.update(&polling).await.unwrap();

    let found = repo.find_by_id(check.id).await.unwrap().unwrap();
    match found.phase {
        CheckPhase::Poll { polls_done, .. } => assert_eq!(polls_done, 1),
        ref other => panic!("unexpected phase: {:?}", other),
    }
    assert!(found.scheduled_at.is_some());
}

#[tokio::test]
async fn test_mark_completed_sets_terminal_state() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    repo.create(&sample_check(1)).await.unwrap();
    let acquired = repo.acquire_next(Uuid::new_v4()).await.unwrap().unwrap();

    repo.mark_completed(acquired.id).await.unwrap();

    let found = repo.find_by_id(acquired.id).await.unwrap().unwrap();
    assert_eq!(found.status, CheckStatus::Completed);
    assert!(found.completed_at.is_some());
    assert!(found.lock_token.is_none());
    assert!(found.lock_expires_at.is_none());
}

#[tokio::test]
async fn test_mark_failed_records_reason() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    repo.create(&sample_check(1)).await.unwrap();
    let acquired = repo.acquire_next(Uuid::new_v4()).await.unwrap().unwrap();

    repo.mark_failed(acquired.id, "decode failed: invalid base64 payload")
        .await
        .unwrap();

    let found = repo.find_by_id(acquired.id).await.unwrap().unwrap();
    assert_eq!(found.status, CheckStatus::Failed);
    assert_eq!(
        found.last_error.as_deref(),
        Some("decode failed: invalid base64 payload")
    );
    assert!(found.completed_at.is_some());
}

#[tokio::test]
async fn test_reset_stuck_checks_requeues_expired_leases() {
    let db = create_test_db().await;
    let repo = CheckRepositoryImpl::new(db);

    // 租约已过期的 active 检查
    let past = Utc::now() - Duration::minutes(10);
    let mut stuck = sample_check(1);
    stuck.status = CheckStatus::Active;
    stuck.started_at = Some(past.into());
    stuck.lock_token = Some(Uuid::new_v4());
    stuck.lock_expires_at = Some(past.into());
    repo.create(&stuck).await.unwrap();

    // 租约仍有效的 active 检查
    let mut healthy = sample_check(2);
    healthy.status = CheckStatus::Active;
    healthy.started_at = Some(Utc::now().into());
    healthy.lock_token = Some(Uuid::new_v4());
    healthy.lock_expires_at = Some((Utc::now() + Duration::minutes(10)).into());
    repo.create(&healthy).await.unwrap();

    let affected = repo.reset_stuck_checks(Duration::minutes(5)).await.unwrap();
    assert_eq!(affected, 1, "should reset exactly 1 check");

    let requeued = repo.find_by_id(stuck.id).await.unwrap().unwrap();
    assert_eq!(requeued.status, CheckStatus::Queued);
    assert!(requeued.lock_token.is_none());
    assert!(requeued.lock_expires_at.is_none());

    let untouched = repo.find_by_id(healthy.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, CheckStatus::Active);
}

#[tokio::test]
async fn test_ranking_insert_and_history_order() {
    let db = create_test_db().await;
    let repo = RankingRepositoryImpl::new(db);

    let base = Utc::now() - Duration::minutes(10);
    for (i, position) in [Some(3), None, Some(1)].iter().enumerate() {
        let mut record = RankingRecord::new(
            42,
            position.map(|p| RankPlacement {
                position: p,
                url: format!("https://example.com/{}", p),
            }),
            10,
        );
        record.checked_at = base + Duration::minutes(i as i64);
        repo.insert(&record).await.unwrap();
    }

    // 其它关键词的记录不混入
    let other = RankingRecord::new(7, None, 0);
    repo.insert(&other).await.unwrap();

    let history = repo.find_by_keyword(42, 100).await.unwrap();
    assert_eq!(history.len(), 3);
    // 按检查时间倒序：最新的在最前
    assert_eq!(history[0].position, Some(1));
    assert_eq!(history[1].position, None);
    assert_eq!(history[2].position, Some(3));

    let limited = repo.find_by_keyword(42, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn test_rankings_are_append_only_across_identical_checks() {
    let db = create_test_db().await;
    let repo = RankingRepositoryImpl::new(db);

    // 同一关键词的两次相同结果各得一行，只有 checked_at 不同
    let placement = || {
        Some(RankPlacement {
            position: 4,
            url: "https://example.com/shoes".to_string(),
        })
    };
    let mut first = RankingRecord::new(42, placement(), 10);
    first.checked_at = Utc::now() - Duration::minutes(1);
    let second = RankingRecord::new(42, placement(), 10);

    repo.insert(&first).await.unwrap();
    repo.insert(&second).await.unwrap();

    let history = repo.find_by_keyword(42, 100).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_ne!(history[0].id, history[1].id);
    assert_eq!(history[0].position, Some(4));
    assert_eq!(history[1].position, Some(4));
}

#[tokio::test]
async fn test_not_found_record_round_trip() {
    let db = create_test_db().await;
    let repo = RankingRepositoryImpl::new(db);

    let record = RankingRecord::new(42, None, 5);
    repo.insert(&record).await.unwrap();

    let history = repo.find_by_keyword(42, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].position.is_none());
    assert!(history[0].found_url.is_none());
    assert_eq!(history[0].total_results, 5);
}
