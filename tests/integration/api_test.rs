// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use serptrack::domain::models::ranking::RankingRecord;
use serptrack::domain::repositories::check_repository::CheckRepository;
use serptrack::domain::repositories::ranking_repository::RankingRepository;
use serptrack::domain::services::rank_extractor::RankPlacement;
use uuid::Uuid;

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/version").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_check_schedules_and_returns_accepted() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/checks")
        .json(&json!({
            "keyword_id": 42,
            "query": "buy shoes",
            "target_url": "example.com/shoes",
            "region": "RU"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::ACCEPTED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "queued");

    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = app.check_repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.keyword_id, 42);
    assert_eq!(stored.region, "RU");
}

#[tokio::test]
async fn test_create_check_defaults_region() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/checks")
        .json(&json!({
            "keyword_id": 7,
            "query": "buy shoes",
            "target_url": "example.com/shoes"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::ACCEPTED);

    let body: Value = response.json();
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = app.check_repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.region, "RU", "region defaults to RU");
}

#[tokio::test]
async fn test_create_check_rejects_empty_query() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/checks")
        .json(&json!({
            "keyword_id": 42,
            "query": "",
            "target_url": "example.com/shoes"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_check_rejects_invalid_region() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/checks")
        .json(&json!({
            "keyword_id": 42,
            "query": "buy shoes",
            "target_url": "example.com/shoes",
            "region": "X"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_check_reports_status_and_phase() {
    let app = create_test_app().await;

    let created: Value = app
        .server
        .post("/v1/checks")
        .json(&json!({
            "keyword_id": 42,
            "query": "buy shoes",
            "target_url": "example.com/shoes"
        }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app.server.get(&format!("/v1/checks/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["keyword_id"], 42);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["phase"], "submit");
    assert_eq!(body["attempt_count"], 0);
    assert!(body["last_error"].is_null());
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn test_get_missing_check_returns_404() {
    let app = create_test_app().await;

    let response = app
        .server
        .get(&format!("/v1/checks/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rankings_endpoint_returns_history() {
    let app = create_test_app().await;

    let mut found = RankingRecord::new(
        42,
        Some(RankPlacement {
            position: 3,
            url: "https://example.com/shoes".to_string(),
        }),
        10,
    );
    found.checked_at = Utc::now() - Duration::minutes(1);
    app.ranking_repo.insert(&found).await.unwrap();

    let missed = RankingRecord::new(42, None, 8);
    app.ranking_repo.insert(&missed).await.unwrap();

    let response = app.server.get("/v1/keywords/42/rankings").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["keyword_id"], 42);

    let rankings = body["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 2);
    // 最新的在最前：未命中记录的位置是 null
    assert!(rankings[0]["position"].is_null());
    assert_eq!(rankings[1]["position"], 3);
    assert_eq!(rankings[1]["found_url"], "https://example.com/shoes");
    assert_eq!(rankings[1]["total_results"], 10);
}

#[tokio::test]
async fn test_rankings_endpoint_honors_limit() {
    let app = create_test_app().await;

    for i in 0..5 {
        let mut record = RankingRecord::new(42, None, 1);
        record.checked_at = Utc::now() - Duration::minutes(i);
        app.ranking_repo.insert(&record).await.unwrap();
    }

    let response = app.server.get("/v1/keywords/42/rankings?limit=2").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["rankings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rankings_endpoint_empty_history() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/keywords/999/rankings").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["keyword_id"], 999);
    assert!(body["rankings"].as_array().unwrap().is_empty());
}
