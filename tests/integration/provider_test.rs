// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{encoded_snapshot, mock_yandex_settings};
use serde_json::json;
use serptrack::domain::search::provider::{PollOutcome, SearchError, SearchProvider};
use serptrack::infrastructure::search::YandexProvider;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_submit_sends_credentials_and_returns_operation_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/web/searchAsync"))
        .and(header("Authorization", "Api-Key test-key"))
        .and(body_partial_json(json!({
            "query": {
                "searchType": "SEARCH_TYPE_RU",
                "queryText": "buy shoes"
            },
            "folderId": "test-folder",
            "responseFormat": "FORMAT_JSON"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "op-abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let operation_id = provider.submit("buy shoes", "RU").await.unwrap();
    assert_eq!(operation_id, "op-abc");
}

#[tokio::test]
async fn test_submit_maps_turkish_region_to_its_index() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/web/searchAsync"))
        .and(body_partial_json(json!({
            "query": { "searchType": "SEARCH_TYPE_TR" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "op-tr" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let operation_id = provider.submit("ayakkabı al", "TR").await.unwrap();
    assert_eq!(operation_id, "op-tr");
}

#[tokio::test]
async fn test_submit_http_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/web/searchAsync"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let err = provider.submit("buy shoes", "RU").await.unwrap_err();
    assert!(matches!(err, SearchError::Submit(_)));
    assert!(err.is_transient(), "5xx submit failures are retryable");
}

#[tokio::test]
async fn test_fetch_pending_operation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-abc"))
        .and(header("Authorization", "Api-Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": false })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let outcome = provider.fetch("op-abc").await.unwrap();
    assert_eq!(outcome, PollOutcome::Pending);
}

#[tokio::test]
async fn test_fetch_done_operation_decodes_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "done": true,
            "response": {
                "rawData": encoded_snapshot(&[
                    "https://other.com/page",
                    "https://example.com/shoes"
                ])
            }
        })))
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    match provider.fetch("op-abc").await.unwrap() {
        PollOutcome::Complete(snapshot) => {
            assert_eq!(snapshot.items.len(), 2);
            assert_eq!(snapshot.items[1].url, "https://example.com/shoes");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_done_without_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let err = provider.fetch("op-abc").await.unwrap_err();
    assert!(matches!(err, SearchError::Decode(_)));
    assert!(!err.is_transient(), "malformed payloads are not retryable");
}

#[tokio::test]
async fn test_fetch_garbled_payload_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "done": true,
            "response": { "rawData": "%%% not base64 %%%" }
        })))
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let err = provider.fetch("op-abc").await.unwrap_err();
    assert!(matches!(err, SearchError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_http_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operations/op-abc"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let provider = YandexProvider::new(mock_yandex_settings(&server.uri()));

    let err = provider.fetch("op-abc").await.unwrap_err();
    assert!(matches!(err, SearchError::Poll(_)));
    assert!(err.is_transient(), "5xx poll failures consume budget, not retries");
}
