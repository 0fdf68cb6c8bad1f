/// エラーシナリオのテスト
///
/// 1. HTTPエラー（401/500）が ApiError として呼び出し元に伝わること
/// 2. 途中ページの失敗で部分結果を返さないこと
/// 3. 不正なJSON・想定外の形のレスポンスの扱い
/// 4. 設定ファイルの欠落・不正

use scorecard::{Error, PsaClient, PsaConfig, PsaCredentials, RmmClient, ScorecardConfig};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> PsaCredentials {
    PsaCredentials {
        company: "acme".to_string(),
        public_key: "pub".to_string(),
        private_key: "priv".to_string(),
        client_id: "client-123".to_string(),
    }
}

async fn setup_client(server: &MockServer) -> PsaClient {
    let config = PsaConfig::new(server.uri(), credentials()).unwrap();
    let names: [&str; 0] = [];
    PsaClient::new(&config, &names).await.unwrap()
}

fn ticket_page(start: usize, len: usize) -> serde_json::Value {
    json!((start..start + len)
        .map(|id| json!({
            "id": id,
            "dateEntered": "2024-03-07T09:00:00Z",
            "company": { "id": 10, "identifier": "ACME", "name": "Acme Ltd" },
            "board": { "id": 1, "name": "Helpdesk" }
        }))
        .collect::<Vec<_>>())
}

#[tokio::test]
async fn test_unauthorized_response() {
    // Given: 認証エラーを返すサーバー
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/tickets/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server).await;

    // When
    let result = client.open_tickets().await;

    // Then
    match result {
        Err(Error::ApiError { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_construction_fails_when_board_listing_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/boards"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PsaConfig::new(mock_server.uri(), credentials()).unwrap();
    let result = PsaClient::new(&config, &["Planned Time Off"]).await;

    assert!(matches!(result, Err(Error::ApiError { status: 500, .. })));
}

#[tokio::test]
async fn test_failure_on_second_page_discards_first_page() {
    // Given: 1ページ目は満杯、2ページ目で失敗
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/tickets/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_page(0, 1000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/service/tickets/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server).await;

    // When
    let result = client.open_tickets_by_board(1).await;

    // Then: 部分結果ではなくエラー
    assert!(matches!(result, Err(Error::ApiError { status: 503, .. })));
}

#[tokio::test]
async fn test_malformed_json_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/boards"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server).await;

    let result = client.boards().await;

    assert!(matches!(result, Err(Error::JsonParsing(_))));
}

#[tokio::test]
async fn test_ticket_missing_required_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/tickets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server).await;

    let result = client.open_tickets().await;

    assert!(matches!(result, Err(Error::JsonParsing(_))));
}

#[tokio::test]
async fn test_board_list_failure_is_not_cached() {
    // Given: 1回目は失敗、2回目は成功
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/boards"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/boards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "name": "SD - Reactive" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server).await;

    // When / Then
    assert!(client.board_id_by_name("SD - Reactive").await.is_err());
    assert_eq!(client.board_id_by_name("SD - Reactive").await.unwrap(), 7);
}

#[tokio::test]
async fn test_rmm_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let rmm = RmmClient::new(&mock_server.uri(), "user:pass").unwrap();

    let result = rmm.device_stats(&["Acme Ltd"]).await;

    assert!(matches!(result, Err(Error::ApiError { status: 403, .. })));
}

#[tokio::test]
async fn test_config_file_missing() {
    let temp_dir = TempDir::new().unwrap();

    let result = ScorecardConfig::load(&temp_dir.path().join("scorecard.json")).await;

    match result {
        Err(e) => assert!(e.is_configuration()),
        Ok(_) => panic!("Expected missing configuration"),
    }
}

#[tokio::test]
async fn test_config_file_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("scorecard.json");
    fs::write(&config_path, r#"{ "rmm_key": 42, "psa_boards": "Helpdesk" }"#).unwrap();

    let result = ScorecardConfig::load(&config_path).await;

    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}
