use gavel_engine::{ApiClient, ApiError, ApiSettings, ReqwestApiClient};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestApiClient {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    };
    ReqwestApiClient::new(settings).expect("client builds")
}

#[tokio::test]
async fn search_flattens_the_mapping_in_response_order() {
    let server = MockServer::start().await;
    let body = r#"{
        "https://example.com/911": {
            "title": "Porsche 911",
            "url": "https://example.com/911",
            "image": "https://example.com/911.jpg",
            "time": "2026-09-01T12:00:00",
            "price": "$45,000",
            "year": 2010
        },
        "https://example.com/e30": {
            "title": "1995 BMW E30",
            "url": "https://example.com/e30",
            "image": "https://example.com/e30.jpg",
            "time": "N/A",
            "price": null
        }
    }"#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "porsche"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let listings = client_for(&server).search("porsche").await.expect("search ok");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].url, "https://example.com/911");
    assert_eq!(listings[0].price.as_deref(), Some("$45,000"));
    assert_eq!(listings[0].year, Some(2010));
    assert_eq!(listings[1].url, "https://example.com/e30");
    assert_eq!(listings[1].price, None);
    assert_eq!(listings[1].effective_year(), Some(1995));
}

#[tokio::test]
async fn empty_pool_answers_as_an_empty_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"{"error": "No listings found"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let listings = client_for(&server).listings().await.expect("listings ok");
    assert!(listings.is_empty());
}

#[tokio::test]
async fn unauthorized_maps_to_the_distinct_auth_required_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garage"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_raw(r#"{"error": "Authentication required"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).garage().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
}

#[tokio::test]
async fn save_posts_the_url_and_returns_the_remote_snapshot() {
    let server = MockServer::start().await;
    let body = r#"{
        "message": "Login successful",
        "car": {
            "title": "Porsche 911",
            "url": "https://example.com/911",
            "image": "https://example.com/911.jpg",
            "time": "2026-09-01T12:00:00",
            "price": "$45,000",
            "year": 2010
        }
    }"#;
    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_json(serde_json::json!({ "url": "https://example.com/911" })))
        .respond_with(ResponseTemplate::new(201).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let listing = client_for(&server)
        .save("https://example.com/911")
        .await
        .expect("save ok");
    assert_eq!(listing.url, "https://example.com/911");
    assert_eq!(listing.title, "Porsche 911");
}

#[tokio::test]
async fn error_payload_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete_saved_listing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(
                r#"{"error": "Listing not found in garage"}"#,
                "application/json",
            ),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_saved_listing("https://example.com/gone")
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Listing not found in garage");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn login_parses_the_user_payload() {
    let server = MockServer::start().await;
    let body = r#"{
        "message": "Login successful",
        "user": {
            "id": 7,
            "email": "alice@example.com",
            "username": "alice",
            "created_at": "2026-01-01T00:00:00+00:00"
        }
    }"#;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(serde_json::json!({
            "email_or_username": "alice",
            "password": "hunter2hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let user = client_for(&server)
        .login("alice", "hunter2hunter2")
        .await
        .expect("login ok");
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn invalid_credentials_surface_as_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_raw(r#"{"error": "Invalid credentials"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
}
