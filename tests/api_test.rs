use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use mediatheque::adapters::clock::FixedClock;
use mediatheque::adapters::memory::InMemoryStore;
use mediatheque::api::{AppState, create_router};
use mediatheque::application::ServiceDependencies;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const STAFF_TOKEN: &str = "test-staff-token";

// ============================================================================
// テストヘルパー
// ============================================================================

/// インメモリストアを使ったルーターを作成する
fn setup_app() -> (axum::Router, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    ));
    let service_deps =
        ServiceDependencies::from_store(Arc::new(InMemoryStore::new()), clock.clone());
    let state = Arc::new(AppState::new(service_deps, Some(STAFF_TOKEN.to_string())));
    (create_router(state), clock)
}

fn request(method: &str, uri: &str, body: Option<Value>, staff: bool) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if staff {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", STAFF_TOKEN));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn create_book(app: &axum::Router, title: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/media/books",
            Some(json!({ "title": title, "author": "Jean Dupont", "year": 2023 })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_member(app: &axum::Router, email: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/members",
            Some(json!({ "name": "Alice Martin", "email": email })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// 公開エンドポイント
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _clock) = setup_app();

    let response = app
        .oneshot(request("GET", "/health", None, false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_media_listing_is_public_and_sorted_by_title() {
    let (app, _clock) = setup_app();
    create_book(&app, "Zazie dans le métro").await;
    create_book(&app, "Antigone").await;

    let (status, body) = send(&app, request("GET", "/media", None, false)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 2);
    assert_eq!(body["media"][0]["title"], "Antigone");
    assert_eq!(body["media"][0]["media_type"], "book");
    assert_eq!(body["media"][1]["title"], "Zazie dans le métro");
}

#[tokio::test]
async fn test_get_item_reports_board_game_as_not_loanable() {
    let (app, _clock) = setup_app();
    let (status, game) = send(
        &app,
        request(
            "POST",
            "/board-games",
            Some(json!({ "title": "Carcassonne", "creator": "Klaus-Jürgen Wrede" })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(game["min_players"], 1);
    assert_eq!(game["max_players"], 4);

    let uri = format!("/items/{}", game["id"].as_str().unwrap());
    let (status, item) = send(&app, request("GET", &uri, None, false)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["media_type"], "board_game");
    assert_eq!(item["loanable"], false);
}

#[tokio::test]
async fn test_get_unknown_item_returns_404() {
    let (app, _clock) = setup_app();
    let uri = format!("/items/{}", uuid::Uuid::new_v4());

    let (status, body) = send(&app, request("GET", &uri, None, false)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

// ============================================================================
// アクセス制御
// ============================================================================

#[tokio::test]
async fn test_members_directory_redirects_anonymous_to_media() {
    let (app, _clock) = setup_app();

    let response = app
        .oneshot(request("GET", "/members", None, false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/media");
}

#[tokio::test]
async fn test_members_directory_for_staff() {
    let (app, _clock) = setup_app();
    create_member(&app, "alice@example.com").await;

    let (status, body) = send(&app, request("GET", "/members", None, true)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["members"][0]["email"], "alice@example.com");
    assert_eq!(body["members"][0]["can_borrow"], true);
}

#[tokio::test]
async fn test_staff_endpoints_reject_anonymous_and_wrong_token() {
    let (app, _clock) = setup_app();
    let body = json!({ "title": "Antigone", "author": "Anouilh", "year": 1944 });

    let (status, _) = send(&app, request("POST", "/media/books", Some(body.clone()), false)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method("POST")
        .uri("/media/books")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let (app, clock) = setup_app();
    let item_id = create_book(&app, "Le Petit Prince").await;
    let member_id = create_member(&app, "alice@example.com").await;

    // 貸出
    let (status, loan) = send(
        &app,
        request(
            "POST",
            "/loans",
            Some(json!({ "item_id": item_id, "member_id": member_id })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["due_on"], "2024-03-08");
    assert_eq!(loan["status"], "active");
    let loan_id = loan["loan_id"].as_str().unwrap().to_string();

    // 同じメディアは貸出不可
    let other = create_member(&app, "bob@example.com").await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/loans",
            Some(json!({ "item_id": item_id, "member_id": other })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "MEDIA_UNAVAILABLE");

    // 延滞
    clock.advance_days(8);
    let (status, overdue) = send(&app, request("GET", "/loans/overdue", None, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    assert_eq!(overdue[0]["overdue"], true);

    // 返却
    let uri = format!("/loans/{}/return", loan_id);
    let (status, returned) = send(&app, request("POST", &uri, None, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["returned_on"], "2024-03-09");
    assert_eq!(returned["returned_late"], true);

    // 二重返却
    let (status, body) = send(&app, request("POST", &uri, None, true)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "LOAN_ALREADY_RETURNED");

    // 会員の貸出一覧（ステータス絞り込み）
    let uri = format!("/loans?member_id={}&status=returned", member_id);
    let (status, loans) = send(&app, request("GET", &uri, None, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_borrow_board_game_returns_422() {
    let (app, _clock) = setup_app();
    let member_id = create_member(&app, "alice@example.com").await;
    let (_, game) = send(
        &app,
        request(
            "POST",
            "/board-games",
            Some(json!({ "title": "Dixit", "creator": "Jean-Louis Roubira", "min_players": 3, "max_players": 6 })),
            true,
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/loans",
            Some(json!({ "item_id": game["id"], "member_id": member_id })),
            true,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NOT_LOANABLE");
}

#[tokio::test]
async fn test_list_loans_requires_member_id_and_valid_status() {
    let (app, _clock) = setup_app();

    let (status, _) = send(&app, request("GET", "/loans", None, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/loans?member_id={}&status=lost", uuid::Uuid::new_v4());
    let (status, _) = send(&app, request("GET", &uri, None, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// 入力エラー・一意制約
// ============================================================================

#[tokio::test]
async fn test_invalid_member_email_returns_400() {
    let (app, _clock) = setup_app();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/members",
            Some(json!({ "name": "Alice", "email": "not-an-email" })),
            true,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_duplicate_email_returns_409() {
    let (app, _clock) = setup_app();
    create_member(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/members",
            Some(json!({ "name": "Alice bis", "email": "alice@example.com" })),
            true,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE");
}

#[tokio::test]
async fn test_block_member_then_borrow_is_refused() {
    let (app, _clock) = setup_app();
    let item_id = create_book(&app, "Le Petit Prince").await;
    let member_id = create_member(&app, "alice@example.com").await;

    let uri = format!("/members/{}/block", member_id);
    let (status, member) = send(&app, request("POST", &uri, None, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member["blocked"], true);

    let uri = format!("/members/{}", member_id);
    let (_, standing) = send(&app, request("GET", &uri, None, true)).await;
    assert_eq!(standing["can_borrow"], false);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/loans",
            Some(json!({ "item_id": item_id, "member_id": member_id })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "MEMBER_BLOCKED");
}

#[tokio::test]
async fn test_overview_counts() {
    let (app, _clock) = setup_app();
    create_book(&app, "A").await;
    create_member(&app, "alice@example.com").await;

    let (status, body) = send(&app, request("GET", "/", None, false)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_members"], 1);
    assert_eq!(body["total_media"], 1);
    assert_eq!(body["available_media"], 1);
    assert_eq!(body["open_loans"], 0);
}

#[tokio::test]
async fn test_malformed_json_body_returns_400() {
    let (app, _clock) = setup_app();

    // 必須フィールドの欠落
    let (status, body) = send(
        &app,
        request("POST", "/members", Some(json!({ "name": "Alice" })), true),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    // UUIDとして解釈できない値
    let member_id = create_member(&app, "alice@example.com").await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/loans",
            Some(json!({ "item_id": "nope", "member_id": member_id })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_path_and_query_return_400() {
    let (app, _clock) = setup_app();

    let (status, body) = send(&app, request("GET", "/items/not-a-uuid", None, false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, body) = send(&app, request("GET", "/loans?member_id=nope", None, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_loans_of_unknown_member_returns_404() {
    let (app, _clock) = setup_app();
    let uri = format!("/loans?member_id={}", uuid::Uuid::new_v4());

    let (status, body) = send(&app, request("GET", &uri, None, true)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
