use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, SecondsFormat, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use spotbook::{
    auth,
    config::AppConfig,
    db::{init_pool, migrate},
    repository::spot,
    routes::create_router,
    state::AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    app: Router,
    state: AppState,
    _root: TempDir,
}

async fn harness() -> Harness {
    let root = TempDir::new().expect("temp dir");
    std::fs::write(root.path().join("index.html"), "<h1>spotbook</h1>").expect("index");
    let config = AppConfig {
        database_url: format!("sqlite://{}", root.path().join("api.sqlite").display()),
        jwt_secret: "api-test-secret".into(),
        static_dir: root.path().to_path_buf(),
        ..AppConfig::default()
    };
    let db = init_pool(&config.database_url).await.expect("pool");
    migrate(&db).await.expect("migrate");
    spot::insert(&db, "A1", "standard").await.expect("spot");
    spot::insert(&db, "E1", "ev").await.expect("spot");

    let state = AppState::new(config, db);
    auth::register_user(&state, "alice", "wonderland")
        .await
        .expect("alice");
    auth::register_user(&state, "bob", "builder").await.expect("bob");

    Harness {
        app: create_router(state.clone()),
        state,
        _root: root,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

fn hours_from_now(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let h = harness().await;
    let (status, body) = send(
        &h.app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "wonderland" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["username"], json!("alice"));
    let token = body["token"].as_str().expect("token");
    let uid = body["user"]["id"].as_i64().expect("id");
    assert_eq!(h.state.tokens.verify(token).expect("valid token"), uid);

    let (status, _) = send(
        &h.app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_requires_a_valid_token() {
    let h = harness().await;
    let body = json!({ "spot_id": 1, "start_time": hours_from_now(1), "end_time": hours_from_now(2) });

    let (status, _) = send(&h.app, Method::POST, "/api/reservations", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &h.app,
        Method::POST,
        "/api/reservations",
        Some("garbage"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_status_codes() {
    let h = harness().await;
    let token = login(&h.app, "alice", "wonderland").await;

    let booking = json!({ "spot_id": 1, "start_time": hours_from_now(1), "end_time": hours_from_now(3) });
    let (status, body) = send(
        &h.app,
        Method::POST,
        "/api/reservations",
        Some(&token),
        Some(booking.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], json!("Reservation created"));

    let (status, body) = send(&h.app, Method::POST, "/api/reservations", Some(&token), Some(booking)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("spot already reserved"));

    let missing = json!({ "spot_id": 404, "start_time": hours_from_now(1), "end_time": hours_from_now(2) });
    let (status, _) = send(&h.app, Method::POST, "/api/reservations", Some(&token), Some(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let past = json!({
        "spot_id": 2,
        "start_time": (Utc::now() - Duration::minutes(30)).format("%Y-%m-%d %H:%M:%S").to_string(),
        "end_time": hours_from_now(1),
    });
    let (status, body) = send(&h.app, Method::POST, "/api/reservations", Some(&token), Some(past)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("cannot book in the past"));

    let inverted = json!({ "spot_id": 2, "start_time": hours_from_now(3), "end_time": hours_from_now(2) });
    let (status, body) = send(&h.app, Method::POST, "/api/reservations", Some(&token), Some(inverted)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("end_time must be after start_time"));
}

#[tokio::test]
async fn completion_status_codes() {
    let h = harness().await;
    let alice = login(&h.app, "alice", "wonderland").await;
    let bob = login(&h.app, "bob", "builder").await;

    let booking = json!({ "spot_id": 1, "start_time": hours_from_now(1), "end_time": hours_from_now(2) });
    let (_, body) = send(&h.app, Method::POST, "/api/reservations", Some(&alice), Some(booking)).await;
    let id = body["id"].as_i64().expect("reservation id");
    let uri = format!("/api/reservations/{id}/complete");

    let (status, _) = send(&h.app, Method::PUT, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, Method::PUT, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&h.app, Method::PUT, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Reservation completed"));

    let (status, _) = send(&h.app, Method::PUT, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &h.app,
        Method::PUT,
        "/api/reservations/9999/complete",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn spots_listing_merges_reservations() {
    let h = harness().await;
    let token = login(&h.app, "alice", "wonderland").await;
    let booking = json!({
        "spot_id": 2,
        "start_time": "2030-06-01T10:00:00Z",
        "end_time": "2030-06-01T12:00:00Z",
    });
    let (status, _) = send(&h.app, Method::POST, "/api/reservations", Some(&token), Some(booking)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&h.app, Method::GET, "/api/spots?date=2030-06-01", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let spots = body.as_array().expect("array");
    assert_eq!(spots.len(), 2);
    assert_eq!(spots[0]["name"], json!("A1"));
    assert_eq!(spots[0]["reservations"], json!([]));
    assert_eq!(spots[1]["type"], json!("ev"));
    let reservation = &spots[1]["reservations"][0];
    assert_eq!(reservation["status"], json!("active"));
    assert_eq!(reservation["spot_id"], json!(2));
    assert_eq!(reservation["start_time"], json!("2030-06-01T10:00:00Z"));

    let (status, body) = send(&h.app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "hour": 10, "count": 1 }]));
}

#[tokio::test]
async fn health_and_static_files() {
    let h = harness().await;
    let (status, body) = send(&h.app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let request = Request::builder()
        .uri("/index.html")
        .body(Body::empty())
        .expect("request");
    let response = h.app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
