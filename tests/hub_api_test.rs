// Integration tests for the hub HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use smartmall::api::{create_router, AppState};
use smartmall::config::HubConfig;
use smartmall::hub::MallHub;
use smartmall::protocol::PushEvent;
use smartmall::state::SlotStatus;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "smartmall-test-boundary";

struct TestApp {
    router: Router,
    hub: Arc<MallHub>,
    upload_dir: TempDir,
}

fn create_test_app() -> TestApp {
    create_test_app_with_limit(HubConfig::default().max_upload_bytes)
}

fn create_test_app_with_limit(max_upload_bytes: usize) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = HubConfig {
        upload_dir: upload_dir.path().to_string_lossy().into_owned(),
        max_upload_bytes,
        ..HubConfig::default()
    };
    let hub = Arc::new(MallHub::from_config(&config));
    let router = create_router(AppState::new(Arc::clone(&hub), &config));
    TestApp {
        router,
        hub,
        upload_dir,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_post(field: &str, file_name: Option<&str>, content: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload_video")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// GET /api/get_state returns the configured parking and zeroed counters.
#[tokio::test]
async fn test_get_state_returns_initial_state() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/get_state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let state = body_json(response).await;
    assert_eq!(state["parking"]["A1"], "free");
    assert_eq!(state["parking"]["A2"], "booked");
    assert_eq!(state["mall"], serde_json::json!({"in": 0, "out": 0, "inside": 0}));
}

/// POST /api/toggle_parking flips the slot and broadcasts parking_update.
#[tokio::test]
async fn test_toggle_parking_flips_and_broadcasts() {
    let app = create_test_app();
    let mut rx = app.hub.subscribe();

    let response = app
        .router
        .oneshot(json_post(
            "/api/toggle_parking",
            serde_json::json!({"slot": "A1", "status": "booked"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["state"]["A1"], "booked");

    match rx.try_recv().unwrap() {
        PushEvent::ParkingUpdate(parking) => {
            assert_eq!(parking.get("A1"), Some(&SlotStatus::Booked));
            assert_eq!(parking.len(), 6);
        }
        other => panic!("unexpected event {}", other.kind()),
    }
}

/// The requested status is not trusted; the hub flips what it has.
#[tokio::test]
async fn test_toggle_parking_ignores_requested_status() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/toggle_parking",
            serde_json::json!({"slot": "A2", "status": "booked"}),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["state"]["A2"], "free");
}

/// Unknown slot -> 400 Invalid slot, nothing broadcast.
#[tokio::test]
async fn test_toggle_parking_invalid_slot() {
    let app = create_test_app();
    let mut rx = app.hub.subscribe();

    let response = app
        .router
        .oneshot(json_post(
            "/api/toggle_parking",
            serde_json::json!({"slot": "Z9", "status": "free"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"success": false, "message": "Invalid slot"}));
    assert!(rx.try_recv().is_err());
}

/// Missing slot field behaves like an unknown slot.
#[tokio::test]
async fn test_toggle_parking_missing_slot() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(json_post("/api/toggle_parking", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Numeric slot ids address the slot with the same decimal key.
#[tokio::test]
async fn test_toggle_parking_numeric_slot() {
    let config = HubConfig {
        parking: [("3", SlotStatus::Free), ("4", SlotStatus::Booked)]
            .into_iter()
            .collect(),
        ..HubConfig::default()
    };
    let hub = Arc::new(MallHub::from_config(&config));
    let router = create_router(AppState::new(Arc::clone(&hub), &config));

    let response = router
        .clone()
        .oneshot(json_post(
            "/api/toggle_parking",
            serde_json::json!({"slot": 3, "status": "booked"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], serde_json::json!({"3": "booked", "4": "booked"}));

    // Anything else that is not a string is an unknown slot
    let response = router
        .oneshot(json_post(
            "/api/toggle_parking",
            serde_json::json!({"slot": {"id": 3}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid slot");
    assert_eq!(hub.snapshot().parking.unwrap().get("3"), Some(&SlotStatus::Booked));
}

/// Upload stores the file under a unique name and returns current analytics.
#[tokio::test]
async fn test_upload_video_stores_file() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(multipart_post("file", Some("gate 2.mp4"), b"not really a video"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["inside"], 0);

    let stored = body["file"].as_str().unwrap();
    assert!(stored.ends_with("-gate_2.mp4"), "stored as {}", stored);
    let content = std::fs::read(app.upload_dir.path().join(stored)).unwrap();
    assert_eq!(content, b"not really a video");
}

/// No `file` field -> 400 No file provided.
#[tokio::test]
async fn test_upload_video_without_file() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(multipart_post("video", Some("gate.mp4"), b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "No file provided");
}

/// A `file` field without a file name is not a file.
#[tokio::test]
async fn test_upload_video_field_without_filename() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(multipart_post("file", None, b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "No file provided");
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
}

/// Bodies over the configured limit are rejected.
#[tokio::test]
async fn test_upload_video_over_limit() {
    let app = create_test_app_with_limit(64);

    let response = app
        .router
        .oneshot(multipart_post("file", Some("big.mp4"), &[0u8; 1024]))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
}

/// A body cut off inside the file leaves nothing behind.
#[tokio::test]
async fn test_upload_video_truncated_body_leaves_no_file() {
    let app = create_test_app();

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"cut.mp4\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(&[7u8; 4096]);
    // No closing boundary
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload_video")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
}

/// POST /api/mall_update replaces analytics and broadcasts mall_update.
#[tokio::test]
async fn test_mall_update_broadcasts() {
    let app = create_test_app();
    let mut rx = app.hub.subscribe();

    let response = app
        .router
        .oneshot(json_post(
            "/api/mall_update",
            serde_json::json!({
                "in": 40, "out": 12, "inside": 28,
                "ages": {"16-20": 5, "21-25": 9},
                "genders": {"Male": 8, "Female": 6}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let mall = app.hub.mall().unwrap();
    assert_eq!(mall.inside, Some(28));
    assert_eq!(
        mall.ages.as_ref().unwrap().keys().collect::<Vec<_>>(),
        vec!["16-20", "21-25"]
    );
    assert!(matches!(rx.try_recv().unwrap(), PushEvent::MallUpdate(m) if m == mall));
}
