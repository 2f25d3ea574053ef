use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use media_review_service::models::{DeleteResponse, Media};
use media_review_service::store::InMemoryMediaStore;
use media_review_service::websocket::{ClientConnection, ConnectionClosed};
use media_review_service::{routes, AppState, Config};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Connection stand-in that records every frame written to it
#[derive(Clone, Default)]
struct RecordingConnection {
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    failing: bool,
}

impl RecordingConnection {
    fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientConnection for RecordingConnection {
    async fn send_text(&mut self, text: &str) -> Result<(), ConnectionClosed> {
        if self.failing {
            return Err(ConnectionClosed);
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn ping(&mut self, _payload: &[u8]) -> Result<(), ConnectionClosed> {
        Ok(())
    }

    async fn pong(&mut self, _payload: &[u8]) -> Result<(), ConnectionClosed> {
        Ok(())
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn memory_state() -> AppState {
    let config = Config::from_pairs(vec![(
        "STORAGE_BACKEND".to_string(),
        "memory".to_string(),
    )])
    .expect("memory config");

    AppState::new(Arc::new(InMemoryMediaStore::new()), config)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(routes::json_config(64 * 1024))
                .configure(routes::configure),
        )
        .await
    };
}

const MEDIA_UPDATED: &str = r#"{"type":"media_updated"}"#;

#[actix_web::test]
async fn test_health_status() {
    let state = memory_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/health-check/v1/status")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"status": "ok", "message": "Service is healthy"}));
}

#[actix_web::test]
async fn test_media_lifecycle_broadcasts_once_per_mutation() {
    let state = memory_state();
    let dashboard = RecordingConnection::default();
    state
        .registry
        .register("dashboard-1", Box::new(dashboard.clone()))
        .await;
    let app = init_app!(state);

    // Create
    let req = test::TestRequest::post()
        .uri("/api/media/v1")
        .set_json(json!({
            "title": "A",
            "type": "image",
            "mimeType": "image/png",
            "size": 10
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Media = test::read_body_json(resp).await;
    assert!(!created.id.is_empty());
    assert_eq!(created.title, "A");
    assert_eq!(created.size, 10);
    assert_eq!(dashboard.sent(), vec![MEDIA_UPDATED]);

    // Get
    let req = test::TestRequest::get()
        .uri(&format!("/api/media/v1/{}", created.id))
        .to_request();
    let fetched: Media = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // Update only the title
    let req = test::TestRequest::put()
        .uri(&format!("/api/media/v1/{}", created.id))
        .set_json(json!({"title": "B"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Media = test::read_body_json(resp).await;
    assert_eq!(updated.title, "B");
    assert_eq!(updated.size, 10);
    assert_eq!(updated.mime_type, "image/png");
    assert_eq!(dashboard.sent().len(), 2);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/media/v1/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: DeleteResponse = test::read_body_json(resp).await;
    assert!(deleted.deleted);
    assert_eq!(dashboard.sent().len(), 3);

    // Second delete fails and does not notify
    let req = test::TestRequest::delete()
        .uri(&format!("/api/media/v1/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(dashboard.sent().len(), 3);

    assert!(dashboard.sent().iter().all(|frame| frame == MEDIA_UPDATED));
}

#[actix_web::test]
async fn test_failed_mutations_do_not_broadcast() {
    let state = memory_state();
    let dashboard = RecordingConnection::default();
    state
        .registry
        .register("dashboard-1", Box::new(dashboard.clone()))
        .await;
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/media/v1/missing")
        .set_json(json!({"title": "B"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/media/v1/missing")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Missing title
    let req = test::TestRequest::post()
        .uri("/api/media/v1")
        .set_json(json!({"type": "image", "mimeType": "image/png", "size": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Negative size on update
    let req = test::TestRequest::put()
        .uri("/api/media/v1/missing")
        .set_json(json!({"size": -1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(dashboard.sent().is_empty());
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let state = memory_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/media/v1")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_list_returns_every_record() {
    let state = memory_state();
    let app = init_app!(state);

    for title in ["one", "two", "three"] {
        let req = test::TestRequest::post()
            .uri("/api/media/v1")
            .set_json(json!({"title": title, "type": "video", "mimeType": "video/mp4"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/media/v1").to_request();
    let media: Vec<Media> = test::call_and_read_body_json(&app, req).await;

    let mut titles: Vec<_> = media.iter().map(|m| m.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["one", "three", "two"]);
}

#[actix_web::test]
async fn test_unreachable_client_is_evicted_on_broadcast() {
    let state = memory_state();
    let healthy = RecordingConnection::default();
    let broken = RecordingConnection::failing();
    state
        .registry
        .register("healthy", Box::new(healthy.clone()))
        .await;
    state
        .registry
        .register("broken", Box::new(broken.clone()))
        .await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/media/v1")
        .set_json(json!({"title": "A", "type": "image", "mimeType": "image/png"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // The mutation still succeeds
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(healthy.sent(), vec![MEDIA_UPDATED]);
    assert!(!state.registry.contains("broken").await);
    assert!(state.registry.contains("healthy").await);
    assert_eq!(broken.closes.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_ws_requires_client_id() {
    let state = memory_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/ws").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/ws?client_id=").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(state.registry.is_empty().await);
}
