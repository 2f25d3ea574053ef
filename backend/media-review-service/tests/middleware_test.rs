use actix_web::{http::StatusCode, test, web, App, HttpMessage, HttpRequest, HttpResponse};
use media_review_service::middleware::{RequestId, RequestIdValue, RequestTimeout};
use std::time::Duration;

async fn echo_request_id(req: HttpRequest) -> HttpResponse {
    let id = req
        .extensions()
        .get::<RequestIdValue>()
        .map(|v| v.0.clone())
        .unwrap_or_default();
    HttpResponse::Ok().body(id)
}

async fn slow_handler() -> HttpResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn test_request_id_generated_and_echoed() {
    let app = test::init_service(
        App::new()
            .wrap(RequestId::new())
            .route("/id", web::get().to(echo_request_id)),
    )
    .await;

    let req = test::TestRequest::get().uri("/id").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .expect("x-request-id header");
    let body = test::read_body(resp).await;
    assert_eq!(body, header.as_bytes());
    assert!(uuid::Uuid::parse_str(&header).is_ok());
}

#[actix_web::test]
async fn test_incoming_request_id_is_kept() {
    let app = test::init_service(
        App::new()
            .wrap(RequestId::new())
            .route("/id", web::get().to(echo_request_id)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/id")
        .insert_header(("x-request-id", "trace-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-123");
    assert_eq!(test::read_body(resp).await, "trace-123");
}

#[actix_web::test]
async fn test_slow_request_times_out() {
    let app = test::init_service(
        App::new()
            .wrap(RequestTimeout::new(Duration::from_millis(100)))
            .route("/slow", web::get().to(slow_handler))
            .route("/fast", web::get().to(HttpResponse::Ok)),
    )
    .await;

    let req = test::TestRequest::get().uri("/slow").to_request();
    let err = match test::try_call_service(&app, req).await {
        Ok(_) => panic!("slow request should time out"),
        Err(err) => err,
    };
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "REQUEST_TIMEOUT");

    let req = test::TestRequest::get().uri("/fast").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
