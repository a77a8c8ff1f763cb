mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use common::{FakeProducts, WEBHOOK_SECRET, bearer, checkout_event, state_with};
use marketplace_orders::{
    entity::orders, gateway::signature::signature_header, routes::create_app,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

fn app(db: DatabaseConnection) -> axum::Router {
    let (state, _) = state_with(db, FakeProducts::default());
    create_app(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn webhook_request(body: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::post("/api/webhooks/stripe")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let body = checkout_event(serde_json::json!({ "id": "cs_1", "payment_status": "paid" }));
    let header = signature_header("whsec_wrong", Utc::now().timestamp(), &body);

    let response = app(empty_db())
        .oneshot(webhook_request(body, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["data"]["code"], "invalid_signature");
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let body = checkout_event(serde_json::json!({ "id": "cs_1" }));

    let response = app(empty_db())
        .oneshot(webhook_request(body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn skipped_session_is_acknowledged() {
    let body = checkout_event(serde_json::json!({
        "id": "cs_1",
        "mode": "subscription",
        "payment_status": "paid"
    }));
    let header = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), &body);

    let response = app(empty_db())
        .oneshot(webhook_request(body, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "received": true }));
}

#[tokio::test]
async fn unrelated_event_type_is_acknowledged() {
    let body = serde_json::to_vec(&serde_json::json!({
        "id": "evt_2",
        "type": "invoice.paid",
        "data": { "object": {} }
    }))
    .unwrap();
    let header = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), &body);

    let response = app(empty_db())
        .oneshot(webhook_request(body, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn order_endpoints_require_a_bearer_token() {
    let response = app(empty_db())
        .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["data"]["code"], "not_authenticated");
}

#[tokio::test]
async fn buyer_sees_only_their_order() {
    let response = app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<orders::Model>::new()])
            .into_connection(),
    )
    .oneshot(
        Request::get(format!("/api/orders/{}", Uuid::new_v4()))
            .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seller_update_with_unknown_status_is_bad_request() {
    let body = serde_json::json!({
        "order_item_id": Uuid::new_v4(),
        "new_status": "refunded"
    });

    let response = app(empty_db())
        .oneshot(
            Request::post("/api/seller/order-items/status")
                .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["data"]["code"], "invalid_input");
}

#[tokio::test]
async fn malformed_json_body_is_bad_request_in_envelope() {
    for body in [r#"{"order_item_id":"x"}"#, "{not json"] {
        let response = app(empty_db())
            .oneshot(
                Request::post("/api/seller/order-items/status")
                    .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = json_body(response).await;
        assert_eq!(json["data"]["code"], "invalid_input");
    }
}

#[tokio::test]
async fn health_and_fallback_routes() {
    let health = app(empty_db())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let missing = app(empty_db())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
