mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use parceltrack_api::app_router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn parcel_intake_returns_created_envelope() {
    let (state, _store) = common::build_state();
    let app = app_router(state);

    let response = app
        .oneshot(post(
            "/parcel",
            json!({
                "customerName": "Daw Khin",
                "address": "Hledan, Yangon",
                "seller": "Shwe Shop",
                "price": "45.50",
                "deliveryFee": "3.00",
                "paymentStatus": "Fully Paid"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["deliveryStatus"], "Pending");
    assert!(body["data"]["batchId"].is_null());
}

#[tokio::test]
async fn invalid_delivery_type_reports_allowed_values() {
    let (state, _store) = common::build_state();
    let app = app_router(state);

    let response = app
        .oneshot(post(
            "/parcel-batch",
            json!({
                "parcelIds": [uuid::Uuid::new_v4()],
                "deliveryType": "Drone"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["allowedValues"],
        json!(["Ninja Van", "Express", "Own Delivery"])
    );
}

#[tokio::test]
async fn sales_report_requires_both_bounds() {
    let (state, _store) = common::build_state();
    let app = app_router(state);

    let response = app
        .oneshot(get("/sales-report?startDate=2024-07-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Start date and end date are required");
}

#[tokio::test]
async fn missing_batch_is_a_404_fail() {
    let (state, _store) = common::build_state();
    let app = app_router(state);

    let response = app
        .oneshot(get(&format!("/parcel-batch/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn batch_round_trip_over_http() {
    let (state, _store) = common::build_state();
    let app = app_router(state);

    let created = app
        .clone()
        .oneshot(post(
            "/parcel",
            json!({
                "customerName": "Ko Myo",
                "address": "Insein Rd",
                "seller": "City Store",
                "price": "20",
                "deliveryFee": "2",
                "paymentStatus": "COD"
            }),
        ))
        .await
        .unwrap();
    let parcel_id = body_json(created).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let batch_created = app
        .clone()
        .oneshot(post(
            "/parcel-batch",
            json!({ "parcelIds": [parcel_id], "deliveryType": "Express" }),
        ))
        .await
        .unwrap();
    assert_eq!(batch_created.status(), StatusCode::CREATED);
    let body = body_json(batch_created).await;
    assert_eq!(body["data"]["updatedParcelCount"], 1);
    let batch_id = body["data"]["batch"]["id"].as_str().unwrap().to_string();

    let listed = app.clone().oneshot(get("/parcel-batch")).await.unwrap();
    let listed_body = body_json(listed).await;
    assert_eq!(listed_body["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed_body["data"][0]["parcelCount"], 1);

    let deleted = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/parcel-batch/{}", batch_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let deleted_body = body_json(deleted).await;
    assert_eq!(deleted_body["data"]["revertedParcelCount"], 1);
}
