use axum::http::StatusCode;
use http_body_util::BodyExt;

use crate::helper::{AppStateTest, body_json, empty_request};

#[tokio::test]
async fn home_page_should_return_ok_and_alive() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(empty_request("GET", "/", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Alive");
}

#[tokio::test]
async fn unknown_route_should_return_json_not_found() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(empty_request("GET", "/library", None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Route not found");
}

#[tokio::test]
async fn response_should_carry_request_id() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(empty_request("GET", "/", None))
        .await;

    assert!(response.headers().contains_key("x-request-id"));
}
