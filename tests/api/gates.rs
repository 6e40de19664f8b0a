use axum::http::{StatusCode, header::AUTHORIZATION};
use novelmt_api::model::Role;
use serde_json::json;
use uuid::Uuid;

use crate::helper::{AppStateTest, body_json, empty_request, json_request};

#[tokio::test]
async fn should_throw_error_when_request_does_not_contain_header_authorization() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(empty_request("GET", "/me", None))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Access denied. No token provided."
    );
}

#[tokio::test]
async fn should_throw_error_when_auth_header_is_malformed() {
    let test_state = AppStateTest::new();

    for header in ["random-string", "not-bearer random-string", "Bearer random-string"] {
        let mut request = empty_request("GET", "/me", None);
        request
            .headers_mut()
            .insert(AUTHORIZATION, header.parse().unwrap());

        let response = test_state.generate_response(request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", header);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid or expired token."
        );
    }
}

#[tokio::test]
async fn admin_routes_reject_anonymous_and_regular_users() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt(Role::User);
    let id = Uuid::new_v4();

    let cases = [
        ("POST", "/novels".to_string()),
        ("DELETE", format!("/novels/{}", id)),
        ("DELETE", "/chapters".to_string()),
        ("DELETE", format!("/chapters/novel/{}", id)),
        ("GET", "/comments/reported".to_string()),
        ("POST", format!("/comments/{}/unreport", id)),
        ("DELETE", format!("/comments/user/{}", id)),
        ("PUT", format!("/genres/{}", id)),
        ("GET", "/users".to_string()),
        ("GET", "/users/active".to_string()),
        ("GET", "/users/role/admin".to_string()),
        ("DELETE", format!("/users/{}", id)),
    ];

    for (method, uri) in cases {
        let response = test_state
            .generate_response(json_request(method, &uri, None, json!({})))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let response = test_state
            .generate_response(json_request(method, &uri, Some(&token), json!({})))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn admin_token_passes_the_gate() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt(Role::Admin);

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &format!("/novels/{}", Uuid::new_v4()),
            Some(&token),
            json!({"title": ""}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Title length must be between 1 and 255"
    );
}

#[tokio::test]
async fn users_cannot_act_for_someone_else() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt(Role::User);
    let other = Uuid::new_v4();

    let cases = [
        ("GET", format!("/users/profile/{}", other), json!({})),
        ("PUT", format!("/users/profile/{}", other), json!({"fullName": "Someone"})),
        (
            "PUT",
            format!("/users/change-password/{}", other),
            json!({"currentPassword": "secret1", "newPassword": "secret2"}),
        ),
        ("GET", format!("/reading-history/{}", other), json!({})),
        ("DELETE", format!("/reading-history/{}/clear", other), json!({})),
        (
            "POST",
            format!("/novels/{}/favorite", Uuid::new_v4()),
            json!({"userId": other}),
        ),
    ];

    for (method, uri, body) in cases {
        let response = test_state
            .generate_response(json_request(method, &uri, Some(&token), body))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn member_routes_require_a_token() {
    let test_state = AppStateTest::new();
    let id = Uuid::new_v4();

    let cases = [
        ("POST", "/comments".to_string()),
        ("POST", format!("/comments/{}/like", id)),
        ("POST", format!("/novels/{}/favorite", id)),
        ("POST", format!("/reading-history/{}/add", id)),
    ];

    for (method, uri) in cases {
        let response = test_state
            .generate_response(json_request(method, &uri, None, json!({})))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn google_login_is_not_found_when_unconfigured() {
    let test_state = AppStateTest::new();

    for uri in ["/auth/google", "/auth/google/callback?code=abc&state=xyz"] {
        let response = test_state
            .generate_response(empty_request("GET", uri, None))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}
