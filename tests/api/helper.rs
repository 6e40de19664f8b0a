use axum::{
    Router,
    body::Body,
    http::{self, Request, Response},
};
use chrono::Utc;
use http_body_util::BodyExt;
use novelmt_api::{
    auth::encode_jwt,
    config::Config,
    model::{Role, User},
    routes::init_router,
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub struct AppStateTest {
    pub app_state: AppState,
    router: Router,
}

fn test_config() -> Config {
    let mut config = Config::new().expect("Failed to read configuration");
    config.oauth.google = None;
    config.storage.covers_dir = None;
    config
}

impl AppStateTest {
    /// Router over a lazy pool; requests rejected before any query never need Postgres.
    pub fn new() -> Self {
        let app_state = AppState::new_lazy(test_config()).expect("Failed to build state");
        let router = init_router(app_state.clone());

        AppStateTest { app_state, router }
    }

    /// Router over a migrated database, for the `#[ignore]`d scenarios.
    pub async fn with_database() -> Self {
        let app_state = AppState::init(test_config())
            .await
            .expect("Failed to connect to database");
        let router = init_router(app_state.clone());

        AppStateTest { app_state, router }
    }

    pub async fn generate_response(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn generate_jwt(&self, role: Role) -> (User, String) {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: format!("reader_{}", now.timestamp_micros()),
            email: "reader@localhost".to_string(),
            full_name: String::new(),
            avatar: String::new(),
            role,
            is_active: true,
            google_id: None,
            created_at: now,
            updated_at: now,
        };
        let token = self.token_for(&user);

        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        encode_jwt(user, &self.app_state.config.jwt).unwrap()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();

    serde_json::from_slice(&body).unwrap()
}
