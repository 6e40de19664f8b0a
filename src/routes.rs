use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, Method, Request,
        header::{self, AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    controllers::{
        auth, chapters, chatbot, comments, genres, home, me, novels, reading_history, users,
    },
    media::COVERS_ROUTE,
    middlewares::{admin_middleware, jwt_auth_middleware, optional_auth_middleware},
    state::{AppState, SharedAppState},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Every route of `router` requires a valid bearer token.
fn signed_in(router: Router<SharedAppState>, state: &SharedAppState) -> Router<SharedAppState> {
    router.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// Every route of `router` requires an admin bearer token.
fn admin_only(router: Router<SharedAppState>, state: &SharedAppState) -> Router<SharedAppState> {
    signed_in(router.route_layer(from_fn(admin_middleware)), state)
}

fn auth_routes() -> Router<SharedAppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", get(auth::google_redirect))
        .route("/google/callback", get(auth::google_callback))
}

fn novel_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let public = Router::new()
        .route("/", get(novels::index))
        .route("/{id}", get(novels::show))
        .route("/favorites/{user_id}", get(novels::favorites));

    let member = Router::new().route("/{id}/favorite", post(novels::favorite));

    let admin = Router::new()
        .route("/", post(novels::store).delete(novels::destroy_all))
        .route("/{id}", put(novels::update).delete(novels::destroy));

    public
        .merge(signed_in(member, state))
        .merge(admin_only(admin, state))
}

fn chapter_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let public = Router::new()
        .route("/", get(chapters::index))
        .route("/novel/{novel_id}", get(chapters::by_novel))
        .route("/{id}", get(chapters::show));

    let admin = Router::new()
        .route("/", post(chapters::store).delete(chapters::destroy_all))
        .route("/novel/{novel_id}", delete(chapters::destroy_by_novel))
        .route("/{id}", put(chapters::update).delete(chapters::destroy));

    public.merge(admin_only(admin, state))
}

fn comment_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let public = Router::new()
        .route("/", get(comments::index))
        .route("/novel/{novel_id}", get(comments::by_novel))
        .route("/chapter/{chapter_id}", get(comments::by_chapter))
        .route("/user/{user_id}", get(comments::by_user))
        .route("/{id}", get(comments::show))
        .route("/{id}/replies", get(comments::replies));

    let member = Router::new()
        .route("/", post(comments::store))
        .route("/{id}", put(comments::update).delete(comments::destroy))
        .route("/{id}/like", post(comments::like))
        .route("/{id}/unlike", post(comments::unlike))
        .route("/{id}/report", post(comments::report));

    let admin = Router::new()
        .route("/", delete(comments::destroy_all))
        .route("/reported", get(comments::reported))
        .route("/{id}/unreport", post(comments::unreport))
        .route("/novel/{novel_id}", delete(comments::destroy_by_novel))
        .route("/chapter/{chapter_id}", delete(comments::destroy_by_chapter))
        .route("/user/{user_id}", delete(comments::destroy_by_user));

    public
        .merge(signed_in(member, state))
        .merge(admin_only(admin, state))
}

fn genre_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let public = Router::new()
        .route("/", get(genres::index))
        .route("/slug/{slug}", get(genres::show_by_slug))
        .route("/{id}", get(genres::show));

    let admin = Router::new()
        .route("/", post(genres::store).delete(genres::destroy_all))
        .route("/{id}", put(genres::update).delete(genres::destroy));

    public.merge(admin_only(admin, state))
}

fn user_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let member = Router::new()
        .route("/profile/{id}", get(users::profile).put(users::update_profile))
        .route("/change-password/{id}", put(users::change_password));

    let admin = Router::new()
        .route("/", get(users::index).delete(users::destroy_all))
        .route("/active", get(users::active))
        .route("/role/{role}", get(users::by_role))
        .route("/{id}", get(users::show).put(users::update).delete(users::destroy));

    signed_in(member, state).merge(admin_only(admin, state))
}

fn reading_history_routes(state: &SharedAppState) -> Router<SharedAppState> {
    let member = Router::new()
        .route("/{user_id}", get(reading_history::index))
        .route("/{user_id}/add", post(reading_history::add))
        .route("/{user_id}/remove/{novel_id}", delete(reading_history::remove))
        .route("/{user_id}/clear", delete(reading_history::clear));

    signed_in(member, state)
}

fn chatbot_routes(state: &SharedAppState) -> Router<SharedAppState> {
    Router::new()
        .route("/chat", post(chatbot::chat))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let me_route = signed_in(Router::new().route("/", get(me::index)), &state);

    let mut app = Router::new()
        .route("/", get(home::index))
        .nest("/auth", auth_routes())
        .nest("/me", me_route)
        .nest("/novels", novel_routes(&state))
        .nest("/chapters", chapter_routes(&state))
        .nest("/comments", comment_routes(&state))
        .nest("/genres", genre_routes(&state))
        .nest("/users", user_routes(&state))
        .nest("/reading-history", reading_history_routes(&state))
        .nest("/chatbot", chatbot_routes(&state))
        .fallback(home::not_found);

    if let Some(covers_dir) = &state.config.storage.covers_dir {
        app = app.nest_service(COVERS_ROUTE, ServeDir::new(covers_dir));
    }

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or_default();
                let user_agent = request
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or_default();

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.layer(CompressionLayer::new())
        .layer(cors_layer())
        .layer(request_id_middleware)
        .with_state(state)
}
