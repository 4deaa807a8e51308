use axum::extract::Request;
use axum::http::HeaderName;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::routing::{delete, get, post, put};
use axum::Router;
use domains::Role;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, auth, posts};
use crate::middleware::{authenticate, require_role};
use crate::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the full application.
///
/// Protected post routes run `authenticate` first and the role check
/// second, so a missing token is always a 401 even where the role would
/// also be wrong.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .nest("/api/auth", auth_routes())
        .nest("/api/posts", post_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                    let request_id = req
                        .headers()
                        .get(&REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(REQUEST_ID))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/signin", post(auth::sign_in))
}

fn post_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post));

    let writers = Router::new()
        .route("/", post(posts::create_post))
        .route("/{id}", put(posts::update_post))
        .route_layer(from_fn(|req: Request, next: Next| {
            require_role(Role::Write, req, next)
        }));

    let admins = Router::new()
        .route("/{id}", delete(posts::delete_post))
        .route_layer(from_fn(|req: Request, next: Next| {
            require_role(Role::Administer, req, next)
        }));

    let protected = writers
        .merge(admins)
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(protected)
}
