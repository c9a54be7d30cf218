use axum::Router;
use axum::routing::get;
use axum_helpers::server::{create_router, health_router};

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod health;
pub mod users;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/users", users::router(state))
}

/// Creates a router with the /ready endpoint that pings the database.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete application: docs, `/api` routes, `/health` and `/ready`.
pub fn app(state: &AppState) -> Router {
    create_router::<ApiDoc>(routes(state))
        .merge(health_router(state.config.app.clone()))
        .merge(ready_router(state.clone()))
}
