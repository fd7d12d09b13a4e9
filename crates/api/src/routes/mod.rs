pub mod admin;
pub mod map;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// POST /map              map a native video event on demand
/// GET  /__health         health report
/// GET  /__gtg            good-to-go
/// GET  /__ping           liveness
/// GET  /__build-info     build metadata
/// ```
pub fn all_routes() -> Router<AppState> {
    Router::new().merge(map::router()).merge(admin::router())
}
