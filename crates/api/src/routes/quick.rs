//! Route definitions for standalone quick generations.

use axum::routing::get;
use axum::Router;

use crate::handlers::quick;
use crate::state::AppState;

/// Routes mounted at `/quick-generations`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(quick::list).post(quick::create))
}
