//! Route definition for the usage summary.

use axum::routing::get;
use axum::Router;

use crate::handlers::usage;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/usage", get(usage::get))
}
