pub mod characters;
pub mod health;
pub mod quick;
pub mod usage;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /characters                                       list, create
/// /characters/selected                              current selection
/// /characters/{id}                                  get, delete
/// /characters/{id}/select                           select (POST)
/// /characters/{id}/reference-images                 upload (POST)
/// /characters/{id}/reference-images/{image_id}      delete
/// /characters/{id}/generations                      list, generate batch
/// /characters/{id}/generations/archive              zip download (GET)
/// /characters/{id}/generations/{image_id}           delete
/// /characters/{id}/generations/{image_id}/edits     edit (POST)
/// /characters/{id}/generations/{image_id}/enhance   enhance (POST)
/// /characters/{id}/generations/{image_id}/regenerate regenerate (POST)
/// /characters/{id}/generations/{image_id}/lineage   lineage (GET)
/// /characters/{id}/generations/{image_id}/download  image download (GET)
///
/// /quick-generations                                list, generate batch
///
/// /usage                                            token totals + cost (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/characters", characters::router())
        .nest("/quick-generations", quick::router())
        .merge(usage::router())
}
