//! Route definitions for the `/characters` resource and its image
//! sub-resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{characters, downloads, generation, reference_images};
use crate::state::AppState;

/// Routes mounted at `/characters`.
pub fn router() -> Router<AppState> {
    let generation_routes = Router::new()
        .route("/", get(generation::list).post(generation::create))
        .route("/archive", get(downloads::download_archive))
        .route("/{image_id}", delete(generation::delete))
        .route("/{image_id}/edits", post(generation::edit))
        .route("/{image_id}/enhance", post(generation::enhance))
        .route("/{image_id}/regenerate", post(generation::regenerate))
        .route("/{image_id}/lineage", get(generation::get_lineage))
        .route("/{image_id}/download", get(downloads::download_image));

    let reference_image_routes = Router::new()
        .route("/", post(reference_images::upload))
        .route("/{image_id}", delete(reference_images::delete));

    Router::new()
        .route("/", get(characters::list).post(characters::create))
        .route("/selected", get(characters::get_selected))
        .route(
            "/{id}",
            get(characters::get_by_id).delete(characters::delete),
        )
        .route("/{id}/select", post(characters::select))
        .nest("/{id}/reference-images", reference_image_routes)
        .nest("/{id}/generations", generation_routes)
}
