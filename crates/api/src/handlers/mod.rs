//! HTTP request handlers.
//!
//! Handlers stay thin: extract, validate at the boundary, delegate to
//! the store or the generation engine, shape the response.

pub mod characters;
pub mod downloads;
pub mod generation;
pub mod quick;
pub mod reference_images;
pub mod usage;
