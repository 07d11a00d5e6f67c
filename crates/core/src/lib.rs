//! Character Studio domain library.
//!
//! Pure, synchronous building blocks shared by the API server: the
//! character/image data model, the in-memory character store, lineage
//! queries over generated images, usage/cost aggregation, aspect-ratio
//! policy, the data-URL codec, and export filename derivation.

pub mod aspect;
pub mod data_url;
pub mod error;
pub mod export;
pub mod lineage;
pub mod model;
pub mod store;
pub mod types;
pub mod usage;
