//! REST client for the external multimodal image-generation API.
//!
//! Wraps the two logical operations the studio consumes: multimodal
//! generation (reference images + prompt, also used for edit/enhance/
//! regenerate) and text-to-image prediction (quick generate). Exposes the
//! [`generator::ImageGenerator`] trait so the orchestration layer can be
//! exercised against a stub.

pub mod client;
pub mod error;
pub mod generator;
pub mod messages;

pub use client::{GenAiClient, GenAiConfig};
pub use error::GenAiError;
pub use generator::{GeneratedPayload, ImageGenerator, PromptPart};
