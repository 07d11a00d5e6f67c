//! Generation engine: batch joining and request orchestration.

pub mod batch;
pub mod orchestrator;

pub use batch::{join_settled, BatchOutcome};
pub use orchestrator::{
    edit_image, enhance_image, generate_for_character, quick_generate, regenerate_image,
    GenerationRequest, ENHANCE_INSTRUCTION,
};
