//! Summarization pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Chunking of prepared text
//! - MAP (one bullet list per chunk, one retry on failure)
//! - REDUCE (grouped rounds until one text remains)
//! - Post-generation redaction and style cleanup
//! - Fallback ladder and the optional repair pass

pub mod chunk;
pub mod map;
pub mod orchestrator;
pub mod output;
pub mod prompts;
pub mod reduce;
pub mod repair;

pub use chunk::chunk;
pub use map::MapStage;
pub use orchestrator::{Summarizer, NO_TEXT_FOUND};
pub use output::{clean_output, normalize_bullets, normalize_reduce_text};
pub use prompts::{
    estimate_tokens, fit_prompt, format_instruction, format_reduce_message, format_repair_prompt,
    format_user_message, SYSTEM_PROMPT,
};
pub use reduce::ReduceStage;
pub use repair::{needs_repair, repair};
