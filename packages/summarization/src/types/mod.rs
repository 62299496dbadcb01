//! Data types shared across the summarization pipeline.

pub mod category;
pub mod config;
pub mod progress;
