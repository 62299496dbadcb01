//! Core trait abstractions for the summarization library.
//!
//! These traits define the interfaces that applications implement
//! to provide text generation and prompt templates.

pub mod generator;
pub mod template;
