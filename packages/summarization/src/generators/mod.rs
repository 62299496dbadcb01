//! Generator implementations for the summarization library.
//!
//! This module provides reference implementations of the `Generator`
//! trait. Users can use these directly or wrap their own inference engine.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpGenerator;
