//! Client for an OpenAI-compatible generative-text service.
//!
//! Wraps `reqwest` with bearer-token auth, typed envelope deserialization,
//! and classification of transport failures into the taxonomy the pipeline's
//! retry policy understands (timeout, rate-limited, upstream). Also provides
//! [`extract_json_block`] for pulling the single JSON object a stage expects
//! out of the surrounding completion prose.

pub mod client;
pub mod error;
pub mod extract;

mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use extract::extract_json_block;
