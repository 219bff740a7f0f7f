//! Client for a Yelp-Fusion-style local-business-directory API.
//!
//! The pipeline's competitor-research stage uses this to find nearby
//! businesses of the same type. An empty result list is a valid response:
//! "no competitors found" is a state, not an error.

pub mod client;
pub mod error;
pub mod types;

pub use client::DirectoryClient;
pub use error::DirectoryError;
pub use types::Business;
