//! Staged content-generation pipeline for postforge.
//!
//! Drives one free-text business description through five ordered stages
//! (parse, audience analysis, competitor research, content generation,
//! discoverability optimization) with a schema-validation gate between every
//! pair of stages, a per-stage retry policy for transient upstream failures,
//! and a run tracker that guarantees at most one recorded outcome per run.
//!
//! Competitor research is the only soft-optional stage: when its retries
//! exhaust, the run continues with an empty insight and the final artifact is
//! flagged as degraded. Every other stage is a hard dependency.

pub mod cancel;
pub mod error;
pub mod orchestrator;
pub mod render;
pub mod tracker;
pub mod types;
pub mod validate;

mod retry;
mod stages;

pub use cancel::CancelFlag;
pub use error::{PipelineError, StageError, StageName, ValidationError};
pub use orchestrator::{Orchestrator, RetryPolicy};
pub use render::render_artifact;
pub use tracker::{RunId, RunOutcome, RunStatus, RunTracker};
pub use types::{
    AudienceProfile, Competitor, CompetitorInsight, DraftContent, FinalArtifact, HashtagBands,
    OptimizedContent, ParsedIntent, PostType, Request,
};
