use thiserror::Error;

/// The five ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Parser,
    Analyzer,
    CompetitorResearch,
    ContentGenerator,
    Optimizer,
}

impl StageName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Parser => "parser",
            StageName::Analyzer => "analyzer",
            StageName::CompetitorResearch => "competitor_research",
            StageName::ContentGenerator => "content_generator",
            StageName::Optimizer => "optimizer",
        }
    }

    /// Human-readable capability name for user-facing failure messages.
    #[must_use]
    pub fn capability(self) -> &'static str {
        match self {
            StageName::Parser => "parsing your request",
            StageName::Analyzer => "audience analysis",
            StageName::CompetitorResearch => "competitor research",
            StageName::ContentGenerator => "content generation",
            StageName::Optimizer => "discoverability optimization",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage produced output that fails its schema contract.
#[derive(Debug, Clone, Error)]
#[error("{stage} output invalid at `{field}`: {reason}")]
pub struct ValidationError {
    pub stage: StageName,
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(stage: StageName, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single stage attempt.
///
/// `Timeout` and `RateLimited` are transient and retried by the orchestrator;
/// `Upstream` and `SchemaInvalid` indicate a non-transient defect and fail
/// the attempt's run immediately.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage's external call timed out or could not connect.
    #[error("external call timed out: {0}")]
    Timeout(String),

    /// The upstream service asked us to back off (HTTP 429).
    #[error("rate limited by upstream (retry-after: {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-2xx response or a malformed transport envelope.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The stage's output did not pass the schema validator.
    #[error(transparent)]
    SchemaInvalid(#[from] ValidationError),
}

/// Terminal failure of a whole pipeline run. Never retried at the
/// orchestrator level; surfaced to the tracker as the run's final state.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A hard-dependency stage exhausted its retries or failed fatally.
    #[error("stage {stage} failed: {cause}")]
    Stage { stage: StageName, cause: StageError },

    /// The owning session was torn down; the run stopped at a stage boundary.
    #[error("run cancelled before {stage}")]
    Cancelled { stage: StageName },
}

impl PipelineError {
    /// User-facing failure summary: names the capability that could not
    /// complete without leaking internal error detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Stage { stage, .. } => format!(
                "Sorry, {} could not complete. Please try again in a little while.",
                stage.capability()
            ),
            PipelineError::Cancelled { .. } => {
                "Your request was cancelled before it finished.".to_string()
            }
        }
    }
}
