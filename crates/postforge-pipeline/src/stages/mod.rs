//! The five stage adapters.
//!
//! Each adapter wraps exactly one external call: it renders its
//! stage-specific request, invokes the upstream, parses the raw response,
//! passes it through the schema validator, and returns the typed output.
//! Four stages call the generative-text service; competitor research calls
//! the business directory. The orchestrator never assumes a shared upstream.

mod analyzer;
mod competitor;
mod generator;
mod optimizer;
mod parser;

pub(crate) mod prompts;

pub(crate) use analyzer::Analyzer;
pub(crate) use competitor::CompetitorResearcher;
pub(crate) use generator::ContentGenerator;
pub(crate) use optimizer::Optimizer;
pub(crate) use parser::Parser;

use postforge_directory::DirectoryError;
use postforge_llm::{extract_json_block, LlmError};

use crate::error::{StageError, StageName, ValidationError};

/// Classifies a generative-text transport failure into the stage taxonomy.
pub(crate) fn classify_llm(err: LlmError) -> StageError {
    match err {
        LlmError::Timeout { context } => StageError::Timeout(context),
        LlmError::RateLimited { retry_after_secs } => StageError::RateLimited { retry_after_secs },
        other => StageError::Upstream(other.to_string()),
    }
}

/// Classifies a directory-lookup transport failure into the stage taxonomy.
pub(crate) fn classify_directory(err: DirectoryError) -> StageError {
    match err {
        DirectoryError::Timeout { context } => StageError::Timeout(context),
        DirectoryError::RateLimited { retry_after_secs } => {
            StageError::RateLimited { retry_after_secs }
        }
        other => StageError::Upstream(other.to_string()),
    }
}

/// Pulls the JSON object out of a completion, failing the stage when the
/// model returned no parseable payload.
pub(crate) fn require_json(
    stage: StageName,
    completion: &str,
) -> Result<serde_json::Value, StageError> {
    extract_json_block(completion).ok_or_else(|| {
        ValidationError::new(stage, "payload", "completion contained no JSON object").into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_timeout_classifies_as_timeout() {
        let err = classify_llm(LlmError::Timeout {
            context: "deadline exceeded".to_string(),
        });
        assert!(matches!(err, StageError::Timeout(_)));
    }

    #[test]
    fn llm_429_classifies_as_rate_limited() {
        let err = classify_llm(LlmError::RateLimited {
            retry_after_secs: Some(3),
        });
        assert!(matches!(
            err,
            StageError::RateLimited {
                retry_after_secs: Some(3)
            }
        ));
    }

    #[test]
    fn llm_api_error_classifies_as_upstream() {
        let err = classify_llm(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(matches!(err, StageError::Upstream(_)));
    }

    #[test]
    fn directory_api_error_classifies_as_upstream() {
        let err = classify_directory(DirectoryError::Api {
            status: 403,
            message: "forbidden".to_string(),
        });
        assert!(matches!(err, StageError::Upstream(_)));
    }

    #[test]
    fn require_json_fails_on_prose_only_completion() {
        let err = require_json(StageName::ContentGenerator, "I'm sorry, I can't do that").unwrap_err();
        assert!(matches!(err, StageError::SchemaInvalid(ref v) if v.field == "payload"));
    }
}
