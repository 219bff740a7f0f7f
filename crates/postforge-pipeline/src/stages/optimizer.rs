//! Optimizer stage: draft + intent + insight → [`OptimizedContent`].

use postforge_llm::LlmClient;

use crate::error::{StageError, StageName};
use crate::types::{CompetitorInsight, DraftContent, OptimizedContent, ParsedIntent};
use crate::validate::validate_optimized_content;

use super::{classify_llm, prompts, require_json};

/// Optimization should be repeatable, not imaginative.
const TEMPERATURE: f32 = 0.3;

pub(crate) struct Optimizer<'a> {
    pub llm: &'a LlmClient,
}

impl Optimizer<'_> {
    pub(crate) async fn execute(
        &self,
        draft: &DraftContent,
        intent: &ParsedIntent,
        insight: &CompetitorInsight,
    ) -> Result<OptimizedContent, StageError> {
        let user_prompt = prompts::optimizer_prompt(draft, intent, insight);
        let completion = self
            .llm
            .complete(prompts::OPTIMIZER_SYSTEM, &user_prompt, TEMPERATURE)
            .await
            .map_err(classify_llm)?;
        let raw = require_json(StageName::Optimizer, &completion)?;
        Ok(validate_optimized_content(raw)?)
    }
}
