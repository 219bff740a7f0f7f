//! Pipeline orchestration.
//!
//! Runs the five stages in order, threading each stage's validated output
//! into the next stage's input. Transient failures (timeout, rate limit) are
//! retried per stage with exponential back-off; non-transient failures fail
//! the run immediately. Competitor research is the sole soft-optional stage:
//! when it cannot complete, the run continues with an empty insight and the
//! artifact is flagged degraded.

use postforge_directory::DirectoryClient;
use postforge_llm::LlmClient;

use crate::cancel::CancelFlag;
use crate::error::{PipelineError, StageName};
use crate::retry::retry_with_backoff;
use crate::stages::{Analyzer, CompetitorResearcher, ContentGenerator, Optimizer, Parser};
use crate::types::{CompetitorInsight, FinalArtifact, ParsedIntent, Request};

/// Per-stage retry bounds, consumed as opaque policy values from config.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first, on transient errors only.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Sequences the five stage adapters for one request at a time.
///
/// Holds no per-run state: a single `Orchestrator` serves any number of
/// concurrent runs, which share nothing but the underlying HTTP clients.
pub struct Orchestrator {
    llm: LlmClient,
    directory: Option<DirectoryClient>,
    policy: RetryPolicy,
}

impl Orchestrator {
    /// `directory` is optional: without a directory credential the
    /// competitor-research stage degrades instead of running.
    #[must_use]
    pub fn new(llm: LlmClient, directory: Option<DirectoryClient>, policy: RetryPolicy) -> Self {
        Self {
            llm,
            directory,
            policy,
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when a hard-dependency stage fails fatally
    /// or exhausts its retries. Competitor-research failure never surfaces
    /// here; it degrades the artifact instead.
    pub async fn run(&self, request: &Request) -> Result<FinalArtifact, PipelineError> {
        self.run_with_cancel(request, &CancelFlag::new()).await
    }

    /// Like [`Orchestrator::run`], checking `cancel` at every stage boundary.
    /// An in-flight external call is never aborted; a tripped flag takes
    /// effect before the next stage begins.
    pub async fn run_with_cancel(
        &self,
        request: &Request,
        cancel: &CancelFlag,
    ) -> Result<FinalArtifact, PipelineError> {
        let policy = self.policy;

        checkpoint(cancel, StageName::Parser)?;
        let parser = Parser { llm: &self.llm };
        let intent = retry_with_backoff(policy.max_retries, policy.backoff_base_ms, || {
            parser.execute(&request.text)
        })
        .await
        .map_err(|cause| PipelineError::Stage {
            stage: StageName::Parser,
            cause,
        })?;
        tracing::info!(
            request_id = %request.request_id,
            business_type = %intent.business_type,
            location = ?intent.location,
            "parsed intent"
        );

        checkpoint(cancel, StageName::Analyzer)?;
        let analyzer = Analyzer { llm: &self.llm };
        let audience = retry_with_backoff(policy.max_retries, policy.backoff_base_ms, || {
            analyzer.execute(&intent)
        })
        .await
        .map_err(|cause| PipelineError::Stage {
            stage: StageName::Analyzer,
            cause,
        })?;
        tracing::info!(
            request_id = %request.request_id,
            post_frequency = audience.post_frequency,
            "audience analysis completed"
        );

        checkpoint(cancel, StageName::CompetitorResearch)?;
        let (insight, degraded) = self.research_competitors(&intent).await;

        checkpoint(cancel, StageName::ContentGenerator)?;
        let generator = ContentGenerator { llm: &self.llm };
        let draft = retry_with_backoff(policy.max_retries, policy.backoff_base_ms, || {
            generator.execute(&intent, &audience, &insight)
        })
        .await
        .map_err(|cause| PipelineError::Stage {
            stage: StageName::ContentGenerator,
            cause,
        })?;
        tracing::info!(
            request_id = %request.request_id,
            post_type = %draft.post_type,
            hashtags = draft.hashtags.len(),
            "draft content generated"
        );

        checkpoint(cancel, StageName::Optimizer)?;
        let optimizer = Optimizer { llm: &self.llm };
        let optimized = retry_with_backoff(policy.max_retries, policy.backoff_base_ms, || {
            optimizer.execute(&draft, &intent, &insight)
        })
        .await
        .map_err(|cause| PipelineError::Stage {
            stage: StageName::Optimizer,
            cause,
        })?;
        tracing::info!(
            request_id = %request.request_id,
            seo_score = optimized.seo_score,
            degraded,
            "run completed"
        );

        Ok(FinalArtifact {
            intent,
            audience,
            competitors: insight,
            draft,
            optimized,
            degraded,
        })
    }

    /// Competitor research with its degrade-don't-fail policy. Returns the
    /// insight and whether the run is degraded.
    ///
    /// Competitor data is an enrichment, not a hard dependency: exhausted
    /// retries, a missing credential, or an upstream defect all yield an
    /// empty insight with the degraded flag set. A request with no locatable
    /// reference skips the lookup without degrading; there is nothing to
    /// search near.
    async fn research_competitors(&self, intent: &ParsedIntent) -> (CompetitorInsight, bool) {
        let Some(directory) = &self.directory else {
            tracing::warn!("no directory credential configured; competitor research degraded");
            return (CompetitorInsight::empty(), true);
        };
        let Some(location) = &intent.location else {
            tracing::info!("request has no locatable reference; skipping competitor lookup");
            return (CompetitorInsight::empty(), false);
        };

        let researcher = CompetitorResearcher { directory };
        match retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            researcher.execute(intent, location)
        })
        .await
        {
            Ok(insight) => (insight, false),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    business_type = %intent.business_type,
                    "competitor research failed; continuing degraded"
                );
                (CompetitorInsight::empty(), true)
            }
        }
    }
}

fn checkpoint(cancel: &CancelFlag, stage: StageName) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        tracing::info!(stage = %stage, "run cancelled at stage boundary");
        return Err(PipelineError::Cancelled { stage });
    }
    Ok(())
}
