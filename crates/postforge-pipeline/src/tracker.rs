//! Session-scoped run tracking.
//!
//! Each accepted request becomes a tracked run. Exactly one terminal outcome
//! is ever recorded per run: the first writer wins and later completions are
//! ignored, so a race between a finishing pipeline and a cancellation path
//! cannot produce two notifications for the same run.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::types::{FinalArtifact, Request};

/// Opaque identifier for one tracked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Terminal result of a run, as reported by whoever finished it.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Artifact(Arc<FinalArtifact>),
    Error(String),
}

/// Observable state of a tracked run.
#[derive(Debug, Clone)]
pub enum RunStatus {
    Running { session_id: String },
    Completed(Arc<FinalArtifact>),
    Failed(String),
}

impl RunStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running { .. })
    }
}

/// In-memory registry of runs keyed by [`RunId`].
///
/// The lock is held only for map operations, never across an await point.
#[derive(Debug, Default)]
pub struct RunTracker {
    runs: Mutex<HashMap<RunId, RunStatus>>,
}

impl RunTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new run in the `Running` state and returns its id.
    pub fn register(&self, request: &Request) -> RunId {
        let id = RunId::generate();
        let mut runs = self.runs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        runs.insert(
            id,
            RunStatus::Running {
                session_id: request.session_id.clone(),
            },
        );
        tracing::debug!(run_id = %id, session_id = %request.session_id, "run registered");
        id
    }

    /// Records the terminal outcome for `id`. Returns `true` if this call
    /// performed the transition, `false` if the run was unknown or already
    /// terminal. Idempotent: only the first completion takes effect.
    pub fn complete(&self, id: RunId, outcome: RunOutcome) -> bool {
        let mut runs = self.runs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match runs.get(&id) {
            Some(status) if !status.is_terminal() => {
                let status = match outcome {
                    RunOutcome::Artifact(artifact) => RunStatus::Completed(artifact),
                    RunOutcome::Error(message) => RunStatus::Failed(message),
                };
                runs.insert(id, status);
                true
            }
            Some(_) => {
                tracing::debug!(run_id = %id, "duplicate completion ignored");
                false
            }
            None => false,
        }
    }

    /// Current status of a run, if it is known.
    #[must_use]
    pub fn lookup(&self, id: RunId) -> Option<RunStatus> {
        let runs = self.runs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        runs.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AudienceProfile, CompetitorInsight, DraftContent, FinalArtifact, HashtagBands,
        OptimizedContent, ParsedIntent, PostType,
    };
    use std::collections::BTreeMap;

    fn artifact() -> Arc<FinalArtifact> {
        Arc::new(FinalArtifact {
            intent: ParsedIntent {
                business_type: "cafe".to_string(),
                location: None,
                campaign_goal: "goal".to_string(),
            },
            audience: AudienceProfile {
                target_audience: "locals".to_string(),
                engagement_times: vec!["08:00".into(), "12:00".into(), "19:00".into()],
                content_tone: "warm".to_string(),
                post_frequency: 3,
                platform_insights: BTreeMap::new(),
            },
            competitors: CompetitorInsight::empty(),
            draft: DraftContent {
                caption: "caption".to_string(),
                hashtags: (0..10).map(|i| format!("#t{i}")).collect(),
                post_type: PostType::Photo,
                call_to_action: "cta".to_string(),
                suggested_post_time: "08:00".to_string(),
                media_prompts: vec![],
            },
            optimized: OptimizedContent {
                optimized_caption: "caption".to_string(),
                optimized_hashtags: HashtagBands {
                    high: vec!["#a".into()],
                    medium: vec![],
                    low: vec![],
                },
                keyword_suggestions: vec![],
                seo_score: 80,
                improvements: vec![],
                alt_text_suggestion: String::new(),
                location_tags: vec![],
            },
            degraded: false,
        })
    }

    #[test]
    fn register_then_lookup_is_running() {
        let tracker = RunTracker::new();
        let id = tracker.register(&Request::new("text", "s-1"));
        assert!(matches!(
            tracker.lookup(id),
            Some(RunStatus::Running { ref session_id }) if session_id == "s-1"
        ));
    }

    #[test]
    fn first_completion_wins() {
        let tracker = RunTracker::new();
        let id = tracker.register(&Request::new("text", "s-1"));

        assert!(tracker.complete(id, RunOutcome::Artifact(artifact())));
        assert!(!tracker.complete(id, RunOutcome::Error("late failure".to_string())));

        assert!(matches!(tracker.lookup(id), Some(RunStatus::Completed(_))));
    }

    #[test]
    fn failure_is_terminal_too() {
        let tracker = RunTracker::new();
        let id = tracker.register(&Request::new("text", "s-1"));

        assert!(tracker.complete(id, RunOutcome::Error("upstream defect".to_string())));
        assert!(!tracker.complete(id, RunOutcome::Artifact(artifact())));

        assert!(matches!(
            tracker.lookup(id),
            Some(RunStatus::Failed(ref msg)) if msg == "upstream defect"
        ));
    }

    #[test]
    fn unknown_run_cannot_be_completed() {
        let tracker = RunTracker::new();
        let id = RunId::generate();
        assert!(!tracker.complete(id, RunOutcome::Error("nope".to_string())));
        assert!(tracker.lookup(id).is_none());
    }
}
