//! Inter-stage data contracts.
//!
//! Every type here is a stage-local value object: the producing stage owns it
//! until it is handed, by value, to the next stage, and nothing mutates it
//! after handoff.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One inbound request. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub text: String,
    pub session_id: String,
    pub request_id: Uuid,
    pub received_at: DateTime<Utc>,
}

impl Request {
    #[must_use]
    pub fn new(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: session_id.into(),
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
        }
    }
}

/// Output of the parser stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedIntent {
    /// Non-empty business type, e.g. "cafe".
    pub business_type: String,
    /// Geocodable location ("San Jose, CA"), or `None` when the input
    /// contains no locatable reference.
    #[serde(default)]
    pub location: Option<String>,
    /// Non-empty campaign objective.
    #[serde(alias = "campaign_goals")]
    pub campaign_goal: String,
}

/// Output of the audience-analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceProfile {
    pub target_audience: String,
    /// 3–5 optimal posting times, HH:MM.
    pub engagement_times: Vec<String>,
    pub content_tone: String,
    /// Posts per week, at least 1.
    #[serde(alias = "recommended_post_frequency")]
    pub post_frequency: u32,
    /// Platform-surface guidance keyed by "stories" / "reels" / "carousels".
    #[serde(default)]
    pub platform_insights: BTreeMap<String, String>,
}

/// One competitor found by the directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    /// Directory star rating in [0.0, 5.0].
    pub rating: f32,
    pub category: String,
}

/// Output of the competitor-research stage. An empty insight is a valid
/// state (no competitors found, or the stage degraded), not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorInsight {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub market_positioning: String,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub suggested_hashtags: BTreeSet<String>,
}

impl CompetitorInsight {
    /// The substitute value used when the stage degrades.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
            && self.market_positioning.is_empty()
            && self.opportunities.is_empty()
            && self.suggested_hashtags.is_empty()
    }
}

/// Recommended post format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    Photo,
    Reel,
    Carousel,
    Story,
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostType::Photo => f.write_str("Photo"),
            PostType::Reel => f.write_str("Reel"),
            PostType::Carousel => f.write_str("Carousel"),
            PostType::Story => f.write_str("Story"),
        }
    }
}

/// Output of the content-generation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContent {
    pub caption: String,
    /// 10–15 hashtags, each with a leading `#`.
    pub hashtags: Vec<String>,
    pub post_type: PostType,
    pub call_to_action: String,
    /// HH:MM, chosen from the audience profile's engagement times.
    pub suggested_post_time: String,
    #[serde(default)]
    pub media_prompts: Vec<String>,
}

/// Optimized hashtags partitioned by competition band.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashtagBands {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

impl HashtagBands {
    #[must_use]
    pub fn total(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }
}

/// Output of the discoverability-optimization stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedContent {
    pub optimized_caption: String,
    pub optimized_hashtags: HashtagBands,
    #[serde(default)]
    pub keyword_suggestions: Vec<String>,
    /// Always in [0, 100].
    pub seo_score: u8,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub alt_text_suggestion: String,
    #[serde(default)]
    pub location_tags: Vec<String>,
}

/// The assembled, renderable result of one successful run.
///
/// Carries `DraftContent` alongside the optimized content because the
/// rendering surface needs the post type, call-to-action, suggested time and
/// media prompts, which only the draft holds.
#[derive(Debug, Clone, Serialize)]
pub struct FinalArtifact {
    pub intent: ParsedIntent,
    pub audience: AudienceProfile,
    pub competitors: CompetitorInsight,
    pub draft: DraftContent,
    pub optimized: OptimizedContent,
    /// True when competitor research failed and the run continued without it.
    pub degraded: bool,
}
