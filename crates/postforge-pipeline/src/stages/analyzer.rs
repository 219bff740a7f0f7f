//! Analyzer stage: [`ParsedIntent`] → [`AudienceProfile`].

use postforge_llm::LlmClient;

use crate::error::{StageError, StageName};
use crate::types::{AudienceProfile, ParsedIntent};
use crate::validate::validate_audience_profile;

use super::{classify_llm, prompts, require_json};

/// Audience analysis benefits from some variety in phrasing.
const TEMPERATURE: f32 = 0.7;

pub(crate) struct Analyzer<'a> {
    pub llm: &'a LlmClient,
}

impl Analyzer<'_> {
    pub(crate) async fn execute(&self, intent: &ParsedIntent) -> Result<AudienceProfile, StageError> {
        let user_prompt = prompts::analyzer_prompt(intent);
        let completion = self
            .llm
            .complete(prompts::ANALYZER_SYSTEM, &user_prompt, TEMPERATURE)
            .await
            .map_err(classify_llm)?;
        let raw = require_json(StageName::Analyzer, &completion)?;
        Ok(validate_audience_profile(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn intent() -> ParsedIntent {
        ParsedIntent {
            business_type: "donut shop".to_string(),
            location: Some("Los Angeles, CA".to_string()),
            campaign_goal: "increase local foot traffic".to_string(),
        }
    }

    #[tokio::test]
    async fn produces_validated_profile() {
        let server = MockServer::start().await;
        let content = serde_json::json!({
            "target_audience": "Commuters and students aged 18-35",
            "engagement_times": ["07:30", "12:00", "20:00"],
            "content_tone": "playful",
            "post_frequency": "4",
            "platform_insights": {"stories": "daily polls", "reels": "high priority", "carousels": "menu roundups"}
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("donut shop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url("sk-test", "gpt-4o-mini", 5, &server.uri()).unwrap();
        let profile = Analyzer { llm: &llm }.execute(&intent()).await.unwrap();
        assert_eq!(profile.post_frequency, 4, "stringified frequency coerced");
        assert_eq!(profile.engagement_times.len(), 3);
        assert_eq!(profile.platform_insights["reels"], "high priority");
    }

    #[tokio::test]
    async fn profile_with_one_engagement_time_fails_validation() {
        let server = MockServer::start().await;
        let content = serde_json::json!({
            "target_audience": "everyone",
            "engagement_times": ["12:00"],
            "content_tone": "warm",
            "post_frequency": 3
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url("sk-test", "gpt-4o-mini", 5, &server.uri()).unwrap();
        let err = Analyzer { llm: &llm }.execute(&intent()).await.unwrap_err();
        assert!(
            matches!(err, StageError::SchemaInvalid(ref v) if v.field == "engagement_times"),
            "got: {err:?}"
        );
    }
}
