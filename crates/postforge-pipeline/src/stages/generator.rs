//! Content-generation stage: intent + audience + insight → [`DraftContent`].

use postforge_llm::LlmClient;

use crate::error::{StageError, StageName};
use crate::types::{AudienceProfile, CompetitorInsight, DraftContent, ParsedIntent};
use crate::validate::validate_draft_content;

use super::{classify_llm, prompts, require_json};

/// Creative stage: runs warm.
const TEMPERATURE: f32 = 0.7;

pub(crate) struct ContentGenerator<'a> {
    pub llm: &'a LlmClient,
}

impl ContentGenerator<'_> {
    pub(crate) async fn execute(
        &self,
        intent: &ParsedIntent,
        audience: &AudienceProfile,
        insight: &CompetitorInsight,
    ) -> Result<DraftContent, StageError> {
        let user_prompt = prompts::generator_prompt(intent, audience, insight);
        let completion = self
            .llm
            .complete(prompts::GENERATOR_SYSTEM, &user_prompt, TEMPERATURE)
            .await
            .map_err(classify_llm)?;
        let raw = require_json(StageName::ContentGenerator, &completion)?;
        Ok(validate_draft_content(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostType;
    use std::collections::BTreeMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn inputs() -> (ParsedIntent, AudienceProfile) {
        (
            ParsedIntent {
                business_type: "cafe".to_string(),
                location: Some("San Jose, CA".to_string()),
                campaign_goal: "free cookie with latte purchase".to_string(),
            },
            AudienceProfile {
                target_audience: "young professionals".to_string(),
                engagement_times: vec!["08:00".into(), "12:00".into(), "19:00".into()],
                content_tone: "warm".to_string(),
                post_frequency: 4,
                platform_insights: BTreeMap::new(),
            },
        )
    }

    fn draft_completion() -> String {
        serde_json::json!({
            "caption": "Cookie season starts now — free with any latte.",
            "hashtags": ["#cafe", "#sanjose", "#latte", "#freecookie", "#coffeetime",
                         "#southbay", "#cookielover", "#espresso", "#morningritual", "#shoplocal"],
            "post_type": "photo",
            "call_to_action": "Show this post at the counter tomorrow.",
            "suggested_post_time": "08:00",
            "media_prompts": ["latte beside a cookie on a wood counter", "barista handing over a cookie"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn produces_validated_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": draft_completion()}}]
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url("sk-test", "gpt-4o-mini", 5, &server.uri()).unwrap();
        let (intent, audience) = inputs();
        let draft = ContentGenerator { llm: &llm }
            .execute(&intent, &audience, &CompetitorInsight::empty())
            .await
            .unwrap();
        assert_eq!(draft.post_type, PostType::Photo, "lowercase coerced");
        assert_eq!(draft.hashtags.len(), 10);
        assert_eq!(draft.suggested_post_time, "08:00");
    }

    #[tokio::test]
    async fn too_few_hashtags_fails_the_stage() {
        let server = MockServer::start().await;
        let content = serde_json::json!({
            "caption": "Nice caption",
            "hashtags": ["#one", "#two"],
            "post_type": "Photo",
            "call_to_action": "Come by",
            "suggested_post_time": "09:00",
            "media_prompts": []
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
        let (intent, audience) = inputs();
        let err = ContentGenerator { llm: &llm }
            .execute(&intent, &audience, &CompetitorInsight::empty())
            .await
            .unwrap_err();
        assert!(
            matches!(err, StageError::SchemaInvalid(ref v) if v.field == "hashtags"),
            "got: {err:?}"
        );
    }
}
