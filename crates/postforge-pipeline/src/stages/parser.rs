//! Parser stage: free text → [`ParsedIntent`].

use postforge_llm::LlmClient;

use crate::error::{StageError, StageName};
use crate::types::ParsedIntent;
use crate::validate::validate_parsed_intent;

use super::{classify_llm, prompts, require_json};

/// Extraction runs cold so the same message parses the same way twice.
const TEMPERATURE: f32 = 0.3;

pub(crate) struct Parser<'a> {
    pub llm: &'a LlmClient,
}

impl Parser<'_> {
    pub(crate) async fn execute(&self, text: &str) -> Result<ParsedIntent, StageError> {
        let completion = self
            .llm
            .complete(prompts::PARSER_SYSTEM, text, TEMPERATURE)
            .await
            .map_err(classify_llm)?;
        let raw = require_json(StageName::Parser, &completion)?;
        Ok(validate_parsed_intent(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn llm_for(server: &MockServer) -> LlmClient {
        LlmClient::with_base_url("sk-test", "gpt-4o-mini", 5, &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn parses_intent_from_prose_wrapped_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "Here you go:\n{\"business_type\": \"cafe\", \"location\": \"San Jose, CA\", \"campaign_goal\": \"free cookie with latte purchase\"}",
            )))
            .mount(&server)
            .await;

        let llm = llm_for(&server);
        let intent = Parser { llm: &llm }
            .execute("cafe in San Jose, free cookie with latte purchase tomorrow")
            .await
            .unwrap();
        assert_eq!(intent.business_type, "cafe");
        assert_eq!(intent.location.as_deref(), Some("San Jose, CA"));
        assert!(intent.campaign_goal.contains("cookie"));
    }

    #[tokio::test]
    async fn unparseable_completion_is_schema_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("I could not determine the business type.")),
            )
            .mount(&server)
            .await;

        let llm = llm_for(&server);
        let err = Parser { llm: &llm }.execute("gibberish").await.unwrap_err();
        assert!(matches!(err, StageError::SchemaInvalid(_)));
    }

    #[tokio::test]
    async fn upstream_500_is_not_schema_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let llm = llm_for(&server);
        let err = Parser { llm: &llm }.execute("anything").await.unwrap_err();
        assert!(matches!(err, StageError::Upstream(_)));
    }
}
