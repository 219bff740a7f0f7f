//! Competitor-research stage: [`ParsedIntent`] → [`CompetitorInsight`].
//!
//! The one stage whose external call is the business directory rather than
//! the generative-text service. Its insight is derived from the typed
//! directory records and still passes the validator gate before handoff.

use postforge_directory::{Business, DirectoryClient};
use serde_json::json;

use crate::error::StageError;
use crate::types::{CompetitorInsight, ParsedIntent};
use crate::validate::validate_competitor_insight;

use super::classify_directory;

pub(crate) struct CompetitorResearcher<'a> {
    pub directory: &'a DirectoryClient,
}

impl CompetitorResearcher<'_> {
    /// `location` is required: the orchestrator only runs this stage when the
    /// parsed intent carries a locatable reference.
    pub(crate) async fn execute(
        &self,
        intent: &ParsedIntent,
        location: &str,
    ) -> Result<CompetitorInsight, StageError> {
        let businesses = self
            .directory
            .search_businesses(&intent.business_type, location)
            .await
            .map_err(classify_directory)?;

        if businesses.is_empty() {
            tracing::info!(
                business_type = %intent.business_type,
                location,
                "directory returned no competitors; valid empty insight"
            );
            return Ok(CompetitorInsight::empty());
        }

        let raw = build_insight(&intent.business_type, location, &businesses);
        Ok(validate_competitor_insight(raw)?)
    }
}

/// Derives positioning, opportunities, and hashtag suggestions from the
/// directory records.
fn build_insight(business_type: &str, location: &str, businesses: &[Business]) -> serde_json::Value {
    #[allow(clippy::cast_precision_loss)]
    let avg_rating =
        businesses.iter().map(|b| b.rating).sum::<f32>() / businesses.len() as f32;

    let positioning = if avg_rating >= 4.5 {
        format!(
            "{} highly-rated {business_type} competitors near {location} averaging {avg_rating:.1} stars; the quality bar is high, so differentiate on experience and offers",
            businesses.len()
        )
    } else {
        format!(
            "{} {business_type} competitors near {location} averaging {avg_rating:.1} stars; there is room to lead on quality and consistency",
            businesses.len()
        )
    };

    let mut opportunities = vec![
        "Post behind-the-scenes content competitors rarely show".to_string(),
        "Lean into community-focused posts to stand out locally".to_string(),
    ];
    if businesses
        .iter()
        .any(|b| matches!(b.price.as_deref(), Some("$$$" | "$$$$")))
    {
        opportunities.push("Undercut premium-priced competitors with value-focused offers".to_string());
    }
    if avg_rating < 4.0 {
        opportunities
            .push("Highlight service quality; nearby ratings leave an opening".to_string());
    }

    let mut hashtags: Vec<String> = vec![hashtag(business_type)];
    if let Some(city) = location.split(',').next() {
        hashtags.push(hashtag(city));
        hashtags.push(hashtag(&format!("{city} {business_type}")));
    }
    for b in businesses {
        let category = b.primary_category();
        if !category.is_empty() {
            hashtags.push(hashtag(category));
        }
    }
    hashtags.retain(|t| t.len() > 1);

    let competitors: Vec<serde_json::Value> = businesses
        .iter()
        .map(|b| {
            json!({
                "name": b.name,
                "rating": b.rating,
                "category": b.primary_category(),
            })
        })
        .collect();

    json!({
        "competitors": competitors,
        "market_positioning": positioning,
        "opportunities": opportunities,
        "suggested_hashtags": hashtags,
    })
}

/// Lowercased, alphanumeric-only hashtag form of a phrase.
fn hashtag(phrase: &str) -> String {
    let body: String = phrase
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    format!("#{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn intent() -> ParsedIntent {
        ParsedIntent {
            business_type: "cafe".to_string(),
            location: Some("San Jose, CA".to_string()),
            campaign_goal: "free cookie with latte purchase".to_string(),
        }
    }

    #[test]
    fn hashtag_strips_spaces_and_case() {
        assert_eq!(hashtag("San Jose"), "#sanjose");
        assert_eq!(hashtag("Coffee & Tea"), "#coffeetea");
    }

    #[tokio::test]
    async fn builds_insight_from_directory_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/businesses/search"))
            .and(query_param("term", "cafe"))
            .and(query_param("location", "San Jose, CA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "businesses": [
                    {"name": "Roastery One", "rating": 4.6, "price": "$$$",
                     "categories": [{"title": "Coffee & Tea"}]},
                    {"name": "Bean Corner", "rating": 4.4, "categories": [{"title": "Cafes"}]}
                ]
            })))
            .mount(&server)
            .await;

        let directory = DirectoryClient::with_base_url("yelp-test", 5, &server.uri()).unwrap();
        let insight = CompetitorResearcher {
            directory: &directory,
        }
        .execute(&intent(), "San Jose, CA")
        .await
        .unwrap();

        assert_eq!(insight.competitors.len(), 2);
        assert_eq!(insight.competitors[0].name, "Roastery One");
        assert!(insight.market_positioning.contains("4.5"));
        assert!(insight
            .opportunities
            .iter()
            .any(|o| o.contains("premium-priced")));
        assert!(insight.suggested_hashtags.contains("#sanjose"));
        assert!(insight.suggested_hashtags.contains("#cafe"));
    }

    #[tokio::test]
    async fn no_competitors_is_a_valid_empty_insight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/businesses/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"businesses": []})),
            )
            .mount(&server)
            .await;

        let directory = DirectoryClient::with_base_url("yelp-test", 5, &server.uri()).unwrap();
        let insight = CompetitorResearcher {
            directory: &directory,
        }
        .execute(&intent(), "Middle of Nowhere, MT")
        .await
        .unwrap();
        assert!(insight.is_empty());
    }

    #[tokio::test]
    async fn directory_429_surfaces_as_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/businesses/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let directory = DirectoryClient::with_base_url("yelp-test", 5, &server.uri()).unwrap();
        let err = CompetitorResearcher {
            directory: &directory,
        }
        .execute(&intent(), "San Jose, CA")
        .await
        .unwrap_err();
        assert!(matches!(err, StageError::RateLimited { .. }));
    }
}
