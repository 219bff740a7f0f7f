//! Schema validation gate between pipeline stages.
//!
//! Each `validate_*` function takes the raw JSON a stage produced and either
//! returns the typed output or a [`ValidationError`] naming the offending
//! field. Recoverable shape mismatches (stringified numbers, wrong-case enum
//! values, missing `#` prefixes) are coerced in place and logged at debug;
//! missing required fields and range/cardinality violations fail. The gate
//! has no side effects beyond logging.

use serde_json::Value;

use crate::error::{StageName, ValidationError};
use crate::types::{
    AudienceProfile, CompetitorInsight, DraftContent, OptimizedContent, ParsedIntent,
};

/// Minimum/maximum hashtags in generated draft content.
pub const DRAFT_HASHTAG_RANGE: (usize, usize) = (10, 15);
/// Minimum/maximum engagement times in an audience profile.
pub const ENGAGEMENT_TIME_RANGE: (usize, usize) = (3, 5);
/// Upper bound on total banded hashtags from the optimizer.
const MAX_BANDED_HASHTAGS: usize = 25;

/// Validates parser output into a [`ParsedIntent`].
///
/// Coercions: an empty or whitespace-only `location` string becomes `null`.
///
/// # Errors
///
/// Fails if the payload does not decode, or `business_type` /
/// `campaign_goal` is empty.
pub fn validate_parsed_intent(mut raw: Value) -> Result<ParsedIntent, ValidationError> {
    const STAGE: StageName = StageName::Parser;

    if let Some(loc) = raw.get("location") {
        if loc.as_str().is_some_and(|s| s.trim().is_empty()) {
            tracing::debug!(stage = %STAGE, "coerced empty location string to null");
            raw["location"] = Value::Null;
        }
    }

    let intent: ParsedIntent = decode(STAGE, raw)?;
    require_non_empty(STAGE, "business_type", &intent.business_type)?;
    require_non_empty(STAGE, "campaign_goal", &intent.campaign_goal)?;
    Ok(intent)
}

/// Validates analyzer output into an [`AudienceProfile`].
///
/// Coercions: stringified `post_frequency` is parsed; non-string
/// `platform_insights` values are flattened to their compact JSON form.
///
/// # Errors
///
/// Fails on a missing field, `post_frequency < 1`, an engagement-time count
/// outside 3–5, or a time not in `HH:MM` form.
pub fn validate_audience_profile(mut raw: Value) -> Result<AudienceProfile, ValidationError> {
    const STAGE: StageName = StageName::Analyzer;

    coerce_number_field(&mut raw, STAGE, "post_frequency");
    coerce_number_field(&mut raw, STAGE, "recommended_post_frequency");
    coerce_string_map(&mut raw, STAGE, "platform_insights");

    let profile: AudienceProfile = decode(STAGE, raw)?;
    require_non_empty(STAGE, "target_audience", &profile.target_audience)?;
    require_non_empty(STAGE, "content_tone", &profile.content_tone)?;
    if profile.post_frequency < 1 {
        return Err(ValidationError::new(
            STAGE,
            "post_frequency",
            "must be at least 1 post per week",
        ));
    }
    check_cardinality(
        STAGE,
        "engagement_times",
        profile.engagement_times.len(),
        ENGAGEMENT_TIME_RANGE,
    )?;
    for time in &profile.engagement_times {
        require_hhmm(STAGE, "engagement_times", time)?;
    }
    Ok(profile)
}

/// Validates competitor-research output into a [`CompetitorInsight`].
///
/// An entirely empty insight is valid.
///
/// # Errors
///
/// Fails if the payload does not decode or a competitor rating falls outside
/// `[0.0, 5.0]`.
pub fn validate_competitor_insight(raw: Value) -> Result<CompetitorInsight, ValidationError> {
    const STAGE: StageName = StageName::CompetitorResearch;

    let insight: CompetitorInsight = decode(STAGE, raw)?;
    for competitor in &insight.competitors {
        if !(0.0..=5.0).contains(&competitor.rating) {
            return Err(ValidationError::new(
                STAGE,
                "competitors.rating",
                format!(
                    "rating {} for '{}' outside [0.0, 5.0]",
                    competitor.rating, competitor.name
                ),
            ));
        }
    }
    Ok(insight)
}

/// Validates content-generation output into [`DraftContent`].
///
/// Coercions: `post_type` is matched case-insensitively; hashtags missing
/// their `#` prefix get one.
///
/// # Errors
///
/// Fails on a missing field, an unrecognized post type, a hashtag count
/// outside 10–15, or a suggested time not in `HH:MM` form.
pub fn validate_draft_content(mut raw: Value) -> Result<DraftContent, ValidationError> {
    const STAGE: StageName = StageName::ContentGenerator;

    coerce_post_type(&mut raw, STAGE)?;
    coerce_hashtag_prefixes(&mut raw, STAGE, "hashtags");

    let draft: DraftContent = decode(STAGE, raw)?;
    require_non_empty(STAGE, "caption", &draft.caption)?;
    require_non_empty(STAGE, "call_to_action", &draft.call_to_action)?;
    check_cardinality(STAGE, "hashtags", draft.hashtags.len(), DRAFT_HASHTAG_RANGE)?;
    require_hhmm(STAGE, "suggested_post_time", &draft.suggested_post_time)?;
    Ok(draft)
}

/// Validates optimizer output into [`OptimizedContent`].
///
/// Coercions: stringified `seo_score` is parsed; a `null`
/// `alt_text_suggestion` becomes the empty string; band hashtags missing
/// their `#` prefix get one.
///
/// # Errors
///
/// Fails on a missing field, `seo_score` outside `[0, 100]`, an empty
/// hashtag banding, or an oversized one.
pub fn validate_optimized_content(mut raw: Value) -> Result<OptimizedContent, ValidationError> {
    const STAGE: StageName = StageName::Optimizer;

    coerce_number_field(&mut raw, STAGE, "seo_score");
    if raw.get("alt_text_suggestion").is_some_and(Value::is_null) {
        tracing::debug!(stage = %STAGE, "coerced null alt_text_suggestion to empty string");
        raw["alt_text_suggestion"] = Value::String(String::new());
    }
    if let Some(bands) = raw.get_mut("optimized_hashtags") {
        for band in ["high", "medium", "low"] {
            coerce_hashtag_prefixes(bands, STAGE, band);
        }
    }

    // Range-check before decode: 150 still fits in a u8 and would slip through.
    if let Some(score) = raw.get("seo_score").and_then(Value::as_i64) {
        if !(0..=100).contains(&score) {
            return Err(ValidationError::new(
                STAGE,
                "seo_score",
                format!("score {score} outside [0, 100]"),
            ));
        }
    }

    let optimized: OptimizedContent = decode(STAGE, raw)?;
    require_non_empty(STAGE, "optimized_caption", &optimized.optimized_caption)?;
    let total = optimized.optimized_hashtags.total();
    if total == 0 {
        return Err(ValidationError::new(
            STAGE,
            "optimized_hashtags",
            "all competition bands are empty",
        ));
    }
    if total > MAX_BANDED_HASHTAGS {
        return Err(ValidationError::new(
            STAGE,
            "optimized_hashtags",
            format!("{total} hashtags across bands exceeds the {MAX_BANDED_HASHTAGS} limit"),
        ));
    }
    Ok(optimized)
}

fn decode<T: serde::de::DeserializeOwned>(
    stage: StageName,
    raw: Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(raw)
        .map_err(|e| ValidationError::new(stage, "payload", e.to_string()))
}

fn require_non_empty(stage: StageName, field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(stage, field, "must not be empty"));
    }
    Ok(())
}

fn check_cardinality(
    stage: StageName,
    field: &str,
    len: usize,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    if len < min || len > max {
        return Err(ValidationError::new(
            stage,
            field,
            format!("expected {min}–{max} entries, got {len}"),
        ));
    }
    Ok(())
}

fn require_hhmm(stage: StageName, field: &str, value: &str) -> Result<(), ValidationError> {
    let valid = match value.split_once(':') {
        Some((h, m)) => {
            h.len() == 2
                && m.len() == 2
                && h.parse::<u8>().is_ok_and(|h| h < 24)
                && m.parse::<u8>().is_ok_and(|m| m < 60)
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::new(
            stage,
            field,
            format!("'{value}' is not a HH:MM time of day"),
        ));
    }
    Ok(())
}

/// Replaces a stringified number (`"5"`) with its numeric form.
fn coerce_number_field(raw: &mut Value, stage: StageName, field: &str) {
    let Some(s) = raw.get(field).and_then(Value::as_str) else {
        return;
    };
    if let Ok(n) = s.trim().parse::<i64>() {
        tracing::debug!(stage = %stage, field, "coerced stringified number");
        raw[field] = Value::from(n);
    }
}

/// Matches `post_type` case-insensitively against the recognized variants.
fn coerce_post_type(raw: &mut Value, stage: StageName) -> Result<(), ValidationError> {
    let Some(s) = raw.get("post_type").and_then(Value::as_str) else {
        // Missing or non-string: let decode report it.
        return Ok(());
    };
    let canonical = match s.trim().to_ascii_lowercase().as_str() {
        "photo" => "Photo",
        "reel" => "Reel",
        "carousel" => "Carousel",
        "story" => "Story",
        other => {
            return Err(ValidationError::new(
                stage,
                "post_type",
                format!("'{other}' is not one of Photo/Reel/Carousel/Story"),
            ));
        }
    };
    if s != canonical {
        tracing::debug!(stage = %stage, from = s, to = canonical, "coerced post_type case");
        raw["post_type"] = Value::String(canonical.to_string());
    }
    Ok(())
}

/// Prepends `#` to any tag in the named string array that lacks one.
fn coerce_hashtag_prefixes(raw: &mut Value, stage: StageName, field: &str) {
    let Some(tags) = raw.get_mut(field).and_then(Value::as_array_mut) else {
        return;
    };
    for tag in tags {
        if let Some(s) = tag.as_str() {
            let trimmed = s.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                tracing::debug!(stage = %stage, field, tag = trimmed, "added missing # prefix");
                *tag = Value::String(format!("#{trimmed}"));
            }
        }
    }
}

/// Flattens non-string values in the named map to compact JSON strings.
fn coerce_string_map(raw: &mut Value, stage: StageName, field: &str) {
    let Some(map) = raw.get_mut(field).and_then(Value::as_object_mut) else {
        return;
    };
    for (key, value) in map.iter_mut() {
        if !value.is_string() {
            tracing::debug!(stage = %stage, field, key, "flattened non-string guidance value");
            *value = Value::String(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostType;
    use serde_json::json;

    fn hashtags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("#tag{i}")).collect()
    }

    fn draft_json(n_hashtags: usize) -> Value {
        json!({
            "caption": "Fresh pour-overs all week.",
            "hashtags": hashtags(n_hashtags),
            "post_type": "Reel",
            "call_to_action": "Stop by before noon.",
            "suggested_post_time": "08:30",
            "media_prompts": ["barista pouring latte art"]
        })
    }

    #[test]
    fn parsed_intent_accepts_valid_payload() {
        let intent = validate_parsed_intent(json!({
            "business_type": "cafe",
            "location": "San Jose, CA",
            "campaign_goal": "free cookie with latte purchase"
        }))
        .unwrap();
        assert_eq!(intent.business_type, "cafe");
        assert_eq!(intent.location.as_deref(), Some("San Jose, CA"));
    }

    #[test]
    fn parsed_intent_coerces_empty_location_to_none() {
        let intent = validate_parsed_intent(json!({
            "business_type": "cafe",
            "location": "  ",
            "campaign_goal": "more regulars"
        }))
        .unwrap();
        assert!(intent.location.is_none());
    }

    #[test]
    fn parsed_intent_accepts_campaign_goals_alias() {
        let intent = validate_parsed_intent(json!({
            "business_type": "bakery",
            "campaign_goals": "corporate catering clients"
        }))
        .unwrap();
        assert_eq!(intent.campaign_goal, "corporate catering clients");
    }

    #[test]
    fn parsed_intent_rejects_empty_business_type() {
        let err = validate_parsed_intent(json!({
            "business_type": "",
            "campaign_goal": "anything"
        }))
        .unwrap_err();
        assert_eq!(err.field, "business_type");
        assert_eq!(err.stage, StageName::Parser);
    }

    #[test]
    fn parsed_intent_rejects_missing_goal() {
        let err = validate_parsed_intent(json!({"business_type": "cafe"})).unwrap_err();
        assert_eq!(err.field, "payload");
    }

    #[test]
    fn audience_profile_coerces_stringified_frequency() {
        let profile = validate_audience_profile(json!({
            "target_audience": "young professionals",
            "engagement_times": ["08:00", "12:00", "19:00"],
            "content_tone": "warm",
            "post_frequency": "5",
            "platform_insights": {"reels": "post daily", "stories": {"frequency": "2x"}}
        }))
        .unwrap();
        assert_eq!(profile.post_frequency, 5);
        // Non-string guidance flattened rather than rejected.
        assert!(profile.platform_insights["stories"].contains("frequency"));
    }

    #[test]
    fn audience_profile_rejects_zero_frequency() {
        let err = validate_audience_profile(json!({
            "target_audience": "anyone",
            "engagement_times": ["08:00", "12:00", "19:00"],
            "content_tone": "warm",
            "post_frequency": 0
        }))
        .unwrap_err();
        assert_eq!(err.field, "post_frequency");
    }

    #[test]
    fn audience_profile_rejects_too_few_engagement_times() {
        let err = validate_audience_profile(json!({
            "target_audience": "anyone",
            "engagement_times": ["08:00"],
            "content_tone": "warm",
            "post_frequency": 3
        }))
        .unwrap_err();
        assert_eq!(err.field, "engagement_times");
    }

    #[test]
    fn audience_profile_rejects_six_engagement_times() {
        let err = validate_audience_profile(json!({
            "target_audience": "anyone",
            "engagement_times": ["06:00", "08:00", "10:00", "12:00", "14:00", "16:00"],
            "content_tone": "warm",
            "post_frequency": 3
        }))
        .unwrap_err();
        assert_eq!(err.field, "engagement_times");
    }

    #[test]
    fn audience_profile_rejects_malformed_time() {
        let err = validate_audience_profile(json!({
            "target_audience": "anyone",
            "engagement_times": ["08:00", "noonish", "19:00"],
            "content_tone": "warm",
            "post_frequency": 3
        }))
        .unwrap_err();
        assert!(err.reason.contains("noonish"), "got: {}", err.reason);
    }

    #[test]
    fn competitor_insight_accepts_empty_object() {
        let insight = validate_competitor_insight(json!({})).unwrap();
        assert!(insight.is_empty());
    }

    #[test]
    fn competitor_insight_rejects_out_of_range_rating() {
        let err = validate_competitor_insight(json!({
            "competitors": [{"name": "Over Achiever", "rating": 6.2, "category": "Cafes"}]
        }))
        .unwrap_err();
        assert_eq!(err.field, "competitors.rating");
    }

    #[test]
    fn draft_content_accepts_valid_payload() {
        let draft = validate_draft_content(draft_json(12)).unwrap();
        assert_eq!(draft.post_type, PostType::Reel);
        assert_eq!(draft.hashtags.len(), 12);
    }

    #[test]
    fn draft_content_coerces_lowercase_post_type() {
        let mut raw = draft_json(10);
        raw["post_type"] = json!("carousel");
        let draft = validate_draft_content(raw).unwrap();
        assert_eq!(draft.post_type, PostType::Carousel);
    }

    #[test]
    fn draft_content_rejects_unknown_post_type() {
        let mut raw = draft_json(10);
        raw["post_type"] = json!("livestream");
        let err = validate_draft_content(raw).unwrap_err();
        assert_eq!(err.field, "post_type");
    }

    #[test]
    fn draft_content_adds_missing_hash_prefixes() {
        let mut raw = draft_json(10);
        raw["hashtags"][0] = json!("latteart");
        let draft = validate_draft_content(raw).unwrap();
        assert_eq!(draft.hashtags[0], "#latteart");
    }

    #[test]
    fn draft_content_rejects_nine_hashtags() {
        let err = validate_draft_content(draft_json(9)).unwrap_err();
        assert_eq!(err.field, "hashtags");
    }

    #[test]
    fn draft_content_rejects_sixteen_hashtags() {
        let err = validate_draft_content(draft_json(16)).unwrap_err();
        assert_eq!(err.field, "hashtags");
    }

    fn optimized_json(score: Value) -> Value {
        json!({
            "optimized_caption": "San Jose's coziest cafe — free cookie with any latte.",
            "optimized_hashtags": {
                "high": ["#coffee", "#cafe"],
                "medium": ["#sanjosecoffee", "#southbayeats"],
                "low": ["#sanjosecookiedeal"]
            },
            "keyword_suggestions": ["san jose cafe", "latte deal"],
            "seo_score": score,
            "improvements": ["added location keywords"],
            "alt_text_suggestion": "A latte beside a chocolate chip cookie",
            "location_tags": ["#sanjose"]
        })
    }

    #[test]
    fn optimized_content_accepts_valid_payload() {
        let optimized = validate_optimized_content(optimized_json(json!(87))).unwrap();
        assert_eq!(optimized.seo_score, 87);
        assert_eq!(optimized.optimized_hashtags.total(), 5);
    }

    #[test]
    fn optimized_content_coerces_stringified_score() {
        let optimized = validate_optimized_content(optimized_json(json!("72"))).unwrap();
        assert_eq!(optimized.seo_score, 72);
    }

    #[test]
    fn optimized_content_rejects_score_above_100() {
        let err = validate_optimized_content(optimized_json(json!(150))).unwrap_err();
        assert_eq!(err.field, "seo_score");
    }

    #[test]
    fn optimized_content_rejects_negative_score() {
        let err = validate_optimized_content(optimized_json(json!(-3))).unwrap_err();
        assert_eq!(err.field, "seo_score");
    }

    #[test]
    fn optimized_content_coerces_null_alt_text() {
        let mut raw = optimized_json(json!(60));
        raw["alt_text_suggestion"] = Value::Null;
        let optimized = validate_optimized_content(raw).unwrap();
        assert!(optimized.alt_text_suggestion.is_empty());
    }

    #[test]
    fn optimized_content_rejects_empty_bands() {
        let mut raw = optimized_json(json!(60));
        raw["optimized_hashtags"] = json!({"high": [], "medium": [], "low": []});
        let err = validate_optimized_content(raw).unwrap_err();
        assert_eq!(err.field, "optimized_hashtags");
    }

    #[test]
    fn unparseable_payload_fails_with_payload_field() {
        let err = validate_draft_content(json!("just a string")).unwrap_err();
        assert_eq!(err.field, "payload");
        assert_eq!(err.stage, StageName::ContentGenerator);
    }
}
