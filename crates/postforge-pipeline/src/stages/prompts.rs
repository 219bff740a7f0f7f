//! Prompt templates for the four generative-text stages.
//!
//! Each template states the stage's job, the exact JSON schema expected back,
//! and the constraints the validator will enforce, so a well-behaved model
//! produces output that passes the gate on the first attempt.

use std::fmt::Write as _;

use crate::types::{AudienceProfile, CompetitorInsight, DraftContent, ParsedIntent};

pub(crate) const PARSER_SYSTEM: &str = r#"You extract structured campaign information from a business owner's message.

Extract these fields:
1. business_type: the type of business (e.g. "donut shop", "cafe", "restaurant")
2. location: the business location, normalized to a geocodable "City, ST" form; null if no location is mentioned
3. campaign_goal: what the owner wants the campaign to achieve

Rules:
- Infer business_type from context if it isn't stated outright
- Never invent a location; use null when none is mentioned
- Return ONLY a JSON object, no extra text

Examples:

Input: "I have a donut shop in Los Angeles and want to increase local foot traffic"
Output: {"business_type": "donut shop", "location": "Los Angeles, CA", "campaign_goal": "Increase local foot traffic"}

Input: "Help me market my bakery, I'm in San Francisco and need more corporate catering clients"
Output: {"business_type": "bakery", "location": "San Francisco, CA", "campaign_goal": "Attract more corporate catering clients"}

Input: "I run a coffee place and want more Instagram followers"
Output: {"business_type": "coffee shop", "location": null, "campaign_goal": "Increase Instagram following"}"#;

pub(crate) const ANALYZER_SYSTEM: &str = "You are a social-media audience analyst for small food and retail businesses. \
You know Instagram's algorithm, when food content performs, and how local audiences behave. \
You answer with a single JSON object and nothing else.";

pub(crate) const GENERATOR_SYSTEM: &str = "You are an Instagram content strategist for small businesses. \
You write concise, scroll-stopping captions that convert, stay within platform norms, \
and match the requested tone. You answer with a single JSON object and nothing else.";

pub(crate) const OPTIMIZER_SYSTEM: &str = "You are an Instagram discoverability specialist. You optimize captions and hashtags \
for search visibility without making them feel keyword-stuffed. \
You answer with a single JSON object and nothing else.";

pub(crate) fn analyzer_prompt(intent: &ParsedIntent) -> String {
    let location_info = intent
        .location
        .as_deref()
        .map_or_else(|| "with general regional appeal".to_string(), |l| format!("located in {l}"));

    format!(
        r#"Analyze the target audience and engagement strategy for a {business_type} {location_info}.

Campaign goal: {goal}

Provide:
1. target_audience: the primary demographic (age range, interests, lifestyle)
2. engagement_times: exactly 3 to 5 optimal posting times, each in HH:MM form
3. content_tone: the recommended tone and style
4. post_frequency: posts per week (an integer, at least 1) for engagement without oversaturation
5. platform_insights: an object mapping "stories", "reels" and "carousels" to one line of guidance each

Return a JSON object matching this schema exactly:
{{
  "target_audience": "string",
  "engagement_times": ["HH:MM", "HH:MM", "HH:MM"],
  "content_tone": "string",
  "post_frequency": 5,
  "platform_insights": {{"stories": "string", "reels": "string", "carousels": "string"}}
}}"#,
        business_type = intent.business_type,
        goal = intent.campaign_goal,
    )
}

pub(crate) fn generator_prompt(
    intent: &ParsedIntent,
    audience: &AudienceProfile,
    insight: &CompetitorInsight,
) -> String {
    let mut prompt = format!(
        r#"Generate a single Instagram-ready post.

Business type: {business_type}
Campaign goal: {goal}
Target audience: {audience}
Recommended tone: {tone}
Engagement times: {times}
"#,
        business_type = intent.business_type,
        goal = intent.campaign_goal,
        audience = audience.target_audience,
        tone = audience.content_tone,
        times = audience.engagement_times.join(", "),
    );

    if !insight.is_empty() {
        let _ = writeln!(prompt, "\nCompetitive context: {}", insight.market_positioning);
        if !insight.opportunities.is_empty() {
            let _ = writeln!(
                prompt,
                "Content opportunities competitors are missing: {}",
                insight.opportunities.join("; ")
            );
        }
    }

    prompt.push_str(
        r##"
Requirements:
- A concise, engaging caption in the recommended tone
- A clear call-to-action aligned with the goal
- The best post type for this content: one of Photo, Reel, Carousel, Story
- Exactly 10 to 15 relevant, non-spammy hashtags, each starting with #
- 2 to 4 media prompts (image or short reel ideas)
- suggested_post_time: pick one of the engagement times above, HH:MM
- No all-caps, at most 1-2 emojis

Return a JSON object matching this schema exactly:
{
  "caption": "string",
  "hashtags": ["#tag1", "#tag2"],
  "post_type": "Photo|Reel|Carousel|Story",
  "call_to_action": "string",
  "suggested_post_time": "HH:MM",
  "media_prompts": ["string", "string"]
}"##,
    );
    prompt
}

pub(crate) fn optimizer_prompt(
    draft: &DraftContent,
    intent: &ParsedIntent,
    insight: &CompetitorInsight,
) -> String {
    let location_info = intent
        .location
        .as_deref()
        .map_or_else(|| "no specific location".to_string(), ToString::to_string);

    let mut prompt = format!(
        r#"Optimize this Instagram content for search visibility and discoverability.

Business type: {business_type}
Location: {location_info}
Campaign goal: {goal}
Post type: {post_type}

Original caption: {caption}
Original hashtags: {hashtags}
"#,
        business_type = intent.business_type,
        goal = intent.campaign_goal,
        post_type = draft.post_type,
        caption = draft.caption,
        hashtags = draft.hashtags.join(", "),
    );

    if !insight.suggested_hashtags.is_empty() {
        let tags: Vec<&str> = insight.suggested_hashtags.iter().map(String::as_str).collect();
        let _ = writeln!(
            prompt,
            "\nHashtags competitors rank for: {}",
            tags.join(", ")
        );
    }

    prompt.push_str(
        r##"
Your task:
1. Rework the caption with natural keyword placement; never keyword-stuff
2. Partition an optimized hashtag set into competition bands:
   - high: 3-5 popular, trending hashtags
   - medium: 5-7 niche-but-active hashtags
   - low: 3-5 specific, low-competition hashtags
3. keyword_suggestions: 5-8 primary keywords to emphasize
4. alt_text_suggestion: descriptive alt text for the media
5. location_tags: location-based tags when a location is given, else []
6. seo_score: an integer 0-100 judging keyword use, hashtag strategy and discoverability
7. improvements: the list of changes you made

Return a JSON object matching this schema exactly:
{
  "optimized_caption": "string",
  "optimized_hashtags": {"high": ["#a"], "medium": ["#b"], "low": ["#c"]},
  "keyword_suggestions": ["string"],
  "seo_score": 85,
  "improvements": ["string"],
  "alt_text_suggestion": "string",
  "location_tags": ["#string"]
}"##,
    );
    prompt
}
