//! Plain-text rendering of a [`FinalArtifact`] for conversational surfaces.

use std::fmt::Write;

use crate::types::FinalArtifact;

/// Renders the artifact as the message a user sees at the end of a run.
///
/// Empty optional sections (media prompts, keywords, location tags) are
/// omitted rather than rendered as empty headers.
#[must_use]
pub fn render_artifact(artifact: &FinalArtifact) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail, so the results are ignored.
    let _ = writeln!(out, "Here's your optimized Instagram post:");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", artifact.optimized.optimized_caption);
    let _ = writeln!(out);

    let bands = &artifact.optimized.optimized_hashtags;
    if bands.total() > 0 {
        let _ = writeln!(out, "Hashtags:");
        for (label, tags) in [
            ("broad reach", &bands.high),
            ("targeted", &bands.medium),
            ("niche", &bands.low),
        ] {
            if !tags.is_empty() {
                let _ = writeln!(out, "  {label}: {}", tags.join(" "));
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Post type: {}", artifact.draft.post_type);
    let _ = writeln!(out, "Best time to post: {}", artifact.draft.suggested_post_time);
    let _ = writeln!(out, "Call to action: {}", artifact.draft.call_to_action);

    if !artifact.draft.media_prompts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Media ideas:");
        for prompt in &artifact.draft.media_prompts {
            let _ = writeln!(out, "  - {prompt}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "SEO score: {}/100", artifact.optimized.seo_score);
    if !artifact.optimized.keyword_suggestions.is_empty() {
        let _ = writeln!(
            out,
            "Keywords to work in: {}",
            artifact.optimized.keyword_suggestions.join(", ")
        );
    }
    if !artifact.optimized.location_tags.is_empty() {
        let _ = writeln!(
            out,
            "Location tags: {}",
            artifact.optimized.location_tags.join(" ")
        );
    }
    if !artifact.optimized.alt_text_suggestion.is_empty() {
        let _ = writeln!(out, "Alt text: {}", artifact.optimized.alt_text_suggestion);
    }

    if artifact.degraded {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Note: competitor research was unavailable for this run, so the post \
             was generated without local competitor insights."
        );
    }

    out
}
