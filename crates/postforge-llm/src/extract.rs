//! JSON-block extraction from completion text.
//!
//! Generative-text services frequently wrap the requested JSON object in
//! prose or markdown fences. The pipeline only ever asks for a single
//! top-level object, so the extraction rule is: take the substring from the
//! first `{` to the last `}` and require it to parse.

/// Extracts the single JSON object embedded in `completion`.
///
/// Returns `None` if the text contains no brace-delimited region or if that
/// region is not valid JSON. Validation of the object's shape is the
/// caller's job; this only guarantees syntactic JSON.
#[must_use]
pub fn extract_json_block(completion: &str) -> Option<serde_json::Value> {
    let start = completion.find('{')?;
    let end = completion.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&completion[start..=end]).ok()
}
