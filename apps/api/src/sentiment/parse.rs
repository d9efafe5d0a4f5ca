//! Tolerant parsing of model output into a `{label, score}` payload.
//!
//! LLMs do not reliably emit exact JSON or exact enum strings, so extraction
//! runs an ordered list of increasingly permissive strategies and label
//! matching is substring-based rather than strict.

use serde_json::Value;

use crate::sentiment::SentimentLabel;

/// Maximum length of the diagnostic excerpt kept from unparseable output.
const EXCERPT_MAX_CHARS: usize = 120;

/// Attempts to extract a JSON value from raw model output.
///
/// Strategies, in order (first success wins):
/// 1. direct parse of the trimmed text;
/// 2. parse after stripping ```` ```json ```` / ```` ``` ```` fences;
/// 3. parse the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    let candidates: [fn(&str) -> Option<Value>; 3] =
        [parse_direct, parse_unfenced, parse_brace_span];

    candidates.iter().find_map(|strategy| strategy(trimmed))
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_unfenced(text: &str) -> Option<Value> {
    serde_json::from_str(strip_json_fences(text)).ok()
}

fn parse_brace_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Strips ```` ```json ... ``` ```` or ```` ``` ... ``` ```` code fences from
/// model output. The `json` tag is matched case-insensitively.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };

    // Drop an optional "json" language tag in any casing.
    let stripped = match stripped.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &stripped[4..],
        _ => stripped,
    };

    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or(stripped)
}

/// Converts a raw model label into a `SentimentLabel`. Defaults to neutral.
///
/// Matching is case-insensitive and substring-based ("very positive!" still
/// maps to positive) — strict enum matching would reject output the provider
/// is observed to emit.
pub fn normalize_label(raw: Option<&Value>) -> SentimentLabel {
    let s = match raw {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(other) => other.to_string().to_lowercase(),
        None => return SentimentLabel::Neutral,
    };

    if s.contains("pos") {
        SentimentLabel::Positive
    } else if s.contains("neu") {
        SentimentLabel::Neutral
    } else if s.contains("neg") {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Coerces a raw score value to a number and clamps it to [0, 1].
///
/// Missing, non-numeric, or NaN scores fall back to 0.5 before clamping.
pub fn clamp_score(raw: Option<&Value>) -> f64 {
    let n = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match n {
        Some(n) if n.is_finite() => n.clamp(0.0, 1.0),
        _ => 0.5,
    }
}

/// Truncates unparseable model output for error diagnostics.
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_direct_json() {
        let v = extract_json("{\"label\":\"positive\",\"score\":0.9}").unwrap();
        assert_eq!(v["label"], "positive");
    }

    #[test]
    fn test_extract_fenced_json() {
        let v = extract_json("```json\n{\"label\":\"NEUTRAL\",\"score\":0.62}\n```").unwrap();
        assert_eq!(v["label"], "NEUTRAL");
        assert_eq!(v["score"], json!(0.62));
    }

    #[test]
    fn test_extract_fenced_json_uppercase_tag() {
        let v = extract_json("```JSON\n{\"label\":\"negative\"}\n```").unwrap();
        assert_eq!(v["label"], "negative");
    }

    #[test]
    fn test_extract_fenced_without_tag() {
        let v = extract_json("```\n{\"label\":\"positive\"}\n```").unwrap();
        assert_eq!(v["label"], "positive");
    }

    #[test]
    fn test_extract_embedded_json() {
        let v = extract_json("Sure! Here is the result: {\"label\": \"negative\", \"score\": 0.8} hope that helps").unwrap();
        assert_eq!(v["label"], "negative");
    }

    #[test]
    fn test_extract_nothing_json_like() {
        assert!(extract_json("I cannot classify this").is_none());
        assert!(extract_json("").is_none());
        assert!(extract_json("   ").is_none());
    }

    #[test]
    fn test_normalize_label_exact_and_cased() {
        assert_eq!(
            normalize_label(Some(&json!("positive"))),
            SentimentLabel::Positive
        );
        assert_eq!(
            normalize_label(Some(&json!("NEGATIVE"))),
            SentimentLabel::Negative
        );
        assert_eq!(
            normalize_label(Some(&json!("Neutral"))),
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn test_normalize_label_substring() {
        assert_eq!(
            normalize_label(Some(&json!("very positive!"))),
            SentimentLabel::Positive
        );
        assert_eq!(
            normalize_label(Some(&json!("somewhat neg"))),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_normalize_label_unknown_defaults_to_neutral() {
        assert_eq!(
            normalize_label(Some(&json!("elated"))),
            SentimentLabel::Neutral
        );
        assert_eq!(normalize_label(Some(&json!(42))), SentimentLabel::Neutral);
        assert_eq!(normalize_label(None), SentimentLabel::Neutral);
    }

    #[test]
    fn test_clamp_score_in_range() {
        assert_eq!(clamp_score(Some(&json!(0.62))), 0.62);
        assert_eq!(clamp_score(Some(&json!(0))), 0.0);
        assert_eq!(clamp_score(Some(&json!(1))), 1.0);
    }

    #[test]
    fn test_clamp_score_out_of_range() {
        assert_eq!(clamp_score(Some(&json!(1.5))), 1.0);
        assert_eq!(clamp_score(Some(&json!(-0.2))), 0.0);
    }

    #[test]
    fn test_clamp_score_coerces_strings() {
        assert_eq!(clamp_score(Some(&json!("0.7"))), 0.7);
        assert_eq!(clamp_score(Some(&json!("garbage"))), 0.5);
    }

    #[test]
    fn test_clamp_score_missing_defaults() {
        assert_eq!(clamp_score(None), 0.5);
        assert_eq!(clamp_score(Some(&json!(null))), 0.5);
    }

    #[test]
    fn test_excerpt_truncates_long_output() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), 120);
        assert_eq!(excerpt("short"), "short");
    }
}
