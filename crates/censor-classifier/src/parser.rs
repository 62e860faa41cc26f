//! Model response parsing and taxonomy validation.
//!
//! Model output is untrusted free text. This is the only place a rating is
//! read from it, and it never fails: unusable output degrades to 12+.

use serde_json::Value;
use tracing::warn;

use crate::audit::Outcome;
use crate::rating::{ClassificationResult, Rating};

/// Rating used when the model answered but not usefully.
pub const DEFAULT_RATING: Rating = Rating::Twelve;
pub const UNPARSEABLE_REASON: &str = "Unable to parse classification response";

/// Parse a raw model response into a valid result.
pub fn parse_response(raw: &str) -> ClassificationResult {
    parse_with_outcome(raw).0
}

/// Like [`parse_response`], also reporting whether the result was taken as-is,
/// had its rating corrected, or was replaced by the default.
pub fn parse_with_outcome(raw: &str) -> (ClassificationResult, Outcome) {
    match try_parse(raw) {
        Ok(parsed) => parsed,
        Err(problem) => {
            warn!(problem, raw_response = raw, "Failed to parse classification response");
            (
                ClassificationResult::new(DEFAULT_RATING, UNPARSEABLE_REASON),
                Outcome::Defaulted,
            )
        }
    }
}

fn try_parse(raw: &str) -> Result<(ClassificationResult, Outcome), &'static str> {
    let json_str = extract_json_object(raw).ok_or("no JSON found in response")?;
    let value: Value = serde_json::from_str(json_str).map_err(|_| "invalid JSON")?;
    let obj = value.as_object().ok_or("response JSON is not an object")?;

    let rating = obj.get("rating").ok_or("missing rating field")?;
    let reason = obj.get("reason").ok_or("missing reason field")?;
    // Non-string reasons keep their JSON text.
    let reason = reason
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| reason.to_string());

    match rating.as_str().and_then(Rating::parse) {
        Some(rating) => Ok((ClassificationResult::new(rating, reason), Outcome::Parsed)),
        None => {
            warn!(invalid_rating = %rating, "Invalid rating, defaulting to {}", DEFAULT_RATING);
            Ok((ClassificationResult::new(DEFAULT_RATING, reason), Outcome::Corrected))
        }
    }
}

/// The slice from the first `{` to the last `}`, inclusive.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
