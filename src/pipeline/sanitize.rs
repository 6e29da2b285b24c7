//! Turns the raw, loosely structured text returned by the analysis
//! service into a well-formed [`AnalysisResult`]. The only failure this
//! module surfaces is [`MalformedResponse`]; every field-level problem is
//! recovered into a typed default instead, so a partially broken answer
//! still produces a usable result.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::MalformedResponse;
use crate::models::{AnalysisResult, FieldComparison};

// Placeholder sentences substituted for fields the service omitted.
const LAYOUT_UNAVAILABLE: &str = "Layout analysis unavailable";
const SECURITY_UNAVAILABLE: &str = "Security feature analysis unavailable";
const STAMP_UNAVAILABLE: &str = "Stamp and signature analysis unavailable";
const METADATA_UNAVAILABLE: &str = "Metadata analysis unavailable";
const ASSESSMENT_UNAVAILABLE: &str = "Overall assessment unavailable";
const COMMENT_MISSING: &str = "No comment provided";
const FIELD_PARSE_ERROR: &str = "Field analysis failed";

// Keys may be unquoted and non-ASCII; values may use single quotes.
static UNQUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,])\s*([\p{L}_][\p{L}\p{N}_]*)\s*:").unwrap());
static SINGLE_QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*'([^']*)'").unwrap());
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());
static LITERAL_UNDEFINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*undefined").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Sanitize the full analysis response: repair the embedded JSON, then
/// coerce every field into its declared type.
pub fn sanitize_response(raw: &str) -> Result<AnalysisResult, MalformedResponse> {
    let cleaned = clean_json_response(raw)?;
    let parsed: Value =
        serde_json::from_str(&cleaned).map_err(|e| MalformedResponse(e.to_string()))?;
    Ok(sanitize_analysis(&parsed))
}

/// Extract and repair the JSON object embedded in the response text.
///
/// Strips code fences, keeps only the first `{` .. last `}` span, and
/// applies conservative fixes for the malformations the service commonly
/// produces (unquoted keys, single-quoted values, trailing commas, the
/// literal `undefined`). Fails if no brace pair exists or the repaired
/// text still does not parse.
pub fn clean_json_response(raw: &str) -> Result<String, MalformedResponse> {
    let text = raw.replace("```json", "").replace("```", "");

    let start = text
        .find('{')
        .ok_or_else(|| MalformedResponse("no JSON object found in response".into()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| MalformedResponse("no JSON object found in response".into()))?;

    let mut json = text[start..=end]
        .replace(['\n', '\r', '\t'], " ");
    json = WHITESPACE_RUN.replace_all(&json, " ").into_owned();
    json = UNQUOTED_KEY.replace_all(&json, "$1\"$2\":").into_owned();
    json = SINGLE_QUOTED_VALUE.replace_all(&json, ":\"$1\"").into_owned();
    json = TRAILING_COMMA.replace_all(&json, "$1").into_owned();
    json = LITERAL_UNDEFINED.replace_all(&json, ":null").into_owned();

    serde_json::from_str::<Value>(&json)
        .map_err(|e| MalformedResponse(format!("JSON still invalid after repair: {e}")))?;
    Ok(json)
}

/// Coerce a parsed response into the strict result shape. Total: every
/// field falls back to a typed default rather than failing.
fn sanitize_analysis(parsed: &Value) -> AnalysisResult {
    AnalysisResult {
        score: sanitize_score(parsed.get("score")),
        field_comparison: sanitize_field_comparison(parsed.get("fieldComparison")),
        layout_match: sanitize_string(parsed.get("layoutMatch"), LAYOUT_UNAVAILABLE),
        security_features: sanitize_string(parsed.get("securityFeatures"), SECURITY_UNAVAILABLE),
        stamp_signature: sanitize_string(parsed.get("stampSignature"), STAMP_UNAVAILABLE),
        metadata_comparison: sanitize_string(parsed.get("metadataComparison"), METADATA_UNAVAILABLE),
        overall_assessment: sanitize_string(parsed.get("overallAssessment"), ASSESSMENT_UNAVAILABLE),
        missing_fields: sanitize_string_list(parsed.get("missingFields")),
    }
}

/// Numeric score clamped to [0, 100]; numeric strings parse, anything
/// else (including NaN) becomes 0.
pub fn sanitize_score(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if number.is_finite() {
        number.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Coerce any value to a trimmed, non-empty string. Structured values
/// serialize; null, absent, and blank values take the fallback sentence.
pub fn sanitize_string(value: Option<&Value>, fallback: &str) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(structured) => serde_json::to_string(structured).unwrap_or_default(),
    };
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// Booleans pass through; the text "true" (any case) is true; everything
/// else follows truthiness of the raw value.
pub fn sanitize_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

/// An array maps element-wise to strings; a lone string wraps into a
/// one-element list; anything else is empty.
pub fn sanitize_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(coerce_element).collect(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        _ => vec![],
    }
}

fn coerce_element(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        structured => serde_json::to_string(structured).unwrap_or_default(),
    }
}

/// Build the field-comparison map. Entries may arrive structured or as
/// string-encoded JSON needing a secondary parse; a failure in one entry
/// degrades that key only and never aborts the map.
fn sanitize_field_comparison(value: Option<&Value>) -> BTreeMap<String, FieldComparison> {
    let mut sanitized = BTreeMap::new();
    let Some(entries) = value.and_then(Value::as_object) else {
        return sanitized;
    };

    for (key, entry) in entries {
        sanitized.insert(key.clone(), sanitize_field_entry(key, entry));
    }
    sanitized
}

fn sanitize_field_entry(key: &str, entry: &Value) -> FieldComparison {
    let parsed = match entry {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(field = %key, error = %e, "Unparsable field comparison entry");
                return FieldComparison {
                    present: false,
                    matches: false,
                    comment: FIELD_PARSE_ERROR.to_string(),
                };
            }
        },
        other => other.clone(),
    };

    FieldComparison {
        present: sanitize_bool(parsed.get("present")),
        matches: sanitize_bool(parsed.get("matches")),
        comment: sanitize_string(parsed.get("comment"), COMMENT_MISSING),
    }
}
