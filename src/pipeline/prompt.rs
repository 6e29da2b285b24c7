use crate::models::{ComparisonMetadata, TemplateMetadata};

pub const COMPARISON_SYSTEM_PROMPT: &str = r#"
You are a bank check verification assistant. You compare a candidate check
against a known-good sample from the same bank and report how closely they
match.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Judge ONLY what is visible in the two documents and their metadata.
2. Score 0-100, where 100 means the candidate is indistinguishable from
   the sample's format.
3. If a field cannot be assessed, say so in its comment instead of guessing.
4. Output MUST be a single valid JSON object with no surrounding text.
"#;

/// How much of each base64 payload is embedded in the prompt as a
/// fingerprint of the document.
const PAYLOAD_PREVIEW_CHARS: usize = 100;

/// Build the comparison request for one template/candidate pair.
pub fn build_comparison_prompt(
    template_pdf: &str,
    candidate_pdf: &str,
    bank: &TemplateMetadata,
    metadata: &ComparisonMetadata,
) -> String {
    let bank_json = serde_json::to_string(bank).unwrap_or_default();
    let template_meta = serde_json::to_string(&metadata.template).unwrap_or_default();
    let verified_meta = serde_json::to_string(&metadata.verified).unwrap_or_default();

    format!(
        r#"Perform a detailed comparison of two bank checks and return JSON.

Bank metadata of the sample check:
{bank_json}

Derived document metadata:
Sample: {template_meta}
Candidate: {verified_meta}

Sample check (base64): {}...
Candidate check (base64): {}...

JSON response structure:
{{
  "score": number from 0 to 100,
  "fieldComparison": {{
    "field_name": {{
      "present": true/false,
      "matches": true/false,
      "comment": "text"
    }}
  }},
  "missingFields": ["field1", "field2"],
  "stampSignature": "analysis text",
  "metadataComparison": "analysis text",
  "layoutMatch": "analysis text",
  "securityFeatures": "analysis text",
  "overallAssessment": "analysis text"
}}

IMPORTANT: return ONLY the JSON object, no additional text."#,
        preview(template_pdf),
        preview(candidate_pdf),
    )
}

fn preview(payload: &str) -> &str {
    let end = payload
        .char_indices()
        .nth(PAYLOAD_PREVIEW_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(payload.len());
    &payload[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;
    use chrono::Utc;

    fn bank() -> TemplateMetadata {
        TemplateMetadata {
            bank_name: "Alpha Bank".into(),
            check_format: "standard".into(),
            date_added: Utc::now(),
        }
    }

    fn metadata() -> ComparisonMetadata {
        ComparisonMetadata {
            template: DocumentMetadata::unknown(),
            verified: DocumentMetadata::unknown(),
        }
    }

    #[test]
    fn prompt_contains_bank_and_schema() {
        let prompt = build_comparison_prompt("AAAA", "BBBB", &bank(), &metadata());
        assert!(prompt.contains("Alpha Bank"));
        assert!(prompt.contains("\"fieldComparison\""));
        assert!(prompt.contains("\"overallAssessment\""));
    }

    #[test]
    fn payloads_are_truncated_to_preview() {
        let long = "A".repeat(5000);
        let prompt = build_comparison_prompt(&long, &long, &bank(), &metadata());
        assert!(!prompt.contains(&"A".repeat(PAYLOAD_PREVIEW_CHARS + 1)));
        assert!(prompt.contains(&"A".repeat(PAYLOAD_PREVIEW_CHARS)));
    }

    #[test]
    fn short_payload_is_kept_whole() {
        let prompt = build_comparison_prompt("short", "also short", &bank(), &metadata());
        assert!(prompt.contains("short..."));
    }
}
