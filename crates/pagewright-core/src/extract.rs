//! Response extractor: normalize heterogeneous provider envelopes into a
//! `FileSet`.
//!
//! Extraction is a fixed sequence of tagged strategies, each of which either
//! recognizes the parsed value and returns a mapping or reports no match.
//! Any parse failure at any stage yields an empty mapping — callers treat
//! that as "generation failed" and move down the fallback chain.

use crate::fileset::FileSet;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Parse a raw provider response body into a filename→content mapping.
/// Returns an empty set when the body is empty, unparseable, or matches no
/// known envelope shape.
pub fn extract_file_map(raw: &str) -> FileSet {
    if raw.trim().is_empty() {
        debug!("provider returned an empty response body");
        return FileSet::new();
    }
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "provider response is not valid JSON");
            return FileSet::new();
        }
    };

    for shape in [Shape::ResponseBlocks, Shape::CandidateParts, Shape::DirectMapping] {
        if let Some(files) = shape.extract(&value) {
            if !files.is_empty() {
                debug!(?shape, count = files.len(), "extracted file mapping");
                return files;
            }
        }
    }
    FileSet::new()
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Envelope shapes tried in order. Specific shapes come before the direct
/// mapping so an envelope is never misread as a set of files.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// `{"output": [{"content": [{"text": "..."}]}]}` — chat/responses envelope.
    ResponseBlocks,
    /// `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`.
    CandidateParts,
    /// A bare JSON object of filename→content.
    DirectMapping,
}

impl Shape {
    fn extract(self, value: &Value) -> Option<FileSet> {
        match self {
            Shape::ResponseBlocks => response_blocks(value),
            Shape::CandidateParts => candidate_parts(value),
            Shape::DirectMapping => direct_mapping(value),
        }
    }
}

fn response_blocks(value: &Value) -> Option<FileSet> {
    let output = value.get("output")?.as_array()?;
    for item in output {
        let Some(blocks) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for block in blocks {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                if let Some(files) = mapping_from_text(text) {
                    return Some(files);
                }
            }
        }
    }
    None
}

fn candidate_parts(value: &Value) -> Option<FileSet> {
    let candidates = value.get("candidates")?.as_array()?;
    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
        else {
            continue;
        };
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                if let Some(files) = mapping_from_text(text) {
                    return Some(files);
                }
            }
        }
    }
    None
}

fn direct_mapping(value: &Value) -> Option<FileSet> {
    let object = value.as_object()?;
    // An envelope that reached this point had no extractable payload; refusing
    // it here keeps envelope keys from turning into files.
    if object.contains_key("output") || object.contains_key("candidates") {
        return None;
    }
    if object.is_empty() {
        return None;
    }
    Some(
        object
            .iter()
            .map(|(name, content)| (name.clone(), canonical_text(content)))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Interpret a textual payload as a file mapping: unwrap a fenced ```json
/// block if present, then parse the interior as a JSON object.
fn mapping_from_text(text: &str) -> Option<FileSet> {
    let inner = unwrap_fence(text).unwrap_or_else(|| text.trim().to_string());
    let value: Value = serde_json::from_str(&inner).ok()?;
    let object = value.as_object()?;
    if object.is_empty() {
        return None;
    }
    Some(
        object
            .iter()
            .map(|(name, content)| (name.clone(), canonical_text(content)))
            .collect(),
    )
}

/// Pull the interior of a triple-backtick fence labeled as JSON (label optional).
fn unwrap_fence(text: &str) -> Option<String> {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").ok()?;
    fence
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Every value handed downstream must be text; non-string values are
/// serialized canonically rather than dropped.
fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> FileSet {
        let mut files = FileSet::new();
        files.insert("index.html", "<h1>Hi</h1>");
        files.insert("style.css", "body { margin: 0; }");
        files
    }

    #[test]
    fn empty_body_yields_empty_mapping() {
        assert!(extract_file_map("").is_empty());
        assert!(extract_file_map("   \n ").is_empty());
    }

    #[test]
    fn non_json_body_yields_empty_mapping() {
        assert!(extract_file_map("I could not help with that.").is_empty());
    }

    #[test]
    fn direct_object_round_trip() {
        let raw = serde_json::to_string(&sample_files()).unwrap();
        assert_eq!(extract_file_map(&raw), sample_files());
    }

    #[test]
    fn fenced_block_round_trip() {
        let inner = serde_json::to_string(&sample_files()).unwrap();
        let envelope = serde_json::json!({
            "output": [{"content": [{"type": "output_text", "text": format!("```json\n{inner}\n```")}]}]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(extract_file_map(&raw), sample_files());
    }

    #[test]
    fn nested_content_block_round_trip() {
        let inner = serde_json::to_string(&sample_files()).unwrap();
        let envelope = serde_json::json!({
            "output": [{"content": [{"type": "output_text", "text": inner}]}]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(extract_file_map(&raw), sample_files());
    }

    #[test]
    fn candidate_parts_round_trip() {
        let inner = serde_json::to_string(&sample_files()).unwrap();
        let envelope = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": format!("```json\n{inner}\n```")}]}}]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(extract_file_map(&raw), sample_files());
    }

    #[test]
    fn envelope_with_prose_payload_yields_empty_mapping() {
        let envelope = serde_json::json!({
            "output": [{"content": [{"text": "Sure! Here is a description of the site."}]}]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert!(extract_file_map(&raw).is_empty());
    }

    #[test]
    fn envelope_keys_never_become_files() {
        let envelope = serde_json::json!({"output": [], "model": "m1"});
        let raw = serde_json::to_string(&envelope).unwrap();
        assert!(extract_file_map(&raw).is_empty());
    }

    #[test]
    fn non_string_values_serialized_not_dropped() {
        let raw = r#"{"index.html": "<h1>Hi</h1>", "data.json": {"items": [1, 2]}}"#;
        let files = extract_file_map(raw);
        assert_eq!(files.len(), 2);
        let data: serde_json::Value = serde_json::from_str(files.get("data.json").unwrap()).unwrap();
        assert_eq!(data["items"][1], 2);
    }

    #[test]
    fn malformed_inner_fence_yields_empty_mapping() {
        let envelope = serde_json::json!({
            "output": [{"content": [{"text": "```json\n{not valid json}\n```"}]}]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert!(extract_file_map(&raw).is_empty());
    }

    #[test]
    fn skips_blocks_without_text_fields() {
        let inner = serde_json::to_string(&sample_files()).unwrap();
        let envelope = serde_json::json!({
            "output": [
                {"content": [{"type": "tool_use"}]},
                {"content": [{"text": inner}]}
            ]
        });
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(extract_file_map(&raw), sample_files());
    }
}
