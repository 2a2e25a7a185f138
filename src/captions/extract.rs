//! Pulls `{top, bottom}` caption pairs out of free-form model text.

use serde_json::Value;

use crate::models::{CaptionResult, MAX_CAPTIONS};

const FENCE: &str = "```";

/// Extracts up to five captions from raw model output.
///
/// Never fails: output with no bracketed array, unparsable JSON, or a value
/// that is not an array all yield an empty vector. Elements that are not
/// objects with non-blank string `top` and `bottom` fields are dropped.
pub fn extract_captions(raw: &str) -> Vec<CaptionResult> {
    let cleaned = strip_fences(raw);

    let Some(candidate) = bracketed_slice(&cleaned) else {
        return Vec::new();
    };

    let items = match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Vec::new(),
        Err(e) => {
            log::debug!("Caption array did not parse: {}", e);
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| {
            let top = item.get("top")?.as_str()?;
            let bottom = item.get("bottom")?.as_str()?;
            CaptionResult::new(top, bottom)
        })
        .take(MAX_CAPTIONS)
        .collect()
}

/// Removes ``` markers together with any language tag that follows them.
fn strip_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

fn bracketed_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
