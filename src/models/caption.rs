use serde::{Deserialize, Serialize};

use super::ImagePayload;

pub const MAX_CAPTIONS: usize = 5;
pub const DEFAULT_PROMPT: &str = "Generate 5 funny meme captions.";

#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub payload: ImagePayload,
    pub prompt: String,
    pub reasoning_mode: bool,
}

impl CaptionRequest {
    pub fn new(payload: ImagePayload, prompt: impl Into<String>, reasoning_mode: bool) -> Self {
        Self {
            payload,
            prompt: prompt.into(),
            reasoning_mode,
        }
    }

    /// The user's prompt, or the stock prompt when it is blank.
    pub fn effective_prompt(&self) -> &str {
        let trimmed = self.prompt.trim();
        if trimmed.is_empty() {
            DEFAULT_PROMPT
        } else {
            trimmed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptionResult {
    pub top: String,
    pub bottom: String,
}

impl CaptionResult {
    /// Returns `None` unless both lines still have content after trimming.
    pub fn new(top: &str, bottom: &str) -> Option<Self> {
        let (top, bottom) = (top.trim(), bottom.trim());
        if top.is_empty() || bottom.is_empty() {
            return None;
        }
        Some(Self {
            top: top.to_string(),
            bottom: bottom.to_string(),
        })
    }
}

/// Up to five captions in the order the model emitted them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CaptionSet(Vec<CaptionResult>);

impl CaptionSet {
    pub fn new(mut captions: Vec<CaptionResult>) -> Self {
        captions.truncate(MAX_CAPTIONS);
        Self(captions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CaptionResult> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaptionResult> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<CaptionResult> {
        self.0
    }
}

impl<'a> IntoIterator for &'a CaptionSet {
    type Item = &'a CaptionResult;
    type IntoIter = std::slice::Iter<'a, CaptionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
