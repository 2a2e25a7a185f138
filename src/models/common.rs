use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTag {
    Fast,
    Reasoning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCandidate {
    pub id: String,
    pub capability: CapabilityTag,
}

impl ModelCandidate {
    pub fn fast(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capability: CapabilityTag::Fast,
        }
    }

    pub fn reasoning(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capability: CapabilityTag::Reasoning,
        }
    }

    pub fn is_reasoning(&self) -> bool {
        self.capability == CapabilityTag::Reasoning
    }
}

/// Ranked fallback list, fixed at construction.
///
/// The fast models are ordered from lowest latency to best quality; the
/// reasoning model is only tried, and then first, when reasoning mode is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    reasoning: ModelCandidate,
    fast: Vec<ModelCandidate>,
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self::new(
            ModelCandidate::reasoning("google/gemini-2.0-flash-thinking-exp:free"),
            vec![
                ModelCandidate::fast("google/gemini-2.0-flash-exp:free"),
                ModelCandidate::fast("meta-llama/llama-3.2-11b-vision-instruct:free"),
                ModelCandidate::fast("google/gemini-flash-1.5-8b"),
            ],
        )
    }
}

impl ModelRoster {
    pub fn new(reasoning: ModelCandidate, fast: Vec<ModelCandidate>) -> Self {
        Self { reasoning, fast }
    }

    pub fn reasoning(&self) -> &ModelCandidate {
        &self.reasoning
    }

    pub fn fast(&self) -> &[ModelCandidate] {
        &self.fast
    }

    /// Candidates in the order they must be attempted.
    pub fn candidates(&self, reasoning_mode: bool) -> Vec<&ModelCandidate> {
        let head = reasoning_mode.then_some(&self.reasoning);
        head.into_iter().chain(self.fast.iter()).collect()
    }
}
