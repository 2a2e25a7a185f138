//! Wire types for the OpenRouter chat-completions API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Plain text of the message. Non-text parts are skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

/// Lenient view of a completion response: every level may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<AssistantMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<AssistantContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssistantContent {
    Text(String),
    Parts(Vec<serde_json::Value>),
}

impl ChatResponse {
    /// Assistant text of the first choice; empty when the provider sent none.
    pub fn first_text(&self) -> String {
        let content = self
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_ref());

        match content {
            Some(AssistantContent::Text(text)) => text.clone(),
            Some(AssistantContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join(""),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_message_serializes_as_mixed_parts() {
        let message = ChatMessage::user_with_image("caption this", "data:image/jpeg;base64,AA==");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "caption this" },
                    { "type": "image_url", "image_url": { "url": "data:image/jpeg;base64,AA==" } }
                ]
            })
        );
    }

    #[test]
    fn response_text_tolerates_shapes() {
        let plain: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": "[]" } }] }))
                .unwrap();
        assert_eq!(plain.first_text(), "[]");

        let parts: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "[{\"top\":" },
                { "type": "text", "text": "\"a\",\"bottom\":\"b\"}]" }
            ] } }]
        }))
        .unwrap();
        assert_eq!(parts.first_text(), "[{\"top\":\"a\",\"bottom\":\"b\"}]");

        let empty: ChatResponse = serde_json::from_value(json!({ "id": "gen-1" })).unwrap();
        assert_eq!(empty.first_text(), "");

        let null_content: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] }))
                .unwrap();
        assert_eq!(null_content.first_text(), "");
    }
}
