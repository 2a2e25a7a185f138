use crate::models::{CaptionRequest, ChatMessage, ChatRequest, ModelCandidate};

pub const SYSTEM_INSTRUCTION: &str = "You are a meme caption generator. Return ONLY a JSON array of objects, each with exactly two string keys, \"top\" and \"bottom\". Example: [{\"top\": \"text\", \"bottom\": \"text\"}]. Do not include any other text.";

const FORMAT_INSTRUCTION: &str = "For each caption, suggest text for the top and bottom of the image.\n\n\
**IMPORTANT:** Output ONLY a JSON array of objects.\n\
Example format: [\n  {\"top\": \"Top text idea 1\", \"bottom\": \"Bottom text idea 1\"},\n  {\"top\": \"Top text idea 2\", \"bottom\": \"Bottom text idea 2\"}\n]";

const REASONING_INSTRUCTION: &str = "Before answering, analyze the image carefully and reason step by step about what is happening and what would make it funny. Then give only the final JSON array.";

pub fn user_instruction(request: &CaptionRequest, candidate: &ModelCandidate) -> String {
    let mut text = format!("{}\n{}", request.effective_prompt(), FORMAT_INSTRUCTION);
    if candidate.is_reasoning() {
        text.push_str("\n\n");
        text.push_str(REASONING_INSTRUCTION);
    }
    text
}

/// Builds the provider request for one candidate.
pub fn build_chat_request(request: &CaptionRequest, candidate: &ModelCandidate) -> ChatRequest {
    ChatRequest {
        model: candidate.id.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user_with_image(
                user_instruction(request, candidate),
                request.payload.to_data_uri(),
            ),
        ],
    }
}
