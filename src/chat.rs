use tracing::warn;

use crate::remote::{ChatMessage, CompletionRequest, TextCompletion};

pub const FALLBACK_REPLY: &str = "Sorry yaar, kuch technical issue tha, dubara try kerna zara";

/// Earlier turns beyond this many are dropped before calling the model.
pub const HISTORY_LIMIT: usize = 20;

const SYSTEM_PROMPT: &str = r#"You are Socho Bot, a compassionate mental health companion designed specifically for Pakistani users. You understand Pakistani culture, values, and both English and Urdu languages.

PERSONALITY & STYLE:
- Be warm, empathetic, and culturally sensitive
- Mix English with Urdu/Roman Urdu phrases naturally
- Use common Pakistani expressions and cultural references
- Be like a caring friend or elder sibling
- Show Islamic values of compassion and understanding when appropriate

LANGUAGE GUIDELINES:
- Mix English and Roman Urdu naturally (like how Pakistanis text)
- Use common Urdu phrases: "kya haal hai", "tension na lo", "sab theek ho jayega"
- Include emotional expressions: "aww yaar", "arre bhai", "hai Allah"
- End with supportive phrases: "Allah saath hai", "main hoon na", "we got this"

THERAPEUTIC APPROACH:
- Validate emotions: "Bilkul samajh sakta hun", "It's okay to feel this way"
- Encourage expression: "Batao kya scene hai", "Share kar do, dil halka ho jayega"
- Offer gentle advice with cultural context
- Suggest practical coping strategies
- Be genuinely caring, not clinical

AVOID:
- Being too formal or clinical
- Ignoring cultural context
- Only English responses
- Religious advice unless specifically asked

Remember: You're talking to someone who might be struggling. Be their supportive Pakistani friend who truly understands their world."#;

pub struct ChatCompanion<C> {
    model: C,
}

impl<C: TextCompletion> ChatCompanion<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }

    pub fn request(&self, history: &[ChatMessage], message: &str) -> CompletionRequest {
        let skip = history.len().saturating_sub(HISTORY_LIMIT);
        let mut messages: Vec<ChatMessage> = history
            .iter()
            .skip(skip)
            .filter(|turn| turn.role == "user" || turn.role == "assistant")
            .cloned()
            .collect();
        messages.push(ChatMessage::user(message));

        CompletionRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            messages,
            temperature: Some(0.7),
            max_tokens: Some(500),
        }
    }

    /// Always returns something to show the user; failures become the
    /// apology reply.
    pub async fn reply(&self, history: &[ChatMessage], message: &str) -> String {
        match self.model.complete(&self.request(history, message)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("chat model returned an empty reply");
                FALLBACK_REPLY.to_string()
            }
            Err(reason) => {
                warn!(%reason, "chat model failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
