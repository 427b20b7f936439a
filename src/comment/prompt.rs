//! Prompt builder for the empathetic-comment request.
//!
//! [`PromptBuilder::build_chat`] produces a `(system_msg, user_msg)` tuple
//! for any OpenAI-compatible `/v1/chat/completions` endpoint.  The user
//! message embeds the diary transcript and the detected emotion label and
//! demands a strict machine-parseable envelope: a single JSON object with
//! one string field, `{"comment": "..."}` — anything else is treated as a
//! generation failure by the caller.

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION: &str = "\
あなたは音声日記アプリの聞き役です。
ユーザーの日記の文字起こしを読み、共感のこもった返事を返してください。

ルール:
1. 返事は1文で簡潔に。説教やアドバイスの押し付けはしない
2. 検出された感情に寄り添う
3. 出力は必ず次のJSON形式のみ: {\"comment\": \"...\"}
4. JSON以外の文字（説明、コードフェンス等）を出力しない";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds comment-generation prompts in chat-message format.
///
/// # Example
/// ```rust
/// use voice_journal::comment::PromptBuilder;
///
/// let builder = PromptBuilder::new();
/// let (system, user) = builder.build_chat("今日は楽しかった", "喜び");
/// assert!(system.contains("JSON"));
/// assert!(user.contains("今日は楽しかった"));
/// assert!(user.contains("喜び"));
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the `(system_msg, user_msg)` pair for one transcript.
    pub fn build_chat(&self, transcript: &str, emotion: &str) -> (String, String) {
        let user = format!(
            "以下はある人の音声日記の文字起こしです。\n\n\
             「{transcript}」\n\n\
             検出された感情: {emotion}\n\n\
             この内容をふまえた共感の一言を、\
             {{\"comment\": \"...\"}} のJSON形式だけで出力してください。"
        );
        (SYSTEM_INSTRUCTION.to_string(), user)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_embeds_transcript_and_emotion() {
        let builder = PromptBuilder::new();
        let (_, user) = builder.build_chat("疲れた一日だった", "悲しみ");
        assert!(user.contains("疲れた一日だった"));
        assert!(user.contains("悲しみ"));
    }

    #[test]
    fn system_message_demands_json_envelope() {
        let builder = PromptBuilder::new();
        let (system, user) = builder.build_chat("t", "普通");
        assert!(system.contains("{\"comment\": \"...\"}"));
        assert!(user.contains("JSON"));
    }

    #[test]
    fn transcript_with_quotes_is_embedded_verbatim() {
        let builder = PromptBuilder::new();
        let (_, user) = builder.build_chat("彼が「もう帰る」と言った", "普通");
        assert!(user.contains("彼が「もう帰る」と言った"));
    }
}
