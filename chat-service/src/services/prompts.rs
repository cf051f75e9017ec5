//! Prompt sent to Gemini.

/// Persona and contact instruction; `{message}` is replaced with the user's
/// trimmed question.
pub const CHAT_PROMPT: &str = "Bạn là trợ lý tư vấn y tế thân thiện, trả lời ngắn gọn, lịch sự và rõ ràng. Nếu cần hướng người dùng tới liên hệ, đề xuất gọi hotline 0868686868. Câu hỏi của người dùng là: \"{message}\"";

pub fn render_chat_prompt(message: &str) -> String {
    CHAT_PROMPT.replace("{message}", message)
}
