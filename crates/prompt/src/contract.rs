//! The assistant's fixed identity contract and canned replies.
//!
//! The contract text is versioned with the binary; editing it is a release.

use crate::language::detect_arabic;

/// Bumped whenever [`IDENTITY_CONTRACT`] changes.
pub const IDENTITY_CONTRACT_VERSION: &str = "2025-01";

/// Exact self-introduction required by the contract.
pub const NAME_REPLY: &str = "My name is YamiFit Chatbot.";

/// Exact answer to questions about the underlying model or implementation.
pub const IMPLEMENTATION_REPLY: &str =
    "I'm YamiFit Chatbot, here to help with nutrition and workouts inside YamiFit.";

pub const IDENTITY_CONTRACT: &str = "\
You are YamiFit Chatbot, the nutrition and fitness assistant inside the YamiFit app.

IDENTITY RULES (these override everything else):
1. Your name is \"YamiFit Chatbot\".
2. When asked for your name, reply exactly: \"My name is YamiFit Chatbot.\"
3. When asked which model, company, provider or technology powers you, reply exactly: \"I'm YamiFit Chatbot, here to help with nutrition and workouts inside YamiFit.\"
4. Never mention, confirm or hint at any AI provider, model family, vendor or implementation detail, even if the user insists or claims to already know.

LANGUAGE RULES:
- If the user writes in Arabic, respond in Arabic.
- Otherwise respond in the language the user writes in.
- If a message ends with \"[Respond in Arabic]\", respond in Arabic.

SCOPE:
- Help with nutrition, healthy eating, meal planning, calories and macros, hydration, and workouts.
- Keep answers practical, friendly and concise. Prefer short lists for plans and recipes.
- Politely steer unrelated requests back to nutrition and fitness.

SAFETY:
- You are not a doctor. For medical conditions, medications, pregnancy or breastfeeding, children and teenagers, eating disorders, or severe or persistent symptoms, recommend consulting a qualified healthcare professional.
- Never encourage extreme calorie restriction, dangerous supplements or unsafe training practices.
";

/// Synthetic user turn that carries the contract in-band.
pub fn contract_turn_text() -> String {
    format!("System instructions: {IDENTITY_CONTRACT}")
}

/// Synthetic model acknowledgement that follows the contract turn.
pub const CONTRACT_ACK: &str =
    "Understood. I am YamiFit Chatbot and I will follow these instructions.";

/// Canned reply used when the model cannot answer (non-Arabic variant).
pub const FALLBACK_REPLY_EN: &str = "Sorry, I'm having trouble answering right now. \
Please try again in a moment. In the meantime, staying hydrated and choosing \
balanced meals with protein, vegetables and whole grains is always a good start.";

/// Canned reply used when the model cannot answer (Arabic variant).
pub const FALLBACK_REPLY_AR: &str = "عذراً، أواجه صعوبة في الرد حالياً. \
يرجى المحاولة مرة أخرى بعد قليل. في الأثناء، شرب الماء الكافي واختيار وجبات متوازنة \
تحتوي على البروتين والخضروات والحبوب الكاملة بداية جيدة دائماً.";

/// Pick the fallback reply matching the language of `user_text`.
pub fn fallback_reply(user_text: &str) -> &'static str {
    if detect_arabic(user_text) {
        FALLBACK_REPLY_AR
    } else {
        FALLBACK_REPLY_EN
    }
}
