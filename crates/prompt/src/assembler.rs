use serde::Serialize;

use yf_domain::message::{Role, SessionView};

use crate::contract::{contract_turn_text, CONTRACT_ACK};
use crate::language::detect_arabic;

/// Suffix appended to the pending user text to pin the reply language.
pub const ARABIC_HINT: &str = " [Respond in Arabic]";

/// Role vocabulary of the model API: there is no system channel, and the
/// assistant side is called `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl From<Role> for TurnRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => TurnRole::User,
            Role::Assistant => TurnRole::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Everything the model sees for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Contract preamble followed by replayed history.
    pub history: Vec<ChatTurn>,
    /// The current user text, with the language hint when one applies.
    pub pending: String,
}

impl AssembledPrompt {
    /// All turns in send order, ending with the pending user turn.
    pub fn turns(&self) -> Vec<ChatTurn> {
        let mut turns = self.history.clone();
        turns.push(ChatTurn::user(self.pending.clone()));
        turns
    }

    pub fn has_arabic_hint(&self) -> bool {
        self.pending.ends_with(ARABIC_HINT)
    }
}

/// Builds the role-tagged prompt from a session window.
///
/// Pure: the same window, text and locale always produce the same prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    history_limit: usize,
}

impl PromptAssembler {
    pub fn new(history_limit: usize) -> Self {
        Self { history_limit }
    }

    /// Assemble the prompt.
    ///
    /// - `window`: the user's visible history, *excluding* the current text
    /// - `user_text`: the text being answered now
    /// - `locale`: explicit UI locale; `"ar"` forces the Arabic hint
    pub fn assemble(
        &self,
        window: &SessionView,
        user_text: &str,
        locale: Option<&str>,
    ) -> AssembledPrompt {
        let replay = window.tail(self.history_limit);

        let mut history = Vec::with_capacity(replay.len() + 2);
        history.push(ChatTurn::user(contract_turn_text()));
        history.push(ChatTurn::model(CONTRACT_ACK));
        history.extend(replay.iter().map(|m| ChatTurn {
            role: m.role.into(),
            text: m.content.clone(),
        }));

        let wants_arabic = detect_arabic(user_text) || locale == Some("ar");
        let pending = if wants_arabic {
            format!("{user_text}{ARABIC_HINT}")
        } else {
            user_text.to_owned()
        };

        tracing::debug!(
            replayed = replay.len(),
            window = window.len(),
            arabic_hint = wants_arabic,
            "prompt assembled"
        );

        AssembledPrompt { history, pending }
    }
}
