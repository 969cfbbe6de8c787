//! Per-session conversation history
//!
//! A session keeps two views of the same conversation: the display
//! transcript (every turn, including grammar corrections, for rendering) and
//! the model-context list (assistant turns reduced to their conversational
//! portion). Only a bounded window of the context list is ever replayed to
//! the completion service.

use chrono::{DateTime, Utc};

use super::{TutorConfig, TutorDefaults};
use crate::completion::ChatMessage;

/// Message role within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of the display transcript. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Grammar note attached to assistant turns; display-only
    pub correction: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of the model-context list
#[derive(Debug, Clone)]
struct ContextEntry {
    role: Role,
    text: String,
}

/// In-memory conversation state for one interactive session.
///
/// Owned by the server's session map and borrowed for the duration of one
/// interaction cycle; never stored in module-level state.
#[derive(Debug)]
pub struct ChatSession {
    id: String,
    config: TutorConfig,
    transcript: Vec<Turn>,
    context: Vec<ContextEntry>,
    replay_corrections: bool,
}

impl ChatSession {
    /// Create a new session with the given configuration
    #[must_use]
    pub fn new(id: String, config: TutorConfig, defaults: &TutorDefaults) -> Self {
        Self {
            id,
            config,
            transcript: Vec::new(),
            context: Vec::new(),
            replay_corrections: defaults.replay_corrections,
        }
    }

    /// Session identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current tutor configuration
    #[must_use]
    pub const fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Replace the tutor configuration (valid between turns)
    pub fn set_config(&mut self, config: TutorConfig) {
        self.config = config;
    }

    /// Full display transcript, oldest first
    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Number of completed learner/tutor exchanges
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count()
    }

    /// Append a user turn to both views
    pub fn push_user(&mut self, text: &str) {
        self.transcript.push(Turn {
            role: Role::User,
            text: text.to_string(),
            correction: None,
            created_at: Utc::now(),
        });
        self.context.push(ContextEntry {
            role: Role::User,
            text: text.to_string(),
        });
    }

    /// Append an assistant turn.
    ///
    /// The display transcript keeps the correction; the context list stores
    /// only the conversational portion unless correction replay is enabled.
    pub fn push_assistant(&mut self, conversation: &str, correction: Option<&str>) {
        self.transcript.push(Turn {
            role: Role::Assistant,
            text: conversation.to_string(),
            correction: correction.map(ToString::to_string),
            created_at: Utc::now(),
        });

        let context_text = if self.replay_corrections {
            correction.map_or_else(
                || conversation.to_string(),
                |c| format!("{conversation}\n[correction: {c}]"),
            )
        } else {
            conversation.to_string()
        };
        self.context.push(ContextEntry {
            role: Role::Assistant,
            text: context_text,
        });
    }

    /// The bounded recent-turn window replayed to the completion service.
    ///
    /// Keeps the most recent `window` entries in original order; older
    /// entries are silently dropped. Rebuilt on every call.
    #[must_use]
    pub fn context_window(&self, window: usize) -> Vec<ChatMessage> {
        let start = self.context.len().saturating_sub(window);
        self.context[start..]
            .iter()
            .map(|entry| ChatMessage {
                role: entry.role.as_str().to_string(),
                content: entry.text.clone(),
            })
            .collect()
    }

    /// Clear the conversation, keeping the configuration
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.context.clear();
    }
}
