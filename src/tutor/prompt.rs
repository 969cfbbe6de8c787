//! Tutoring prompt assembly
//!
//! Builds the exact ordered message list sent to the completion service:
//! one system instruction generated from the session's tutor configuration,
//! the bounded window of prior turns, then the new learner utterance.

use super::session::ChatSession;
use super::{TutorConfig, TutorDefaults};
use crate::completion::ChatMessage;

/// Build the system instruction for a tutor configuration.
///
/// Names the persona and target language, states topic and proficiency
/// level, constrains reply length and questioning, and mandates the
/// two-section tagged output format the reply parser expects.
#[must_use]
pub fn system_prompt(config: &TutorConfig) -> String {
    let language = config.language.name();
    let persona = config.persona.name().to_lowercase();
    let topic = config.topic.name();
    let level = config.level.name();

    format!(
        "You are an experienced {language} language tutor with a {persona} teaching style.\n\
         \n\
         Your role:\n\
         - Help the student practice {language} conversation on the topic of {topic}\n\
         - Adapt your language to {level} proficiency\n\
         - Keep responses natural and conversational (2-4 sentences)\n\
         - Ask at most one question per response\n\
         - Never repeat yourself, and never write the student's side of the dialogue\n\
         - Provide grammar corrections when needed WITHOUT interrupting the conversation flow\n\
         \n\
         CRITICAL: You MUST use this exact format for EVERY response:\n\
         \n\
         <conversation>\n\
         [Your natural, conversational response here - NO corrections, NO grammar mentions, ONLY conversation]\n\
         </conversation>\n\
         \n\
         <correction>\n\
         [ONLY if there was a grammar/vocabulary/spelling error, write it here. Otherwise leave empty]\n\
         [Format: \"You said: '[incorrect phrase]' → Better: '[corrected phrase]' - [brief explanation]\"]\n\
         </correction>\n\
         \n\
         IMPORTANT RULES:\n\
         1. The <conversation> section must NEVER mention errors or corrections\n\
         2. The <conversation> section must flow naturally as if nothing was wrong\n\
         3. Keep the conversation going - ask a follow-up question, show interest\n\
         4. The <correction> section is COMPLETELY SEPARATE - only grammar fixes go there\n\
         5. If there are no errors, leave <correction> empty\n\
         6. Do NOT mix conversation and correction - they are separate sections\n\
         \n\
         Topic: {topic}\n\
         Level: {level}\n\
         Persona: {}",
        config.persona.name(),
    )
}

/// Assemble the full message list for one completion call.
///
/// The utterance must already be trimmed and non-empty; empty input is a
/// no-op upstream and never reaches the assembler. This function performs no
/// network calls and cannot fail.
#[must_use]
pub fn assemble(
    session: &ChatSession,
    utterance: &str,
    defaults: &TutorDefaults,
) -> Vec<ChatMessage> {
    let window = session.context_window(defaults.context_window);

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: system_prompt(session.config()),
    });
    messages.extend(window);
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: utterance.to_string(),
    });

    messages
}
