//! Conversation core integration tests
//!
//! Exercises the reply parser, history windowing, and prompt assembly
//! together, without requiring network access

use std::sync::Arc;

use secrecy::SecretString;

use lingo_gateway::tutor::{
    prompt, ChatPipeline, ChatSession, Language, Level, Persona, Role, Topic, TutorConfig,
    TutorDefaults, parse_reply,
};
use lingo_gateway::CompletionClient;

fn new_session() -> ChatSession {
    ChatSession::new(
        "test-session".to_string(),
        TutorConfig::default(),
        &TutorDefaults::default(),
    )
}

#[test]
fn test_well_formed_reply_end_to_end() {
    let raw = "<conversation>Nice! What did you buy?</conversation>\
               <correction>You said: 'I goed' → Better: 'I went' - irregular verb.</correction>";

    let mut session = new_session();
    session.push_user("I goed to the store");

    let parsed = parse_reply(raw);
    session.push_assistant(&parsed.conversation, parsed.correction.as_deref());

    // Displayed reply and correction
    assert_eq!(parsed.conversation, "Nice! What did you buy?");
    assert_eq!(
        parsed.correction.as_deref(),
        Some("You said: 'I goed' → Better: 'I went' - irregular verb.")
    );

    // History-appended assistant text is the conversation portion only
    let window = session.context_window(6);
    assert_eq!(window[1].content, "Nice! What did you buy?");
    assert!(!window[1].content.contains("irregular verb"));

    // The display transcript still carries the correction
    let assistant_turn = &session.transcript()[1];
    assert_eq!(assistant_turn.role, Role::Assistant);
    assert!(assistant_turn.correction.is_some());
}

#[test]
fn test_correction_never_reappears_in_later_payloads() {
    let defaults = TutorDefaults::default();
    let mut session = new_session();

    session.push_user("She don't like coffee");
    session.push_assistant(
        "Oh, interesting! What does she drink instead?",
        Some("You said: 'She don't' → Better: 'She doesn't'."),
    );

    // Several turns later the correction is still absent from every payload
    session.push_user("She drink tea");
    let messages = prompt::assemble(&session, "Every morning", &defaults);
    assert!(messages.iter().all(|m| !m.content.contains("She doesn't")));
}

#[test]
fn test_windowing_over_ten_turns() {
    let defaults = TutorDefaults::default();
    let mut session = new_session();

    for i in 1..=10 {
        if i % 2 == 1 {
            session.push_user(&format!("T{i}"));
        } else {
            session.push_assistant(&format!("T{i}"), None);
        }
    }

    // Context list passed to the next completion call is exactly T5..T10
    let window = session.context_window(6);
    let texts: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, ["T5", "T6", "T7", "T8", "T9", "T10"]);

    // Assembled request: system + window + the new utterance, in order
    let messages = prompt::assemble(&session, "T11", &defaults);
    assert_eq!(messages.len(), 8);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].content, "T5");
    assert_eq!(messages[7].content, "T11");
}

#[test]
fn test_parser_fallback_and_purity() {
    let plain = "No tags here at all, just a reply.";
    let parsed = parse_reply(plain);
    assert_eq!(parsed.conversation, plain);
    assert_eq!(parsed.correction, None);

    // Pure function: identical input, identical output
    assert_eq!(parse_reply(plain), parse_reply(plain));
}

#[test]
fn test_system_prompt_tracks_config_changes() {
    let mut session = new_session();

    let messages = prompt::assemble(&session, "Hello", &TutorDefaults::default());
    assert!(messages[0].content.contains("English language tutor"));

    // Configuration is mutable between turns
    session.set_config(TutorConfig {
        persona: Persona::Casual,
        topic: Topic::Travel,
        level: Level::Beginner,
        language: Language::French,
        voice: None,
    });
    let messages = prompt::assemble(&session, "Bonjour", &TutorDefaults::default());
    assert!(messages[0].content.contains("French language tutor"));
    assert!(messages[0].content.contains("casual teaching style"));
    assert!(messages[0].content.contains("Travel"));
}

#[tokio::test]
async fn test_blank_utterance_is_noop() {
    let completion = Arc::new(
        CompletionClient::new(SecretString::from("test-key"), "gpt-4o-mini".to_string())
            .expect("client"),
    );
    let pipeline = ChatPipeline::new(completion, None, None, TutorDefaults::default());

    let mut session = new_session();
    let outcome = pipeline
        .run_text_cycle(&mut session, "  \n ", false)
        .await
        .expect("no-op must not error");

    assert!(outcome.is_none());
    assert!(session.transcript().is_empty());
    assert_eq!(session.config(), &TutorConfig::default());
}
