//! Lingo Gateway - Voice-enabled language-tutoring chat gateway
//!
//! This library provides the core functionality for the Lingo gateway:
//! - Voice processing (hosted STT and TTS)
//! - Tutoring prompt assembly and tagged-reply parsing
//! - Per-session conversation history with a bounded context window
//! - User store, authentication, and admin API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Browser / Mobile UI                 │
//! │        mic capture  │  text input  │  playback      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Lingo Gateway                       │
//! │   Auth  │  Sessions  │  Prompt  │  Reply Parser     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Hosted services                         │
//! │   STT  │  Chat Completions  │  TTS                  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod security;
pub mod speech;
pub mod tutor;

pub use completion::{ChatMessage, CompletionClient};
pub use config::Config;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use speech::{SpeechToText, TextToSpeech, Transcript};
pub use tutor::{
    ChatPipeline, ChatSession, CycleOutcome, Language, Level, ParsedReply, Persona, Role, Topic,
    Turn, TutorConfig, TutorDefaults, parse_reply,
};
