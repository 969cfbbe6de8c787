//! Hosted speech processing (STT and TTS)

pub mod stt;
pub mod tts;

pub use stt::{SpeechToText, Transcript};
pub use tts::TextToSpeech;
