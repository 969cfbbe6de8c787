//! The interaction-cycle pipeline
//!
//! One cycle runs Idle → (Transcribing) → Composing → Parsing →
//! (Synthesizing) → Rendering → Idle. Errors at a suspending phase surface
//! to the caller and return the session to Idle without corrupting the
//! history store: a failed transcription appends nothing, a failed
//! completion is never appended (the user turn it followed stays), and a
//! failed synthesis still renders the text reply.

use std::sync::Arc;

use super::prompt;
use super::reply::parse_reply;
use super::session::ChatSession;
use super::TutorDefaults;
use crate::completion::CompletionClient;
use crate::speech::{SpeechToText, TextToSpeech};
use crate::{Error, Result};

/// The rendered result of one interaction cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// What the learner said, after transcription/trimming
    pub transcript: String,
    /// The tutor's conversational reply
    pub conversation: String,
    /// Grammar note, when one was produced
    pub correction: Option<String>,
    /// MP3 audio of the reply, when synthesis was requested and succeeded
    pub audio: Option<Vec<u8>>,
}

/// Drives interaction cycles against the hosted services.
///
/// Client handles are constructed once at startup and shared read-only.
pub struct ChatPipeline {
    completion: Arc<CompletionClient>,
    stt: Option<Arc<SpeechToText>>,
    tts: Option<Arc<TextToSpeech>>,
    defaults: TutorDefaults,
}

impl ChatPipeline {
    /// Create a new pipeline
    #[must_use]
    pub fn new(
        completion: Arc<CompletionClient>,
        stt: Option<Arc<SpeechToText>>,
        tts: Option<Arc<TextToSpeech>>,
        defaults: TutorDefaults,
    ) -> Self {
        Self {
            completion,
            stt,
            tts,
            defaults,
        }
    }

    /// Tutoring defaults in effect for this pipeline
    #[must_use]
    pub const fn defaults(&self) -> &TutorDefaults {
        &self.defaults
    }

    /// Run one cycle from a text utterance.
    ///
    /// Returns `None` (a no-op, not an error) when the utterance is empty
    /// after trimming; the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the completion call fails
    pub async fn run_text_cycle(
        &self,
        session: &mut ChatSession,
        message: &str,
        synthesize: bool,
    ) -> Result<Option<CycleOutcome>> {
        let utterance = message.trim();
        if utterance.is_empty() {
            return Ok(None);
        }

        self.run_utterance(session, utterance, synthesize)
            .await
            .map(Some)
    }

    /// Run one cycle from captured audio.
    ///
    /// Returns `None` when the service detects no speech; no turns are
    /// appended and the configuration is unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if transcription or the completion call fails, or if no
    /// STT service is configured
    pub async fn run_audio_cycle(
        &self,
        session: &mut ChatSession,
        audio: &[u8],
        synthesize: bool,
    ) -> Result<Option<CycleOutcome>> {
        let stt = self
            .stt
            .as_ref()
            .ok_or_else(|| Error::Config("no STT service configured".to_string()))?;

        let language_code = session.config().language.code();
        let transcript = stt.transcribe(audio, language_code).await?;
        if transcript.is_empty() {
            return Ok(None);
        }

        let utterance = transcript.text.trim().to_string();
        self.run_utterance(session, &utterance, synthesize)
            .await
            .map(Some)
    }

    /// Composing → Parsing → (Synthesizing), with the history-append rules
    /// of the observed contract
    async fn run_utterance(
        &self,
        session: &mut ChatSession,
        utterance: &str,
        synthesize: bool,
    ) -> Result<CycleOutcome> {
        // Window is computed before the new turn enters the store
        let messages = prompt::assemble(session, utterance, &self.defaults);

        // The user turn stays even if the completion below fails
        session.push_user(utterance);

        let raw = self
            .completion
            .complete(&messages, self.defaults.temperature, self.defaults.max_tokens)
            .await?;

        let parsed = parse_reply(&raw);
        session.push_assistant(&parsed.conversation, parsed.correction.as_deref());

        let audio = if synthesize {
            self.synthesize_reply(session, &parsed.conversation).await
        } else {
            None
        };

        Ok(CycleOutcome {
            transcript: utterance.to_string(),
            conversation: parsed.conversation,
            correction: parsed.correction,
            audio,
        })
    }

    /// Synthesis failure is non-fatal: the text reply still renders, the
    /// audio is simply omitted
    async fn synthesize_reply(&self, session: &ChatSession, text: &str) -> Option<Vec<u8>> {
        let tts = self.tts.as_ref()?;
        let config = session.config();

        match tts
            .synthesize(text, config.language.code(), config.resolved_voice())
            .await
        {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(error = %e, "reply synthesis failed, returning text only");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::tutor::TutorConfig;

    fn pipeline() -> ChatPipeline {
        let completion = Arc::new(
            CompletionClient::new(SecretString::from("test-key"), "gpt-4o-mini".to_string())
                .unwrap(),
        );
        ChatPipeline::new(completion, None, None, TutorDefaults::default())
    }

    fn session() -> ChatSession {
        ChatSession::new(
            "test".to_string(),
            TutorConfig::default(),
            &TutorDefaults::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_text_is_noop() {
        let pipeline = pipeline();
        let mut session = session();

        let outcome = pipeline
            .run_text_cycle(&mut session, "   \n\t  ", false)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_audio_without_stt_is_config_error() {
        let pipeline = pipeline();
        let mut session = session();

        let result = pipeline
            .run_audio_cycle(&mut session, &[0_u8; 16], false)
            .await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert!(session.transcript().is_empty());
    }
}
