//! Text-to-speech (TTS) processing

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// TTS provider backend
#[derive(Clone, Copy, Debug)]
enum TtsProvider {
    Google,
    OpenAI,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    /// Voice used by the `OpenAI` backend; the Google backend takes the voice
    /// per request from the session's language voice list
    fallback_voice: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a new TTS instance using Google Cloud Text-to-Speech
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_google(api_key: SecretString) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google API key required for speech synthesis".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: String::new(),
            fallback_voice: String::new(),
            provider: TtsProvider::Google,
        })
    }

    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_openai(api_key: SecretString, model: String, voice: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            fallback_voice: voice,
            provider: TtsProvider::OpenAI,
        })
    }

    /// Synthesize text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `language_code` - BCP-47 code, e.g. "en-US"
    /// * `voice` - Voice identifier from the language's voice list
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
        voice: &str,
    ) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Err(Error::Synthesis("empty text".to_string()));
        }

        match self.provider {
            TtsProvider::Google => self.synthesize_google(text, language_code, voice).await,
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
        }
    }

    /// Synthesize using Google Cloud Text-to-Speech
    async fn synthesize_google(
        &self,
        text: &str,
        language_code: &str,
        voice: &str,
    ) -> Result<Vec<u8>> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SynthesizeResponse {
            audio_content: String,
        }

        tracing::debug!(chars = text.len(), voice = %voice, "starting Google synthesis");

        let body = serde_json::json!({
            "input": { "text": text },
            "voice": {
                "languageCode": language_code,
                "name": voice,
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": 1.0,
                "pitch": 0.0,
            },
        });

        let url = format!(
            "https://texttospeech.googleapis.com/v1/text:synthesize?key={}",
            self.api_key.expose_secret()
        );

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "Google TTS error {status}: {body}"
            )));
        }

        let result: SynthesizeResponse = response.json().await?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(&result.audio_content)
            .map_err(|e| Error::Synthesis(format!("invalid audio content: {e}")))?;

        tracing::debug!(bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }

    /// Synthesize using OpenAI TTS
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.fallback_voice,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "OpenAI TTS error {status}: {body}"
            )));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}
