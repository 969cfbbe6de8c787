//! Speech-to-text (STT) processing

use std::io::Cursor;

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Fallback sample rate when the audio has no readable WAV header
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Response from the Google Cloud Speech recognize API
#[derive(serde::Deserialize)]
struct GoogleRecognizeResponse {
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(serde::Deserialize)]
struct GoogleResult {
    #[serde(default)]
    alternatives: Vec<GoogleAlternative>,
}

#[derive(serde::Deserialize)]
struct GoogleAlternative {
    transcript: String,
    confidence: Option<f32>,
}

/// Response from the OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// A transcription result
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub confidence: Option<f32>,
}

impl Transcript {
    /// Whether the service detected any speech at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    const fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: None,
        }
    }
}

/// STT provider backend
#[derive(Clone, Copy, Debug)]
enum SttProvider {
    Google,
    Whisper,
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT instance using Google Cloud Speech
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_google(api_key: SecretString, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google API key required for speech recognition".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider: SttProvider::Google,
        })
    }

    /// Create a new STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper(api_key: SecretString, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider: SttProvider::Whisper,
        })
    }

    /// Transcribe audio to text.
    ///
    /// An empty transcript means "no speech detected", not an error.
    ///
    /// # Arguments
    ///
    /// * `audio` - linear-PCM WAV audio bytes
    /// * `language_code` - BCP-47 code, e.g. "en-US"
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn transcribe(&self, audio: &[u8], language_code: &str) -> Result<Transcript> {
        if audio.is_empty() {
            return Err(Error::Transcription("empty audio data".to_string()));
        }

        match self.provider {
            SttProvider::Google => self.transcribe_google(audio, language_code).await,
            SttProvider::Whisper => self.transcribe_whisper(audio, language_code).await,
        }
    }

    /// Transcribe using Google Cloud Speech
    async fn transcribe_google(&self, audio: &[u8], language_code: &str) -> Result<Transcript> {
        let sample_rate = sniff_sample_rate(audio).unwrap_or(DEFAULT_SAMPLE_RATE);
        tracing::debug!(
            audio_bytes = audio.len(),
            sample_rate,
            language = %language_code,
            "starting Google transcription"
        );

        let body = serde_json::json!({
            "config": {
                "encoding": "LINEAR16",
                "sampleRateHertz": sample_rate,
                "languageCode": language_code,
                "enableAutomaticPunctuation": true,
                "model": self.model,
            },
            "audio": {
                "content": base64::engine::general_purpose::STANDARD.encode(audio),
            },
        });

        let url = format!(
            "https://speech.googleapis.com/v1/speech:recognize?key={}",
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google Speech request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google Speech API error");
            return Err(Error::Transcription(format!(
                "Google Speech API error {status}: {body}"
            )));
        }

        let result: GoogleRecognizeResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Google Speech response");
            e
        })?;

        if result.results.is_empty() {
            tracing::info!("no speech detected");
            return Ok(Transcript::empty());
        }

        let texts: Vec<&str> = result
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect();
        let text = texts.join(" ").trim().to_string();

        let confidences: Vec<f32> = result
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .filter_map(|a| a.confidence)
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let confidence = if confidences.is_empty() {
            None
        } else {
            Some(confidences.iter().sum::<f32>() / confidences.len() as f32)
        };

        tracing::info!(transcript = %text, "transcription complete");
        Ok(Transcript { text, confidence })
    }

    /// Transcribe using OpenAI Whisper
    async fn transcribe_whisper(&self, audio: &[u8], language_code: &str) -> Result<Transcript> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        // Whisper takes a bare ISO-639-1 code
        let language = language_code
            .split('-')
            .next()
            .unwrap_or(language_code)
            .to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Transcription(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language);

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Transcription(format!(
                "Whisper API error {status}: {body}"
            )));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Whisper response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(Transcript {
            text: result.text.trim().to_string(),
            confidence: None,
        })
    }
}

/// Read the sample rate from a WAV header, if the bytes carry one
#[must_use]
pub fn sniff_sample_rate(audio: &[u8]) -> Option<u32> {
    hound::WavReader::new(Cursor::new(audio))
        .ok()
        .map(|reader| reader.spec().sample_rate)
}
