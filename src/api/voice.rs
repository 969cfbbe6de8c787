//! Voice API endpoints for speech-to-text and text-to-speech

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::tutor::Language;

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/synthesize", post(synthesize))
        .route("/voices", get(voices))
        .route("/capabilities", get(capabilities))
        .with_state(state)
}

/// Voice capabilities response
#[derive(Debug, Serialize)]
pub struct VoiceCapabilities {
    pub stt_available: bool,
    pub tts_available: bool,
}

/// Get voice capabilities
async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<VoiceCapabilities> {
    Json(VoiceCapabilities {
        stt_available: state.stt.is_some(),
        tts_available: state.tts.is_some(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    /// BCP-47 language code for recognition
    #[serde(default = "default_language_code")]
    pub language: String,
}

fn default_language_code() -> String {
    "en-US".to_string()
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Transcribe audio to text
///
/// Accepts linear-PCM WAV audio in the request body. An empty transcript
/// means no speech was detected; that is a 200, not an error.
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TranscribeQuery>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, VoiceError> {
    let stt = state
        .stt
        .as_ref()
        .ok_or(VoiceError::NotConfigured("STT not configured (no speech key)"))?;

    if body.is_empty() {
        return Err(VoiceError::BadRequest("empty audio data"));
    }

    let transcript = stt
        .transcribe(&body, &query.language)
        .await
        .map_err(|e| VoiceError::TranscriptionFailed(e.to_string()))?;

    Ok(Json(TranscribeResponse {
        transcript: transcript.text,
        confidence: transcript.confidence,
    }))
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default)]
    pub voice: Option<String>,
}

/// Synthesize text to speech
///
/// Returns audio in MP3 format
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Response, VoiceError> {
    let tts = state
        .tts
        .as_ref()
        .ok_or(VoiceError::NotConfigured("TTS not configured (no speech key)"))?;

    if request.text.is_empty() {
        return Err(VoiceError::BadRequest("empty text"));
    }

    let voice = request.voice.unwrap_or_else(|| {
        language_for_code(&request.language_code)
            .default_voice()
            .to_string()
    });

    let audio = tts
        .synthesize(&request.text, &request.language_code, &voice)
        .await
        .map_err(|e| VoiceError::SynthesisFailed(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=speech.mp3",
            ),
        ],
        audio,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    /// Short language id ("en" or "fr"); unknown values fall back to "en"
    #[serde(default = "default_short_language")]
    pub language: String,
}

fn default_short_language() -> String {
    "en".to_string()
}

/// List synthesis voices for a language
async fn voices(Query(query): Query<VoicesQuery>) -> Json<serde_json::Value> {
    let language = match query.language.as_str() {
        "fr" | "french" | "fr-FR" => Language::French,
        _ => Language::English,
    };

    Json(serde_json::json!({ "voices": language.voices() }))
}

/// Map a BCP-47 code onto a supported language, defaulting to English
fn language_for_code(code: &str) -> Language {
    if code.starts_with("fr") {
        Language::French
    } else {
        Language::English
    }
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    TranscriptionFailed(String),
    SynthesisFailed(String),
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::TranscriptionFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "transcription_failed", msg),
            Self::SynthesisFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg),
        };

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_code() {
        assert_eq!(language_for_code("fr-FR"), Language::French);
        assert_eq!(language_for_code("fr"), Language::French);
        assert_eq!(language_for_code("en-US"), Language::English);
        assert_eq!(language_for_code("de-DE"), Language::English);
    }
}
