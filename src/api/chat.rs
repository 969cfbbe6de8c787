//! Chat API endpoints for tutoring conversations

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiState;
use crate::tutor::{Language, Level, Persona, Role, Topic, TutorConfig};
use crate::Error;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/send", post(send))
        .route("/reset", post(reset))
        .route("/transcript", get(transcript))
        .route("/topics", get(topics))
        .route("/personas", get(personas))
        .route("/levels", get(levels))
        .route("/languages", get(languages))
        .with_state(state)
}

// --- Request/Response types ---

/// Partial tutor configuration; present fields replace the session's values
#[derive(Debug, Default, Deserialize)]
pub struct ConfigPatch {
    pub persona: Option<Persona>,
    pub topic: Option<Topic>,
    pub level: Option<Level>,
    pub language: Option<Language>,
    pub voice: Option<String>,
}

impl ConfigPatch {
    fn apply(&self, config: &mut TutorConfig) {
        if let Some(persona) = self.persona {
            config.persona = persona;
        }
        if let Some(topic) = self.topic {
            config.topic = topic;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(voice) = &self.voice {
            config.voice = Some(voice.clone());
        }
    }

    fn is_empty(&self) -> bool {
        self.persona.is_none()
            && self.topic.is_none()
            && self.level.is_none()
            && self.language.is_none()
            && self.voice.is_none()
    }
}

#[derive(Deserialize)]
pub struct SendRequest {
    /// Omit to start a new session
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub config: Option<ConfigPatch>,
    /// Whether to synthesize the reply to speech (default true)
    #[serde(default = "default_synthesize")]
    pub synthesize: bool,
}

const fn default_synthesize() -> bool {
    true
}

#[derive(Serialize)]
pub struct SendResponse {
    pub session_id: String,
    pub conversation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
    /// Base64-encoded MP3 of the reply, when synthesis succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct TranscriptQuery {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct TurnView {
    pub role: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub turns: Vec<TurnView>,
    pub exchange_count: usize,
}

#[derive(Serialize)]
pub struct OptionEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

// --- Handlers ---

/// Send one learner utterance through the tutoring pipeline
async fn send(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ChatError> {
    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or(ChatError::NotConfigured("chat not configured (no completion key)"))?
        .clone();

    let session_id = req
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut initial_config = TutorConfig::default();
    if let Some(patch) = &req.config {
        patch.apply(&mut initial_config);
    }

    let session = state.session(&session_id, initial_config).await;
    let mut session = session.lock().await;

    // Configuration changes apply between turns
    if let Some(patch) = &req.config {
        if !patch.is_empty() {
            let mut config = session.config().clone();
            patch.apply(&mut config);
            session.set_config(config);
        }
    }

    let outcome = pipeline
        .run_text_cycle(&mut session, &req.message, req.synthesize)
        .await
        .map_err(ChatError::from)?
        .ok_or(ChatError::BadRequest("empty message"))?;

    Ok(Json(SendResponse {
        session_id,
        conversation: outcome.conversation,
        correction: outcome.correction,
        audio: outcome
            .audio
            .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
    }))
}

/// Clear a session's conversation, keeping its configuration
async fn reset(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ResetRequest>,
) -> Result<StatusCode, ChatError> {
    let session = state
        .existing_session(&req.session_id)
        .await
        .ok_or(ChatError::SessionNotFound)?;

    session.lock().await.reset();
    tracing::info!(session_id = %req.session_id, "session reset");
    Ok(StatusCode::NO_CONTENT)
}

/// Full display transcript for a session
async fn transcript(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<TranscriptResponse>, ChatError> {
    let session = state
        .existing_session(&query.session_id)
        .await
        .ok_or(ChatError::SessionNotFound)?;

    let session = session.lock().await;
    let turns = session
        .transcript()
        .iter()
        .map(|turn| TurnView {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            text: turn.text.clone(),
            correction: turn.correction.clone(),
        })
        .collect();

    Ok(Json(TranscriptResponse {
        session_id: query.session_id,
        turns,
        exchange_count: session.exchange_count(),
    }))
}

/// Available conversation topics
async fn topics() -> Json<serde_json::Value> {
    let topics: Vec<OptionEntry> = Topic::ALL
        .iter()
        .map(|t| OptionEntry {
            id: t.id(),
            name: t.name(),
            description: t.description(),
        })
        .collect();
    Json(serde_json::json!({ "topics": topics }))
}

/// Available tutor personas
async fn personas() -> Json<serde_json::Value> {
    let personas: Vec<OptionEntry> = Persona::ALL
        .iter()
        .map(|p| OptionEntry {
            id: p.id(),
            name: p.name(),
            description: p.description(),
        })
        .collect();
    Json(serde_json::json!({ "personas": personas }))
}

/// Available proficiency levels
async fn levels() -> Json<serde_json::Value> {
    let levels: Vec<OptionEntry> = Level::ALL
        .iter()
        .map(|l| OptionEntry {
            id: l.id(),
            name: l.name(),
            description: l.description(),
        })
        .collect();
    Json(serde_json::json!({ "levels": levels }))
}

/// Supported target languages
async fn languages() -> Json<serde_json::Value> {
    let languages: Vec<serde_json::Value> = Language::ALL
        .iter()
        .map(|l| {
            serde_json::json!({
                "id": l.id(),
                "name": l.name(),
                "code": l.code(),
            })
        })
        .collect();
    Json(serde_json::json!({ "languages": languages }))
}

// --- Errors ---

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    NotConfigured(&'static str),
    Unavailable(String),
    BadRequest(&'static str),
    SessionNotFound,
    CompletionFailed(String),
    TranscriptionFailed(String),
    Internal(String),
}

impl From<Error> for ChatError {
    fn from(e: Error) -> Self {
        match e {
            Error::Completion(msg) => Self::CompletionFailed(msg),
            Error::Transcription(msg) => Self::TranscriptionFailed(msg),
            Error::Config(msg) => Self::Unavailable(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ChatError {
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
            Self::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string())
            }
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::SessionNotFound => {
                (StatusCode::NOT_FOUND, "session_not_found", "unknown session".to_string())
            }
            Self::CompletionFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "completion_failed", msg)
            }
            Self::TranscriptionFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "transcription_failed", msg)
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
