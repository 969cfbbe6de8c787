//! HTTP API server for the Lingo gateway

pub mod admin;
pub mod auth;
pub mod chat;
pub mod health;
pub mod voice;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::completion::CompletionClient;
use crate::db::{self, DbPool, UserRepo};
use crate::security::TokenService;
use crate::speech::{SpeechToText, TextToSpeech};
use crate::tutor::{ChatPipeline, ChatSession, TutorDefaults};
use crate::{Config, Error, Result};

/// The process-wide session map. Each session is behind its own lock so one
/// interaction cycle serializes per session without blocking the others.
pub type Sessions = Arc<RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>>;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub db: DbPool,
    pub user_repo: UserRepo,
    pub tokens: TokenService,
    /// Interaction-cycle pipeline; absent when no completion key is configured
    pub pipeline: Option<Arc<ChatPipeline>>,
    pub stt: Option<Arc<SpeechToText>>,
    pub tts: Option<Arc<TextToSpeech>>,
    pub sessions: Sessions,
    pub tutor_defaults: TutorDefaults,
}

impl ApiState {
    /// Fetch an existing session handle, or create one under the given ID
    pub async fn session(&self, id: &str, config: crate::tutor::TutorConfig) -> Arc<Mutex<ChatSession>> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id = %id, "creating session");
                Arc::new(Mutex::new(ChatSession::new(
                    id.to_string(),
                    config,
                    &self.tutor_defaults,
                )))
            })
            .clone()
    }

    /// Fetch an existing session handle without creating one
    pub async fn existing_session(&self, id: &str) -> Option<Arc<Mutex<ChatSession>>> {
        self.sessions.read().await.get(id).cloned()
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the server from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns error if the database or an external client cannot be
    /// initialized
    pub fn new(config: &Config, port: u16) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db_path = config.data_dir.join("lingo.db");
        let db = db::init(&db_path)?;
        tracing::info!(path = %db_path.display(), "database ready");

        let state = build_state(config, db)?;

        Ok(Self {
            state: Arc::new(state),
            port,
            static_dir: config.static_dir.clone(),
        })
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api/auth", auth::router(self.state.clone()))
            .nest("/api/admin", admin::router(self.state.clone()))
            .nest("/api/chat", chat::router(self.state.clone()))
            .nest("/api/voice", voice::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from the frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

/// Wire up repositories and external-service clients.
///
/// Each client handle is created at most once and shared read-only; provider
/// choice follows the available keys (Google keys take the Google STT/TTS
/// backends, OpenAI keys the Whisper/OpenAI ones).
fn build_state(config: &Config, db: DbPool) -> Result<ApiState> {
    let user_repo = UserRepo::new(db.clone());
    let tokens = TokenService::new(&config.auth);

    let completion = match &config.api_keys.openai {
        Some(key) => Some(Arc::new(CompletionClient::new(
            key.clone(),
            config.llm_model.clone(),
        )?)),
        None => {
            tracing::warn!("no OpenAI API key configured, chat disabled");
            None
        }
    };

    let stt = match (&config.api_keys.google, &config.api_keys.openai) {
        (Some(key), _) => Some(Arc::new(SpeechToText::new_google(
            key.clone(),
            config.voice.stt_model.clone(),
        )?)),
        (None, Some(key)) => Some(Arc::new(SpeechToText::new_whisper(
            key.clone(),
            "whisper-1".to_string(),
        )?)),
        (None, None) => {
            tracing::warn!("no speech key configured, transcription disabled");
            None
        }
    };

    let tts = match (&config.api_keys.google, &config.api_keys.openai) {
        (Some(key), _) => Some(Arc::new(TextToSpeech::new_google(key.clone())?)),
        (None, Some(key)) => Some(Arc::new(TextToSpeech::new_openai(
            key.clone(),
            config.voice.tts_model.clone(),
            config.voice.tts_voice.clone(),
        )?)),
        (None, None) => {
            tracing::warn!("no speech key configured, synthesis disabled");
            None
        }
    };

    let pipeline = completion.map(|completion| {
        Arc::new(ChatPipeline::new(
            completion,
            stt.clone(),
            tts.clone(),
            config.tutor.clone(),
        ))
    });

    Ok(ApiState {
        db,
        user_repo,
        tokens,
        pipeline,
        stt,
        tts,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        tutor_defaults: config.tutor.clone(),
    })
}
