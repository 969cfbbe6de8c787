//! TOML configuration file loading
//!
//! Supports `~/.config/omni/lingo/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LingoConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Tutoring defaults
    #[serde(default)]
    pub tutor: TutorFileConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Data directory (database, cache)
    pub data_dir: Option<String>,

    /// Static files directory (web UI)
    pub static_dir: Option<String>,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT model (e.g. "default" for Google, "whisper-1" for OpenAI)
    pub stt_model: Option<String>,

    /// TTS model for the OpenAI backend (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice for the OpenAI backend (e.g. "alloy")
    pub tts_voice: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub google: Option<String>,
}

/// Tutoring defaults
#[derive(Debug, Default, Deserialize)]
pub struct TutorFileConfig {
    /// Recent context entries replayed to the completion service
    pub context_window: Option<usize>,

    /// Whether grammar corrections are replayed to the model
    pub replay_corrections: Option<bool>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token cap
    pub max_tokens: Option<u32>,
}

/// Authentication configuration
#[derive(Debug, Default, Deserialize)]
pub struct AuthFileConfig {
    /// JWT signing secret
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    pub token_ttl_minutes: Option<i64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `LingoConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> LingoConfigFile {
    let Some(path) = config_file_path() else {
        return LingoConfigFile::default();
    };

    if !path.exists() {
        return LingoConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LingoConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LingoConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/lingo/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("lingo")
            .join("config.toml")
    })
}
