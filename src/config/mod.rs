//! Configuration management for the Lingo gateway
//!
//! Settings come from an ordered list of named sources (environment
//! variables, then the TOML config file, then built-in defaults). The first
//! present source wins and the resolution is explicit: no ambient lookups,
//! the resolved [`Config`] struct is passed through the call graph.

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use crate::tutor::TutorDefaults;

/// Default LLM model for tutoring completions
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default access token lifetime: 7 days
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;

/// Lingo gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database, cache)
    pub data_dir: PathBuf,

    /// Path to static files directory (web UI), if any
    pub static_dir: Option<PathBuf>,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// LLM model identifier for chat completions
    pub llm_model: String,

    /// Voice processing configuration
    pub voice: VoiceConfig,

    /// Tutoring defaults (context window, correction replay, sampling)
    pub tutor: TutorDefaults,

    /// Authentication configuration
    pub auth: AuthSettings,
}

/// API keys for external services
#[derive(Clone)]
pub struct ApiKeys {
    pub openai: Option<SecretString>,
    pub google: Option<SecretString>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "***"))
            .field("google", &self.google.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model ("default" for Google, "whisper-1" for OpenAI)
    pub stt_model: String,

    /// TTS model for the OpenAI backend
    pub tts_model: String,

    /// TTS voice for the OpenAI backend
    pub tts_voice: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: "default".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
        }
    }
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthSettings {
    /// JWT signing secret
    pub jwt_secret: SecretString,

    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"***")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

/// Return the first present value from an ordered list of named sources.
///
/// Empty strings count as absent. Logs which source won, so a misconfigured
/// deployment is diagnosable from the logs alone.
#[must_use]
pub fn resolve(setting: &str, sources: &[(&str, Option<String>)]) -> Option<String> {
    for (label, value) in sources {
        if let Some(v) = value {
            if !v.is_empty() {
                tracing::debug!(setting, source = label, "resolved setting");
                return Some(v.clone());
            }
        }
    }
    tracing::debug!(setting, "no source present");
    None
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Config {
    /// Load configuration from environment variables and the config file
    #[must_use]
    pub fn load() -> Self {
        let file = file::load_config_file();

        let data_dir = resolve(
            "data_dir",
            &[
                ("env:LINGO_DATA_DIR", env("LINGO_DATA_DIR")),
                ("file:server.data_dir", file.server.data_dir.clone()),
            ],
        )
        .map_or_else(default_data_dir, PathBuf::from);

        let static_dir = resolve(
            "static_dir",
            &[
                ("env:LINGO_STATIC_DIR", env("LINGO_STATIC_DIR")),
                ("file:server.static_dir", file.server.static_dir.clone()),
            ],
        )
        .map(PathBuf::from);

        let openai = resolve(
            "openai_api_key",
            &[
                ("env:LINGO_OPENAI_API_KEY", env("LINGO_OPENAI_API_KEY")),
                ("env:OPENAI_API_KEY", env("OPENAI_API_KEY")),
                ("file:api_keys.openai", file.api_keys.openai.clone()),
            ],
        )
        .map(SecretString::from);

        let google = resolve(
            "google_api_key",
            &[
                ("env:LINGO_GOOGLE_API_KEY", env("LINGO_GOOGLE_API_KEY")),
                ("env:GOOGLE_API_KEY", env("GOOGLE_API_KEY")),
                ("file:api_keys.google", file.api_keys.google.clone()),
            ],
        )
        .map(SecretString::from);

        let llm_model = resolve(
            "llm_model",
            &[
                ("env:LINGO_LLM_MODEL", env("LINGO_LLM_MODEL")),
                ("file:llm.model", file.llm.model.clone()),
            ],
        )
        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());

        let voice_defaults = VoiceConfig::default();
        let voice = VoiceConfig {
            stt_model: resolve(
                "stt_model",
                &[
                    ("env:LINGO_STT_MODEL", env("LINGO_STT_MODEL")),
                    ("file:voice.stt_model", file.voice.stt_model.clone()),
                ],
            )
            .unwrap_or(voice_defaults.stt_model),
            tts_model: file
                .voice
                .tts_model
                .clone()
                .unwrap_or(voice_defaults.tts_model),
            tts_voice: file
                .voice
                .tts_voice
                .clone()
                .unwrap_or(voice_defaults.tts_voice),
        };

        let tutor_defaults = TutorDefaults::default();
        let tutor = TutorDefaults {
            context_window: file
                .tutor
                .context_window
                .unwrap_or(tutor_defaults.context_window),
            replay_corrections: file
                .tutor
                .replay_corrections
                .unwrap_or(tutor_defaults.replay_corrections),
            temperature: file.tutor.temperature.unwrap_or(tutor_defaults.temperature),
            max_tokens: file.tutor.max_tokens.unwrap_or(tutor_defaults.max_tokens),
        };

        let jwt_secret = resolve(
            "jwt_secret",
            &[
                ("env:LINGO_JWT_SECRET", env("LINGO_JWT_SECRET")),
                ("file:auth.jwt_secret", file.auth.jwt_secret.clone()),
            ],
        )
        .map_or_else(
            || {
                tracing::warn!("no JWT secret configured, using development default");
                SecretString::from("lingo-dev-secret-change-in-production")
            },
            SecretString::from,
        );

        let auth = AuthSettings {
            jwt_secret,
            token_ttl_minutes: file
                .auth
                .token_ttl_minutes
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        };

        Self {
            data_dir,
            static_dir,
            api_keys: ApiKeys { openai, google },
            llm_model,
            voice,
            tutor,
            auth,
        }
    }
}

/// Default data directory: `~/.local/share/omni/lingo` (platform equivalent)
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".lingo"),
        |d| d.data_dir().join("omni").join("lingo"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_first_present_wins() {
        let value = resolve(
            "test",
            &[
                ("a", None),
                ("b", Some("from-b".to_string())),
                ("c", Some("from-c".to_string())),
            ],
        );
        assert_eq!(value.as_deref(), Some("from-b"));
    }

    #[test]
    fn test_resolve_skips_empty_strings() {
        let value = resolve(
            "test",
            &[
                ("a", Some(String::new())),
                ("b", Some("real".to_string())),
            ],
        );
        assert_eq!(value.as_deref(), Some("real"));
    }

    #[test]
    fn test_resolve_all_absent() {
        assert_eq!(resolve("test", &[("a", None), ("b", None)]), None);
    }

    #[test]
    fn test_api_keys_debug_redacted() {
        let keys = ApiKeys {
            openai: Some(SecretString::from("sk-secret")),
            google: None,
        };
        let debug = format!("{keys:?}");
        assert!(!debug.contains("sk-secret"));
    }
}
