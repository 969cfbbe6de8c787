//! Tutoring domain: configuration enums, prompt assembly, reply parsing,
//! per-session history, and the interaction-cycle pipeline

pub mod pipeline;
pub mod prompt;
pub mod reply;
pub mod session;

use serde::{Deserialize, Serialize};

pub use pipeline::{ChatPipeline, CycleOutcome};
pub use reply::{ParsedReply, parse_reply};
pub use session::{ChatSession, Role, Turn};

/// Tutor personality, controls the register of the system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Patient, supportive, celebrates the learner's efforts
    #[default]
    Friendly,
    /// Focused on accuracy, provides clear feedback
    Professional,
    /// Uses idioms, humor, and relatable examples
    Casual,
}

impl Persona {
    /// All personas, in presentation order
    pub const ALL: [Self; 3] = [Self::Friendly, Self::Professional, Self::Casual];

    /// Stable wire identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Casual => "casual",
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Friendly => "Friendly",
            Self::Professional => "Professional",
            Self::Casual => "Casual",
        }
    }

    /// One-line description for option listings
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Friendly => "Patient, supportive, celebrates your efforts",
            Self::Professional => "Focused on accuracy, provides clear feedback",
            Self::Casual => "Uses idioms, humor, and relatable examples",
        }
    }
}

/// Learner proficiency level (CEFR bands)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Level {
    /// All levels, in presentation order
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Stable wire identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Display label including the CEFR band
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner (A1-A2)",
            Self::Intermediate => "Intermediate (B1-B2)",
            Self::Advanced => "Advanced (C1-C2)",
        }
    }

    /// One-line description for option listings
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Beginner => "Simple vocabulary, short sentences",
            Self::Intermediate => "Broader vocabulary, complex sentences",
            Self::Advanced => "Sophisticated language, nuanced discussions",
        }
    }
}

/// Conversation topic for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    Food,
    Travel,
    Work,
    Shopping,
    Interview,
}

impl Topic {
    /// All topics, in presentation order
    pub const ALL: [Self; 6] = [
        Self::General,
        Self::Food,
        Self::Travel,
        Self::Work,
        Self::Shopping,
        Self::Interview,
    ];

    /// Stable wire identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Work => "work",
            Self::Shopping => "shopping",
            Self::Interview => "interview",
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Work => "Work",
            Self::Shopping => "Shopping",
            Self::Interview => "Job Interview",
        }
    }

    /// One-line description for option listings
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::General => "General conversation practice",
            Self::Food => "Restaurant and food discussions",
            Self::Travel => "Travel and tourism scenarios",
            Self::Work => "Professional and work-related topics",
            Self::Shopping => "Shopping and errands",
            Self::Interview => "Practice job interviews",
        }
    }
}

/// Target language being practiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// All supported languages, in presentation order
    pub const ALL: [Self; 2] = [Self::English, Self::French];

    /// Stable wire identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::French => "french",
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
        }
    }

    /// BCP-47 code used by the STT/TTS services
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::French => "fr-FR",
        }
    }

    /// Synthesis voices available for this language
    #[must_use]
    pub const fn voices(self) -> &'static [VoiceOption] {
        match self {
            Self::English => &[
                VoiceOption { id: "en-US-Journey-F", name: "Journey Female", gender: "female" },
                VoiceOption { id: "en-US-Journey-D", name: "Journey Male", gender: "male" },
                VoiceOption { id: "en-US-Studio-O", name: "Studio Female", gender: "female" },
                VoiceOption { id: "en-US-Studio-M", name: "Studio Male", gender: "male" },
                VoiceOption { id: "en-US-Neural2-F", name: "Neural2 Female", gender: "female" },
                VoiceOption { id: "en-US-Neural2-D", name: "Neural2 Male", gender: "male" },
            ],
            Self::French => &[
                VoiceOption { id: "fr-FR-Neural2-A", name: "Neural2 Female A", gender: "female" },
                VoiceOption { id: "fr-FR-Neural2-B", name: "Neural2 Male B", gender: "male" },
                VoiceOption { id: "fr-FR-Neural2-C", name: "Neural2 Female C", gender: "female" },
                VoiceOption { id: "fr-FR-Neural2-D", name: "Neural2 Male D", gender: "male" },
                VoiceOption { id: "fr-FR-Standard-A", name: "Standard Female A", gender: "female" },
                VoiceOption { id: "fr-FR-Standard-B", name: "Standard Male B", gender: "male" },
            ],
        }
    }

    /// Default synthesis voice for this language
    #[must_use]
    pub const fn default_voice(self) -> &'static str {
        match self {
            Self::English => "en-US-Neural2-F",
            Self::French => "fr-FR-Neural2-A",
        }
    }
}

/// A synthesis voice option
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: &'static str,
}

/// Per-session tutoring configuration, mutable between turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub topic: Topic,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub language: Language,
    /// Synthesis voice; must come from `language.voices()`
    #[serde(default)]
    pub voice: Option<String>,
}

impl TutorConfig {
    /// Resolve the synthesis voice, falling back to the language default
    /// when unset or not in the language's voice list
    #[must_use]
    pub fn resolved_voice(&self) -> &str {
        match &self.voice {
            Some(v) if self.language.voices().iter().any(|opt| opt.id == v) => v,
            _ => self.language.default_voice(),
        }
    }
}

/// Gateway-wide tutoring defaults, resolved from configuration
#[derive(Debug, Clone)]
pub struct TutorDefaults {
    /// Number of recent context entries replayed to the completion service
    pub context_window: usize,
    /// Whether grammar corrections are replayed to the completion service.
    /// Corrections are display-only in the observed contract.
    pub replay_corrections: bool,
    /// Model sampling temperature
    pub temperature: f32,
    /// Completion token cap
    pub max_tokens: u32,
}

impl Default for TutorDefaults {
    fn default() -> Self {
        Self {
            context_window: 6,
            replay_corrections: false,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}
