//! Tagged-section reply parsing
//!
//! The system prompt asks the model to multiplex two logical outputs into one
//! completion: the conversational reply inside `<conversation>` tags and an
//! optional grammar note inside `<correction>` tags. Models are not 100%
//! compliant, so extraction is defensive and never fails.

use std::sync::LazyLock;

use regex::Regex;

static CONVERSATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<conversation>(.*?)</conversation>").expect("valid regex")
});

static CORRECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<correction>(.*?)</correction>").expect("valid regex")
});

/// Placeholder values models emit when there is nothing to correct
const EMPTY_CORRECTION_SENTINELS: &[&str] = &["-", "none", "n/a"];

/// A model completion split into its two logical sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// The conversational reply shown (and spoken) to the learner
    pub conversation: String,
    /// Grammar note, display-only; never replayed to the model
    pub correction: Option<String>,
}

/// Split a raw completion into conversation and correction sections.
///
/// The first `<conversation>` pair wins; when the tag is absent the entire
/// completion is treated as the conversational reply. Text outside both tags
/// is discarded. Pure function: identical input yields identical output.
#[must_use]
pub fn parse_reply(raw: &str) -> ParsedReply {
    let conversation = CONVERSATION_RE
        .captures(raw)
        .map_or_else(|| raw.trim().to_string(), |caps| caps[1].trim().to_string());

    let correction = CORRECTION_RE
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
        .filter(|text| !is_empty_correction(text));

    ParsedReply {
        conversation,
        correction,
    }
}

/// Whether an extracted correction is an "empty" sentinel rather than content
fn is_empty_correction(text: &str) -> bool {
    text.len() < 3
        || EMPTY_CORRECTION_SENTINELS
            .iter()
            .any(|s| text.eq_ignore_ascii_case(s))
}
