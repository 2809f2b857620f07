//! Outbound webhook messages.
//!
//! A submission becomes either a single embed with one field per key, or,
//! when there are more keys than an embed can hold, a plain-text message
//! carrying a fenced JSON dump.

use serde::Serialize;

use crate::constants::{
    EMBED_COLOR, EMBED_CONTENT, EMBED_TITLE, FALLBACK_PREFIX, MAX_EMBED_FIELDS,
    MAX_FALLBACK_DUMP_CHARS, MAX_FIELD_NAME_CHARS, MAX_FIELD_VALUE_CHARS, PLACEHOLDER_NAME,
    PLACEHOLDER_VALUE,
};
use crate::models::submission::{Submission, display_value};

/// A single `name: value` row inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich embed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub fields: Vec<EmbedField>,
    pub color: u32,
}

/// JSON body posted to the destination webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    /// One embed with a field per submitted key.
    Structured { content: String, embeds: Vec<Embed> },
    /// Plain text with a truncated JSON dump, used above the field limit.
    Fallback { content: String },
}

impl Envelope {
    pub fn content(&self) -> &str {
        match self {
            Envelope::Structured { content, .. } | Envelope::Fallback { content } => content,
        }
    }

    /// Fields of the embed, or an empty slice for the fallback form.
    pub fn fields(&self) -> &[EmbedField] {
        match self {
            Envelope::Structured { embeds, .. } => {
                embeds.first().map(|e| e.fields.as_slice()).unwrap_or_default()
            }
            Envelope::Fallback { .. } => &[],
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Envelope::Fallback { .. })
    }
}

/// Reshape a submission into the message sent to the destination.
pub fn build_envelope(submission: &Submission) -> Envelope {
    if submission.len() > MAX_EMBED_FIELDS {
        let dump = truncate_chars(&submission.to_pretty_json(), MAX_FALLBACK_DUMP_CHARS);
        return Envelope::Fallback {
            content: format!("{FALLBACK_PREFIX}\n```json\n{dump}\n```"),
        };
    }

    let fields = submission
        .iter()
        .map(|(key, value)| EmbedField {
            name: or_placeholder(truncate_chars(key, MAX_FIELD_NAME_CHARS), PLACEHOLDER_NAME),
            value: or_placeholder(
                truncate_chars(&display_value(value), MAX_FIELD_VALUE_CHARS),
                PLACEHOLDER_VALUE,
            ),
            inline: false,
        })
        .collect();

    Envelope::Structured {
        content: EMBED_CONTENT.to_string(),
        embeds: vec![Embed {
            title: EMBED_TITLE.to_string(),
            fields,
            color: EMBED_COLOR,
        }],
    }
}

/// Keep at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

fn or_placeholder(s: String, placeholder: &str) -> String {
    if s.is_empty() { placeholder.to_string() } else { s }
}
