//! App-wide constants.
//!
//! Centralises the version, environment variable names, destination
//! limits, and the CORS allow-list so a change only touches this file.

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path of the single relay endpoint.
pub const RELAY_PATH: &str = "/send-webhook";

/// Port used when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Bind address used when neither `--host` nor `RELAY_HOST` is set.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Origins allowed to call the relay from a browser.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "http://127.0.0.1:5500",
    "http://localhost:5500",
    "https://reviewthisalways.netlify.app",
];

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PORT: &str = "PORT";
pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK";
pub const ENV_HOST: &str = "RELAY_HOST";

// ── Destination (Discord) limits ────────────────────────────────────

/// Maximum characters in an embed field name.
pub const MAX_FIELD_NAME_CHARS: usize = 256;

/// Maximum characters in an embed field value.
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

/// Maximum number of fields in a single embed.
pub const MAX_EMBED_FIELDS: usize = 25;

/// Budget for the JSON dump in a fallback message, keeping the whole
/// message under the 2000 character content limit.
pub const MAX_FALLBACK_DUMP_CHARS: usize = 1900;

// ── Message text ────────────────────────────────────────────────────

pub const EMBED_TITLE: &str = "Raw Submission";
pub const EMBED_COLOR: u32 = 5_814_783;
pub const EMBED_CONTENT: &str = "Raw form submission (forwarded without masking).";
pub const FALLBACK_PREFIX: &str = "Raw submission (too many fields for embed):";

/// Substituted for an empty key.
pub const PLACEHOLDER_NAME: &str = "field";

/// Substituted for an empty or missing value.
pub const PLACEHOLDER_VALUE: &str = "\u{2014}";
