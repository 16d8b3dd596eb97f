//! Application configuration.
//!
//! Every value is resolved with the priority: config.toml > environment (.env) > default.
//! A broken config.toml is reported and ignored rather than aborting startup.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ==================== Defaults ====================

/// Server address to bind to
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Deck file loaded at startup
pub const DEFAULT_DECK_PATH: &str = "flashcards.json";

/// Directory receiving one JSONL log per session
pub const DEFAULT_LOG_DIR: &str = "runs";

/// Session cookie lifetime in hours
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 12;

/// Upper bound for the session lifetime (one year)
pub const MAX_SESSION_EXPIRY_HOURS: i64 = 24 * 365;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SUBJECT: &str = "C++";
pub const DEFAULT_MAX_TOKENS: u32 = 350;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_GRADER_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE: &str = "config.toml";

// ==================== File Structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    deck: Option<DeckSection>,
    logs: Option<LogsSection>,
    session: Option<SessionSection>,
    grader: Option<GraderSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DeckSection {
    path: Option<String>,
    shuffle: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LogsSection {
    dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionSection {
    secret: Option<String>,
    expiry_hours: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct GraderSection {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    subject: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

// ==================== Resolved Config ====================

/// Settings for the grading client.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// `None` disables grading; the UI shows a banner instead of failing startup.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Interview topic injected into the grading prompt
    pub subject: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GraderConfig {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub server_port: u16,
    pub deck_path: PathBuf,
    pub shuffle_deck: bool,
    pub log_dir: PathBuf,
    /// Secret the session cookie signing key is derived from
    pub session_secret: Option<String>,
    pub session_expiry_hours: i64,
    pub grader: GraderConfig,
}

impl Config {
    /// Load configuration from `.env`, `config.toml` and the process environment.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string(CONFIG_FILE).ok();
        if file.is_some() {
            tracing::info!("Reading configuration from {}", CONFIG_FILE);
        }
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from raw config.toml contents and an environment lookup.
    pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = match file.map(toml::from_str::<FileConfig>) {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid {}: {}", CONFIG_FILE, e);
                FileConfig::default()
            }
            None => FileConfig::default(),
        };

        let server = file.server.unwrap_or_default();
        let deck = file.deck.unwrap_or_default();
        let logs = file.logs.unwrap_or_default();
        let session = file.session.unwrap_or_default();
        let grader = file.grader.unwrap_or_default();

        let env_text = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = grader
            .api_key
            .or_else(|| env_text("OPENAI_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        Self {
            server_addr: server
                .addr
                .or_else(|| env_text("SERVER_ADDR"))
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            server_port: server
                .port
                .unwrap_or_else(|| parse_env(&env, "PORT", DEFAULT_SERVER_PORT)),
            deck_path: PathBuf::from(
                deck.path
                    .or_else(|| env_text("DECK_PATH"))
                    .unwrap_or_else(|| DEFAULT_DECK_PATH.to_string()),
            ),
            shuffle_deck: deck
                .shuffle
                .unwrap_or_else(|| parse_env(&env, "DECK_SHUFFLE", false)),
            log_dir: PathBuf::from(
                logs.dir
                    .or_else(|| env_text("LOG_DIR"))
                    .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            ),
            session_secret: session.secret.or_else(|| env_text("SESSION_SECRET")),
            session_expiry_hours: checked_expiry_hours(session.expiry_hours.unwrap_or_else(|| {
                parse_env(&env, "SESSION_EXPIRY_HOURS", DEFAULT_SESSION_EXPIRY_HOURS)
            })),
            grader: GraderConfig {
                api_key,
                base_url: grader
                    .base_url
                    .or_else(|| env_text("OPENAI_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                model: grader
                    .model
                    .or_else(|| env_text("OPENAI_MODEL"))
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                subject: grader
                    .subject
                    .or_else(|| env_text("GRADER_SUBJECT"))
                    .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
                max_tokens: grader.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: grader.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                timeout: Duration::from_secs(grader.timeout_secs.unwrap_or_else(|| {
                    parse_env(&env, "GRADER_TIMEOUT_SECS", DEFAULT_GRADER_TIMEOUT_SECS)
                })),
            },
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match env(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        _ => default,
    }
}

/// Session lifetime must be positive and at most a year.
fn checked_expiry_hours(hours: i64) -> i64 {
    if (1..=MAX_SESSION_EXPIRY_HOURS).contains(&hours) {
        hours
    } else {
        tracing::warn!(
            "Session expiry of {} hours is outside 1..={}, using default",
            hours,
            MAX_SESSION_EXPIRY_HOURS
        );
        DEFAULT_SESSION_EXPIRY_HOURS
    }
}
