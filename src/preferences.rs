//! User preferences kept in local storage.
//!
//! Every accessor falls back to its default when the key is absent or the
//! stored value does not parse. Writes through [`set_preference`] are
//! validated for the known keys; other keys are stored as-is.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{self, DatabaseError};
use crate::models::{Language, Theme};

pub const KEY_THEME: &str = "theme";
pub const KEY_ACCENT_COLOR: &str = "accentColor";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_DATE_FORMAT: &str = "dateFormat";
pub const KEY_WORLD_CLOCKS: &str = "worldClocks";
pub const KEY_TELEGRAM_TOKEN: &str = "telegram_bot_token";
pub const KEY_TELEGRAM_INSTRUCTIONS: &str = "telegram_bot_instructions";
pub const KEY_TELEGRAM_CONNECTED: &str = "telegram_bot_connected";

pub const DEFAULT_THEME: Theme = Theme::Dark;
pub const DEFAULT_ACCENT_COLOR: &str = "#00D4AA";
pub const DEFAULT_LANGUAGE: Language = Language::Ru;
pub const DEFAULT_DATE_FORMAT: &str = "DD.MM.YYYY";
pub const DEFAULT_WORLD_CLOCKS: [&str; 4] = [
    "Europe/Moscow",
    "Europe/London",
    "America/New_York",
    "Asia/Tokyo",
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Snapshot of every known preference, defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub accent_color: String,
    pub language: Language,
    pub date_format: String,
    pub world_clocks: Vec<String>,
    pub telegram: TelegramSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub instructions: Option<String>,
    pub connected: bool,
}

pub fn load_preferences(conn: &Connection) -> Result<Preferences, DatabaseError> {
    Ok(Preferences {
        theme: theme(conn)?,
        accent_color: accent_color(conn)?,
        language: language(conn)?,
        date_format: date_format(conn)?,
        world_clocks: world_clocks(conn)?,
        telegram: telegram_settings(conn)?,
    })
}

// ─── Typed accessors ──────────────────────────────────────────────────────────

pub fn theme(conn: &Connection) -> Result<Theme, DatabaseError> {
    Ok(db::get_item(conn, KEY_THEME)?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_THEME))
}

pub fn set_theme(conn: &Connection, theme: Theme) -> Result<(), DatabaseError> {
    db::set_item(conn, KEY_THEME, theme.as_str())
}

pub fn accent_color(conn: &Connection) -> Result<String, DatabaseError> {
    Ok(db::get_item(conn, KEY_ACCENT_COLOR)?
        .filter(|raw| HEX_COLOR.is_match(raw))
        .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string()))
}

/// Only `ru` and `en` are honoured; anything else reads as `ru`.
pub fn language(conn: &Connection) -> Result<Language, DatabaseError> {
    Ok(db::get_item(conn, KEY_LANGUAGE)?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_LANGUAGE))
}

pub fn set_language(conn: &Connection, language: Language) -> Result<(), DatabaseError> {
    db::set_item(conn, KEY_LANGUAGE, language.as_str())
}

pub fn date_format(conn: &Connection) -> Result<String, DatabaseError> {
    Ok(db::get_item(conn, KEY_DATE_FORMAT)?
        .filter(|raw| !raw.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()))
}

pub fn world_clocks(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    match db::get_json::<Vec<String>>(conn, KEY_WORLD_CLOCKS) {
        Ok(Some(zones)) => Ok(zones),
        Ok(None) => Ok(default_world_clocks()),
        Err(DatabaseError::MalformedValue { key, reason }) => {
            tracing::warn!(%key, %reason, "Stored world clocks unreadable, using defaults");
            Ok(default_world_clocks())
        }
        Err(e) => Err(e),
    }
}

pub fn set_world_clocks(conn: &Connection, zones: &[String]) -> Result<(), DatabaseError> {
    db::set_json(conn, KEY_WORLD_CLOCKS, &zones)
}

fn default_world_clocks() -> Vec<String> {
    DEFAULT_WORLD_CLOCKS.iter().map(|z| z.to_string()).collect()
}

pub fn telegram_settings(conn: &Connection) -> Result<TelegramSettings, DatabaseError> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    Ok(TelegramSettings {
        bot_token: non_empty(db::get_item(conn, KEY_TELEGRAM_TOKEN)?),
        instructions: non_empty(db::get_item(conn, KEY_TELEGRAM_INSTRUCTIONS)?),
        connected: db::get_item(conn, KEY_TELEGRAM_CONNECTED)?.as_deref() == Some("true"),
    })
}

/// Persist token, instructions and connection flag together.
pub fn save_telegram_settings(
    conn: &Connection,
    settings: &TelegramSettings,
) -> Result<(), DatabaseError> {
    db::set_item(
        conn,
        KEY_TELEGRAM_TOKEN,
        settings.bot_token.as_deref().unwrap_or(""),
    )?;
    db::set_item(
        conn,
        KEY_TELEGRAM_INSTRUCTIONS,
        settings.instructions.as_deref().unwrap_or(""),
    )?;
    db::set_item(
        conn,
        KEY_TELEGRAM_CONNECTED,
        if settings.connected { "true" } else { "false" },
    )
}

/// Mark the bot disconnected; token and instructions stay stored.
pub fn disconnect_telegram(conn: &Connection) -> Result<(), DatabaseError> {
    db::set_item(conn, KEY_TELEGRAM_CONNECTED, "false")
}

// ─── Raw key access (HTTP layer) ──────────────────────────────────────────────

/// Validate a raw value for a known key before storing it.
pub fn validate_preference(key: &str, value: &str) -> Result<(), DatabaseError> {
    let invalid = |reason: &str| DatabaseError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    match key {
        KEY_THEME => value
            .parse::<Theme>()
            .map(|_| ())
            .map_err(|_| invalid("expected light, dark or system")),
        KEY_LANGUAGE => value
            .parse::<Language>()
            .map(|_| ())
            .map_err(|_| invalid("expected ru or en")),
        KEY_ACCENT_COLOR if !HEX_COLOR.is_match(value) => Err(invalid("expected #RRGGBB")),
        KEY_WORLD_CLOCKS => serde_json::from_str::<Vec<String>>(value)
            .map(|_| ())
            .map_err(|_| invalid("expected a JSON array of time zone names")),
        KEY_TELEGRAM_CONNECTED if value != "true" && value != "false" => {
            Err(invalid("expected true or false"))
        }
        _ => Ok(()),
    }
}

pub fn set_preference(conn: &Connection, key: &str, value: &str) -> Result<(), DatabaseError> {
    validate_preference(key, value)?;
    db::set_item(conn, key, value)?;
    tracing::debug!(%key, "Preference updated");
    Ok(())
}
