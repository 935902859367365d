use serde::{Deserialize, Serialize};

/// Scope granting read/write access to calendars and events.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

// --- Google Calendar Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    // Falls back to GOOGLE_APPLICATION_CREDENTIALS when unset.
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    // Impersonated user for domain-wide delegation
    #[serde(default)]
    pub subject: Option<String>,
}

impl Default for GcalConfig {
    fn default() -> Self {
        Self {
            key_path: None,
            calendar_id: default_calendar_id(),
            scopes: default_scopes(),
            subject: None,
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![CALENDAR_SCOPE.to_string()]
}

// --- Fixture event ---
// The event every check creates in setup and deletes in teardown.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixtureConfig {
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_start_offset_hours")]
    pub start_offset_hours: i64,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
    #[serde(default = "default_time_zone")]
    pub default_time_zone: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            summary: default_summary(),
            description: default_description(),
            location: default_location(),
            start_offset_hours: default_start_offset_hours(),
            duration_minutes: default_duration_minutes(),
            default_time_zone: default_time_zone(),
        }
    }
}

fn default_summary() -> String {
    "테스트 이벤트".to_string()
}

fn default_description() -> String {
    "이벤트 설명".to_string()
}

fn default_location() -> String {
    "A회의실".to_string()
}

fn default_start_offset_hours() -> i64 {
    24
}

fn default_duration_minutes() -> i64 {
    60
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub fixture: FixtureConfig,
}
