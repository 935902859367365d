//! The calendar event representation shared by every backend.
//!
//! Field names serialize the way the remote API spells them (`timeZone`,
//! `dateTime`) and absent fields are left out entirely, so the JSON form of
//! a [`CalendarEvent`] answers "does the result contain this field" the same
//! way the remote response does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Start or end of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn new(date_time: DateTime<Utc>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time),
            time_zone: Some(time_zone.into()),
        }
    }
}

/// A calendar event as stored by the remote service.
///
/// `id` is assigned by the service on insert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
}

impl CalendarEvent {
    /// The JSON representation, with absent fields omitted.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Looks up a field by dotted path, e.g. `"summary"` or `"start.timeZone"`.
    pub fn field(&self, path: &str) -> Option<Value> {
        let pointer = format!("/{}", path.replace('.', "/"));
        self.to_json().pointer(&pointer).cloned()
    }

    /// Whether the representation contains the field at `path`.
    pub fn has_field(&self, path: &str) -> bool {
        self.field(path).is_some()
    }

    /// The field at `path` when it is a string.
    pub fn text_field(&self, path: &str) -> Option<String> {
        match self.field(path)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Body of a full-replace update.
///
/// Every field that is `None` is dropped from the stored event, not left
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
}

impl UpdateRequest {
    /// The event that results from replacing the stored event `id` with this body.
    pub fn into_event(self, id: impl Into<String>) -> CalendarEvent {
        CalendarEvent {
            id: Some(id.into()),
            summary: self.summary,
            description: self.description,
            location: self.location,
            start: self.start,
            end: self.end,
        }
    }
}
