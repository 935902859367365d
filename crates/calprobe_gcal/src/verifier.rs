//! The per-check event fixture.
//!
//! An [`EventFixture`] owns exactly one remote event: it is created by
//! [`EventFixture::setup`] and removed by [`EventFixture::teardown`]. Checks
//! never share a fixture.

use std::sync::Arc;

use calprobe_common::{
    validation_error, CalendarEvent, CalendarService, CalprobeError, EventTime, UpdateRequest,
};
use calprobe_config::FixtureConfig;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// What a check changes in an update. Every `None` is sent as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl UpdateFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// Decodes fields from a loosely typed payload such as
    /// `{"summary": null, "timeZone": "Asia/Seoul"}`.
    ///
    /// Non-text values (a numeric `timeZone`, say) and unknown keys are
    /// refused here, before any request is sent.
    pub fn from_json(payload: &Value) -> Result<Self, CalprobeError> {
        Self::deserialize(payload)
            .map_err(|e| validation_error(format!("invalid update payload {}: {}", payload, e)))
    }
}

/// One remote event owned by one check.
pub struct EventFixture<S: CalendarService> {
    service: Arc<S>,
    calendar_id: String,
    event: CalendarEvent,
    event_id: String,
    default_time_zone: String,
}

impl<S: CalendarService> EventFixture<S> {
    /// Creates the fixture event: starts `start_offset_hours` from now and
    /// lasts `duration_minutes`, with the configured text fields.
    pub async fn setup(
        service: Arc<S>,
        calendar_id: &str,
        config: &FixtureConfig,
    ) -> Result<Self, SetupError<S::Error>> {
        let (start_time, end_time) = fixture_window(config)?;

        let event = CalendarEvent {
            id: None,
            summary: Some(config.summary.clone()),
            description: Some(config.description.clone()),
            location: Some(config.location.clone()),
            start: Some(EventTime::new(start_time, config.default_time_zone.as_str())),
            end: Some(EventTime::new(end_time, config.default_time_zone.as_str())),
        };

        let created = service
            .insert_event(calendar_id, event)
            .await
            .map_err(SetupError::Insert)?;
        let event_id = created.id.clone().ok_or(SetupError::MissingId)?;
        info!("Fixture event {} created in {}", event_id, calendar_id);

        Ok(Self {
            service,
            calendar_id: calendar_id.to_string(),
            event: created,
            event_id,
            default_time_zone: config.default_time_zone.clone(),
        })
    }

    /// The event as the service returned it on insert.
    pub fn event(&self) -> &CalendarEvent {
        &self.event
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Zone used for start/end when an update leaves `time_zone` out.
    pub fn default_time_zone(&self) -> &str {
        &self.default_time_zone
    }

    /// The full-replace body for `fields`.
    ///
    /// Start and end keep the created event's timestamps; both take
    /// `fields.time_zone`, or the default zone when it is absent.
    pub fn build_request(&self, fields: UpdateFields) -> UpdateRequest {
        let time_zone = fields
            .time_zone
            .unwrap_or_else(|| self.default_time_zone.clone());
        let retimed = |time: Option<&EventTime>| EventTime {
            date_time: time.and_then(|t| t.date_time),
            time_zone: Some(time_zone.clone()),
        };

        UpdateRequest {
            summary: fields.summary,
            description: fields.description,
            location: fields.location,
            start: Some(retimed(self.event.start.as_ref())),
            end: Some(retimed(self.event.end.as_ref())),
        }
    }

    /// Sends `fields` as a full-replace update and returns the stored result.
    pub async fn update_event(&self, fields: UpdateFields) -> Result<CalendarEvent, S::Error> {
        let request = self.build_request(fields);
        debug!("Updating fixture event {}", self.event_id);
        self.service
            .update_event(&self.calendar_id, &self.event_id, request)
            .await
    }

    /// Deletes the fixture event. Failures are logged, not returned.
    pub async fn teardown(self) {
        match self
            .service
            .delete_event(&self.calendar_id, &self.event_id)
            .await
        {
            Ok(()) => debug!("Fixture event {} deleted", self.event_id),
            Err(e) => warn!(
                "Could not delete fixture event {} from {}: {}",
                self.event_id, self.calendar_id, e
            ),
        }
    }
}

/// Start and end of the fixture event, from now.
fn fixture_window<E: std::error::Error + 'static>(
    config: &FixtureConfig,
) -> Result<(DateTime<Utc>, DateTime<Utc>), SetupError<E>> {
    if config.duration_minutes <= 0 {
        return Err(SetupError::InvalidFixture(format!(
            "duration_minutes must be positive, got {}",
            config.duration_minutes
        )));
    }
    let offset = Duration::try_hours(config.start_offset_hours).ok_or_else(|| {
        SetupError::InvalidFixture(format!(
            "start_offset_hours {} is out of range",
            config.start_offset_hours
        ))
    })?;
    let duration = Duration::try_minutes(config.duration_minutes).ok_or_else(|| {
        SetupError::InvalidFixture(format!(
            "duration_minutes {} is out of range",
            config.duration_minutes
        ))
    })?;

    let start_time = Utc::now().checked_add_signed(offset).ok_or_else(|| {
        SetupError::InvalidFixture(format!(
            "start {} hours from now is not a representable time",
            config.start_offset_hours
        ))
    })?;
    let end_time = start_time.checked_add_signed(duration).ok_or_else(|| {
        SetupError::InvalidFixture(format!(
            "end {} minutes after {} is not a representable time",
            config.duration_minutes, start_time
        ))
    })?;
    Ok((start_time, end_time))
}

/// Why a fixture could not be created.
#[derive(Error, Debug)]
pub enum SetupError<E: std::error::Error + 'static> {
    #[error("creating the fixture event failed: {0}")]
    Insert(#[source] E),
    #[error("the created event has no id")]
    MissingId,
    /// The fixture settings do not describe a usable time window.
    #[error("invalid fixture settings: {0}")]
    InvalidFixture(String),
}
