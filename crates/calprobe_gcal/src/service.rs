//! Google Calendar service implementation.
//!
//! This module provides the `CalendarService` implementation backed by the
//! `google-calendar3` binding, and an in-memory backend with the same
//! replace semantics for offline runs.

use std::sync::Arc;

use calprobe_common::services::BoxFuture;
use calprobe_common::{
    external_service_error, log_result, not_found, CalendarEvent, CalendarService, CalprobeError,
    EventTime, ServiceError, UpdateRequest,
};
use calprobe_config::GcalConfig;
use google_calendar3::api::{Event, EventDateTime};
use google_calendar3::common::Connector as HubConnector;
use google_calendar3::CalendarHub;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{create_calendar_hub, Connector};

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    /// The service answered with a non-success status.
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Response is missing field: {0}")]
    MissingField(&'static str),
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl GcalServiceError {
    /// Splits the binding's error into remote rejections and everything else.
    fn from_api(err: google_calendar3::Error) -> Self {
        match err {
            google_calendar3::Error::BadRequest(body) => {
                let status = body
                    .pointer("/error/code")
                    .and_then(Value::as_u64)
                    .and_then(|code| u16::try_from(code).ok())
                    .unwrap_or(400);
                let message = body
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("bad request")
                    .to_string();
                GcalServiceError::Rejected { status, message }
            }
            google_calendar3::Error::Failure(response) => GcalServiceError::Rejected {
                status: response.status().as_u16(),
                message: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            },
            other => GcalServiceError::ApiError(other),
        }
    }
}

impl ServiceError for GcalServiceError {
    /// A 4xx answer about the request itself. Auth, missing event and
    /// rate limiting are failures, not rejections.
    fn is_rejection(&self) -> bool {
        match self {
            GcalServiceError::Rejected { status, .. } => {
                (400..500).contains(status) && !matches!(status, 401 | 403 | 404 | 429)
            }
            GcalServiceError::InvalidTimeZone(_) => true,
            _ => false,
        }
    }
}

impl From<GcalServiceError> for CalprobeError {
    fn from(err: GcalServiceError) -> Self {
        match err {
            GcalServiceError::NotFound(id) => not_found(id),
            other => external_service_error("google-calendar", other),
        }
    }
}

fn to_google_time(time: EventTime) -> EventDateTime {
    EventDateTime {
        date_time: time.date_time,
        time_zone: time.time_zone,
        ..Default::default()
    }
}

fn from_google_time(time: EventDateTime) -> EventTime {
    EventTime {
        date_time: time.date_time,
        time_zone: time.time_zone,
    }
}

/// The binding's event body for an insert.
pub fn to_google_event(event: CalendarEvent) -> Event {
    Event {
        id: event.id,
        summary: event.summary,
        description: event.description,
        location: event.location,
        start: event.start.map(to_google_time),
        end: event.end.map(to_google_time),
        ..Default::default() // Use default for other fields
    }
}

/// The binding's event body for a full-replace update.
pub fn to_google_update(request: UpdateRequest) -> Event {
    Event {
        summary: request.summary,
        description: request.description,
        location: request.location,
        start: request.start.map(to_google_time),
        end: request.end.map(to_google_time),
        ..Default::default()
    }
}

/// The crate's view of an event returned by the API.
pub fn from_google_event(event: Event) -> CalendarEvent {
    CalendarEvent {
        id: event.id,
        summary: event.summary,
        description: event.description,
        location: event.location,
        start: event.start.map(from_google_time),
        end: event.end.map(from_google_time),
    }
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService<C = Connector> {
    calendar_hub: Arc<CalendarHub<C>>,
    scopes: Vec<String>,
}

impl<C> GoogleCalendarService<C> {
    /// Create a new Google Calendar service. Calls use the hub's default scopes.
    pub fn new(calendar_hub: Arc<CalendarHub<C>>) -> Self {
        Self {
            calendar_hub,
            scopes: Vec::new(),
        }
    }

    /// Request these OAuth scopes on every call instead of the defaults.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }
}

impl GoogleCalendarService<Connector> {
    /// Authenticates with the configured service account and builds the service.
    pub async fn connect(config: &GcalConfig) -> Result<Self, CalprobeError> {
        let hub = log_result(
            create_calendar_hub(config).await,
            "Connected to Google Calendar",
            "Google Calendar authentication failed",
        )?;
        Ok(Self::new(Arc::new(hub)).with_scopes(config.scopes.clone()))
    }
}

impl<C> CalendarService for GoogleCalendarService<C>
where
    C: HubConnector,
{
    type Error = GcalServiceError;

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let (_response, created) = self
                .calendar_hub
                .events()
                .insert(to_google_event(event), &calendar_id)
                .add_scopes(self.scopes.iter())
                .doit()
                .await
                .map_err(GcalServiceError::from_api)?;

            if created.id.is_none() {
                return Err(GcalServiceError::MissingField("id"));
            }
            info!("Created event {:?} in {}", created.id, calendar_id);
            Ok(from_google_event(created))
        })
    }

    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        request: UpdateRequest,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            debug!("Replacing event {} in {} with {:?}", event_id, calendar_id, request);

            // events.update is a PUT: fields missing from the body are cleared
            let (_response, updated) = self
                .calendar_hub
                .events()
                .update(to_google_update(request), &calendar_id, &event_id)
                .add_scopes(self.scopes.iter())
                .doit()
                .await
                .map_err(GcalServiceError::from_api)?;

            Ok(from_google_event(updated))
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            self.calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .send_updates("none")
                .add_scopes(self.scopes.iter())
                .doit()
                .await
                .map_err(GcalServiceError::from_api)?;

            info!("Deleted event {} from {}", event_id, calendar_id);
            Ok(())
        })
    }
}

/// In-memory calendar with the remote's replace semantics.
///
/// Updates replace the whole stored event, and every `timeZone` is checked
/// against the IANA database the way the remote checks it.
pub mod mock {
    use super::*;
    use chrono_tz::Tz;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    type Store = HashMap<String, HashMap<String, CalendarEvent>>;

    /// Mock calendar service for tests and offline runs.
    #[derive(Default)]
    pub struct MockCalendarService {
        events: Mutex<Store>,
        fail_inserts: AtomicBool,
        fail_updates: AtomicBool,
        update_calls: AtomicUsize,
    }

    impl MockCalendarService {
        /// Create a new mock calendar service.
        pub fn new() -> Self {
            Self::default()
        }

        /// Every insert fails, as if credentials were rejected.
        pub fn with_failing_inserts(self) -> Self {
            self.fail_inserts.store(true, Ordering::SeqCst);
            self
        }

        /// Every update fails with a server error.
        pub fn with_failing_updates(self) -> Self {
            self.fail_updates.store(true, Ordering::SeqCst);
            self
        }

        /// Number of events currently stored in `calendar_id`.
        pub fn event_count(&self, calendar_id: &str) -> usize {
            self.store().get(calendar_id).map_or(0, HashMap::len)
        }

        /// The stored event, if any.
        pub fn stored_event(&self, calendar_id: &str, event_id: &str) -> Option<CalendarEvent> {
            self.store()
                .get(calendar_id)
                .and_then(|events| events.get(event_id))
                .cloned()
        }

        /// How many update calls were received, successful or not.
        pub fn update_calls(&self) -> usize {
            self.update_calls.load(Ordering::SeqCst)
        }

        fn store(&self) -> MutexGuard<'_, Store> {
            self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    fn validate_time(field: &'static str, time: Option<&EventTime>) -> Result<(), GcalServiceError> {
        let time = time.ok_or(GcalServiceError::Rejected {
            status: 400,
            message: format!("Missing {} time.", field),
        })?;
        if time.date_time.is_none() {
            return Err(GcalServiceError::Rejected {
                status: 400,
                message: format!("Missing {} dateTime.", field),
            });
        }
        match &time.time_zone {
            Some(zone) if zone.parse::<Tz>().is_err() => {
                Err(GcalServiceError::InvalidTimeZone(zone.clone()))
            }
            _ => Ok(()),
        }
    }

    fn validate(event: &CalendarEvent) -> Result<(), GcalServiceError> {
        validate_time("start", event.start.as_ref())?;
        validate_time("end", event.end.as_ref())
    }

    impl CalendarService for MockCalendarService {
        type Error = GcalServiceError;

        fn insert_event(
            &self,
            calendar_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
            let calendar_id = calendar_id.to_string();

            Box::pin(async move {
                if self.fail_inserts.load(Ordering::SeqCst) {
                    return Err(GcalServiceError::Injected("insert refused".to_string()));
                }
                validate(&event)?;

                let event_id = format!("mock-event-{}", uuid::Uuid::new_v4().simple());
                let stored = CalendarEvent {
                    id: Some(event_id.clone()),
                    ..event
                };

                self.store()
                    .entry(calendar_id)
                    .or_default()
                    .insert(event_id, stored.clone());
                Ok(stored)
            })
        }

        fn update_event(
            &self,
            calendar_id: &str,
            event_id: &str,
            request: UpdateRequest,
        ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
            let calendar_id = calendar_id.to_string();
            let event_id = event_id.to_string();

            Box::pin(async move {
                self.update_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_updates.load(Ordering::SeqCst) {
                    return Err(GcalServiceError::Rejected {
                        status: 503,
                        message: "Backend Error".to_string(),
                    });
                }

                let replacement = request.into_event(event_id.clone());
                validate(&replacement)?;

                let mut store = self.store();
                let slot = store
                    .get_mut(&calendar_id)
                    .and_then(|events| events.get_mut(&event_id))
                    .ok_or_else(|| GcalServiceError::NotFound(event_id.clone()))?;
                *slot = replacement.clone();
                Ok(replacement)
            })
        }

        fn delete_event(
            &self,
            calendar_id: &str,
            event_id: &str,
        ) -> BoxFuture<'_, (), Self::Error> {
            let calendar_id = calendar_id.to_string();
            let event_id = event_id.to_string();

            Box::pin(async move {
                self.store()
                    .get_mut(&calendar_id)
                    .and_then(|events| events.remove(&event_id))
                    .map(|_| ())
                    .ok_or(GcalServiceError::NotFound(event_id))
            })
        }
    }
}
