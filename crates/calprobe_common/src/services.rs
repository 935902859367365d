//! Service abstraction for the remote calendar.
//!
//! The verifier only talks to this trait, so the same checks run against
//! the real Google Calendar API and against the in-memory backend.

use std::future::Future;
use std::pin::Pin;

use crate::models::{CalendarEvent, UpdateRequest};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// An error from a calendar backend.
pub trait ServiceError: std::error::Error + Send + Sync + 'static {
    /// Whether the remote refused the request as invalid, as opposed to
    /// failing to process it (outage, transport or auth failure).
    fn is_rejection(&self) -> bool;
}

/// Operations on events of a remote calendar.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: ServiceError;

    /// Create an event. The returned event carries the server-assigned id.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error>;

    /// Replace the stored event with `request`, returning the stored result.
    ///
    /// Fields left `None` in the request are removed from the event.
    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        request: UpdateRequest,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error>;

    /// Delete an event.
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error>;
}
