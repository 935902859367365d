//! Checks the requests the Google-backed service puts on the wire.
//!
//! The hub is pointed at a local wiremock server over plain HTTP and
//! authenticates with a fixed bearer token.

use calprobe_common::{CalendarEvent, CalendarService, EventTime, ServiceError, UpdateRequest};
use calprobe_gcal::{GcalServiceError, GoogleCalendarService};
use chrono::{TimeZone, Utc};
use google_calendar3::hyper_util::client::legacy::connect::HttpConnector;
use google_calendar3::hyper_util::client::legacy::Client;
use google_calendar3::hyper_util::rt::TokioExecutor;
use google_calendar3::CalendarHub;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENT_PATH: &str = "/calendar/v3/calendars/primary/events/evt-1";

fn service_for(server: &MockServer) -> GoogleCalendarService<HttpConnector> {
    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let mut hub = CalendarHub::new(client, "test-token".to_string());
    hub.root_url(format!("{}/", server.uri()));
    hub.base_url(format!("{}/calendar/v3/", server.uri()));
    GoogleCalendarService::new(Arc::new(hub))
}

fn times(zone: &str) -> (EventTime, EventTime) {
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
    (EventTime::new(start, zone), EventTime::new(end, zone))
}

fn stored_event_json() -> Value {
    json!({
        "id": "evt-1",
        "summary": "제목",
        "start": { "dateTime": "2026-10-19T09:00:00Z", "timeZone": "UTC" },
        "end": { "dateTime": "2026-10-19T10:00:00Z", "timeZone": "UTC" }
    })
}

#[tokio::test]
async fn test_update_is_a_put_without_omitted_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(EVENT_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_event_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (start, end) = times("UTC");
    let request = UpdateRequest {
        summary: Some("제목".to_string()),
        start: Some(start),
        end: Some(end),
        ..Default::default()
    };
    let updated = service_for(&server)
        .update_event("primary", "evt-1", request)
        .await
        .unwrap();

    assert_eq!(updated.id.as_deref(), Some("evt-1"));
    assert_eq!(updated.summary.as_deref(), Some("제목"));
    assert!(!updated.has_field("description"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["summary"], "제목");
    assert_eq!(body["start"]["timeZone"], "UTC");
    assert_eq!(body["end"]["timeZone"], "UTC");
    // a full replace: omitted fields are not sent at all, not even as null
    let keys = body.as_object().unwrap();
    assert!(!keys.contains_key("description"));
    assert!(!keys.contains_key("location"));
    assert!(!keys.contains_key("timeZone"));
}

#[tokio::test]
async fn test_rejected_update_maps_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(EVENT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Invalid time zone definition for start time."
            }
        })))
        .mount(&server)
        .await;

    let (start, end) = times("InvalidTimeZone");
    let request = UpdateRequest {
        start: Some(start),
        end: Some(end),
        ..Default::default()
    };
    let err = service_for(&server)
        .update_event("primary", "evt-1", request)
        .await
        .unwrap_err();

    match &err {
        GcalServiceError::Rejected { status, message } => {
            assert_eq!(*status, 400);
            assert!(message.contains("Invalid time zone"));
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_insert_posts_event_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendar/v3/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_event_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (start, end) = times("UTC");
    let event = CalendarEvent {
        summary: Some("테스트 이벤트".to_string()),
        description: Some("이벤트 설명".to_string()),
        location: Some("A회의실".to_string()),
        start: Some(start),
        end: Some(end),
        ..Default::default()
    };
    let created = service_for(&server)
        .insert_event("primary", event)
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("evt-1"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["location"], "A회의실");
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_insert_without_returned_id_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendar/v3/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "제목" })))
        .mount(&server)
        .await;

    let (start, end) = times("UTC");
    let event = CalendarEvent {
        start: Some(start),
        end: Some(end),
        ..Default::default()
    };
    let result = service_for(&server).insert_event("primary", event).await;

    assert!(matches!(result, Err(GcalServiceError::MissingField("id"))));
}

#[tokio::test]
async fn test_delete_sends_delete_without_notifications() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(EVENT_PATH))
        .and(query_param("sendUpdates", "none"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    service_for(&server)
        .delete_event("primary", "evt-1")
        .await
        .unwrap();
}
