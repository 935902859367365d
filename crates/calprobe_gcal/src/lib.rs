// Declare modules within this crate
pub mod auth;
pub mod cases;
pub mod service;
#[cfg(test)]
mod service_proptest;
pub mod verifier;

pub use cases::{CaseError, CaseOutcome, SuiteAborted, SuiteReport, UpdateCase, UpdateSuite};
pub use service::{mock::MockCalendarService, GcalServiceError, GoogleCalendarService};
pub use verifier::{EventFixture, SetupError, UpdateFields};
