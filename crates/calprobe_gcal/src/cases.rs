//! The update-semantics checks `API_001`..`API_008`.
//!
//! Each check gets its own fixture event: [`UpdateSuite::run_case`] creates
//! it, runs the check and deletes it again whatever the outcome. Failures
//! come back as [`CaseError`] so callers (and `cargo test`) see them.

use std::fmt;
use std::sync::Arc;

use calprobe_common::{CalendarEvent, CalendarService, ServiceError};
use calprobe_config::{AppConfig, FixtureConfig};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::verifier::{EventFixture, UpdateFields};

/// Why a check failed.
#[derive(Error, Debug)]
pub enum CaseError {
    /// The fixture event could not be created. Aborts a suite run.
    #[error("setup failed: {0}")]
    Setup(String),
    /// An update that should have succeeded was refused.
    #[error("update call failed: {0}")]
    Update(String),
    #[error("{field}: expected {expected:?}, got {actual:?}")]
    Mismatch {
        field: String,
        expected: String,
        actual: Option<String>,
    },
    #[error("{0} should be absent from the updated event")]
    UnexpectedField(String),
    /// An update that should have been refused succeeded.
    #[error("update with {0} should have been rejected")]
    ExpectedFailure(String),
}

/// A suite run stopped by a setup failure, with the checks that ran before it.
#[derive(Error, Debug)]
#[error("{case}: setup failed after {} completed checks: {reason}", .partial.outcomes.len())]
pub struct SuiteAborted {
    /// The check whose fixture could not be created.
    pub case: UpdateCase,
    pub reason: String,
    pub partial: SuiteReport,
}

/// The eight update variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateCase {
    SummaryOnly,
    AllFields,
    NullSummary,
    NullDescription,
    NullLocation,
    NullTimeZone,
    InvalidTimeZone,
    NumericTimeZone,
}

impl UpdateCase {
    pub const ALL: [UpdateCase; 8] = [
        UpdateCase::SummaryOnly,
        UpdateCase::AllFields,
        UpdateCase::NullSummary,
        UpdateCase::NullDescription,
        UpdateCase::NullLocation,
        UpdateCase::NullTimeZone,
        UpdateCase::InvalidTimeZone,
        UpdateCase::NumericTimeZone,
    ];

    pub fn id(self) -> &'static str {
        match self {
            UpdateCase::SummaryOnly => "API_001",
            UpdateCase::AllFields => "API_002",
            UpdateCase::NullSummary => "API_003",
            UpdateCase::NullDescription => "API_004",
            UpdateCase::NullLocation => "API_005",
            UpdateCase::NullTimeZone => "API_006",
            UpdateCase::InvalidTimeZone => "API_007",
            UpdateCase::NumericTimeZone => "API_008",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            UpdateCase::SummaryOnly => "only summary given",
            UpdateCase::AllFields => "all fields given",
            UpdateCase::NullSummary => "summary null",
            UpdateCase::NullDescription => "description null",
            UpdateCase::NullLocation => "location null",
            UpdateCase::NullTimeZone => "timeZone null",
            UpdateCase::InvalidTimeZone => "timeZone not a zone name",
            UpdateCase::NumericTimeZone => "timeZone an integer instead of a string",
        }
    }

    /// Runs the check against an already created fixture.
    pub async fn run<S: CalendarService>(self, fixture: &EventFixture<S>) -> Result<(), CaseError> {
        match self {
            UpdateCase::SummaryOnly => {
                let updated = update(fixture, UpdateFields::new().summary("제목")).await?;
                expect_text(&updated, "summary", "제목")
            }
            UpdateCase::AllFields => {
                let fields = UpdateFields::new()
                    .summary("제목 업데이트")
                    .description("설명 업데이트")
                    .location("B회의실")
                    .time_zone("Asia/Seoul");
                let updated = update(fixture, fields).await?;
                expect_text(&updated, "summary", "제목 업데이트")?;
                expect_text(&updated, "description", "설명 업데이트")?;
                expect_text(&updated, "location", "B회의실")?;
                expect_text(&updated, "start.timeZone", "Asia/Seoul")?;
                expect_text(&updated, "end.timeZone", "Asia/Seoul")
            }
            UpdateCase::NullSummary => {
                let updated = update(fixture, UpdateFields::new()).await?;
                expect_absent(&updated, "summary")
            }
            UpdateCase::NullDescription => {
                let updated = update(fixture, UpdateFields::new()).await?;
                expect_absent(&updated, "description")
            }
            UpdateCase::NullLocation => {
                let updated = update(fixture, UpdateFields::new()).await?;
                expect_absent(&updated, "location")
            }
            UpdateCase::NullTimeZone => {
                let updated = update(fixture, UpdateFields::new()).await?;
                // timeZone is never top-level; the zones live under start/end
                expect_absent(&updated, "timeZone")?;
                let fallback = fixture.default_time_zone();
                expect_text(&updated, "start.timeZone", fallback)?;
                expect_text(&updated, "end.timeZone", fallback)
            }
            UpdateCase::InvalidTimeZone => {
                let result = fixture
                    .update_event(UpdateFields::new().time_zone("InvalidTimeZone"))
                    .await;
                expect_rejected(result, "timeZone \"InvalidTimeZone\"")
            }
            UpdateCase::NumericTimeZone => {
                // The typed client cannot carry a number, so the payload is
                // refused while decoding and never reaches the remote.
                let fields = match UpdateFields::from_json(&json!({ "timeZone": 12345 })) {
                    Ok(fields) => fields,
                    Err(e) => {
                        info!("numeric timeZone refused: {}", e);
                        return Ok(());
                    }
                };
                let result = fixture.update_event(fields).await;
                expect_rejected(result, "timeZone 12345")
            }
        }
    }
}

impl fmt::Display for UpdateCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id(), self.title())
    }
}

async fn update<S: CalendarService>(
    fixture: &EventFixture<S>,
    fields: UpdateFields,
) -> Result<CalendarEvent, CaseError> {
    fixture
        .update_event(fields)
        .await
        .map_err(|e| CaseError::Update(e.to_string()))
}

fn expect_text(event: &CalendarEvent, field: &str, expected: &str) -> Result<(), CaseError> {
    let actual = event.text_field(field);
    if actual.as_deref() == Some(expected) {
        Ok(())
    } else {
        Err(CaseError::Mismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

fn expect_absent(event: &CalendarEvent, field: &str) -> Result<(), CaseError> {
    if event.has_field(field) {
        Err(CaseError::UnexpectedField(field.to_string()))
    } else {
        Ok(())
    }
}

/// Passes only when the remote refused the input. An outage or auth failure
/// says nothing about the input and fails the check.
fn expect_rejected<T, E: ServiceError>(result: Result<T, E>, input: &str) -> Result<(), CaseError> {
    match result {
        Ok(_) => Err(CaseError::ExpectedFailure(input.to_string())),
        Err(e) if e.is_rejection() => {
            info!("{} refused as expected: {}", input, e);
            Ok(())
        }
        Err(e) => Err(CaseError::Update(format!(
            "{} was not rejected, the call failed: {}",
            input, e
        ))),
    }
}

/// The outcome of one check in a suite run.
#[derive(Debug)]
pub struct CaseOutcome {
    pub case: UpdateCase,
    pub result: Result<(), CaseError>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a suite run, in execution order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    pub fn failures(&self) -> Vec<&CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed()).collect()
    }
}

/// Runs checks against one calendar, each with a fresh fixture event.
pub struct UpdateSuite<S: CalendarService> {
    service: Arc<S>,
    calendar_id: String,
    fixture: FixtureConfig,
}

impl<S: CalendarService> UpdateSuite<S> {
    pub fn new(service: Arc<S>, calendar_id: impl Into<String>, fixture: FixtureConfig) -> Self {
        Self {
            service,
            calendar_id: calendar_id.into(),
            fixture,
        }
    }

    /// A suite on the configured calendar (`primary` without a gcal section).
    pub fn from_config(service: Arc<S>, config: &AppConfig) -> Self {
        let calendar_id = config
            .gcal
            .as_ref()
            .map(|gcal| gcal.calendar_id.clone())
            .unwrap_or_else(|| "primary".to_string());
        Self::new(service, calendar_id, config.fixture.clone())
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Creates a fixture event for ad-hoc checks. The caller must tear it down.
    pub async fn fixture(&self) -> Result<EventFixture<S>, CaseError> {
        EventFixture::setup(self.service.clone(), &self.calendar_id, &self.fixture)
            .await
            .map_err(|e| CaseError::Setup(e.to_string()))
    }

    /// Setup, run `case`, teardown. Teardown happens on every path past setup.
    pub async fn run_case(&self, case: UpdateCase) -> Result<(), CaseError> {
        let fixture = self.fixture().await?;
        let result = case.run(&fixture).await;
        fixture.teardown().await;
        result
    }

    /// Runs all eight checks in order, logging PASS/FAIL for each.
    ///
    /// A setup failure stops the run; the error carries the outcomes of the
    /// checks that completed before it.
    pub async fn run_all(&self) -> Result<SuiteReport, SuiteAborted> {
        let mut report = SuiteReport::default();

        for case in UpdateCase::ALL {
            let result = self.run_case(case).await;
            match result {
                Err(CaseError::Setup(reason)) => {
                    error!("{}: setup failed, aborting run: {}", case, reason);
                    info!(
                        "{} of {} checks passed before the abort",
                        report.outcomes.len() - report.failures().len(),
                        report.outcomes.len()
                    );
                    return Err(SuiteAborted {
                        case,
                        reason,
                        partial: report,
                    });
                }
                Ok(()) => {
                    info!("{}: PASS", case);
                    report.outcomes.push(CaseOutcome { case, result: Ok(()) });
                }
                Err(e) => {
                    error!("{}: FAIL: {}", case, e);
                    report.outcomes.push(CaseOutcome { case, result: Err(e) });
                }
            }
        }

        info!(
            "{} of {} checks passed",
            report.outcomes.len() - report.failures().len(),
            report.outcomes.len()
        );
        Ok(report)
    }
}
