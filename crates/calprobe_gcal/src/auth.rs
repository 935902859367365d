// File: crates/calprobe_gcal/src/auth.rs
use calprobe_common::{auth_error, config_error, CalprobeError};
use calprobe_config::GcalConfig;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use std::path::Path;
use tracing::{debug, info};

// Type aliases for clarity
pub type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds a calendar hub authenticated as the configured service account.
///
/// The key file comes from `key_path`, falling back to
/// `GOOGLE_APPLICATION_CREDENTIALS`. When `subject` is set the account
/// impersonates that user (domain-wide delegation). No token is fetched
/// here; the authenticator fetches one for the scopes of the first call.
pub async fn create_calendar_hub(config: &GcalConfig) -> Result<HubType, CalprobeError> {
    let key_path = config.resolved_key_path().ok_or_else(|| {
        config_error("Missing key_path in GcalConfig and GOOGLE_APPLICATION_CREDENTIALS is unset")
    })?;
    debug!("Reading service account key from {}", key_path);

    let sa_key = read_service_account_key(Path::new(&key_path))
        .await
        .map_err(|e| auth_error(format!("reading service account key {}: {}", key_path, e)))?;

    let mut builder = ServiceAccountAuthenticator::builder(sa_key);
    if let Some(subject) = &config.subject {
        builder = builder.subject(subject.clone());
    }
    let auth = builder
        .build()
        .await
        .map_err(|e| auth_error(format!("building service account authenticator: {}", e)))?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| config_error(format!("loading native TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    let hub = CalendarHub::new(client, auth);
    info!("Calendar hub ready for calendar {}", config.calendar_id);

    Ok(hub)
}
