use std::fmt;
use thiserror::Error;

/// The base error type shared by the calprobe crates.
///
/// Backend-specific errors convert into this when they cross a crate
/// boundary that does not care about the backend.
#[derive(Error, Debug)]
pub enum CalprobeError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Credential loading or token acquisition failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// A request was refused before it left the process
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The remote calendar service failed or rejected a call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),
}

pub fn config_error<T: fmt::Display>(message: T) -> CalprobeError {
    CalprobeError::ConfigError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> CalprobeError {
    CalprobeError::AuthError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> CalprobeError {
    CalprobeError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CalprobeError {
    CalprobeError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> CalprobeError {
    CalprobeError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_service_error_display() {
        let err = external_service_error("google-calendar", "400 Bad Request");
        assert_eq!(
            err.to_string(),
            "External service error: google-calendar - 400 Bad Request"
        );
    }

    #[test]
    fn test_helpers_pick_variant() {
        assert!(matches!(config_error("x"), CalprobeError::ConfigError(_)));
        assert!(matches!(auth_error("x"), CalprobeError::AuthError(_)));
        assert!(matches!(validation_error("x"), CalprobeError::ValidationError(_)));
        assert_eq!(not_found("evt-1").to_string(), "Not found: evt-1");
    }
}
