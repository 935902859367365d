// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Event representation
pub mod services; // Service abstractions

pub use error::{
    auth_error, config_error, external_service_error, not_found, validation_error, CalprobeError,
};

pub use logging::{init, init_with_level, log_error, log_result};

pub use models::{CalendarEvent, EventTime, UpdateRequest};
pub use services::{BoxFuture, CalendarService, ServiceError};
