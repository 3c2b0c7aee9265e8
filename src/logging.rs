//! Logging utilities for skope-session.
//!
//! Structured `tracing` events for session mutations, so a session can be
//! replayed from its log.

use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::status::{RequestStatus, Severity};

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log a summary of a loaded catalog
pub fn log_catalog_stats(file_path: &str, dataset_count: usize, variable_count: usize) {
    info!(
        operation = "catalog_load",
        file_path = file_path,
        dataset_count = dataset_count,
        variable_count = variable_count,
        "Catalog loaded successfully"
    );
}

/// Log a change of the time-series request status, at a level matching its severity
pub fn log_status_transition(from: &RequestStatus, to: &RequestStatus) {
    match to.severity() {
        Severity::Info => info!(
            operation = "time_series_status",
            from = from.kind(),
            status = to.kind(),
            "Request status changed"
        ),
        Severity::Warning => warn!(
            operation = "time_series_status",
            from = from.kind(),
            status = to.kind(),
            "Request status changed"
        ),
        Severity::Error => error!(
            operation = "time_series_status",
            from = from.kind(),
            status = to.kind(),
            messages = to.messages().len(),
            "Request failed"
        ),
    }
}

/// Log an error with context
pub fn log_error(error: &crate::error::SessionError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
