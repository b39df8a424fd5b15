//! Logging utilities for carbonarr.
//!
//! This module provides structured logging for map composition so that every
//! layer insertion and every failure shows up with searchable fields.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{CarbonarrError, Result};

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
            "Operation failed"
        );
    }
}

/// Run a file-reading step, logging its duration and outcome under one operation id
pub fn log_timed_operation<T, F>(operation: &str, path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let operation_id = generate_operation_id();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        path = %path.display(),
        "Reading layer source"
    );

    let result = f();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => info!(
            operation = operation,
            operation_id = %operation_id,
            path = %path.display(),
            duration_ms = duration_ms,
            "Layer source read"
        ),
        Err(e) => warn!(
            operation = operation,
            operation_id = %operation_id,
            path = %path.display(),
            duration_ms = duration_ms,
            error = %e,
            "Layer source could not be read"
        ),
    }

    result
}

/// Log a layer that was just inserted into the display tree
pub fn log_layer_added(kind: &str, name: &str, layer_count: usize, detail: Option<&str>) {
    info!(
        operation = "add_layer",
        kind = kind,
        layer = name,
        layer_count = layer_count,
        detail = detail.unwrap_or("none"),
        "Layer added"
    );
}

/// Log an error with context
pub fn log_error(error: &CarbonarrError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique operation ID
pub fn generate_operation_id() -> String {
    Uuid::new_v4().to_string()
}
