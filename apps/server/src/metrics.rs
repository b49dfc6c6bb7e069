//! Prometheus metrics for the registry server

use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cde_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "cde_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUEST_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "cde_http_request_size_bytes",
        "HTTP request body size in bytes",
        &["method", "path"],
        vec![100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0, 5_000_000.0]
    )
    .expect("Failed to register HTTP_REQUEST_SIZE_BYTES");

    /// Unit-of-work flushes by outcome (committed, empty, failed)
    pub static ref STORE_COMMITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cde_store_commits_total",
        "Unit-of-work flushes by storage backend and outcome",
        &["backend", "outcome"]
    )
    .expect("Failed to register STORE_COMMITS_TOTAL");

    pub static ref STORE_COMMIT_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "cde_store_commit_duration_seconds",
        "Unit-of-work flush duration in seconds",
        &["backend"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("Failed to register STORE_COMMIT_DURATION_SECONDS");

    /// Rows removed by cascading deletes, by table
    pub static ref CASCADE_ROWS_REMOVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cde_cascade_rows_removed_total",
        "Rows removed by set and element cascade deletes",
        &["root"]
    )
    .expect("Failed to register CASCADE_ROWS_REMOVED_TOTAL");

    /// Module imports by operation (create, update, source) and status
    pub static ref MODULE_IMPORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cde_module_imports_total",
        "Module XML imports",
        &["operation", "status"]
    )
    .expect("Failed to register MODULE_IMPORTS_TOTAL");
}

/// Replace identifier path segments with placeholders to bound label cardinality.
pub fn sanitize_path(path: &str) -> String {
    if path == "/" || path.is_empty() {
        return "/".to_string();
    }

    let mut previous = "";
    let mut out = Vec::new();
    for segment in path.split('/') {
        let label = if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            "{id}"
        } else if previous == "source" && !segment.is_empty() {
            // module identifiers from the external source are free-form
            "{moduleId}"
        } else {
            segment
        };
        out.push(label);
        previous = segment;
    }
    out.join("/")
}

/// Record the outcome of a module import.
pub fn record_module_import(operation: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    MODULE_IMPORTS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_path_replaces_numeric_ids() {
        assert_eq!(sanitize_path("/sets"), "/sets");
        assert_eq!(sanitize_path("/sets/42"), "/sets/{id}");
        assert_eq!(
            sanitize_path("/sets/42/elements/7"),
            "/sets/{id}/elements/{id}"
        );
        assert_eq!(sanitize_path("/elements/search"), "/elements/search");
        assert_eq!(
            sanitize_path("/module/source/lung-rads"),
            "/module/source/{moduleId}"
        );
        assert_eq!(sanitize_path("/"), "/");
    }
}
