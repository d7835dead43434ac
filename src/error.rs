// src/error.rs
// =============================================================================
// Errors that can fail a whole audit.
//
// Most things that go wrong during an audit are NOT errors: a dead host, a
// timeout or a malformed URL is recorded as a category on that URL's outcome
// and the audit carries on. Only failures that stop the worker pool from
// doing its job at all end up here.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The shared HTTP client could not be constructed (TLS backend, bad header, ...)
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A checker worker panicked or was aborted before draining its share of the queue
    #[error("checker worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AuditError>;
