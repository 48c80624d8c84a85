//! Error taxonomy for the fetch -> convert -> persist chain.
//!
//! Every error aborts the whole cycle and carries enough context to diagnose
//! without re-running: the command text plus stderr for probe failures, the
//! field name plus raw output for parse failures.

use thiserror::Error;

/// Failures while obtaining metrics from the remote host.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The session could not be established: resolution, TCP connect,
    /// handshake, host-key verification, or authentication.
    #[error("connect to {host} failed: {reason}")]
    Connect { host: String, reason: String },

    /// A probe command failed: wrote to stderr, exited non-zero, or hit the
    /// per-command timeout on the session.
    #[error("command `{command}` failed: {detail}")]
    Command { command: String, detail: String },

    /// Probe output was not a number.
    #[error("{field} output {output:?} is not numeric")]
    Parse { field: &'static str, output: String },
}

/// Failures against the relational store. An insert that fails leaves no row
/// visible.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure of one collection cycle.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking fetch task was cancelled or panicked.
    #[error("fetch task failed: {0}")]
    FetchTask(#[source] tokio::task::JoinError),
}
