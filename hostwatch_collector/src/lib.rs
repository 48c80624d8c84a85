//! Core library for hostwatch: SSH probes in, MariaDB rows out.
//!
//! The pipeline is fetch -> parse -> stamp -> insert, with failure isolation
//! between the remote fetch and the database write: any error aborts the
//! cycle before a row becomes visible. One invocation is one cycle; retry is
//! the scheduler's next interval.

pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod remote;
pub mod store;
pub mod types;
