//! Remote table access.
//!
//! The [`TableSource`] trait is the one seam between the pipeline and the
//! remote store: a single range-bounded read of a table projection. The
//! production implementation is [`RestStore`], which speaks PostgREST over
//! HTTP. Tests substitute an in-memory source.

mod rest;

pub use rest::RestStore;

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// A failed range request. Any one of these aborts the whole pipeline run.
#[derive(Error, Debug)]
pub enum RemoteReadError {
    #[error("Request for table {table} failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Table {table} rows {start}-{end}: server returned {status}: {message}")]
    Status {
        table: String,
        start: usize,
        end: usize,
        status: u16,
        message: String,
    },
    #[error("Table {table}: could not decode rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Range-bounded reads against remote tables.
///
/// `start` and `end` are inclusive row offsets. Implementations return at
/// most `end - start + 1` rows; fewer means the table is exhausted. Row order
/// must be stable across calls for the same query.
pub trait TableSource: Sync {
    fn fetch_range(
        &self,
        table: &str,
        columns: &str,
        start: usize,
        end: usize,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteReadError>> + Send;
}
