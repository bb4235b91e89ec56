//! Bulk table reader.
//!
//! The store caps every response at `fetch_limit` rows, so a whole table is
//! read as a sequence of contiguous ranges:
//!
//! ```text
//! [0, L-1]  →  L rows
//! [L, 2L-1] →  L rows
//! [2L, 3L-1] → k < L rows   (stop)
//! ```
//!
//! The offset advances by the number of rows actually returned and reading
//! stops at the first short page. A table whose size is an exact multiple of
//! `L` costs one extra request that comes back empty. Requests for one table
//! are strictly sequential; there is no deduplication, so a store without a
//! stable row order can skip or repeat rows.

use crate::config::TableConfig;
use crate::store::{RemoteReadError, TableSource};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Read every row of `table`, decoding each into `T`.
///
/// The first failing request aborts the read; rows fetched before it are
/// discarded.
pub async fn read_all<S, T>(
    source: &S,
    table: &TableConfig,
    fetch_limit: usize,
) -> Result<Vec<T>, RemoteReadError>
where
    S: TableSource,
    T: DeserializeOwned,
{
    let limit = fetch_limit.max(1);
    let mut rows = Vec::new();
    let mut offset = 0;

    loop {
        let end = offset + limit - 1;
        let page = source
            .fetch_range(&table.name, &table.columns, offset, end)
            .await?;
        let returned = page.len();
        debug!(
            table = %table.name,
            start = offset,
            end,
            returned,
            "Fetched range"
        );

        for row in page {
            let record = serde_json::from_value(row).map_err(|source| RemoteReadError::Decode {
                table: table.name.clone(),
                source,
            })?;
            rows.push(record);
        }

        offset += returned;
        if returned < limit {
            break;
        }
    }

    info!(table = %table.name, rows = rows.len(), "Read table");
    Ok(rows)
}
