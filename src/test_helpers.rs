//! Shared test utilities for the caption-gallery test suite.
//!
//! Provides an in-memory [`MockStore`] that records every range request,
//! record builders, and item lookups that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let store = MockStore::new()
//!     .with_table("images", image_rows(3))
//!     .with_table("captions", caption_rows(&[("x", Some(1))]));
//!
//! let out = run(&store, &GalleryConfig::default(), &mut seeded_rng()).await.unwrap();
//! assert_eq!(find_item(&out.items, "1-0").caption.as_deref(), Some("x"));
//! assert_eq!(store.requested_ranges("images"), vec![(0, 999)]);
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::store::{RemoteReadError, TableSource};
use crate::types::{CaptionRecord, DisplayItem, ImageRecord, ItemId};

// =========================================================================
// Mock store
// =========================================================================

/// In-memory table source.
///
/// Uses Mutex (not RefCell) so it is Sync and can be shared by the two
/// concurrent table reads.
#[derive(Default)]
pub struct MockStore {
    tables: HashMap<String, Vec<Value>>,
    server_cap: Option<usize>,
    failures: HashMap<String, usize>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, usize, usize)>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    /// Return at most `cap` rows per request regardless of the range asked for.
    pub fn with_server_cap(mut self, cap: usize) -> Self {
        self.server_cap = Some(cap);
        self
    }

    /// Fail the request for `table` that starts at row `start`.
    pub fn fail_at(mut self, table: &str, start: usize) -> Self {
        self.failures.insert(table.to_string(), start);
        self
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Inclusive ranges requested for `table`, in request order.
    pub fn requested_ranges(&self, table: &str) -> Vec<(usize, usize)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _, _)| t == table)
            .map(|(_, start, end)| (*start, *end))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl TableSource for MockStore {
    fn fetch_range(
        &self,
        table: &str,
        _columns: &str,
        start: usize,
        end: usize,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteReadError>> + Send {
        async move {
            self.requests
                .lock()
                .unwrap()
                .push((table.to_string(), start, end));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.failures.get(table) == Some(&start) {
                return Err(RemoteReadError::Status {
                    table: table.to_string(),
                    start,
                    end,
                    status: 503,
                    message: "mock failure".to_string(),
                });
            }

            let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
            let mut take = (end + 1).saturating_sub(start);
            if let Some(cap) = self.server_cap {
                take = take.min(cap);
            }
            Ok(rows.iter().skip(start).take(take).cloned().collect())
        }
    }
}

// =========================================================================
// Record builders
// =========================================================================

pub fn image(id: i64, url: &str) -> ImageRecord {
    ImageRecord {
        id,
        url: url.to_string(),
    }
}

pub fn caption(content: &str, image_id: Option<i64>) -> CaptionRecord {
    CaptionRecord {
        content: content.to_string(),
        image_id,
    }
}

/// `n` image rows with ids `1..=n`.
pub fn image_rows(n: i64) -> Vec<Value> {
    (1..=n)
        .map(|id| json!({"id": id, "url": format!("https://img.example/{id}.jpg")}))
        .collect()
}

pub fn caption_rows(captions: &[(&str, Option<i64>)]) -> Vec<Value> {
    captions
        .iter()
        .map(|(content, image_id)| json!({"content": content, "image_id": image_id}))
        .collect()
}

/// A deterministic RNG so shuffle-dependent assertions are reproducible.
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

// =========================================================================
// Item lookups — panics with a clear message on miss
// =========================================================================

/// Find an item by its string id. Panics if not found.
pub fn find_item<'a>(items: &'a [DisplayItem], id: &str) -> &'a DisplayItem {
    crate::types::find_item(items, id).unwrap_or_else(|| {
        let ids: Vec<String> = items.iter().map(|i| i.id.to_string()).collect();
        panic!("item '{id}' not found. Available: {ids:?}")
    })
}

/// All item ids as strings, in sequence order.
pub fn item_ids(items: &[DisplayItem]) -> Vec<String> {
    items.iter().map(|i| i.id.to_string()).collect()
}

/// Item ids sorted, for order-insensitive comparisons.
pub fn sorted_ids(items: &[DisplayItem]) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
    ids.sort_by_key(|id| (id.image_id(), id.to_string()));
    ids
}
