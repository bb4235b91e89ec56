//! The gallery aggregation pipeline.
//!
//! ```text
//! images   ─ read_all ─┐
//!                      ├─ merge ─ expand ─ rank ─ shuffle ─→ items
//! captions ─ read_all ─┘
//! ```
//!
//! The two tables are read concurrently; each read is itself a sequence of
//! range requests. Everything after the reads is synchronous and cannot fail.
//! A run either produces the full item sequence or a [`RemoteReadError`];
//! nothing partial escapes.

use crate::config::GalleryConfig;
use crate::expand::expand;
use crate::merge::merge;
use crate::rank::order;
use crate::reader::read_all;
use crate::store::{RemoteReadError, TableSource};
use crate::types::{CaptionRecord, DisplayItem, ImageRecord};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Counts gathered along one run, for logging and the `stats` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub images: usize,
    pub captions: usize,
    pub captions_attached: usize,
    pub captions_dropped: usize,
    pub captioned_images: usize,
    pub items: usize,
}

/// Result of one run: the ordered items plus what went into them.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub items: Vec<DisplayItem>,
    pub stats: PipelineStats,
}

/// Fetch both tables concurrently.
pub async fn fetch<S: TableSource>(
    source: &S,
    config: &GalleryConfig,
) -> Result<(Vec<ImageRecord>, Vec<CaptionRecord>), RemoteReadError> {
    let limit = config.store.fetch_limit;
    tokio::try_join!(
        read_all(source, &config.tables.images, limit),
        read_all(source, &config.tables.captions, limit),
    )
}

/// Merge, expand and order already-fetched records.
pub fn assemble<R: Rng + ?Sized>(
    images: Vec<ImageRecord>,
    captions: Vec<CaptionRecord>,
    rng: &mut R,
) -> PipelineOutput {
    let image_count = images.len();
    let caption_count = captions.len();

    let aggregates = merge(images, captions);
    if aggregates.dropped_captions() > 0 {
        debug!(
            dropped = aggregates.dropped_captions(),
            "Dropped captions with no matching image"
        );
    }

    let items = order(expand(&aggregates), &aggregates, rng);
    let stats = PipelineStats {
        images: image_count,
        captions: caption_count,
        captions_attached: aggregates.total_captions(),
        captions_dropped: aggregates.dropped_captions(),
        captioned_images: aggregates.iter().filter(|a| !a.captions.is_empty()).count(),
        items: items.len(),
    };
    PipelineOutput { items, stats }
}

/// One full run with fresh thread-local randomness.
pub async fn run<S: TableSource>(
    source: &S,
    config: &GalleryConfig,
) -> Result<PipelineOutput, RemoteReadError> {
    let (images, captions) = fetch(source, config).await?;
    let output = assemble(images, captions, &mut rand::thread_rng());
    info!(
        images = output.stats.images,
        captions = output.stats.captions,
        items = output.stats.items,
        "Gallery assembled"
    );
    Ok(output)
}

/// [`run`] with a caller-supplied random source.
pub async fn run_with_rng<S: TableSource, R: Rng + ?Sized>(
    source: &S,
    config: &GalleryConfig,
    rng: &mut R,
) -> Result<PipelineOutput, RemoteReadError> {
    let (images, captions) = fetch(source, config).await?;
    Ok(assemble(images, captions, rng))
}
