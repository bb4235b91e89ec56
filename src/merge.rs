//! Relational merge of images and captions.
//!
//! Builds one [`ImageAggregate`] per image id, then attaches each caption to
//! the image its `image_id` names. Captions with a null or unknown reference
//! are data noise, not errors: they are counted and dropped.
//!
//! Aggregates iterate in the order their image ids were first seen. If the
//! images table repeats an id, the aggregate keeps its first position and
//! takes the later row's url.

use crate::types::{CaptionRecord, ImageAggregate, ImageRecord};
use std::collections::HashMap;

/// Per-image aggregates keyed by image id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    entries: Vec<ImageAggregate>,
    index: HashMap<i64, usize>,
    dropped_captions: usize,
}

impl Aggregates {
    pub fn get(&self, image_id: i64) -> Option<&ImageAggregate> {
        self.index.get(&image_id).map(|&i| &self.entries[i])
    }

    /// Number of captions attached to `image_id`, 0 for unknown ids.
    pub fn caption_count(&self, image_id: i64) -> usize {
        self.get(image_id).map_or(0, |a| a.captions.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAggregate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captions dropped because their image reference was null or unknown.
    pub fn dropped_captions(&self) -> usize {
        self.dropped_captions
    }

    /// Total captions attached across all images.
    pub fn total_captions(&self) -> usize {
        self.entries.iter().map(|a| a.captions.len()).sum()
    }

    fn insert_image(&mut self, image: ImageRecord) {
        let aggregate = ImageAggregate {
            id: image.id,
            image_url: image.url,
            captions: Vec::new(),
        };
        match self.index.get(&image.id) {
            Some(&i) => self.entries[i] = aggregate,
            None => {
                self.index.insert(image.id, self.entries.len());
                self.entries.push(aggregate);
            }
        }
    }

    fn attach(&mut self, caption: CaptionRecord) {
        let slot = caption.image_id.and_then(|id| self.index.get(&id).copied());
        match slot {
            Some(i) => self.entries[i].captions.push(caption.content),
            None => self.dropped_captions += 1,
        }
    }
}

/// Join images and captions into per-image aggregates.
pub fn merge(
    images: impl IntoIterator<Item = ImageRecord>,
    captions: impl IntoIterator<Item = CaptionRecord>,
) -> Aggregates {
    let mut aggregates = Aggregates::default();
    for image in images {
        aggregates.insert_image(image);
    }
    for caption in captions {
        aggregates.attach(caption);
    }
    aggregates
}
