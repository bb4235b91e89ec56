//! Display-item expansion.
//!
//! Each aggregate becomes one item per caption (`"<image>-<index>"`), or a
//! single caption-less item carrying the bare image id. Output order follows
//! aggregate order; the ranker/shuffler replaces it.

use crate::merge::Aggregates;
use crate::types::{DisplayItem, ItemId};

pub fn expand(aggregates: &Aggregates) -> Vec<DisplayItem> {
    let mut items = Vec::with_capacity(aggregates.total_captions() + aggregates.len());
    for aggregate in aggregates.iter() {
        if aggregate.captions.is_empty() {
            items.push(DisplayItem {
                id: ItemId::Image(aggregate.id),
                image_url: aggregate.image_url.clone(),
                caption: None,
            });
            continue;
        }
        items.extend(
            aggregate
                .captions
                .iter()
                .enumerate()
                .map(|(index, caption)| DisplayItem {
                    id: ItemId::Caption {
                        image_id: aggregate.id,
                        index,
                    },
                    image_url: aggregate.image_url.clone(),
                    caption: Some(caption.clone()),
                }),
        );
    }
    items
}
