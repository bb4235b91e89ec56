//! Shared types passed between pipeline stages.
//!
//! Records mirror the two remote tables as they come off the wire. Aggregates
//! and display items are derived per run and never outlive it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A row of the images table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub url: String,
}

/// A row of the captions table.
///
/// `image_id` is nullable in the store; captions without a matching image are
/// dropped during the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRecord {
    pub content: String,
    #[serde(default)]
    pub image_id: Option<i64>,
}

/// All captions collected for one image during a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAggregate {
    pub id: i64,
    pub image_url: String,
    /// Caption contents in the order they were read from the captions table.
    pub captions: Vec<String>,
}

/// Identity of a display item.
///
/// Renders as `"<image>-<index>"` for captioned items and as the bare image id
/// otherwise. Only unique within one pipeline run: editing captions between
/// runs shifts the indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ItemId {
    Image(i64),
    Caption { image_id: i64, index: usize },
}

impl ItemId {
    /// Id of the image this item was expanded from.
    pub fn image_id(&self) -> i64 {
        match *self {
            ItemId::Image(id) => id,
            ItemId::Caption { image_id, .. } => image_id,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Image(id) => write!(f, "{id}"),
            ItemId::Caption { image_id, index } => write!(f, "{image_id}-{index}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid display item id: {0:?}")]
pub struct ParseItemIdError(pub String);

impl FromStr for ItemId {
    type Err = ParseItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseItemIdError(s.to_string());
        // Split on the last dash so a negative image id ("-7") stays intact.
        match s.rsplit_once('-') {
            Some((image, index)) if !image.is_empty() => Ok(ItemId::Caption {
                image_id: image.parse().map_err(|_| invalid())?,
                index: index.parse().map_err(|_| invalid())?,
            }),
            _ => s.parse().map(ItemId::Image).map_err(|_| invalid()),
        }
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ItemId {
    type Error = ParseItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One renderable unit: an image with at most one caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    pub id: ItemId,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Find an item by the string form of its id (e.g. a selection coming back
/// from the UI).
pub fn find_item<'a>(items: &'a [DisplayItem], id: &str) -> Option<&'a DisplayItem> {
    let id: ItemId = id.parse().ok()?;
    items.iter().find(|item| item.id == id)
}
