//! Page slicing and the page-number navigation window.
//!
//! Pages are 1-based. Everything here is pure and allocation-light, so the UI
//! can call it on every navigation without touching the pipeline.
//!
//! ## Page window
//!
//! At most `max_buttons` contiguous pages, centered on the current page where
//! the edges allow. The first and last pages stay reachable as anchors, with a
//! gap marker wherever an anchor is not adjacent to the window:
//!
//! ```text
//! current=1,  total=10, max=5   →  [1] 2 3 4 5 … 10
//! current=6,  total=10, max=5   →  1 … 4 5 [6] 7 8 … 10
//! current=10, total=10, max=5   →  1 … 6 7 8 9 [10]
//! ```

use serde::Serialize;

/// One entry of the navigation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// Number of pages needed for `item_count` items.
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    item_count.div_ceil(page_size)
}

/// Items on page `page`, clamped to the bounds of `items`.
///
/// Page 0 and pages past the end are empty, never an error.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    &items[start..end]
}

/// 1-based position of the first item on `page` within the whole sequence.
///
/// Saturates instead of overflowing for absurd page numbers.
pub fn first_position(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1)
        .saturating_mul(page_size)
        .saturating_add(1)
}

/// Navigation window around `current` for `total_pages` pages.
pub fn page_window(current: usize, total_pages: usize, max_buttons: usize) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }
    let max_buttons = max_buttons.max(1);

    let mut start = current.saturating_sub(max_buttons / 2).max(1);
    let end = start.saturating_add(max_buttons - 1).min(total_pages);
    if (end + 1).saturating_sub(start) < max_buttons {
        start = (total_pages + 1).saturating_sub(max_buttons).max(1);
    }

    let mut links = Vec::with_capacity(end + 5 - start);
    if start > 1 {
        links.push(PageLink::Page(1));
        if start > 2 {
            links.push(PageLink::Gap);
        }
    }
    links.extend((start..=end).map(PageLink::Page));
    if end < total_pages {
        if end + 1 < total_pages {
            links.push(PageLink::Gap);
        }
        links.push(PageLink::Page(total_pages));
    }
    links
}

/// Everything a UI needs to draw page navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    /// Controls are only drawn when there is more than one page.
    pub show_controls: bool,
    pub window: Vec<PageLink>,
}

impl Pagination {
    pub fn new(item_count: usize, page_size: usize, current: usize, max_buttons: usize) -> Self {
        let total = total_pages(item_count, page_size);
        Self {
            current,
            total_pages: total,
            has_previous: current > 1,
            has_next: current < total,
            show_controls: total > 1,
            window: page_window(current, total, max_buttons),
        }
    }
}
