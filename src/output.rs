//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Page
//!
//! ```text
//! Page 2 of 3 (250 items)
//! 101 12-0  https://img.example/12.jpg
//!     When the cat finally learns to open the fridge
//! 102 7     https://img.example/7.jpg
//! ...
//!
//! ‹ Prev 1 [2] 3 Next ›
//! ```
//!
//! ## Stats
//!
//! ```text
//! Images:    120 (84 with captions)
//! Captions:  310 (302 attached, 8 dropped)
//! Items:     338
//! Pages:     4 × 100
//! ```

use crate::paginate::{PageLink, Pagination};
use crate::pipeline::PipelineStats;
use crate::session::Session;
use crate::types::DisplayItem;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based position as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_caption(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Render the navigation line, current page in brackets.
///
/// Unavailable Prev/Next collapse to a `·` placeholder so the line keeps
/// its shape.
pub fn format_navigation(pagination: &Pagination) -> String {
    let mut parts = Vec::with_capacity(pagination.window.len() + 2);
    parts.push(if pagination.has_previous { "‹ Prev" } else { "·" }.to_string());
    for link in &pagination.window {
        parts.push(match link {
            PageLink::Page(n) if *n == pagination.current => format!("[{n}]"),
            PageLink::Page(n) => n.to_string(),
            PageLink::Gap => "…".to_string(),
        });
    }
    parts.push(if pagination.has_next { "Next ›" } else { "·" }.to_string());
    parts.join(" ")
}

// ============================================================================
// Page
// ============================================================================

/// Format one gallery page. `first_position` is the 1-based position of the
/// page's first item within the whole sequence.
pub fn format_page(
    items: &[DisplayItem],
    first_position: usize,
    total_items: usize,
    pagination: &Pagination,
) -> Vec<String> {
    let mut lines = Vec::new();

    if pagination.total_pages == 0 {
        lines.push("No images yet".to_string());
        return lines;
    }
    if items.is_empty() {
        lines.push(format!(
            "Page {} is empty ({} pages)",
            pagination.current, pagination.total_pages
        ));
        return lines;
    }

    lines.push(format!(
        "Page {} of {} ({} items)",
        pagination.current, pagination.total_pages, total_items
    ));

    let id_width = items
        .iter()
        .map(|i| i.id.to_string().len())
        .max()
        .unwrap_or(0);
    for (offset, item) in items.iter().enumerate() {
        lines.push(format!(
            "{} {:<width$}  {}",
            format_index(first_position + offset),
            item.id.to_string(),
            item.image_url,
            width = id_width
        ));
        if let Some(ref caption) = item.caption {
            lines.push(format!("    {}", truncate_caption(caption.trim(), 100)));
        }
    }

    if pagination.show_controls {
        lines.push(String::new());
        lines.push(format_navigation(pagination));
    }
    lines
}

pub fn print_page(
    items: &[DisplayItem],
    first_position: usize,
    total_items: usize,
    pagination: &Pagination,
) {
    for line in format_page(items, first_position, total_items, pagination) {
        println!("{}", line);
    }
}

// ============================================================================
// Stats
// ============================================================================

pub fn format_stats(stats: &PipelineStats, page_size: usize, total_pages: usize) -> Vec<String> {
    vec![
        format!(
            "Images:    {} ({} with captions)",
            stats.images, stats.captioned_images
        ),
        format!(
            "Captions:  {} ({} attached, {} dropped)",
            stats.captions, stats.captions_attached, stats.captions_dropped
        ),
        format!("Items:     {}", stats.items),
        format!("Pages:     {} × {}", total_pages, page_size),
    ]
}

pub fn print_stats(stats: &PipelineStats, page_size: usize, total_pages: usize) {
    for line in format_stats(stats, page_size, total_pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Session
// ============================================================================

pub fn format_session(session: Option<&Session>) -> Vec<String> {
    match session {
        None => vec!["Not signed in".to_string()],
        Some(session) => {
            let mut lines = vec![format!("Signed in as {}", session.user.id)];
            if let Some(ref email) = session.user.email {
                lines.push(format!("    Email: {}", email));
            }
            lines
        }
    }
}

pub fn print_session(session: Option<&Session>) {
    for line in format_session(session) {
        println!("{}", line);
    }
}
