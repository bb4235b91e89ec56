//! # Caption Gallery
//!
//! A shuffled, paginated gallery of images and the captions people wrote for
//! them. Both live in a remote relational store behind a PostgREST API; the
//! gallery reads them in full, pairs every caption with its image, shuffles
//! the result and serves it a page at a time.
//!
//! # Architecture: Five-Stage Pipeline
//!
//! ```text
//! 1. Read      images, captions  →  records       (range-paginated, concurrent)
//! 2. Merge     records           →  aggregates    (captions grouped per image)
//! 3. Expand    aggregates        →  items         (one per caption, or one bare)
//! 4. Order     items             →  items         (rank by caption count, shuffle)
//! 5. Paginate  items             →  page + window (pure, on demand)
//! ```
//!
//! Stages 2–5 are pure functions, so unit tests exercise them without a
//! store. Stage 1 goes through the [`store::TableSource`] trait, which tests
//! replace with an in-memory source.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`reader`] | Stage 1 — reads a whole table through successive range requests |
//! | [`merge`] | Stage 2 — joins captions onto images by foreign key |
//! | [`expand`] | Stage 3 — turns aggregates into display items |
//! | [`rank`] | Stage 4 — caption-count ranking and Fisher–Yates shuffle |
//! | [`paginate`] | Stage 5 — page slicing and the navigation window |
//! | [`pipeline`] | Runs stages 1–4 and collects statistics |
//! | [`gallery`] | Session-gated load state with stale-run protection |
//! | [`store`] | `TableSource` trait and the PostgREST client |
//! | [`session`] | Access token → user resolution |
//! | [`config`] | `gallery.toml` loading, merging and validation |
//! | [`types`] | Records, aggregates, display items and their ids |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Ranked, Then Fully Shuffled
//!
//! Items are first ordered by how many captions their image has, then the
//! whole sequence is shuffled uniformly. The shuffle erases the ranking; both
//! steps are kept so the ordering contract stays explicit.
//!
//! ## Explicit Session
//!
//! Whether someone is signed in is an argument, not ambient state. No session
//! means no requests are made at all.
//!
//! ## Whole Tables In Memory
//!
//! Both tables are materialized before merging. That keeps the merge a plain
//! hash join and the ordering a single in-place shuffle.

pub mod config;
pub mod expand;
pub mod gallery;
pub mod merge;
pub mod output;
pub mod paginate;
pub mod pipeline;
pub mod rank;
pub mod reader;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
