//! # Gatherer Archive
//!
//! A static site generator for an archive of card-forum comments. Each card
//! printing gets its own page with its archived discussion; every printing of
//! the same card is also gathered onto one combined page; an alphabetical
//! index and a sitemap tie it together.
//!
//! # Architecture: Load, Cross-Reference, Render
//!
//! ```text
//! 1. Load       data/*.json + caches  →  Catalog   (printings, merged comments)
//! 2. Link       Catalog               →  Catalog   (forum links → local links)
//! 3. Group      Catalog               →  Catalog   (oracle id → printings by date)
//! 4. Render     Catalog               →  dist/     (pages, index, sitemap, assets)
//! ```
//!
//! Steps 1-3 are pure in-memory transforms over the [`catalog::Catalog`], so
//! unit tests exercise merging, linking and grouping without touching disk.
//! Step 4 borrows the finished catalog; the only thing it writes back is each
//! printing's image path, and only once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Printings, comments, and the raw archive records they come from |
//! | [`links`] | Rewrites forum auto-card links into local page links |
//! | [`ingest`] | Reads archive JSON files and the name/metadata caches |
//! | [`catalog`] | Merges printings, rewrites links, groups printings by oracle id |
//! | [`images`] | Finds and copies card images |
//! | [`index`] | Alphabetical card index, rating aggregation, sitemap |
//! | [`generate`] | Renders every page with Maud and orchestrates the build |
//! | [`config`] | `config.toml` loading, validation, CLI overrides |
//! | [`output`] | CLI output formatting of build results |
//!
//! # Design Decisions
//!
//! ## Best-Effort Everywhere, Except Where Asked
//!
//! Archives are messy. Missing metadata, missing images, unknown card links
//! and unreadable data files all degrade the output instead of stopping the
//! build. A page that fails to write is reported and skipped. Only a missing
//! data directory, or a single card requested by identifier that does not
//! exist, aborts.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! checked at compile time and interpolation is escaped by default. The
//! archived comment bodies are the one deliberate exception and are inserted
//! as pre-escaped HTML.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod images;
pub mod index;
pub mod ingest;
pub mod links;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
