//! # gf-press
//!
//! Static export of a gluten-free recipe catalog. The recipe database is the
//! data source: every published recipe becomes a page, categories and tags
//! become listing pages, and every page carries the metadata search engines
//! read (canonical URLs, Open Graph, schema.org `Recipe` JSON-LD).
//!
//! # Architecture: One Batch Pipeline
//!
//! ```text
//! 1. Fetch      source   →  Snapshot    (one read, fatal if unreadable)
//! 2. Aggregate  Snapshot →  Catalog     (eligibility, order, categories, tags)
//! 3. Render     Catalog  →  pages       (pure functions, per-page errors)
//! 4. Publish    pages    →  dist/       (staging directory, atomic swap)
//! ```
//!
//! The snapshot is passed explicitly from stage to stage. Rendering is a pure
//! function of the catalog, the config and the footer year, so two builds of
//! the same data produce byte-identical trees, which the build report proves
//! with a digest.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Reads the snapshot from a JSON export or the SQLite database |
//! | [`catalog`] | Eligibility, total order, category and tag aggregates, warnings |
//! | [`naming`] | Slugs, routes, output paths and canonical URLs |
//! | [`filter`] | Listing filters, the browser index and pagination arithmetic |
//! | [`jsonld`] | schema.org `Recipe` structured data and script-safe JSON |
//! | [`render`] | Maud templates for every page, sitemap and robots.txt |
//! | [`generate`] | Build orchestration: plan, parallel render, staging swap |
//! | [`config`] | `gf-press.toml` loading, validation and CSS generation |
//! | [`digest`] | SHA-256 digest of a generated tree |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting for build and check reports |
//! | [`types`] | Recipe, review and snapshot records |
//!
//! # Design Decisions
//!
//! ## One Slug Function
//!
//! Category links in the navigation and category directories on disk are
//! both derived by [`naming::category_slug`]. If two code paths slugified
//! labels independently a label like `"Soups & Stews"` could link to one
//! directory and be written to another. Tags share the same rule.
//!
//! ## Best-Effort Pages, Fatal Source
//!
//! A broken recipe record must not keep hundreds of good ones offline, so
//! page failures are counted and reported rather than aborting. A failed
//! fetch is different: there is nothing trustworthy to render, and the build
//! stops before touching the output directory.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Interpolation is
//! auto-escaped, which makes it the single escaping rule for recipe text.
//! JSON inside `<script>` blocks has its own single rule,
//! [`jsonld::to_script_json`].
//!
//! ## Filters Decided in Rust
//!
//! The listing page filters in the browser, but every predicate input (the
//! search haystack, time bucket, lowercased difficulty and tags) is computed
//! by [`filter`] and shipped in the page's JSON index. The script only
//! compares strings, so it cannot drift from the server-side rules.

pub mod catalog;
pub mod config;
pub mod digest;
pub mod filter;
pub mod generate;
pub mod jsonld;
pub mod logging;
pub mod naming;
pub mod output;
pub mod render;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
