//! # spacetraveling
//!
//! A blog front-end generated from a Prismic repository. Posts are fetched from
//! the content API and rendered to plain HTML pages: a list page with "load
//! more" pagination and one page per post with an estimated reading time.
//!
//! # Architecture: Three Control Paths
//!
//! Pages come into existence in three explicit ways, each a plain async
//! function that can be tested on its own:
//!
//! ```text
//! 1. Build       generate::build_site   home + first N posts  →  dist/ or memory
//! 2. Fallback    fallback::request      unknown slug          →  loading page, then post
//! 3. Revalidate  revalidate::spawn      every hour            →  fresh home page
//! ```
//!
//! `build` runs path 1 and writes the result to disk. `serve` runs path 1 into
//! the in-memory [`store`], then serves it while paths 2 and 3 keep it current.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`prismic`] | Content API client behind the [`prismic::ContentSource`] trait |
//! | [`document`] | Raw API documents → post summaries and details, with safe defaults |
//! | [`reading_time`] | Word count and reading-time estimate |
//! | [`pagination`] | "Load more" state: accumulated posts, cursor, in-flight guard |
//! | [`render`] | Maud templates for the list, post, loading, 404 and error pages |
//! | [`generate`] | Build path: fetch, render, write with the build cache |
//! | [`fallback`] | Request-time generation of posts that were not pre-rendered |
//! | [`revalidate`] | Periodic home page refresh |
//! | [`store`] | In-memory pages served by the server |
//! | [`serve`] | Axum router, error pages, graceful shutdown |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`cache`] | Content-hash manifest for incremental builds |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Client
//!
//! The content client is built once from config and passed down as
//! `&dyn ContentSource` (or `Arc<dyn ContentSource>` in the server). Nothing
//! reaches for a global, and every path can run against an in-memory fake.
//!
//! ## Pagination Without JavaScript
//!
//! The "load more" control is a link to `/?pages=N+1`. The server replays the
//! first page plus N load-more fetches through the same [`pagination::PostFeed`]
//! a client-side implementation would use, so the merge rules (arrival order,
//! cursor replacement, no fetch once the cursor is gone) live in one place.
//!
//! ## Dates Formatted at Display Time
//!
//! Publication dates are parsed into `chrono` values on extraction and
//! formatted once, when rendered, as `25 mar 2021`.

pub mod cache;
pub mod config;
pub mod dates;
pub mod document;
pub mod fallback;
pub mod generate;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod prismic;
pub mod reading_time;
pub mod render;
pub mod revalidate;
pub mod serve;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
