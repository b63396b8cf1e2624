//! Site generation: the build-time path.
//!
//! Fetches the first listing page and the posts chosen for pre-rendering,
//! renders them with [`crate::render`], and writes the result to the output
//! directory. The same page builders are used at request time by the server
//! ([`build_home`] for `/?pages=N` and revalidation, [`render_post_page`] for
//! fallback resolution), so a post rendered on demand is byte-identical to
//! one rendered by `build`.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # First listing page
//! ├── .build-manifest.json       # Page hashes for incremental builds
//! └── post/
//!     ├── como-utilizar-hooks/
//!     │   └── index.html         # Pre-rendered post
//!     └── ...
//! ```
//!
//! Posts outside the pre-rendered set are not written; the server generates
//! them on first request.

use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use crate::cache::{BuildManifest, CacheStats, hash_page};
use crate::config::SiteConfig;
use crate::document::{post_detail, post_page};
use crate::pagination::{LoadMore, PostFeed};
use crate::prismic::{ContentError, ContentSource};
use crate::render::{DetailState, PageContext, render_home, render_post};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("content API error: {0}")]
    Content(#[from] ContentError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walking output directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A rendered listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub html: String,
    /// Posts shown on the page.
    pub posts: usize,
    /// Result pages merged into the listing.
    pub pages: usize,
    pub has_more: bool,
}

/// A rendered post page.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPost {
    pub slug: String,
    pub title: String,
    pub html: String,
}

/// Everything a build produces, before it touches the disk.
#[derive(Debug, Clone)]
pub struct Site {
    pub home: HomePage,
    pub posts: Vec<GeneratedPost>,
}

/// Whether `slug` can name a post page: non-empty ASCII letters, digits,
/// `-` and `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Output path of a post page, relative to the output directory.
pub fn post_page_path(slug: &str) -> String {
    format!("post/{slug}/index.html")
}

/// Render the listing after `pages` result pages.
///
/// The first page is fetched with the configured page size; every further page
/// is a load-more through the feed's cursor. `pages` is clamped to
/// `1..=listing.max_pages`. Merging stops early when the cursor runs out. A
/// failed load-more does not fail the page: the posts loaded so far are shown
/// with an error notice and a link that retries. Only a failed first fetch is
/// an error.
pub async fn build_home(
    source: &dyn ContentSource,
    config: &SiteConfig,
    ctx: &PageContext,
    pages: usize,
) -> Result<HomePage, ContentError> {
    let max_pages = config.listing.max_pages.max(1);
    let wanted = pages.clamp(1, max_pages);
    let first = source
        .query_by_type(&config.prismic.document_type, config.listing.page_size)
        .await?;
    let mut feed = PostFeed::new(post_page(first));
    let mut shown = 1;
    let mut load_error = None;

    while shown < wanted {
        match feed.load_more(source).await {
            Ok(LoadMore::Appended(_)) => shown += 1,
            Ok(LoadMore::Exhausted) | Ok(LoadMore::Busy) => break,
            Err(e) => {
                load_error = Some(e.to_string());
                break;
            }
        }
    }

    let html = render_home(ctx, &feed, shown, max_pages, load_error.as_deref()).into_string();
    Ok(HomePage {
        html,
        posts: feed.posts().len(),
        pages: shown,
        has_more: feed.has_more(),
    })
}

/// Fetch and render one post. `Ok(None)` when no document has this UID.
pub async fn render_post_page(
    source: &dyn ContentSource,
    document_type: &str,
    ctx: &PageContext,
    slug: &str,
) -> Result<Option<GeneratedPost>, ContentError> {
    let Some(doc) = source.get_by_uid(document_type, slug).await? else {
        return Ok(None);
    };
    let detail = post_detail(&doc);
    let title = detail.title.clone();
    let html = render_post(ctx, &DetailState::Ready(detail)).into_string();
    Ok(Some(GeneratedPost {
        slug: slug.to_string(),
        title,
        html,
    }))
}

/// Fetch and render the home page and the first `build.prerender` posts.
pub async fn build_site(
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> Result<Site, GenerateError> {
    let ctx = PageContext::from_config(config);
    let document_type = &config.prismic.document_type;

    let home = build_home(source, config, &ctx, 1).await?;
    tracing::info!(posts = home.posts, has_more = home.has_more, "rendered home page");

    let mut posts = Vec::new();
    if config.build.prerender > 0 {
        let listing = source
            .query_by_type(document_type, config.build.prerender)
            .await?;
        for doc in &listing.results {
            let Some(slug) = doc.uid.as_deref().filter(|s| !s.is_empty()) else {
                tracing::debug!(id = %doc.id, "skipping post without uid");
                continue;
            };
            if !is_valid_slug(slug) {
                tracing::warn!(slug, "skipping post with unroutable uid");
                continue;
            }
            match render_post_page(source, document_type, &ctx, slug).await? {
                Some(post) => {
                    tracing::debug!(slug, "rendered post");
                    posts.push(post);
                }
                None => tracing::warn!(slug, "listed post disappeared before it was fetched"),
            }
        }
    }

    Ok(Site { home, posts })
}

/// Write a generated site to `output_dir`.
///
/// With `use_cache`, pages whose HTML hash matches the previous build's
/// manifest are left untouched. Pages recorded by the previous build that this
/// build no longer produces are deleted either way, along with any post
/// directories left empty.
pub fn write_site(
    site: &Site,
    output_dir: &Path,
    use_cache: bool,
) -> Result<CacheStats, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let previous = BuildManifest::load(output_dir);
    let mut manifest = BuildManifest::empty();
    let mut stats = CacheStats::default();

    let pages = std::iter::once(("index.html".to_string(), site.home.html.as_str())).chain(
        site.posts
            .iter()
            .map(|post| (post_page_path(&post.slug), post.html.as_str())),
    );

    for (path, html) in pages {
        let hash = hash_page(html);
        if use_cache && previous.is_unchanged(&path, &hash, output_dir) {
            stats.skip();
        } else {
            let target = output_dir.join(&path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, html)?;
            stats.write();
        }
        manifest.insert(path, hash);
    }

    for stale in previous
        .entries
        .keys()
        .filter(|path| !manifest.entries.contains_key(*path))
    {
        match fs::remove_file(output_dir.join(stale)) {
            Ok(()) => {
                tracing::debug!(path = %stale, "removed stale page");
                stats.remove();
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    remove_empty_dirs(&output_dir.join("post"))?;

    manifest.save(output_dir)?;
    Ok(stats)
}

/// Remove empty directories below `root` (not `root` itself).
fn remove_empty_dirs(root: &Path) -> Result<(), GenerateError> {
    if !root.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() && fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
        }
    }
    Ok(())
}
