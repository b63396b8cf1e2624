//! "Load more" pagination state.
//!
//! A [`PostFeed`] holds the posts fetched so far and the cursor to the next
//! page. Loading appends the next page in arrival order and swaps in the new
//! cursor; once the cursor runs out, further loads are no-ops that never touch
//! the network.
//!
//! ## Failure and concurrency
//!
//! A failed fetch leaves both the posts and the cursor as they were, so the
//! same load can simply be retried. While a load is in flight, another one is
//! refused with [`LoadMore::Busy`] rather than racing the first. The split
//! [`PostFeed::start_load`] / [`PostFeed::finish_load`] pair is what makes the
//! guard meaningful when a feed is shared behind a lock that must not be held
//! across the fetch; [`PostFeed::load_more`] wraps both for the common case.

use crate::document::post_page;
use crate::prismic::{ContentError, ContentSource};
use crate::types::{PostPage, PostSummary};

/// Result of a load-more request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// No cursor left; nothing was fetched.
    Exhausted,
    /// Another load is still pending; nothing was fetched.
    Busy,
    /// A page was fetched and this many posts were appended.
    Appended(usize),
}

/// What the caller should do after [`PostFeed::start_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStart {
    /// Fetch this cursor, then hand the result to [`PostFeed::finish_load`].
    Fetch(String),
    Exhausted,
    Busy,
}

#[derive(Debug, Clone, Default)]
pub struct PostFeed {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    in_flight: bool,
}

impl PostFeed {
    /// Start a feed from its first page.
    pub fn new(first: PostPage) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page,
            in_flight: false,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether a "load more" control should be offered.
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Claim the next load. Marks the feed busy when it returns `Fetch`.
    pub fn start_load(&mut self) -> LoadStart {
        if self.in_flight {
            return LoadStart::Busy;
        }
        match &self.next_page {
            Some(cursor) => {
                self.in_flight = true;
                LoadStart::Fetch(cursor.clone())
            }
            None => LoadStart::Exhausted,
        }
    }

    /// Complete a load claimed with [`start_load`](Self::start_load).
    ///
    /// On success the page is appended and the cursor replaced. On failure the
    /// feed is unchanged apart from clearing the busy flag, and the error is
    /// handed back.
    pub fn finish_load(
        &mut self,
        result: Result<PostPage, ContentError>,
    ) -> Result<usize, ContentError> {
        self.in_flight = false;
        let page = result?;
        let added = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        Ok(added)
    }

    /// Fetch and append the next page from `source`.
    pub async fn load_more(
        &mut self,
        source: &dyn ContentSource,
    ) -> Result<LoadMore, ContentError> {
        let cursor = match self.start_load() {
            LoadStart::Fetch(cursor) => cursor,
            LoadStart::Exhausted => return Ok(LoadMore::Exhausted),
            LoadStart::Busy => return Ok(LoadMore::Busy),
        };
        let mut guard = InFlight { feed: self };
        let result = source.fetch_page(&cursor).await.map(post_page);
        if let Err(e) = &result {
            tracing::warn!(%cursor, error = %e, "load more failed");
        }
        guard.feed.finish_load(result).map(LoadMore::Appended)
    }
}

/// Clears the busy flag if a `load_more` future is dropped mid-fetch.
struct InFlight<'a> {
    feed: &'a mut PostFeed,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.feed.in_flight = false;
    }
}
