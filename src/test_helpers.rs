//! Shared test utilities: an in-memory [`ContentSource`] and document builders.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let source = FakeSource::new()
//!     .with_first_page(&["a"], Some("c1"))
//!     .with_page("c1", &["b"], None)
//!     .with_post(post_doc("a", "First", &["Some words here"]));
//!
//! let page = source.query_by_type("posts", 1).await.unwrap();
//! assert_eq!(source.queries(), 1);
//! ```
//!
//! Cursors are plain strings; any string works as a `next_page` value.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::prismic::{ApiPage, ContentError, ContentSource, Document};

// =========================================================================
// Document builders
// =========================================================================

/// A list-shaped document with a title derived from the UID.
pub fn summary_doc(uid: &str) -> Document {
    Document {
        id: format!("id-{uid}"),
        uid: Some(uid.to_string()),
        document_type: "posts".to_string(),
        first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
        data: json!({
            "title": format!("Post {uid}"),
            "subtitle": format!("Subtitle {uid}"),
            "author": "Joseph Oliveira",
        }),
    }
}

/// A full post document with one content block holding `paragraphs`.
pub fn post_doc(uid: &str, title: &str, paragraphs: &[&str]) -> Document {
    let body: Vec<_> = paragraphs
        .iter()
        .map(|text| json!({ "type": "paragraph", "text": text, "spans": [] }))
        .collect();
    Document {
        id: format!("id-{uid}"),
        uid: Some(uid.to_string()),
        document_type: "posts".to_string(),
        first_publication_date: Some("2021-03-25T19:25:28+0000".to_string()),
        data: json!({
            "title": title,
            "subtitle": "",
            "author": "Danilo Vieira",
            "banner": { "url": format!("https://images.prismic.io/{uid}.png") },
            "content": [{ "heading": "Introdução", "body": body }],
        }),
    }
}

fn api_page(uids: &[&str], next: Option<&str>) -> ApiPage {
    ApiPage {
        results: uids.iter().map(|u| summary_doc(u)).collect(),
        next_page: next.map(str::to_string),
    }
}

fn unavailable(what: &str) -> ContentError {
    ContentError::Status {
        url: what.to_string(),
        status: 503,
    }
}

// =========================================================================
// FakeSource
// =========================================================================

/// In-memory content source with call counters and injectable failures.
#[derive(Default)]
pub struct FakeSource {
    first_page: Mutex<Option<ApiPage>>,
    pages: Mutex<HashMap<String, ApiPage>>,
    failing_pages: Mutex<HashSet<String>>,
    posts: Mutex<HashMap<String, Document>>,
    failing_posts: Mutex<HashSet<String>>,
    query_fails: AtomicBool,
    queries: AtomicUsize,
    page_fetches: AtomicUsize,
    uid_lookups: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents returned by `query_by_type`, truncated to the requested page size.
    pub fn with_first_page(self, uids: &[&str], next: Option<&str>) -> Self {
        self.set_first_page(uids, next);
        self
    }

    pub fn with_page(self, cursor: &str, uids: &[&str], next: Option<&str>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(cursor.to_string(), api_page(uids, next));
        self
    }

    pub fn with_failing_page(self, cursor: &str) -> Self {
        self.failing_pages
            .lock()
            .unwrap()
            .insert(cursor.to_string());
        self
    }

    pub fn with_post(self, doc: Document) -> Self {
        let uid = doc.uid.clone().unwrap_or_default();
        self.posts.lock().unwrap().insert(uid, doc);
        self
    }

    pub fn with_failing_post(self, uid: &str) -> Self {
        self.failing_posts.lock().unwrap().insert(uid.to_string());
        self
    }

    pub fn with_failing_queries(self) -> Self {
        self.query_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Replace the first page (simulates new content being published).
    pub fn set_first_page(&self, uids: &[&str], next: Option<&str>) {
        *self.first_page.lock().unwrap() = Some(api_page(uids, next));
    }

    /// Stop failing `cursor` and serve the given page from now on.
    pub fn recover_page(&self, cursor: &str, uids: &[&str], next: Option<&str>) {
        self.failing_pages.lock().unwrap().remove(cursor);
        self.pages
            .lock()
            .unwrap()
            .insert(cursor.to_string(), api_page(uids, next));
    }

    pub fn recover_post(&self, doc: Document) {
        let uid = doc.uid.clone().unwrap_or_default();
        self.failing_posts.lock().unwrap().remove(&uid);
        self.posts.lock().unwrap().insert(uid, doc);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    pub fn uid_lookups(&self) -> usize {
        self.uid_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn query_by_type(
        &self,
        document_type: &str,
        page_size: u32,
    ) -> Result<ApiPage, ContentError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.query_fails.load(Ordering::SeqCst) {
            return Err(unavailable(document_type));
        }
        let page = self.first_page.lock().unwrap().clone().unwrap_or_default();
        Ok(ApiPage {
            results: page.results.into_iter().take(page_size as usize).collect(),
            next_page: page.next_page,
        })
    }

    async fn get_by_uid(
        &self,
        _document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, ContentError> {
        self.uid_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_posts.lock().unwrap().contains(uid) {
            return Err(unavailable(uid));
        }
        Ok(self.posts.lock().unwrap().get(uid).cloned())
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiPage, ContentError> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_pages.lock().unwrap().contains(url) {
            return Err(unavailable(url));
        }
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ContentError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
