//! Post types shared by extraction, pagination and rendering.
//!
//! These are the display-ready shapes produced by [`crate::document`] from raw
//! content API documents. Dates stay as timestamps here and are only turned
//! into text by [`crate::dates`] at render time.

use chrono::{DateTime, Utc};

/// A post as it appears in the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Document UID, used as the `/post/{slug}` slug. Documents without one
    /// are still listed but not linked.
    pub uid: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post as rendered on its detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub uid: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Banner image URL, absent when the document has no banner.
    pub banner_url: Option<String>,
    pub content: Vec<ContentBlock>,
}

/// One section of a post body: a heading followed by its paragraphs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentBlock {
    pub heading: String,
    /// Paragraph texts in document order.
    pub body: Vec<String>,
}

/// One page of list results plus the cursor to the next page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    /// Opaque next-page URL; `None` on the last page.
    pub next_page: Option<String>,
}
