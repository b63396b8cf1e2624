//! Raw document → post extraction.
//!
//! Field access is forgiving. A post missing its author, banner or content
//! still renders with empty values instead of failing the page. Text fields
//! are accepted either as plain strings (Key Text fields) or as rich-text
//! arrays of `{ "text": ... }` blocks, whose texts are joined with spaces.

use serde_json::Value;

use crate::dates::parse_publication_date;
use crate::prismic::{ApiPage, Document};
use crate::types::{ContentBlock, PostDetail, PostPage, PostSummary};

/// Extract the list-view fields of a document.
pub fn post_summary(doc: &Document) -> PostSummary {
    PostSummary {
        uid: doc.uid.clone().filter(|u| !u.is_empty()),
        first_publication_date: publication_date(doc),
        title: text_field(&doc.data, "title"),
        subtitle: text_field(&doc.data, "subtitle"),
        author: text_field(&doc.data, "author"),
    }
}

/// Extract the detail-view fields of a document.
pub fn post_detail(doc: &Document) -> PostDetail {
    let banner_url = doc
        .data
        .get("banner")
        .and_then(|b| b.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let content = doc
        .data
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| blocks.iter().map(content_block).collect())
        .unwrap_or_default();

    PostDetail {
        uid: doc.uid.clone().filter(|u| !u.is_empty()),
        first_publication_date: publication_date(doc),
        title: text_field(&doc.data, "title"),
        subtitle: text_field(&doc.data, "subtitle"),
        author: text_field(&doc.data, "author"),
        banner_url,
        content,
    }
}

/// Convert a raw result page into a page of summaries.
///
/// An empty `next_page` string is treated the same as a missing one.
pub fn post_page(page: ApiPage) -> PostPage {
    PostPage {
        results: page.results.iter().map(post_summary).collect(),
        next_page: page.next_page.filter(|url| !url.trim().is_empty()),
    }
}

fn publication_date(doc: &Document) -> Option<chrono::DateTime<chrono::Utc>> {
    doc.first_publication_date
        .as_deref()
        .and_then(parse_publication_date)
}

fn content_block(block: &Value) -> ContentBlock {
    let body = block
        .get("body")
        .and_then(Value::as_array)
        .map(|fragments| {
            fragments
                .iter()
                .filter_map(|f| f.get("text").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ContentBlock {
        heading: text_value(block.get("heading")),
        body,
    }
}

fn text_field(data: &Value, key: &str) -> String {
    text_value(data.get(key))
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(spans)) => spans
            .iter()
            .filter_map(|s| s.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}
