//! Content API client.
//!
//! Everything the site knows about posts comes through [`ContentSource`]. The
//! production implementation, [`PrismicClient`], talks to the Prismic REST API
//! (v2); tests substitute in-memory sources. The client is always constructed
//! explicitly and handed to the build job and the server as
//! `Arc<dyn ContentSource>`.
//!
//! ## Prismic API v2 in brief
//!
//! ```text
//! GET {endpoint}                      → { refs: [{ ref, isMasterRef }] }
//! GET {endpoint}/documents/search
//!       ?ref=<master>&q=<predicates>&pageSize=<n>
//!                                     → { results: [...], next_page: url|null }
//! GET <next_page url>                 → same shape as search
//! ```
//!
//! Every search needs the current master ref, so it is fetched before each
//! query. That keeps revalidation honest: a newly published document shows up
//! on the next query without any ref caching to invalidate.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::config::PrismicConfig;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content API returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("content API at {0} has no master ref")]
    NoMasterRef(String),
}

/// A raw document as returned by the content API.
///
/// Only the envelope is typed; `data` stays a JSON value so that
/// [`crate::document`] can apply safe defaults field by field instead of
/// rejecting a whole page because one post is missing a field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of query results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub results: Vec<Document>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Source of post documents.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of `document_type`, `page_size` per page.
    async fn query_by_type(
        &self,
        document_type: &str,
        page_size: u32,
    ) -> Result<ApiPage, ContentError>;

    /// The document of `document_type` whose UID is `uid`, or `None`.
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, ContentError>;

    /// Follow an opaque `next_page` URL from a previous page.
    async fn fetch_page(&self, url: &str) -> Result<ApiPage, ContentError>;
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, rename = "isMasterRef")]
    is_master: bool,
}

/// Prismic REST API client.
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Build a client from the `[prismic]` config section.
    pub fn new(config: &PrismicConfig) -> Result<Self, ContentError> {
        let token = Some(config.access_token.clone()).filter(|t| !t.trim().is_empty());
        Self::with_timeout(
            &config.endpoint,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build a client with an explicit request timeout.
    pub fn with_timeout(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ContentError> {
        let mut request = self.http.get(url).query(query);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn master_ref(&self) -> Result<String, ContentError> {
        let root: ApiRoot = self.get_json(&self.endpoint, &[]).await?;
        root.refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.reference)
            .ok_or_else(|| ContentError::NoMasterRef(self.endpoint.clone()))
    }

    async fn search(&self, predicate: String, page_size: u32) -> Result<ApiPage, ContentError> {
        let master = self.master_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);
        tracing::debug!(%url, %predicate, page_size, "querying content API");
        self.get_json(
            &url,
            &[
                ("ref", master),
                ("q", predicate),
                ("pageSize", page_size.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query_by_type(
        &self,
        document_type: &str,
        page_size: u32,
    ) -> Result<ApiPage, ContentError> {
        self.search(at("document.type", document_type), page_size)
            .await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, ContentError> {
        let path = format!("my.{document_type}.uid");
        let page = self.search(at(&path, uid), 1).await?;
        Ok(page.results.into_iter().next())
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiPage, ContentError> {
        tracing::debug!(%url, "following next page");
        // next_page URLs already carry ref, query and page size
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<ApiPage>().await?)
    }
}

/// Build an `at(path, "value")` predicate in Prismic query syntax.
pub fn at(path: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[[at({path},\"{escaped}\")]]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_predicate_for_document_type() {
        assert_eq!(at("document.type", "posts"), r#"[[at(document.type,"posts")]]"#);
    }

    #[test]
    fn at_predicate_escapes_quotes() {
        assert_eq!(
            at("my.posts.uid", r#"a"b"#),
            r#"[[at(my.posts.uid,"a\"b")]]"#
        );
    }

    #[test]
    fn document_tolerates_missing_envelope_fields() {
        let doc: Document = serde_json::from_str(r#"{"data": {"title": "Only a title"}}"#).unwrap();
        assert_eq!(doc.uid, None);
        assert_eq!(doc.first_publication_date, None);
        assert_eq!(doc.data["title"], "Only a title");
    }

    #[test]
    fn api_page_parses_null_next_page() {
        let page: ApiPage = serde_json::from_str(
            r#"{"page": 1, "results": [{"uid": "a", "type": "posts"}], "next_page": null}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].document_type, "posts");
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn client_trims_trailing_slash_from_endpoint() {
        let client = PrismicClient::with_timeout(
            "https://example.cdn.prismic.io/api/v2/",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.endpoint, "https://example.cdn.prismic.io/api/v2");
    }

    #[test]
    fn blank_access_token_is_ignored() {
        let config = PrismicConfig {
            access_token: "   ".to_string(),
            ..PrismicConfig::default()
        };
        let client = PrismicClient::new(&config).unwrap();
        assert!(client.access_token.is_none());
    }
}
