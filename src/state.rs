//! Application state shared by request handlers and background tasks.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::prismic::{ContentError, ContentSource};
use crate::render::PageContext;
use crate::serve::ServeError;
use crate::store::PageStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    source: Arc<dyn ContentSource>,
    config: SiteConfig,
    ctx: Arc<PageContext>,
    store: PageStore,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>, config: SiteConfig, store: PageStore) -> Self {
        let ctx = Arc::new(PageContext::from_config(&config));
        Self {
            inner: Arc::new(AppStateInner {
                source,
                config,
                ctx,
                store,
            }),
        }
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.inner.source.as_ref()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    pub fn ctx(&self) -> &PageContext {
        &self.inner.ctx
    }

    pub fn store(&self) -> &PageStore {
        &self.inner.store
    }

    pub fn document_type(&self) -> &str {
        &self.inner.config.prismic.document_type
    }

    pub fn not_found(&self) -> ServeError {
        ServeError::NotFound {
            ctx: Arc::clone(&self.inner.ctx),
        }
    }

    pub fn upstream(&self, source: ContentError) -> ServeError {
        ServeError::Upstream {
            ctx: Arc::clone(&self.inner.ctx),
            source,
        }
    }

    pub fn resolution_failed(&self, message: String) -> ServeError {
        ServeError::Resolution {
            ctx: Arc::clone(&self.inner.ctx),
            message,
        }
    }
}
