//! On-demand generation of post pages that were not pre-rendered.
//!
//! The first request for an unknown slug claims it in the [`PageStore`],
//! spawns a resolution task and gets the loading page. Requests arriving while
//! the task runs see the same pending slot and get the loading page too; no
//! second fetch is started. When the task finishes, the slot holds the
//! rendered post, a not-found marker, or the failure.
//!
//! A failure is shown once, as an error page, and then cleared so the
//! following request starts a fresh resolution.
//!
//! [`PageStore`]: crate::store::PageStore

use crate::generate::{is_valid_slug, render_post_page};
use crate::prismic::ContentSource;
use crate::render::PageContext;
use crate::state::AppState;
use crate::store::PostSlot;

/// Fetch and render `slug`, turning every outcome into a slot.
pub async fn resolve(
    source: &dyn ContentSource,
    document_type: &str,
    ctx: &PageContext,
    slug: &str,
) -> PostSlot {
    match render_post_page(source, document_type, ctx, slug).await {
        Ok(Some(post)) => {
            tracing::info!(slug, title = %post.title, "generated post on demand");
            PostSlot::Ready(post.html)
        }
        Ok(None) => {
            tracing::info!(slug, "no post with this uid");
            PostSlot::NotFound
        }
        Err(e) => {
            tracing::warn!(slug, error = %e, "on-demand generation failed");
            PostSlot::Failed(e.to_string())
        }
    }
}

/// Resolve `slug` and record the outcome in the store.
pub async fn resolve_and_store(state: &AppState, slug: &str) {
    let slot = resolve(state.source(), state.document_type(), state.ctx(), slug).await;
    state.store().settle(slug, slot);
}

/// What a request for `/post/{slug}` should see right now.
///
/// Starts a background resolution when the slug is unknown. Must be called
/// from within a tokio runtime.
pub fn request(state: &AppState, slug: &str) -> PostSlot {
    if !is_valid_slug(slug) {
        return PostSlot::NotFound;
    }
    let store = state.store();
    if let Some(message) = store.take_failure(slug) {
        return PostSlot::Failed(message);
    }
    if let Some(slot) = store.post(slug) {
        return slot;
    }
    if store.claim(slug) {
        tracing::debug!(slug, "starting on-demand generation");
        let state = state.clone();
        let slug = slug.to_string();
        tokio::spawn(async move {
            resolve_and_store(&state, &slug).await;
        });
    }
    PostSlot::Pending
}
