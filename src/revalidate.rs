//! Periodic regeneration of the home page.
//!
//! Every `serve.revalidate_secs` the first listing page is fetched and
//! rendered again. The stored page is replaced only when the new HTML differs.
//! A failed refresh keeps serving the previous page until the next tick. Each
//! tick also forgets posts that were not found, so a post published since then
//! is generated on its next request.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::generate::build_home;
use crate::prismic::ContentError;
use crate::state::AppState;

/// Rebuild the home page once. Returns whether the stored page changed.
pub async fn refresh_home(state: &AppState) -> Result<bool, ContentError> {
    let home = build_home(state.source(), state.config(), state.ctx(), 1).await?;
    let changed = state.store().set_home(home.html);
    let forgotten = state.store().forget_missing();
    if forgotten > 0 {
        tracing::debug!(forgotten, "cleared not-found posts");
    }
    Ok(changed)
}

/// Start the revalidation timer. The first refresh runs one `period` from now.
pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match refresh_home(&state).await {
                Ok(true) => tracing::info!("home page revalidated"),
                Ok(false) => tracing::debug!("home page unchanged"),
                Err(e) => tracing::warn!(error = %e, "home page revalidation failed"),
            }
        }
    })
}
