//! # Quote Cache
//!
//! Holds the last quote document fetched from the `QuoteSource` and refreshes it once
//! the refresh interval has elapsed. A failed refresh keeps serving the previous
//! document and is retried on the next request; the fetch timestamp only moves
//! forward on success.
//!
//! Only one refresh runs at a time. While it is in flight, callers that already have a
//! document get the stale one straight away; only the first population waits.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::document::QuoteDocument;
use crate::domain::traits::QuoteSource;

#[derive(Default)]
struct CacheState {
    document: Option<Arc<QuoteDocument>>,
    fetched_at: Option<Instant>,
}

pub struct QuoteCache {
    source: Arc<dyn QuoteSource>,
    interval: Duration,
    // Never held across a fetch.
    state: Mutex<CacheState>,
    refreshing: Mutex<()>,
}

impl QuoteCache {
    pub fn new(source: Arc<dyn QuoteSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            state: Mutex::new(CacheState::default()),
            refreshing: Mutex::new(()),
        }
    }

    /// Returns the cached document, refreshing it first if it is missing or stale.
    ///
    /// `None` only when no fetch has ever succeeded.
    pub async fn get(&self) -> Option<Arc<QuoteDocument>> {
        let (document, stale) = self.snapshot().await;
        if !stale {
            return document;
        }

        let _refresh = match &document {
            Some(stale_doc) => match self.refreshing.try_lock() {
                Ok(guard) => guard,
                Err(_) => return Some(stale_doc.clone()),
            },
            None => self.refreshing.lock().await,
        };

        // another caller may have finished a refresh while we waited
        let (document, stale) = self.snapshot().await;
        if !stale {
            return document;
        }
        tracing::info!("{}", crate::strings::logs::CACHE_EXPIRED);
        self.fetch_into().await;
        self.snapshot().await.0
    }

    /// Fetches unconditionally. Returns whether the fetch succeeded.
    pub async fn refresh(&self) -> bool {
        let _refresh = self.refreshing.lock().await;
        self.fetch_into().await
    }

    async fn snapshot(&self) -> (Option<Arc<QuoteDocument>>, bool) {
        let state = self.state.lock().await;
        let stale = match (&state.document, state.fetched_at) {
            (Some(_), Some(at)) => at.elapsed() >= self.interval,
            _ => true,
        };
        (state.document.clone(), stale)
    }

    async fn fetch_into(&self) -> bool {
        let started = Instant::now();
        match self.source.fetch().await {
            Ok(document) => {
                tracing::info!(
                    "{}",
                    crate::strings::logs::cache_refreshed(
                        document.len(),
                        &self.source.describe(),
                        started.elapsed().as_millis()
                    )
                );
                let mut state = self.state.lock().await;
                state.document = Some(Arc::new(document));
                state.fetched_at = Some(Instant::now());
                true
            }
            Err(e) => {
                tracing::warn!("{}", crate::strings::logs::cache_refresh_failed(&format!("{e:#}")));
                false
            }
        }
    }
}
