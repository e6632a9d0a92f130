//! Holder for the model currently being served.
//!
//! Readers clone the inner `Arc` and drop the lock straight away, so a lookup
//! never holds the lock while computing. A retrain or reload builds the new
//! state elsewhere and swaps the pointer in one short write.

use recommender::RecommenderState;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<Arc<RecommenderState>>>>,
}

impl ModelHandle {
    /// A handle with no model loaded yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(state: RecommenderState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(state)))),
        }
    }

    /// Snapshot of the active model, if any
    pub async fn current(&self) -> Option<Arc<RecommenderState>> {
        self.inner.read().await.clone()
    }

    /// Swap in a new model, returning the previous one
    pub async fn replace(&self, state: RecommenderState) -> Option<Arc<RecommenderState>> {
        let next = Arc::new(state);
        self.inner.write().await.replace(next)
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
