//! Credential → backend session cache.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::backend::{BackendClient, BackendError, BackendResult, Credential};
use crate::config::BackendConfig;
use crate::observability::metrics;

type Slot = Arc<OnceCell<Arc<BackendClient>>>;

/// A thread-safe cache holding at most one backend session per credential.
///
/// Entries live for the lifetime of the cache and are never invalidated,
/// not even after the backend starts rejecting the credential.
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<DashMap<Credential, Slot>>,
    config: BackendConfig,
}

impl SessionCache {
    /// Create a new empty cache connecting with `config`.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Return the session for `credential`, establishing it on first use.
    ///
    /// Concurrent first requests for the same credential share one
    /// connection attempt. A failed attempt leaves the slot empty so the
    /// next request tries again.
    pub async fn get_or_connect(&self, credential: &Credential) -> BackendResult<Arc<BackendClient>> {
        let slot: Slot = self.inner.entry(credential.clone()).or_default().clone();

        let result = slot
            .get_or_try_init(|| async {
                let client = BackendClient::connect(&self.config, credential.clone()).await?;
                metrics::record_session_created();
                Ok::<_, BackendError>(Arc::new(client))
            })
            .await;

        match result {
            Ok(client) => {
                metrics::record_session_cache_size(self.len());
                Ok(Arc::clone(client))
            }
            Err(e) => {
                // A concurrent caller may have connected in the meantime.
                self.inner.remove_if(credential, |_, slot| !slot.initialized());
                Err(e)
            }
        }
    }

    /// Number of credentials with an established session.
    pub fn len(&self) -> usize {
        self.inner
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("api_url", &self.config.api_url)
            .field("sessions", &self.len())
            .finish()
    }
}
