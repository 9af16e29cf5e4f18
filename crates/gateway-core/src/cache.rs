use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::limiters::Limiters;
use crate::model::{CacheEntry, Embedding, ImageRef};

/// Fronts the remote embedding store. Every backend round trip is gated by
/// the shared cache semaphore so a burst of pipeline calls cannot open an
/// unbounded number of connections, mirroring `Limiters::acquire_timed`.
#[derive(Clone)]
pub struct CacheCoordinator {
    conn: ConnectionManager,
    semaphore: Arc<Semaphore>,
    acquire_timeout: Duration,
    ttl: Duration,
}

impl CacheCoordinator {
    pub async fn connect(
        redis_url: &str,
        limiters: &Limiters,
        ttl: Duration,
    ) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            semaphore: limiters.cache.clone(),
            acquire_timeout: limiters.acquire_timeout,
            ttl,
        })
    }

    async fn acquire(&self) -> Result<tokio::sync::OwnedSemaphorePermit, CacheError> {
        tokio::time::timeout(self.acquire_timeout, self.semaphore.clone().acquire_owned())
            .await
            .map_err(|_| CacheError::LimiterTimeout)?
            .map_err(|_| CacheError::LimiterTimeout)
    }

    /// Fetches one embedding. A backend error is logged and reported as a
    /// miss rather than failing the caller -- the source's
    /// `get_cached_embedding` never raises either.
    pub async fn get(&self, key: &ImageRef) -> Option<Embedding> {
        let _permit = match self.acquire().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "cache limiter timeout on get, treating as miss");
                return None;
            }
        };
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key.as_str()).await {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => Some(entry.into()),
                Err(e) => {
                    warn!(error = %e, key = %key, "cache entry failed to decode, treating as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, key = %key, "cache backend error on get, treating as miss");
                None
            }
        }
    }

    /// Fetches many embeddings in parallel, preserving input order in the
    /// returned vector. Any key whose value was absent or whose lookup
    /// failed for any reason appears in `missing` instead -- matching the
    /// source's `get_cached_embeddings_parallel`, which folds both
    /// exceptions and `None` results into a single "missing" bucket via
    /// `asyncio.gather(..., return_exceptions=True)`.
    pub async fn get_many(
        &self,
        keys: &[ImageRef],
    ) -> (Vec<Option<Embedding>>, Vec<ImageRef>) {
        let futures = keys.iter().map(|k| self.get(k));
        let results = join_all(futures).await;

        let missing = keys
            .iter()
            .zip(results.iter())
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.clone())
            .collect();

        (results, missing)
    }

    /// Writes one embedding with the configured TTL. Failure here is not
    /// downgraded -- the embedding pipeline surfaces it as a hard error,
    /// since a missing write breaks the cache-then-read contract every
    /// other pipeline relies on.
    pub async fn set(&self, key: &ImageRef, value: Embedding) -> Result<(), CacheError> {
        let _permit = self.acquire().await?;
        let entry: CacheEntry = value.into();
        let raw = serde_json::to_string(&entry)
            .map_err(|e| CacheError::Backend(format!("encode failure: {e}")))?;
        let mut conn = self.conn.clone();
        let ttl_secs = self.ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key.as_str(), raw, ttl_secs)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        debug!(key = %key, ttl_secs, "wrote embedding to cache");
        Ok(())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
