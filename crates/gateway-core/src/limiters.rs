use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::settings::LimitsConfig;

/// Per-operation concurrency gates plus the cache-wide gate, all drawn from
/// one shared acquire timeout. One instance lives for the lifetime of the
/// process and is cloned (cheaply, via `Arc`) into every pipeline call site.
#[derive(Clone)]
pub struct Limiters {
    pub embedding: Arc<Semaphore>,
    pub category: Arc<Semaphore>,
    pub duplicate: Arc<Semaphore>,
    pub quality: Arc<Semaphore>,
    pub score: Arc<Semaphore>,
    pub people: Arc<Semaphore>,
    pub cache: Arc<Semaphore>,
    pub acquire_timeout: Duration,
}

impl Limiters {
    pub fn new(cfg: &LimitsConfig) -> Self {
        Self {
            embedding: Arc::new(Semaphore::new(cfg.embedding_concurrency)),
            category: Arc::new(Semaphore::new(cfg.category_concurrency)),
            duplicate: Arc::new(Semaphore::new(cfg.duplicate_concurrency)),
            quality: Arc::new(Semaphore::new(cfg.quality_concurrency)),
            score: Arc::new(Semaphore::new(cfg.score_concurrency)),
            people: Arc::new(Semaphore::new(cfg.people_concurrency)),
            cache: Arc::new(Semaphore::new(cfg.cache_concurrency)),
            acquire_timeout: Duration::from_millis(cfg.acquire_timeout_ms),
        }
    }

    /// Acquires an owned permit from `sem`, bounded by `acquire_timeout`.
    /// Returns the permit plus how long the caller waited for it, which
    /// pipelines fold into their tracing spans.
    pub async fn acquire_timed(
        sem: Arc<Semaphore>,
        acquire_timeout: Duration,
        op: &'static str,
    ) -> Result<(OwnedSemaphorePermit, Duration)> {
        let start = Instant::now();
        let permit = tokio::time::timeout(acquire_timeout, sem.acquire_owned())
            .await
            .map_err(|_| anyhow::anyhow!("Limiter acquire timeout for op={}", op))??;
        Ok((permit, start.elapsed()))
    }
}
