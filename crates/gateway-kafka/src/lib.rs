pub mod consumer;
pub mod envelope;
pub mod handler;
pub mod producer;
pub mod topics;

use std::sync::Arc;

use gateway_core::context::AppContext;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use topics::Operation;

/// All six consumer loops plus the shutdown signal that stops them.
pub struct KafkaConsumers {
    pub handles: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl KafkaConsumers {
    /// Spawns one consumer task per operation.
    pub fn start(ctx: Arc<AppContext>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = Operation::ALL
            .into_iter()
            .map(|op| {
                let ctx = ctx.clone();
                let shutdown_rx = shutdown_rx.clone();
                tokio::spawn(async move {
                    if let Err(e) = consumer::run_consumer_loop(op, ctx, shutdown_rx).await {
                        tracing::error!(op = ?op, error = %e, "kafka consumer loop exited with error");
                    }
                })
            })
            .collect();

        Self { handles, shutdown_tx }
    }

    /// Signals every consumer loop to stop after its current poll cycle and
    /// awaits their exit, aborting any that don't stop promptly.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            let abort_handle = handle.abort_handle();
            if tokio::time::timeout(std::time::Duration::from_secs(5), handle).await.is_err() {
                tracing::warn!("kafka consumer task did not exit promptly, aborting");
                abort_handle.abort();
            }
        }
    }
}
