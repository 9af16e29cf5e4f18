use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::topic_partition_list::TopicPartitionList;
use tokio::sync::Mutex;

const TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// One transactional producer per operation. `rdkafka` allows only one
/// in-flight transaction per producer handle, so the begin/send/commit
/// critical section is serialized behind an internal mutex -- the
/// per-partition handlers upstream of this still validate and run
/// pipelines concurrently; only the produce-and-commit step is exclusive.
pub struct TransactionalProducer {
    inner: FutureProducer,
    guard: Mutex<()>,
}

impl TransactionalProducer {
    pub fn new(broker_url: &str, transactional_id: &str) -> anyhow::Result<Self> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker_url)
            .set("transactional.id", transactional_id)
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .create()?;
        inner.init_transactions(TRANSACTION_TIMEOUT)?;
        Ok(Self { inner, guard: Mutex::new(()) })
    }

    /// Produces `records` (topic, key, value) as one transaction, then
    /// commits the consumer offsets for `group_id` up through
    /// `partition`/`next_offset` as part of the same transaction. Aborts
    /// and returns the error on any failure after `begin_transaction`.
    pub async fn send_batch_transactional(
        &self,
        records: Vec<(String, Vec<u8>, Vec<u8>)>,
        group_id: &str,
        offsets: &TopicPartitionList,
    ) -> anyhow::Result<()> {
        let _guard = self.guard.lock().await;

        self.inner.begin_transaction()?;

        let result = self.produce_all(records).await;
        if let Err(e) = result {
            self.inner.abort_transaction(TRANSACTION_TIMEOUT)?;
            return Err(e);
        }

        if let Err(e) = self.inner.send_offsets_to_transaction(offsets, &consumer_metadata(group_id), TRANSACTION_TIMEOUT) {
            self.inner.abort_transaction(TRANSACTION_TIMEOUT)?;
            return Err(anyhow::anyhow!("send_offsets_to_transaction failed: {e}"));
        }

        if let Err(e) = self.inner.commit_transaction(TRANSACTION_TIMEOUT) {
            self.inner.abort_transaction(TRANSACTION_TIMEOUT)?;
            return Err(anyhow::anyhow!("commit_transaction failed: {e}"));
        }

        Ok(())
    }

    async fn produce_all(&self, records: Vec<(String, Vec<u8>, Vec<u8>)>) -> anyhow::Result<()> {
        for (topic, key, value) in records {
            let record = FutureRecord::to(&topic).key(&key).payload(&value);
            self.inner
                .send(record, Duration::from_secs(0))
                .await
                .map_err(|(e, _)| anyhow::anyhow!("produce failed: {e}"))?;
        }
        Ok(())
    }
}

fn consumer_metadata(group_id: &str) -> rdkafka::consumer::ConsumerGroupMetadata {
    rdkafka::consumer::ConsumerGroupMetadata::new(group_id)
}
