use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use gateway_core::context::AppContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::topic_partition_list::TopicPartitionList;
use rdkafka::Offset;
use tracing::{debug, error, info, warn};

use crate::handler::handle_record;
use crate::producer::TransactionalProducer;
use crate::topics::Operation;

const POLL_TIMEOUT: Duration = Duration::from_millis(200);
const MAX_BATCH_RECORDS: usize = 100;

/// One operation's consume loop: poll the request topic in small batches,
/// dispatch each partition's records concurrently (sequentially within a
/// partition), then commit the response production and offset advance as
/// one transaction per partition.
pub async fn run_consumer_loop(
    op: Operation,
    ctx: Arc<AppContext>,
    shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let kafka_cfg = &ctx.settings.kafka;
    let group_id = op.group_id(kafka_cfg);

    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &kafka_cfg.broker_url)
        .set("group.id", &group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("isolation.level", "read_committed")
        .create()?;
    consumer.subscribe(&[&op.request_topic()])?;

    let producer = Arc::new(TransactionalProducer::new(&kafka_cfg.broker_url, &op.transactional_id())?);
    let response_topic = op.response_topic();

    info!(op = ?op, group_id, "kafka consumer started");

    let mut shutdown = shutdown;
    loop {
        if *shutdown.borrow() {
            break;
        }

        let batch = collect_batch(&consumer).await;
        if batch.is_empty() {
            continue;
        }

        let by_partition = group_by_partition(batch);
        let handles: Vec<_> = by_partition
            .into_iter()
            .map(|(partition, records)| {
                let ctx = ctx.clone();
                let producer = producer.clone();
                let response_topic = response_topic.clone();
                let group_id = group_id.clone();
                tokio::spawn(async move {
                    process_partition_batch(op, partition, records, &ctx, &producer, &response_topic, &group_id).await
                })
            })
            .collect();

        for handle in join_all(handles).await {
            if let Err(e) = handle {
                error!(error = %e, "partition handler task panicked");
            }
        }

        if shutdown.has_changed().unwrap_or(false) {
            shutdown.borrow_and_update();
        }
    }

    info!(op = ?op, "kafka consumer stopped");
    Ok(())
}

struct RawRecord {
    key: Vec<u8>,
    value: Vec<u8>,
    offset: i64,
}

async fn collect_batch(consumer: &StreamConsumer) -> Vec<(String, i32, RawRecord)> {
    let mut batch = Vec::with_capacity(MAX_BATCH_RECORDS);
    let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;

    while batch.len() < MAX_BATCH_RECORDS {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }
        match tokio::time::timeout(remaining, consumer.recv()).await {
            Ok(Ok(msg)) => {
                let key = msg.key().unwrap_or_default().to_vec();
                let value = msg.payload().unwrap_or_default().to_vec();
                batch.push((
                    msg.topic().to_string(),
                    msg.partition(),
                    RawRecord { key, value, offset: msg.offset() },
                ));
            }
            Ok(Err(e)) => {
                warn!(error = %e, "kafka recv error");
                break;
            }
            Err(_) => break,
        }
    }

    batch
}

fn group_by_partition(
    batch: Vec<(String, i32, RawRecord)>,
) -> HashMap<(String, i32), Vec<RawRecord>> {
    let mut grouped: HashMap<(String, i32), Vec<RawRecord>> = HashMap::new();
    for (topic, partition, record) in batch {
        grouped.entry((topic, partition)).or_default().push(record);
    }
    grouped
}

async fn process_partition_batch(
    op: Operation,
    partition: (String, i32),
    records: Vec<RawRecord>,
    ctx: &Arc<AppContext>,
    producer: &Arc<TransactionalProducer>,
    response_topic: &str,
    group_id: &str,
) {
    let (topic, partition_id) = partition;
    let last_offset = records.iter().map(|r| r.offset).max().unwrap_or(0);

    let mut outgoing = Vec::with_capacity(records.len());
    for record in records {
        // Sequential within the partition to preserve per-key ordering.
        let response = handle_record(op, &record.value, ctx).await;
        let response_bytes = match serde_json::to_vec(&response) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "failed to encode kafka response envelope");
                continue;
            }
        };
        outgoing.push((response_topic.to_string(), record.key, response_bytes));
    }

    let mut offsets = TopicPartitionList::new();
    offsets
        .add_partition_offset(&topic, partition_id, Offset::Offset(last_offset + 1))
        .expect("valid offset");

    if let Err(e) = producer
        .send_batch_transactional(outgoing, group_id, &offsets)
        .await
    {
        error!(error = %e, topic, partition_id, "transaction aborted for partition batch");
    } else {
        debug!(topic, partition_id, last_offset, "committed partition batch transaction");
    }
}
