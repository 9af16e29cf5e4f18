/// One of the six operations the gateway serves over Kafka, each bound to
/// its own request/response topic pair and consumer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Embedding,
    Category,
    Duplicate,
    Quality,
    Score,
    People,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Embedding,
        Operation::Category,
        Operation::Duplicate,
        Operation::Quality,
        Operation::Score,
        Operation::People,
    ];

    fn slug(self) -> &'static str {
        match self {
            Operation::Embedding => "embedding",
            Operation::Category => "category",
            Operation::Duplicate => "duplicate",
            Operation::Quality => "quality",
            Operation::Score => "score",
            Operation::People => "people",
        }
    }

    pub fn request_topic(self) -> String {
        format!("album.ai.{}.request", self.slug())
    }

    pub fn response_topic(self) -> String {
        format!("album.ai.{}.response", self.slug())
    }

    pub fn group_id(self, kafka: &gateway_core::settings::KafkaConfig) -> String {
        match self {
            Operation::Embedding => kafka.group_embedding.clone(),
            Operation::Category => kafka.group_category.clone(),
            Operation::Duplicate => kafka.group_duplicate.clone(),
            Operation::Quality => kafka.group_quality.clone(),
            Operation::Score => kafka.group_score.clone(),
            Operation::People => kafka.group_people.clone(),
        }
    }

    pub fn transactional_id(self) -> String {
        format!("gateway-{}-{}", self.slug(), uuid::Uuid::new_v4())
    }
}
