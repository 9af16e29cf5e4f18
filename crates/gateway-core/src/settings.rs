use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fully resolved, validated application configuration. Loaded once at
/// startup via [`Settings::load`] and never mutated afterward.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub gpu: GpuConfig,
    pub kafka: KafkaConfig,
    pub model: ModelConfig,
    pub image_source: ImageSourceConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub project_id: String,
    pub app_env: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: u8,
    pub cache_ttl_secs: u64,
}

impl RedisConfig {
    pub fn connection_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GpuConfig {
    pub base_url: String,
    #[serde(default = "default_gpu_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gpu_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ModelName {
    #[serde(rename = "ViT-B/32")]
    ViTB32,
    #[serde(rename = "ViT-L/14")]
    ViTL14,
}

impl ModelName {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "ViT-B/32" => Ok(ModelName::ViTB32),
            "ViT-L/14" => Ok(ModelName::ViTL14),
            other => Err(anyhow::anyhow!(
                "MODEL_NAME must be one of \"ViT-B/32\" or \"ViT-L/14\", got {:?}",
                other
            )),
        }
    }

    /// The (T_a, T_c) quality thresholds for the dual-threshold quality branch.
    pub fn quality_thresholds(self) -> (f32, f32) {
        match self {
            ModelName::ViTB32 => (0.488, 0.490),
            ModelName::ViTL14 => (0.483, 0.486),
        }
    }

    pub fn dim(self) -> usize {
        match self {
            ModelName::ViTB32 => 512,
            ModelName::ViTL14 => 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    pub name: ModelName,
    pub regressor_path: String,
    pub category_features_path: String,
    pub quality_features_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ImageMode {
    Local,
    S3,
    Gcs,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageSourceConfig {
    pub mode: ImageMode,
    pub local_img_path: String,
    pub aws_access_key: String,
    pub aws_secret_key: String,
    pub aws_region: String,
    pub s3_bucket_name: String,
    pub gcs_bucket_name: String,
    pub gcp_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub broker_url: String,
    pub group_category: String,
    pub group_duplicate: String,
    pub group_quality: String,
    pub group_score: String,
    pub group_embedding: String,
    pub group_people: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_embedding_concurrency")]
    pub embedding_concurrency: usize,
    #[serde(default = "default_op_concurrency")]
    pub category_concurrency: usize,
    #[serde(default = "default_op_concurrency")]
    pub duplicate_concurrency: usize,
    #[serde(default = "default_op_concurrency")]
    pub quality_concurrency: usize,
    #[serde(default = "default_op_concurrency")]
    pub score_concurrency: usize,
    #[serde(default = "default_op_concurrency")]
    pub people_concurrency: usize,
    #[serde(default = "default_cache_concurrency")]
    pub cache_concurrency: usize,
    #[serde(default = "default_cpu_workers")]
    pub cpu_workers: usize,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_embedding_concurrency() -> usize {
    4
}

fn default_op_concurrency() -> usize {
    5
}

fn default_cache_concurrency() -> usize {
    80
}

fn default_cpu_workers() -> usize {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    30_000
}

/// The mandatory environment variables this gateway refuses to start
/// without. Mirrors the source's `if not X: raise EnvironmentError(...)`
/// guard pattern, applied once at startup rather than scattered per module.
const MANDATORY_VARS: &[&str] = &[
    "PROJECT_ID",
    "APP_ENV",
    "AWS_ACCESS_KEY",
    "AWS_SECRET_KEY",
    "AWS_REGION",
    "S3_BUCKET_NAME",
    "GCS_BUCKET_NAME",
    "GCP_KEY",
    "IMAGE_MODE",
    "LOCAL_IMG_PATH",
    "MODEL_NAME",
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_DB",
    "REDIS_CACHE_TTL",
    "GPU_SERVER_BASE_URL",
    "KAFKA_BROKER_URL",
    "KAFKA_GROUP_CATEGORY",
    "KAFKA_GROUP_DUPLICATE",
    "KAFKA_GROUP_QUALITY",
    "KAFKA_GROUP_SCORE",
    "KAFKA_GROUP_EMBEDDING",
    "KAFKA_GROUP_PEOPLE",
];

impl Settings {
    /// Loads configuration from `config/settings.toml` (optional) layered
    /// under environment variables (`APP__*` plus the flat mandatory names
    /// below), then validates every mandatory variable is present before
    /// returning. Bails loudly -- matching the source's fail-fast module
    /// initialization -- rather than allowing a partially configured
    /// process to bind a socket.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let missing: Vec<&str> = MANDATORY_VARS
            .iter()
            .filter(|key| std::env::var(key).is_err())
            .copied()
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "missing mandatory environment variable(s): {}",
                missing.join(", ")
            );
        }

        let image_mode = match std::env::var("IMAGE_MODE")?.as_str() {
            "local" => ImageMode::Local,
            "s3" => ImageMode::S3,
            "gcs" => ImageMode::Gcs,
            other => anyhow::bail!("IMAGE_MODE must be one of local|s3|gcs, got {:?}", other),
        };
        let model_name = ModelName::parse(&std::env::var("MODEL_NAME")?)?;

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/settings").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );
        let layered = builder.build().unwrap_or_else(|_| config::Config::default());
        let limits: LimitsConfig = layered
            .get("limits")
            .unwrap_or_else(|_| LimitsConfig {
                embedding_concurrency: default_embedding_concurrency(),
                category_concurrency: default_op_concurrency(),
                duplicate_concurrency: default_op_concurrency(),
                quality_concurrency: default_op_concurrency(),
                score_concurrency: default_op_concurrency(),
                people_concurrency: default_op_concurrency(),
                cache_concurrency: default_cache_concurrency(),
                cpu_workers: default_cpu_workers(),
                acquire_timeout_ms: default_acquire_timeout_ms(),
            });

        Ok(Settings {
            server: ServerConfig {
                host: default_host(),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_port),
                project_id: std::env::var("PROJECT_ID")?,
                app_env: std::env::var("APP_ENV")?,
            },
            redis: RedisConfig {
                host: std::env::var("REDIS_HOST")?,
                port: std::env::var("REDIS_PORT")?.parse()?,
                db: std::env::var("REDIS_DB")?.parse()?,
                cache_ttl_secs: std::env::var("REDIS_CACHE_TTL")?.parse()?,
            },
            gpu: GpuConfig {
                base_url: std::env::var("GPU_SERVER_BASE_URL")?,
                timeout_secs: default_gpu_timeout_secs(),
            },
            kafka: KafkaConfig {
                broker_url: std::env::var("KAFKA_BROKER_URL")?,
                group_category: std::env::var("KAFKA_GROUP_CATEGORY")?,
                group_duplicate: std::env::var("KAFKA_GROUP_DUPLICATE")?,
                group_quality: std::env::var("KAFKA_GROUP_QUALITY")?,
                group_score: std::env::var("KAFKA_GROUP_SCORE")?,
                group_embedding: std::env::var("KAFKA_GROUP_EMBEDDING")?,
                group_people: std::env::var("KAFKA_GROUP_PEOPLE")?,
            },
            model: ModelConfig {
                name: model_name,
                regressor_path: std::env::var("AESTHETIC_REGRESSOR_PATH")
                    .unwrap_or_else(|_| "config/aesthetic_regressor.json".to_string()),
                category_features_path: std::env::var("CATEGORY_FEATURES_PATH")
                    .unwrap_or_else(|_| "config/category_features.json".to_string()),
                quality_features_path: std::env::var("QUALITY_FEATURES_PATH")
                    .unwrap_or_else(|_| "config/quality_features.json".to_string()),
            },
            image_source: ImageSourceConfig {
                mode: image_mode,
                local_img_path: std::env::var("LOCAL_IMG_PATH")?,
                aws_access_key: std::env::var("AWS_ACCESS_KEY")?,
                aws_secret_key: std::env::var("AWS_SECRET_KEY")?,
                aws_region: std::env::var("AWS_REGION")?,
                s3_bucket_name: std::env::var("S3_BUCKET_NAME")?,
                gcs_bucket_name: std::env::var("GCS_BUCKET_NAME")?,
                gcp_key: std::env::var("GCP_KEY")?,
            },
            limits,
        })
    }
}
