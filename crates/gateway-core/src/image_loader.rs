use async_trait::async_trait;
use std::path::PathBuf;

use crate::model::ImageRef;
use crate::settings::ImageSourceConfig;

/// Pluggable byte fetcher for raw image content. Only the quality
/// pipeline's Laplacian branch needs actual decoded pixels; every other
/// pipeline works purely off cached embeddings.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>>;
}

pub struct LocalImageLoader {
    root: PathBuf,
}

impl LocalImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageLoader for LocalImageLoader {
    async fn load(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(image.as_str());
        Ok(tokio::fs::read(path).await?)
    }
}

pub struct S3ImageLoader {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ImageLoader {
    pub async fn new(cfg: &ImageSourceConfig) -> anyhow::Result<Self> {
        let region = aws_sdk_s3::config::Region::new(cfg.aws_region.clone());
        let creds = aws_sdk_s3::config::Credentials::new(
            cfg.aws_access_key.clone(),
            cfg.aws_secret_key.clone(),
            None,
            None,
            "gateway-static",
        );
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(creds)
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&shared);
        Ok(Self {
            client,
            bucket: cfg.s3_bucket_name.clone(),
        })
    }
}

#[async_trait]
impl ImageLoader for S3ImageLoader {
    async fn load(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        let obj = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(image.as_str())
            .send()
            .await?;
        let bytes = obj.body.collect().await?.into_bytes();
        Ok(bytes.to_vec())
    }
}

/// A minimal GCS object fetcher over the public JSON download API. The pack
/// has no dedicated GCS SDK crate, so this speaks the download endpoint
/// directly with the shared `reqwest` client rather than introduce an
/// out-of-pack dependency.
pub struct GcsImageLoader {
    client: reqwest::Client,
    bucket: String,
    access_token: std::sync::Arc<tokio::sync::RwLock<String>>,
}

impl GcsImageLoader {
    pub fn new(bucket: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bucket,
            access_token: std::sync::Arc::new(tokio::sync::RwLock::new(access_token)),
        }
    }
}

#[async_trait]
impl ImageLoader for GcsImageLoader {
    async fn load(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        let token = self.access_token.read().await.clone();
        let url = format!(
            "https://storage.googleapis.com/storage/v1/b/{}/o/{}?alt=media",
            self.bucket,
            urlencoding::encode(image.as_str())
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}
