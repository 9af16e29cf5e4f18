use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GpuError;
use crate::model::ImageRef;

/// Thin, long-lived client for the remote GPU inference service. Holds a
/// single pooled `reqwest::Client` for the process lifetime, following the
/// same construction the embedding service uses for its own HTTP client.
#[derive(Clone)]
pub struct GpuClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    images: &'a [ImageRef],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    message: String,
    data: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct PeopleClusterRequest<'a> {
    images: &'a [ImageRef],
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FaceBox {
    pub image: String,
    pub bbox: [f32; 4],
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PeopleCluster {
    pub images: Vec<String>,
    pub representative_face: FaceBox,
}

#[derive(Debug, Deserialize)]
struct PeopleClusterResponse {
    message: String,
    data: Vec<PeopleCluster>,
}

impl GpuClient {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn map_transport_error(err: reqwest::Error) -> GpuError {
        if err.is_timeout() {
            GpuError::Timeout
        } else {
            GpuError::Transport(err.to_string())
        }
    }

    /// Calls `POST /clip/embedding`. Returns the subset of requested refs
    /// the GPU service actually embedded; refs absent from the response
    /// are left for the caller to report as `invalid_images`.
    pub async fn embed(
        &self,
        images: &[ImageRef],
    ) -> Result<HashMap<String, Vec<f32>>, GpuError> {
        let resp = self
            .client
            .post(format!("{}/clip/embedding", self.base_url))
            .json(&EmbeddingRequest { images })
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !resp.status().is_success() {
            return Err(GpuError::HttpStatus(resp.status().as_u16()));
        }

        let body: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| GpuError::Decode(e.to_string()))?;

        if body.message != "success" {
            return Err(GpuError::BadMessage(body.message));
        }

        Ok(body.data)
    }

    /// Calls `POST /people/cluster`. Pure pass-through; no local
    /// post-processing is applied to the returned clusters.
    pub async fn cluster_people(
        &self,
        images: &[ImageRef],
    ) -> Result<Vec<PeopleCluster>, GpuError> {
        let resp = self
            .client
            .post(format!("{}/people/cluster", self.base_url))
            .json(&PeopleClusterRequest { images })
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !resp.status().is_success() {
            return Err(GpuError::HttpStatus(resp.status().as_u16()));
        }

        let body: PeopleClusterResponse = resp
            .json()
            .await
            .map_err(|e| GpuError::Decode(e.to_string()))?;

        if body.message != "success" {
            return Err(GpuError::BadMessage(body.message));
        }

        Ok(body.data)
    }
}
