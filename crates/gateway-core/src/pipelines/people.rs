use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::gpu_client::PeopleCluster;
use crate::model::ImageRef;

use super::run_guarded;

#[derive(Debug, Deserialize)]
pub struct PeopleRequest {
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Serialize, Default)]
pub struct PeopleResponseData {
    pub people_clusters: Vec<PeopleCluster>,
}

pub async fn run(ctx: &AppContext, req: PeopleRequest) -> PipelineOutcome<PeopleResponseData> {
    run_guarded("people", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: PeopleRequest) -> PipelineOutcome<PeopleResponseData> {
    if req.images.is_empty() {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, PeopleResponseData::default());
    }

    match ctx.gpu.cluster_people(&req.images).await {
        Ok(people_clusters) => {
            PipelineOutcome::new(StatusTaxonomy::Success, PeopleResponseData { people_clusters })
        }
        Err(e) => {
            tracing::error!(error = %e, "gpu people cluster call failed");
            PipelineOutcome::new(StatusTaxonomy::InternalError, PeopleResponseData::default())
        }
    }
}
