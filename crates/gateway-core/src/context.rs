use std::sync::Arc;

use crate::banks::{AestheticRegressor, CategoryFeatureBank, QualityFeatureBank};
use crate::cache::CacheCoordinator;
use crate::gpu_client::GpuClient;
use crate::image_loader::ImageLoader;
use crate::limiters::Limiters;
use crate::settings::Settings;

/// Explicit application context threaded through every pipeline as
/// `Arc<AppContext>`, in place of process-wide globals -- mirroring the
/// server crate's `AppState`, generalized to this gateway's singletons.
pub struct AppContext {
    pub settings: Settings,
    pub limiters: Arc<Limiters>,
    pub cache: CacheCoordinator,
    pub gpu: GpuClient,
    pub image_loader: Arc<dyn ImageLoader>,
    pub regressor: Arc<AestheticRegressor>,
    pub category_bank: Arc<CategoryFeatureBank>,
    pub quality_bank: Arc<QualityFeatureBank>,
}

impl AppContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        limiters: Arc<Limiters>,
        cache: CacheCoordinator,
        gpu: GpuClient,
        image_loader: Arc<dyn ImageLoader>,
        regressor: Arc<AestheticRegressor>,
        category_bank: Arc<CategoryFeatureBank>,
        quality_bank: Arc<QualityFeatureBank>,
    ) -> Self {
        Self {
            settings,
            limiters,
            cache,
            gpu,
            image_loader,
            regressor,
            category_bank,
            quality_bank,
        }
    }
}
