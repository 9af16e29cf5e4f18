use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use gateway_core::banks::{AestheticRegressor, CategoryFeatureBank, QualityFeatureBank};
use gateway_core::cache::CacheCoordinator;
use gateway_core::context::AppContext;
use gateway_core::gpu_client::GpuClient;
use gateway_core::image_loader::{GcsImageLoader, ImageLoader, LocalImageLoader, S3ImageLoader};
use gateway_core::limiters::Limiters;
use gateway_core::settings::{ImageMode, Settings};
use gateway_kafka::KafkaConsumers;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info,gateway=debug".to_string()))
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("starting AI task gateway");

    let settings = Settings::load()?;
    info!("configuration loaded");

    let regressor = Arc::new(AestheticRegressor::load(&settings.model.regressor_path)?);
    let category_bank = Arc::new(CategoryFeatureBank::load(&settings.model.category_features_path)?);
    let quality_bank = Arc::new(QualityFeatureBank::load(&settings.model.quality_features_path)?);
    info!("model banks loaded");

    let image_loader: Arc<dyn ImageLoader> = match settings.image_source.mode {
        ImageMode::Local => Arc::new(LocalImageLoader::new(settings.image_source.local_img_path.clone())),
        ImageMode::S3 => Arc::new(S3ImageLoader::new(&settings.image_source).await?),
        ImageMode::Gcs => Arc::new(GcsImageLoader::new(
            settings.image_source.gcs_bucket_name.clone(),
            std::fs::read_to_string(&settings.image_source.gcp_key)?,
        )),
    };
    info!(mode = ?settings.image_source.mode, "image loader ready");

    let limiters = Arc::new(Limiters::new(&settings.limits));

    let cache = CacheCoordinator::connect(&settings.redis.connection_url(), &limiters, settings.redis.ttl()).await?;
    cache.ping().await?;
    info!("cache connection established");

    let gpu = GpuClient::new(settings.gpu.base_url.clone(), std::time::Duration::from_secs(settings.gpu.timeout_secs))?;

    let ctx = Arc::new(AppContext::new(
        settings.clone(),
        limiters,
        cache,
        gpu,
        image_loader,
        regressor,
        category_bank,
        quality_bank,
    ));

    let kafka = KafkaConsumers::start(ctx.clone());
    info!("kafka consumers started");

    let app = gateway_http::router::build_router(ctx);
    let addr = SocketAddr::from((settings.server.host.parse::<std::net::IpAddr>()?, settings.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http server listening");

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "http server exited with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down");
    kafka.shutdown().await;
    info!("gateway stopped");

    Ok(())
}
