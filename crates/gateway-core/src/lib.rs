pub mod banks;
pub mod blur;
pub mod cache;
pub mod context;
pub mod dbscan;
pub mod error;
pub mod gpu_client;
pub mod image_loader;
pub mod limiters;
pub mod model;
pub mod pipelines;
pub mod settings;
pub mod vecmath;
