use gateway_core::image_loader::{ImageLoader, LocalImageLoader};
use gateway_core::model::ImageRef;

#[tokio::test]
async fn local_loader_reads_bytes_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("photo.jpg");
    std::fs::write(&file_path, b"fake-jpeg-bytes").unwrap();

    let loader = LocalImageLoader::new(dir.path());
    let bytes = loader.load(&ImageRef("photo.jpg".to_string())).await.unwrap();
    assert_eq!(bytes, b"fake-jpeg-bytes");
}

#[tokio::test]
async fn local_loader_errors_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let loader = LocalImageLoader::new(dir.path());
    let result = loader.load(&ImageRef("missing.jpg".to_string())).await;
    assert!(result.is_err());
}
