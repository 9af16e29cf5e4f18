use gateway_core::gpu_client::GpuClient;
use gateway_core::model::ImageRef;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn embed_returns_vectors_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clip/embedding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": { "img-1.jpg": [0.1, 0.2, 0.3] }
        })))
        .mount(&server)
        .await;

    let client = GpuClient::new(server.uri(), std::time::Duration::from_secs(5)).unwrap();
    let result = client.embed(&[ImageRef("img-1.jpg".to_string())]).await.unwrap();
    assert_eq!(result.get("img-1.jpg").unwrap(), &vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn embed_maps_non_success_message_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clip/embedding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "failure",
            "data": {}
        })))
        .mount(&server)
        .await;

    let client = GpuClient::new(server.uri(), std::time::Duration::from_secs(5)).unwrap();
    let err = client.embed(&[ImageRef("img-1.jpg".to_string())]).await.unwrap_err();
    assert!(matches!(err, gateway_core::error::GpuError::BadMessage(_)));
}

#[tokio::test]
async fn embed_maps_non_2xx_to_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clip/embedding"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GpuClient::new(server.uri(), std::time::Duration::from_secs(5)).unwrap();
    let err = client.embed(&[ImageRef("img-1.jpg".to_string())]).await.unwrap_err();
    assert!(matches!(err, gateway_core::error::GpuError::HttpStatus(500)));
}

#[tokio::test]
async fn cluster_people_passes_through_clusters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/people/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": [{
                "images": ["a.jpg", "b.jpg"],
                "representative_face": { "image": "a.jpg", "bbox": [0.0, 0.0, 1.0, 1.0] }
            }]
        })))
        .mount(&server)
        .await;

    let client = GpuClient::new(server.uri(), std::time::Duration::from_secs(5)).unwrap();
    let clusters = client.cluster_people(&[ImageRef("a.jpg".to_string())]).await.unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].images, vec!["a.jpg", "b.jpg"]);
}
