use gateway_core::pipelines::embedding::EmbeddingResponseData;

#[test]
fn all_embedded_serializes_data_as_null() {
    let data = EmbeddingResponseData::default();
    let json = serde_json::to_string(&data).unwrap();
    assert_eq!(json, "null");
}

#[test]
fn one_unknown_image_serializes_data_as_bare_array() {
    let data = EmbeddingResponseData(Some(vec!["b.jpg".to_string()]));
    let json = serde_json::to_string(&data).unwrap();
    assert_eq!(json, r#"["b.jpg"]"#);
}
