use gateway_kafka::envelope::parse_header;

#[test]
fn parse_header_extracts_task_and_album_id() {
    let raw = br#"{"taskId":"t-1","albumId":42,"images":["a.jpg"]}"#;
    let (value, task_id, album_id) = parse_header(raw).unwrap();
    assert_eq!(task_id, "t-1");
    assert_eq!(album_id, 42);
    assert_eq!(value["images"][0], "a.jpg");
}

#[test]
fn parse_header_rejects_missing_task_id() {
    let raw = br#"{"albumId":42,"images":["a.jpg"]}"#;
    let err = parse_header(raw).unwrap_err();
    assert_eq!(err.0, "unknown");
    assert_eq!(err.1, 42);
}

#[test]
fn parse_header_rejects_malformed_json() {
    let raw = b"not json";
    let err = parse_header(raw).unwrap_err();
    assert_eq!(err.0, "unknown");
    assert_eq!(err.1, 0);
}
