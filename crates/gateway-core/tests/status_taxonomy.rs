use gateway_core::error::StatusTaxonomy;

#[test]
fn codes_and_messages_match_closed_taxonomy() {
    let cases = [
        (StatusTaxonomy::Success, 201, "success"),
        (StatusTaxonomy::InvalidRequest, 400, "invalid_request"),
        (StatusTaxonomy::Unauthorized, 403, "unauthorized_server"),
        (StatusTaxonomy::EmbeddingRequired, 428, "embedding_required"),
        (StatusTaxonomy::InternalError, 500, "internal_server_error"),
    ];
    for (status, code, message) in cases {
        assert_eq!(status.code(), code);
        assert_eq!(status.message(), message);
        assert_eq!(StatusTaxonomy::from_code(code), Some(status));
    }
}

#[test]
fn unknown_code_does_not_resolve() {
    assert_eq!(StatusTaxonomy::from_code(999), None);
}
