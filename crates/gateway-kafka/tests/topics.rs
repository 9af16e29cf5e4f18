use gateway_kafka::topics::Operation;

#[test]
fn topic_names_follow_the_fixed_naming_scheme() {
    assert_eq!(Operation::Embedding.request_topic(), "album.ai.embedding.request");
    assert_eq!(Operation::Embedding.response_topic(), "album.ai.embedding.response");
    assert_eq!(Operation::People.request_topic(), "album.ai.people.request");
}

#[test]
fn transactional_id_is_unique_per_call() {
    let a = Operation::Category.transactional_id();
    let b = Operation::Category.transactional_id();
    assert_ne!(a, b);
    assert!(a.starts_with("gateway-category-"));
}
