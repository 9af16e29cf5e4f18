use gateway_core::banks::{CategoryFeatureBank, CategoryPrompts};
use gateway_core::model::ImageRef;

fn unit(x: f32, y: f32) -> Vec<f32> {
    let norm = (x * x + y * y).sqrt();
    vec![x / norm, y / norm]
}

fn bank_with_two_categories() -> CategoryFeatureBank {
    CategoryFeatureBank {
        parent_categories: vec![
            CategoryPrompts { category: "food".to_string(), prompts: vec![unit(1.0, 0.0)] },
            CategoryPrompts { category: "landscape".to_string(), prompts: vec![unit(0.0, 1.0)] },
        ],
        concept_categories: Default::default(),
        tag_boost: Default::default(),
    }
}

#[test]
fn effective_categories_includes_concept_extras() {
    let mut bank = bank_with_two_categories();
    bank.concept_categories.insert(
        "pets".to_string(),
        vec![CategoryPrompts { category: "pets".to_string(), prompts: vec![unit(0.7, 0.7)] }],
    );

    let base = bank.effective_categories(&[]);
    assert_eq!(base.len(), 2);

    let with_concept = bank.effective_categories(&["pets".to_string()]);
    assert_eq!(with_concept.len(), 3);
    assert!(with_concept.iter().any(|c| c.category == "pets"));
}

#[test]
fn image_ref_roundtrips_through_json() {
    let r = ImageRef("img-001.jpg".to_string());
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, "\"img-001.jpg\"");
    let back: ImageRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}
