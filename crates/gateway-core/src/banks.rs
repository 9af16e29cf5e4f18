use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single linear regressor (`D -> 1`), used to score highlight/aesthetic
/// quality of an already-normalized embedding. Loaded once at startup from
/// a small JSON sidecar standing in for the original checkpoint format
/// (model-weight IO is explicitly out of scope; see design notes).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AestheticRegressor {
    pub weight: Vec<f32>,
    pub bias: f32,
}

impl AestheticRegressor {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn score(&self, embedding: &[f32]) -> f32 {
        let dot: f32 = embedding
            .iter()
            .zip(self.weight.iter())
            .map(|(a, b)| a * b)
            .sum();
        dot + self.bias
    }
}

/// One category's prompt bank: `P` prompt vectors averaged per image to
/// produce that category's similarity score.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryPrompts {
    pub category: String,
    pub prompts: Vec<Vec<f32>>,
}

/// The category classification bank: parent categories plus any per-concept
/// additional categories, and an optional tag-boost multiplier map.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryFeatureBank {
    pub parent_categories: Vec<CategoryPrompts>,
    #[serde(default)]
    pub concept_categories: HashMap<String, Vec<CategoryPrompts>>,
    #[serde(default)]
    pub tag_boost: HashMap<String, f32>,
}

impl CategoryFeatureBank {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The effective category set for a request: parent categories plus
    /// whichever concept-specific categories the request named.
    pub fn effective_categories(&self, concepts: &[String]) -> Vec<&CategoryPrompts> {
        let mut out: Vec<&CategoryPrompts> = self.parent_categories.iter().collect();
        for concept in concepts {
            if let Some(extra) = self.concept_categories.get(concept) {
                out.extend(extra.iter());
            }
        }
        out
    }
}

/// One quality field's (positive, negative) prompt pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityField {
    pub name: String,
    pub positive: Vec<f32>,
    pub negative: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityFeatureBank {
    pub fields: Vec<QualityField>,
}

impl QualityFeatureBank {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn field(&self, name: &str) -> Option<&QualityField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
