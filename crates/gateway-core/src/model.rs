use serde::{Deserialize, Serialize};

/// Opaque identifier for one image, shared as both the object-store key and
/// the cache key for its embedding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        ImageRef(s)
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single-precision embedding vector of declared dimension `D`.
#[derive(Debug, Clone)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// Returns an L2-normalized copy. A zero vector normalizes to itself.
    pub fn normalized(&self) -> Embedding {
        let norm = self.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return self.clone();
        }
        Embedding::new(self.values.iter().map(|v| v / norm).collect())
    }

    pub fn dot(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// A row in the cache: the embedding plus how it was encoded on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub values: Vec<f32>,
}

impl From<Embedding> for CacheEntry {
    fn from(e: Embedding) -> Self {
        CacheEntry { values: e.into_vec() }
    }
}

impl From<CacheEntry> for Embedding {
    fn from(c: CacheEntry) -> Self {
        Embedding::new(c.values)
    }
}
