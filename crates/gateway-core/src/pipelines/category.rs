use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::banks::CategoryFeatureBank;
use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::ImageRef;
use crate::vecmath::dot;

use super::{fetch_and_normalize, run_guarded};

const TOP_K: usize = 3;
const TAU: f32 = 0.28;
const LAMBDA: f32 = 0.5;
const ASSIGN_THRESHOLD: f32 = 0.21;
const BOOST_THRESHOLD: f32 = 0.22;
const TOP_REPRESENTATIVE: usize = 5;
const OTHER: &str = "기타";

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub concepts: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CategoryCluster {
    pub category: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CategoryResponseData {
    Clusters(Vec<CategoryCluster>),
    Missing(Vec<String>),
}

impl Default for CategoryResponseData {
    fn default() -> Self {
        CategoryResponseData::Clusters(Vec::new())
    }
}

pub async fn run(ctx: &AppContext, req: CategoryRequest) -> PipelineOutcome<CategoryResponseData> {
    run_guarded("category", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: CategoryRequest) -> PipelineOutcome<CategoryResponseData> {
    if req.images.is_empty() {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, CategoryResponseData::default());
    }

    let rows = match fetch_and_normalize(ctx, &req.images).await {
        Ok(rows) => rows,
        Err(outcome) => {
            return PipelineOutcome::new(outcome.status, CategoryResponseData::Missing(outcome.body.data));
        }
    };

    let bank = ctx.category_bank.clone();
    let images = req.images.clone();
    let concepts = req.concepts.clone();

    let result = tokio::task::spawn_blocking(move || classify(&bank, &images, rows, &concepts)).await;

    match result {
        Ok(clusters) => PipelineOutcome::new(StatusTaxonomy::Success, CategoryResponseData::Clusters(clusters)),
        Err(e) => {
            tracing::error!(error = %e, "category classification task failed");
            PipelineOutcome::new(StatusTaxonomy::InternalError, CategoryResponseData::default())
        }
    }
}

/// One image's ranked top-k (tag index, score) pairs, ties broken by lower
/// tag index first.
fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
    indexed.truncate(k);
    indexed
}

/// Sums representative scores (and bonus-weighted representative scores)
/// per tag over the top-k entries of the given image indices only.
fn representative_scores(
    top3: &[Vec<(usize, f32)>],
    members: &[usize],
) -> HashMap<usize, f32> {
    let mut sum_score: HashMap<usize, f32> = HashMap::new();
    let mut bonus: HashMap<usize, f32> = HashMap::new();

    for &n in members {
        for &(tag, score) in &top3[n] {
            *sum_score.entry(tag).or_insert(0.0) += score;
            if score > TAU {
                *bonus.entry(tag).or_insert(0.0) += score;
            }
        }
    }

    sum_score
        .into_iter()
        .map(|(tag, s)| {
            let b = bonus.get(&tag).copied().unwrap_or(0.0);
            (tag, s + LAMBDA * b)
        })
        .collect()
}

fn classify(
    bank: &CategoryFeatureBank,
    images: &[ImageRef],
    rows: Vec<Vec<f32>>,
    concepts: &[String],
) -> Vec<CategoryCluster> {
    let categories = bank.effective_categories(concepts);
    let n = rows.len();
    let t = categories.len();
    if t == 0 {
        return vec![CategoryCluster {
            category: OTHER.to_string(),
            images: images.iter().map(|i| i.0.clone()).collect(),
        }];
    }

    // Step 1: similarity matrix S[n][t] = mean over that category's prompts.
    let mut scores = vec![vec![0.0f32; t]; n];
    for (ti, cat) in categories.iter().enumerate() {
        if cat.prompts.is_empty() {
            continue;
        }
        for (ni, row) in rows.iter().enumerate() {
            let mean: f32 =
                cat.prompts.iter().map(|p| dot(row, p)).sum::<f32>() / cat.prompts.len() as f32;
            scores[ni][ti] = mean;
        }
    }

    // Step 2: optional tag boost for low scores.
    for ni in 0..n {
        for ti in 0..t {
            if scores[ni][ti] <= BOOST_THRESHOLD {
                if let Some(&boost) = bank.tag_boost.get(&categories[ti].category) {
                    scores[ni][ti] *= boost;
                }
            }
        }
    }

    // Step 3: per-image top-k tags.
    let top3: Vec<Vec<(usize, f32)>> = scores.iter().map(|s| top_k(s, TOP_K)).collect();

    // Steps 4-5: representative score across all images, top-5 tags.
    let all_members: Vec<usize> = (0..n).collect();
    let rep = representative_scores(&top3, &all_members);
    let mut rep_sorted: Vec<(usize, f32)> = rep.into_iter().collect();
    rep_sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
    let representative_set: std::collections::HashSet<usize> = rep_sorted
        .into_iter()
        .take(TOP_REPRESENTATIVE)
        .map(|(tag, _)| tag)
        .collect();

    // Step 6: primary assignment.
    let mut assignment: Vec<String> = vec![OTHER.to_string(); n];
    for ni in 0..n {
        let mut chosen = None;
        for &(tag, score) in &top3[ni] {
            if representative_set.contains(&tag) && score >= ASSIGN_THRESHOLD {
                chosen = Some(tag);
                break;
            }
        }
        if let Some(tag) = chosen {
            assignment[ni] = categories[tag].category.clone();
        }
    }

    // Step 7: representative refinement per non-other bucket.
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (ni, cat) in assignment.iter().enumerate() {
        buckets.entry(cat.clone()).or_default().push(ni);
    }

    let mut relabel: HashMap<String, String> = HashMap::new();
    for (old_label, members) in buckets.iter() {
        if old_label == OTHER {
            continue;
        }
        let bucket_rep = representative_scores(&top3, members);
        if let Some((&best_tag, _)) = bucket_rep
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap().then(b.0.cmp(a.0)))
        {
            relabel.insert(old_label.clone(), categories[best_tag].category.clone());
        }
    }

    // Step 8: reclassification against the refined label.
    for (old_label, members) in buckets {
        if old_label == OTHER {
            continue;
        }
        let Some(new_label) = relabel.get(&old_label) else {
            continue;
        };
        if *new_label == old_label {
            continue;
        }
        let new_tag_idx = categories.iter().position(|c| &c.category == new_label);
        for ni in members {
            let qualifies = new_tag_idx
                .map(|tag| top3[ni].iter().any(|&(t, s)| t == tag && s >= ASSIGN_THRESHOLD))
                .unwrap_or(false);
            assignment[ni] = if qualifies {
                new_label.clone()
            } else {
                OTHER.to_string()
            };
        }
    }

    let mut final_buckets: HashMap<String, Vec<String>> = HashMap::new();
    for (ni, cat) in assignment.into_iter().enumerate() {
        final_buckets.entry(cat).or_default().push(images[ni].0.clone());
    }

    final_buckets
        .into_iter()
        .filter(|(_, imgs)| !imgs.is_empty())
        .map(|(category, images)| CategoryCluster { category, images })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_breaks_ties_by_lower_index() {
        let scores = vec![0.5, 0.5, 0.9, 0.1];
        let top = top_k(&scores, 2);
        assert_eq!(top[0].0, 2);
        assert_eq!(top[1].0, 0);
    }
}
