//! Dependency-free DBSCAN over a precomputed distance matrix. No crate in
//! the dependency pack offers this for a precomputed-metric input, so it is
//! hand-written here the way the server crate hand-writes its own small
//! numeric helpers rather than reaching for a linear-algebra dependency.

const NOISE: i32 = -1;
const UNVISITED: i32 = -2;

/// Clusters `n` points given their pairwise distances. Returns a label per
/// point: `-1` for noise, otherwise a 0-based cluster id assigned in the
/// order clusters are first discovered.
pub fn dbscan(distances: &[Vec<f32>], eps: f32, min_samples: usize) -> Vec<i32> {
    let n = distances.len();
    let mut labels = vec![UNVISITED; n];
    let mut next_cluster = 0i32;

    let neighbors = |i: usize| -> Vec<usize> {
        (0..n).filter(|&j| j != i && distances[i][j] <= eps).collect()
    };

    for i in 0..n {
        if labels[i] != UNVISITED {
            continue;
        }
        let seeds = neighbors(i);
        if seeds.len() + 1 < min_samples {
            labels[i] = NOISE;
            continue;
        }

        let cluster_id = next_cluster;
        next_cluster += 1;
        labels[i] = cluster_id;

        let mut queue: Vec<usize> = seeds;
        let mut idx = 0;
        while idx < queue.len() {
            let q = queue[idx];
            idx += 1;

            if labels[q] == NOISE {
                labels[q] = cluster_id;
            }
            if labels[q] != UNVISITED {
                continue;
            }
            labels[q] = cluster_id;

            let q_neighbors = neighbors(q);
            if q_neighbors.len() + 1 >= min_samples {
                for &r in &q_neighbors {
                    if labels[r] == UNVISITED || labels[r] == NOISE {
                        queue.push(r);
                    }
                }
            }
        }
    }

    labels
}

/// Groups labeled indices into clusters, excluding noise (`-1`), preserving
/// first-seen label order and within-cluster input order.
pub fn group_labels(labels: &[i32]) -> Vec<Vec<usize>> {
    let mut order: Vec<i32> = Vec::new();
    let mut groups: std::collections::HashMap<i32, Vec<usize>> = std::collections::HashMap::new();

    for (idx, &label) in labels.iter().enumerate() {
        if label == NOISE {
            continue;
        }
        if !order.contains(&label) {
            order.push(label);
        }
        groups.entry(label).or_default().push(idx);
    }

    order.into_iter().map(|l| groups.remove(&l).unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist_from_points(points: &[(f32, f32)]) -> Vec<Vec<f32>> {
        let n = points.len();
        let mut d = vec![vec![0.0f32; n]; n];
        for i in 0..n {
            for j in 0..n {
                let (ax, ay) = points[i];
                let (bx, by) = points[j];
                d[i][j] = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
            }
        }
        d
    }

    #[test]
    fn two_tight_clusters_and_one_outlier() {
        let points = [
            (0.0, 0.0),
            (0.05, 0.0),
            (0.0, 0.05),
            (10.0, 10.0),
            (10.05, 10.0),
            (50.0, 50.0),
        ];
        let d = dist_from_points(&points);
        let labels = dbscan(&d, 0.1, 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[5], -1);

        let groups = group_labels(&labels);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() >= 2));
    }

    #[test]
    fn all_noise_when_isolated() {
        let points = [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)];
        let d = dist_from_points(&points);
        let labels = dbscan(&d, 0.1, 2);
        assert!(labels.iter().all(|&l| l == -1));
        assert!(group_labels(&labels).is_empty());
    }
}
