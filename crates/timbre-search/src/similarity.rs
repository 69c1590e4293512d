//! Cosine-similarity ranking over a feature space.
//!
//! [`find_neighbors`] scores the query entity against every row, sorts the
//! scores in descending order with a stable sort (ties keep the original row
//! order), and walks the ranking collecting distinct identities. Repeated
//! names, as happen when two songs share a title, only ever contribute their
//! best-ranked row.

use std::collections::HashSet;

use serde::Serialize;
use timbre_core::{Error, Feature, FeatureSpace, Result, SpaceEntry};

/// Cosine of the angle between two vectors.
///
/// Similarity against a zero vector is `0.0`. The result is clamped to
/// `[-1, 1]` to absorb rounding.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// A ranked neighbor of the query entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub name: String,
    pub vector: Vec<f64>,
    pub score: f64,
}

/// The ranked neighbors of one query entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub query: String,
    /// Whether `neighbors[0]` is the query itself.
    pub includes_self: bool,
    pub neighbors: Vec<Neighbor>,
    #[serde(skip)]
    columns: Vec<Feature>,
}

impl SimilarityResult {
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors other than the query, best first.
    pub fn others(&self) -> &[Neighbor] {
        if self.includes_self {
            &self.neighbors[1..]
        } else {
            &self.neighbors
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.neighbors.iter().map(|n| n.name.as_str())
    }

    /// Scores in rank order, aligned with [`SimilarityResult::into_space`].
    pub fn scores(&self) -> Vec<f64> {
        self.neighbors.iter().map(|n| n.score).collect()
    }

    /// The ranked neighborhood as a space of its own, in rank order.
    ///
    /// With the query included this is exactly the layout the projector
    /// expects: the selected entity at row 0 followed by its neighbors.
    pub fn into_space(self) -> Result<FeatureSpace> {
        let entries = self
            .neighbors
            .into_iter()
            .map(|n| SpaceEntry::new(n.name, n.vector))
            .collect();
        FeatureSpace::new(self.columns, entries)
    }
}

/// Rank the `k` entities most similar to `query`.
///
/// The first row named `query` provides the query vector; every row with
/// that name is treated as the query and never counts as a neighbor. With
/// `include_self` the query is placed at rank 0 with its self-similarity,
/// ahead of the `k` neighbors. Fewer than `k` neighbors are returned when the
/// batch runs out of distinct identities.
///
/// # Errors
/// - [`Error::DegenerateBatch`] when the space has fewer than two rows.
/// - [`Error::UnknownEntity`] when no row is named `query`.
pub fn find_neighbors(
    query: &str,
    space: &FeatureSpace,
    k: usize,
    include_self: bool,
) -> Result<SimilarityResult> {
    if space.len() < 2 {
        return Err(Error::DegenerateBatch {
            rows: space.len(),
            required: 2,
        });
    }

    let query_index = space.position(query).ok_or_else(|| Error::UnknownEntity {
        name: query.to_string(),
    })?;
    let entries = space.entries();
    let query_vector = &entries[query_index].vector;

    let mut ranking: Vec<(usize, f64)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, cosine_similarity(query_vector, &e.vector)))
        .collect();
    // sort_by is stable: equal scores keep row order
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut neighbors = Vec::with_capacity(k + 1);
    if include_self {
        neighbors.push(Neighbor {
            name: query.to_string(),
            vector: query_vector.clone(),
            score: cosine_similarity(query_vector, query_vector),
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut found = 0;
    for (i, score) in ranking {
        if found == k {
            break;
        }
        let entry = &entries[i];
        if entry.name == query || !seen.insert(entry.name.as_str()) {
            continue;
        }
        neighbors.push(Neighbor {
            name: entry.name.clone(),
            vector: entry.vector.clone(),
            score,
        });
        found += 1;
    }

    log::debug!(
        "Found {} neighbors for {} among {} entities",
        found,
        query,
        space.len()
    );

    Ok(SimilarityResult {
        query: query.to_string(),
        includes_self: include_self,
        neighbors,
        columns: space.columns().to_vec(),
    })
}

/// Pairwise cosine similarities between every entity of a space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The full symmetric similarity matrix of a space, labelled by identity.
pub fn similarity_matrix(space: &FeatureSpace) -> SimilarityMatrix {
    let entries = space.entries();
    let n = entries.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let score = cosine_similarity(&entries[i].vector, &entries[j].vector);
            values[i][j] = score;
            values[j][i] = score;
        }
    }
    SimilarityMatrix {
        labels: space.names().map(String::from).collect(),
        values,
    }
}
