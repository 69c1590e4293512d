//! Two-dimensional layout of a feature space for display.

use serde::Serialize;
use timbre_core::{Error, FeatureSpace, Result};

use crate::tsne::{self, TsneParams};

/// How many of the best-scoring rows are highlighted next to the selection.
pub const TOP_SIMILAR: usize = 3;

const BASE_SIZE: f64 = 8.0;
const SIZE_RANGE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOptions {
    /// Upper bound on the t-SNE perplexity; capped at `rows - 1`.
    pub perplexity: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        let params = TsneParams::default();
        Self {
            perplexity: params.perplexity,
            iterations: params.iterations,
            seed: params.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCategory {
    Selected,
    TopSimilar,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub category: PointCategory,
    pub score: Option<f64>,
    /// Marker size for rendering, larger for more similar entities.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// The perplexity actually used after capping.
    pub perplexity: f64,
    pub points: Vec<ProjectedPoint>,
}

impl Projection {
    pub fn with_category(&self, category: PointCategory) -> impl Iterator<Item = &ProjectedPoint> {
        self.points.iter().filter(move |p| p.category == category)
    }
}

/// Rescale every column to zero mean and unit population variance.
///
/// Constant columns become all zeros.
pub fn standardize(space: &FeatureSpace) -> Vec<Vec<f64>> {
    let n = space.len() as f64;
    let dims = space.dimensions();
    let mut means = vec![0.0_f64; dims];
    for v in space.vectors() {
        for (m, x) in means.iter_mut().zip(v) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = vec![0.0_f64; dims];
    for v in space.vectors() {
        for ((s, x), m) in stds.iter_mut().zip(v).zip(&means) {
            *s += (x - m) * (x - m);
        }
    }
    for (s, m) in stds.iter_mut().zip(&means) {
        *s = (*s / n).sqrt();
        // rounding noise on a constant column is not spread
        if *s <= f64::EPSILON * m.abs().max(1.0) {
            *s = 0.0;
        }
    }

    space
        .vectors()
        .map(|v| {
            v.iter()
                .zip(&means)
                .zip(&stds)
                .map(|((x, m), s)| if *s > 0.0 { (x - m) / s } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Lay a space out in two dimensions with t-SNE.
///
/// When `scores` are given (one per row, typically from a
/// [`SimilarityResult`](crate::SimilarityResult) with the query included),
/// row 0 is tagged as the selection and the [`TOP_SIMILAR`] best-scoring
/// other rows as top similar.
///
/// # Errors
/// - [`Error::DegenerateBatch`] for fewer than two rows; the reduction is
///   not attempted.
/// - [`Error::AlignmentViolation`] when `scores` has a different length
///   than the space.
/// - [`Error::InvalidData`] for a non-positive perplexity.
pub fn project_2d(
    space: &FeatureSpace,
    scores: Option<&[f64]>,
    options: &ProjectionOptions,
) -> Result<Projection> {
    let n = space.len();
    if n < 2 {
        return Err(Error::DegenerateBatch {
            rows: n,
            required: 2,
        });
    }
    if let Some(scores) = scores {
        if scores.len() != n {
            return Err(Error::AlignmentViolation {
                identities: n,
                vectors: scores.len(),
            });
        }
    }
    if !(options.perplexity.is_finite() && options.perplexity > 0.0) {
        return Err(Error::InvalidData(format!(
            "perplexity must be positive, got {}",
            options.perplexity
        )));
    }

    let perplexity = options.perplexity.min((n - 1) as f64);
    log::info!(
        "Projecting {} entities with perplexity {} over {} iterations",
        n,
        perplexity,
        options.iterations
    );

    let params = TsneParams {
        perplexity,
        iterations: options.iterations,
        seed: options.seed,
        ..TsneParams::default()
    };
    let layout = tsne::embed(&standardize(space), &params);
    let categories = categorize(n, scores);

    let points = space
        .entries()
        .iter()
        .zip(layout)
        .zip(categories)
        .enumerate()
        .map(|(i, ((entry, [x, y]), category))| {
            let score = scores.map(|s| s[i]);
            ProjectedPoint {
                name: entry.name.clone(),
                x,
                y,
                category,
                score,
                size: marker_size(category, score),
            }
        })
        .collect();

    Ok(Projection { perplexity, points })
}

fn categorize(n: usize, scores: Option<&[f64]>) -> Vec<PointCategory> {
    let mut categories = vec![PointCategory::Other; n];
    let Some(scores) = scores else {
        return categories;
    };

    categories[0] = PointCategory::Selected;
    let mut ranked: Vec<usize> = (1..n).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    for i in ranked.into_iter().take(TOP_SIMILAR) {
        categories[i] = PointCategory::TopSimilar;
    }
    categories
}

fn marker_size(category: PointCategory, score: Option<f64>) -> f64 {
    match (category, score) {
        (PointCategory::Selected, _) => BASE_SIZE + SIZE_RANGE,
        (_, Some(score)) => BASE_SIZE + SIZE_RANGE * score.clamp(0.0, 1.0),
        (_, None) => BASE_SIZE,
    }
}
