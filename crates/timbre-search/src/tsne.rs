//! Exact t-distributed stochastic neighbor embedding into two dimensions.
//!
//! The high-dimensional affinities are Gaussian, each row calibrated by a
//! binary search on its bandwidth until the conditional distribution reaches
//! the requested perplexity. The low-dimensional affinities use a Student-t
//! kernel with one degree of freedom. Optimization is plain gradient descent
//! with early exaggeration, momentum and per-coordinate adaptive gains.
//!
//! All pairwise quantities are held as dense `n * n` buffers, which is fine
//! for the batch sizes this crate handles (a few thousand rows at most).
//!
//! The initial layout is drawn from a seeded [`StdRng`], and nothing else in
//! the optimization is random, so a given input and parameter set always
//! produces the same embedding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;
const MIN_PROBABILITY: f64 = 1e-12;
const MIN_GAIN: f64 = 0.01;
const INITIAL_SCALE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct TsneParams {
    pub perplexity: f64,
    pub iterations: usize,
    pub learning_rate: f64,
    pub early_exaggeration: f64,
    /// Iterations spent with exaggerated affinities and low momentum.
    pub exaggeration_iterations: usize,
    pub seed: u64,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            iterations: 1000,
            learning_rate: 200.0,
            early_exaggeration: 12.0,
            exaggeration_iterations: 250,
            seed: 42,
        }
    }
}

/// Embed the rows of `data` in the plane.
///
/// `perplexity` must already be valid for the batch (below the row count);
/// the projector takes care of capping it.
pub fn embed(data: &[Vec<f64>], params: &TsneParams) -> Vec<[f64; 2]> {
    let n = data.len();
    if n < 2 {
        return vec![[0.0, 0.0]; n];
    }

    // the distance matrix is only needed to fit P
    let p = {
        let distances = squared_distances(data);
        joint_probabilities(&distances, n, params.perplexity)
    };

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut y: Vec<f64> = (0..n * 2)
        .map(|_| INITIAL_SCALE * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let mut update = vec![0.0; n * 2];
    let mut gains = vec![1.0_f64; n * 2];
    let mut grad = vec![0.0; n * 2];
    let mut num = vec![0.0; n * n];

    for iter in 0..params.iterations {
        let early = iter < params.exaggeration_iterations;
        let exaggeration = if early { params.early_exaggeration } else { 1.0 };
        let momentum = if early { 0.5 } else { 0.8 };

        // Student-t affinities
        let mut z = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = y[2 * i] - y[2 * j];
                let dy = y[2 * i + 1] - y[2 * j + 1];
                let q = 1.0 / (1.0 + dx * dx + dy * dy);
                num[i * n + j] = q;
                num[j * n + i] = q;
                z += 2.0 * q;
            }
        }
        let z = z.max(f64::MIN_POSITIVE);

        grad.fill(0.0);
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let q = num[i * n + j];
                let mult = 4.0 * (exaggeration * p[i * n + j] - q / z) * q;
                grad[2 * i] += mult * (y[2 * i] - y[2 * j]);
                grad[2 * i + 1] += mult * (y[2 * i + 1] - y[2 * j + 1]);
            }
        }

        for d in 0..n * 2 {
            gains[d] = if update[d] * grad[d] < 0.0 {
                gains[d] + 0.2
            } else {
                (gains[d] * 0.8).max(MIN_GAIN)
            };
            update[d] = momentum * update[d] - params.learning_rate * gains[d] * grad[d];
            y[d] += update[d];
        }

        recentre(&mut y, n);

        if log::log_enabled!(log::Level::Trace) && (iter + 1) % 100 == 0 {
            log::trace!(
                "t-SNE iteration {}: KL divergence {:.4}",
                iter + 1,
                kl_divergence(&p, &num, z, n)
            );
        }
    }

    y.chunks_exact(2).map(|c| [c[0], c[1]]).collect()
}

fn squared_distances(data: &[Vec<f64>]) -> Vec<f64> {
    let n = data.len();
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d: f64 = data[i]
                .iter()
                .zip(&data[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            out[i * n + j] = d;
            out[j * n + i] = d;
        }
    }
    out
}

/// Symmetrized joint probabilities `P_ij = (p_j|i + p_i|j) / 2n`.
fn joint_probabilities(distances: &[f64], n: usize, perplexity: f64) -> Vec<f64> {
    let target = perplexity.max(1.0).ln();
    let mut conditional = vec![0.0; n * n];

    for i in 0..n {
        let row = &distances[i * n..(i + 1) * n];
        let min_dist = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &d)| d)
            .fold(f64::INFINITY, f64::min);

        let mut beta = 1.0;
        let mut lo = 0.0;
        let mut hi = f64::INFINITY;
        let out = &mut conditional[i * n..(i + 1) * n];

        for _ in 0..PERPLEXITY_STEPS {
            let entropy = row_distribution(row, i, min_dist, beta, out);
            let diff = entropy - target;
            if diff.abs() < PERPLEXITY_TOLERANCE {
                break;
            }
            if diff > 0.0 {
                lo = beta;
                beta = if hi.is_infinite() {
                    beta * 2.0
                } else {
                    (beta + hi) / 2.0
                };
            } else {
                hi = beta;
                beta = (beta + lo) / 2.0;
            }
        }
    }

    let scale = 2.0 * n as f64;
    let mut joint = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let pair = conditional[i * n + j] + conditional[j * n + i];
                joint[i * n + j] = (pair / scale).max(MIN_PROBABILITY);
            }
        }
    }
    joint
}

/// Fill `out` with `p_j|i` for bandwidth `beta` and return its entropy in nats.
///
/// Distances are shifted by the row minimum so the largest term is always
/// `exp(0)` and the sum cannot underflow.
fn row_distribution(row: &[f64], i: usize, min_dist: f64, beta: f64, out: &mut [f64]) -> f64 {
    let mut sum = 0.0;
    for (j, (&d, p)) in row.iter().zip(out.iter_mut()).enumerate() {
        *p = if j == i {
            0.0
        } else {
            (-(d - min_dist) * beta).exp()
        };
        sum += *p;
    }

    let mut weighted = 0.0;
    for (j, (&d, p)) in row.iter().zip(out.iter_mut()).enumerate() {
        if j == i {
            continue;
        }
        *p /= sum;
        weighted += (d - min_dist) * *p;
    }
    sum.ln() + beta * weighted
}

fn recentre(y: &mut [f64], n: usize) {
    let (mut mx, mut my) = (0.0, 0.0);
    for c in y.chunks_exact(2) {
        mx += c[0];
        my += c[1];
    }
    mx /= n as f64;
    my /= n as f64;
    for c in y.chunks_exact_mut(2) {
        c[0] -= mx;
        c[1] -= my;
    }
}

fn kl_divergence(p: &[f64], num: &[f64], z: f64, n: usize) -> f64 {
    let mut kl = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let pij = p[i * n + j];
                let qij = (num[i * n + j] / z).max(MIN_PROBABILITY);
                kl += pij * (pij / qij).ln();
            }
        }
    }
    kl
}
