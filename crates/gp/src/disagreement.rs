//! A module to quantify disagreement between trajectories sampled from a gaussian process.
//!
//! Disagreement at a point `x*` of an ensemble of `k` predictions is their population variance
//!
//! `D(x*) = 1/k * sum_i (f_i(x*) - mean(x*))^2`
//!
//! Sample matrices are organized as (n points, k trajectories).

use linfa::Float;
use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2};

/// Disagreement and its standard deviation form at a given point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disagreement<F: Float> {
    /// Variance of the predictions
    pub disagreement: F,
    /// Standard deviation of the predictions
    pub std: F,
}

/// Population variance of the `predictions`, 0 when empty
pub fn disagreement<F: Float>(predictions: &ArrayBase<impl Data<Elem = F>, Ix1>) -> F {
    if predictions.is_empty() {
        return F::zero();
    }
    let n = F::cast(predictions.len());
    let mean = predictions.sum() / n;
    predictions
        .iter()
        .fold(F::zero(), |acc, &p| acc + (p - mean) * (p - mean))
        / n
}

/// Standard deviation of the `predictions`, on the same scale as the predictions
pub fn std_disagreement<F: Float>(predictions: &ArrayBase<impl Data<Elem = F>, Ix1>) -> F {
    disagreement(predictions).sqrt()
}

/// Disagreement at each point (row) of the `samples` (n, k) matrix, empty when no sample
pub fn disagreement_from_samples<F: Float>(samples: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
    if samples.is_empty() {
        return Array1::zeros(0);
    }
    samples.map_axis(Axis(1), |row| disagreement(&row))
}

/// Standard deviation disagreement at each point (row) of the `samples` (n, k) matrix
pub fn std_disagreement_from_samples<F: Float>(
    samples: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array1<F> {
    disagreement_from_samples(samples).mapv(|v| v.sqrt())
}

/// Index of the `xs` value nearest to `x`, first one wins on ties, none when `xs` is empty
pub fn nearest_index<F: Float>(xs: &ArrayBase<impl Data<Elem = F>, Ix1>, x: F) -> Option<usize> {
    let mut closest: Option<(usize, F)> = None;
    for (i, &xi) in xs.iter().enumerate() {
        let dist = (xi - x).abs();
        match closest {
            Some((_, best)) if !(dist < best) => {}
            _ => closest = Some((i, dist)),
        }
    }
    closest.map(|(i, _)| i)
}

/// Disagreement of the trajectories at the `xs` point nearest to `x`.
///
/// `samples` rows correspond to `xs` points. Returns zeros when there is no point or no sample.
pub fn disagreement_at_x<F: Float>(
    xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
    samples: &ArrayBase<impl Data<Elem = F>, Ix2>,
    x: F,
) -> Disagreement<F> {
    match nearest_index(xs, x) {
        Some(idx) if idx < samples.nrows() => {
            let d = disagreement(&samples.row(idx));
            Disagreement {
                disagreement: d,
                std: d.sqrt(),
            }
        }
        _ => Disagreement {
            disagreement: F::zero(),
            std: F::zero(),
        },
    }
}

/// Point of maximum disagreement as (x, disagreement), first one wins on ties.
/// Returns (0, 0) when there is no point or no sample.
pub fn max_disagreement_point<F: Float>(
    xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
    samples: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> (F, F) {
    let disagreements = disagreement_from_samples(samples);
    if xs.is_empty() || disagreements.is_empty() {
        return (F::zero(), F::zero());
    }
    let mut max_index = 0;
    let mut max_value = disagreements[0];
    for (i, &d) in disagreements.iter().enumerate().skip(1) {
        if d > max_value {
            max_value = d;
            max_index = i;
        }
    }
    (xs[max_index], max_value)
}
