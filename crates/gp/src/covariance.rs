//! Covariance matrices built from a [`CovarianceFunction`] evaluated over input points.
//!
//! Row and column ordering of the resulting matrices follows the ordering of the given inputs.

use crate::kernels::CovarianceFunction;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1};

/// Compute the symmetric (n, n) covariance matrix `K[i, j] = k(xs[i], xs[j])`.
///
/// Only the upper triangle is evaluated, then mirrored.
pub fn covariance_matrix<F: Float>(
    kernel: &impl CovarianceFunction<F>,
    xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Array2<F> {
    let dim = xs.len();
    let mut k_mx = Array2::zeros((dim, dim));
    for i in 0..dim {
        for j in i..dim {
            let k = kernel.value(xs[i], xs[j]);
            k_mx[[i, j]] = k;
            k_mx[[j, i]] = k;
        }
    }
    k_mx
}

/// Compute the (n, m) cross covariance matrix `K[i, j] = k(xa[i], xb[j])`
pub fn cross_covariance<F: Float>(
    kernel: &impl CovarianceFunction<F>,
    xa: &ArrayBase<impl Data<Elem = F>, Ix1>,
    xb: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Array2<F> {
    Array2::from_shape_fn((xa.len(), xb.len()), |(i, j)| kernel.value(xa[i], xb[j]))
}
