//! Sampling of correlated gaussian trajectories.
//!
//! Given a mean vector `m` and a covariance square root `L` (such that `L.Lt = C`),
//! `m + L.v` is distributed as `N(m, C)` when `v` columns are standard normal vectors.

use crate::errors::{GpError, Result};
use linfa::Float;
use linfa_linalg::eigh::EighInto;
use log::{debug, warn};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Compute a square root `L` of the symmetric matrix `m` such that `L.Lt = m`
/// using the eigen decomposition `m = W.diag(v).Wt` and `L = W.diag(sqrt(v))`.
///
/// Negative eigenvalues come from rounding errors and are clamped to zero.
/// Only the symmetric part `(m + mt) / 2` of `m` is used.
pub fn matrix_sqrt<F: Float>(m: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
    if m.nrows() != m.ncols() {
        return Err(GpError::DimensionMismatch {
            expected: m.nrows(),
            actual: m.ncols(),
        });
    }
    if m.is_empty() {
        return Ok(Array2::zeros(m.dim()));
    }
    let sym = (&m.view() + &m.t()) * F::cast(0.5);
    let (v, w) = sym.eigh_into()?;

    let n_clamped = v.iter().filter(|&&val| val < F::zero()).count();
    if n_clamped > 0 {
        debug!("Matrix square root: {n_clamped} negative eigenvalue(s) clamped to zero");
    }
    let sqrt_v = v.mapv(|val| if val < F::zero() { F::zero() } else { val.sqrt() });
    Ok(w * &sqrt_v.insert_axis(Axis(0)))
}

/// Draw a (rows, cols) matrix of independent standard normal values
pub fn draw_standard_normal<F: Float>(rows: usize, cols: usize) -> Array2<F> {
    draw_standard_normal_using(rows, cols, &mut Xoshiro256Plus::from_entropy())
}

/// Draw a (rows, cols) matrix of independent standard normal values using the given random generator.
///
/// Values are generated with the Box-Muller transform `sqrt(-2 ln(u1)) cos(2 pi u2)`
/// where `u1` is drawn in (0, 1], never 0.
pub fn draw_standard_normal_using<F: Float, R: Rng>(
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Array2<F> {
    let mut v = Array2::zeros((rows, cols));
    for mut col in v.columns_mut() {
        for val in col.iter_mut() {
            *val = F::cast(box_muller(rng));
        }
    }
    v
}

fn box_muller<R: Rng>(rng: &mut R) -> f64 {
    let u1 = loop {
        let u: f64 = rng.gen();
        if u > 0. {
            break u;
        }
    };
    let u2: f64 = rng.gen();
    (-2. * u1.ln()).sqrt() * (2. * std::f64::consts::PI * u2).cos()
}

/// Sample from the multivariate normal `N(mean, cov_sqrt.cov_sqrt_t)` given `noise`,
/// a matrix whose columns are standard normal vectors: returns `cov_sqrt.noise + mean`
/// with `mean` added to each column.
///
/// When `cov_sqrt` columns number does not match `noise` rows number, a zero matrix
/// of shape (|mean|, noise columns) is returned. See [`try_sample`] for a checked version.
///
/// *Panics* if `mean` length differs from `cov_sqrt` rows number.
pub fn sample<F: Float>(
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    cov_sqrt: &ArrayBase<impl Data<Elem = F>, Ix2>,
    noise: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    if cov_sqrt.ncols() != noise.nrows() {
        warn!(
            "Cannot sample: covariance square root has {} columns, noise has {} rows",
            cov_sqrt.ncols(),
            noise.nrows()
        );
        return Array2::zeros((mean.len(), noise.ncols()));
    }
    cov_sqrt.dot(noise) + mean.view().insert_axis(Axis(1))
}

/// Checked version of [`sample`] returning an error on dimension mismatch
pub fn try_sample<F: Float>(
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    cov_sqrt: &ArrayBase<impl Data<Elem = F>, Ix2>,
    noise: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Result<Array2<F>> {
    if cov_sqrt.ncols() != noise.nrows() {
        return Err(GpError::DimensionMismatch {
            expected: cov_sqrt.ncols(),
            actual: noise.nrows(),
        });
    }
    if cov_sqrt.nrows() != mean.len() {
        return Err(GpError::DimensionMismatch {
            expected: cov_sqrt.nrows(),
            actual: mean.len(),
        });
    }
    Ok(sample(mean, cov_sqrt, noise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::covariance_matrix;
    use crate::kernels::Kernel;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array, Array1};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    #[test]
    fn test_matrix_sqrt_random_psd() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        for n in [1, 2, 5, 13, 20] {
            let a = Array::random_using((n, n), Uniform::new(-1f64, 1.), &mut rng);
            let m = a.dot(&a.t());
            let l = matrix_sqrt(&m).expect("matrix sqrt");
            assert_eq!(l.dim(), (n, n));
            assert_abs_diff_eq!(l.dot(&l.t()), m, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_matrix_sqrt_kernel_matrix() {
        // large lengthscale gives a nearly singular covariance
        let xs: Array1<f64> = Array::linspace(0., 10., 20);
        let m = covariance_matrix(&Kernel::squared_exponential(1., 5.).with_jitter(1e-6), &xs);
        let l = matrix_sqrt(&m).expect("matrix sqrt");
        assert!(l.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(l.dot(&l.t()), m, epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_sqrt_clamps_negative_eigenvalues() {
        // eigenvalues 3 and -1
        let m: Array2<f64> = array![[1., 2.], [2., 1.]];
        let l = matrix_sqrt(&m).expect("matrix sqrt");
        assert!(l.iter().all(|v| v.is_finite()));
        // only the positive part remains: 3 * [1, 1]/sqrt(2) [1, 1]/sqrt(2)
        assert_abs_diff_eq!(l.dot(&l.t()), array![[1.5, 1.5], [1.5, 1.5]], epsilon = 1e-10);
    }

    #[test]
    fn test_matrix_sqrt_rank_deficient() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        for rank in [1, 3] {
            let a = Array::random_using((20, rank), Uniform::new(-1f64, 1.), &mut rng);
            let m = a.dot(&a.t());
            let l = matrix_sqrt(&m).expect("matrix sqrt");
            assert_eq!(l.dim(), (20, 20));
            assert_abs_diff_eq!(l.dot(&l.t()), m, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_matrix_sqrt_not_square() {
        assert!(matches!(
            matrix_sqrt(&Array2::<f64>::zeros((2, 3))),
            Err(GpError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_matrix_sqrt_empty() {
        let l = matrix_sqrt(&Array2::<f64>::zeros((0, 0))).expect("matrix sqrt");
        assert_eq!(l.dim(), (0, 0));
    }

    #[test]
    fn test_draw_standard_normal() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let v: Array2<f64> = draw_standard_normal_using(200, 50, &mut rng);
        assert_eq!(v.dim(), (200, 50));
        assert!(v.iter().all(|x| x.is_finite()));
        let n = v.len() as f64;
        let mean = v.sum() / n;
        let var = v.mapv(|x| (x - mean) * (x - mean)).sum() / n;
        assert_abs_diff_eq!(mean, 0., epsilon = 0.05);
        assert_abs_diff_eq!(var, 1., epsilon = 0.05);
    }

    #[test]
    fn test_draw_standard_normal_reproducible() {
        let v1: Array2<f64> =
            draw_standard_normal_using(4, 3, &mut Xoshiro256Plus::seed_from_u64(7));
        let v2: Array2<f64> =
            draw_standard_normal_using(4, 3, &mut Xoshiro256Plus::seed_from_u64(7));
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_sample_zero_noise_is_mean() {
        let mean = array![1., -2., 3.5];
        let cov_sqrt = array![[1., 0., 0.], [0.5, 1., 0.], [0.2, 0.3, 1.]];
        let noise = Array2::zeros((3, 4));
        let samples = sample(&mean, &cov_sqrt, &noise);
        assert_eq!(samples.dim(), (3, 4));
        for col in samples.columns() {
            assert_eq!(col, mean);
        }
    }

    #[test]
    fn test_sample() {
        let mean = array![1., 2.];
        let cov_sqrt = array![[2., 0.], [1., 1.]];
        let noise = array![[1., 0.], [1., -1.]];
        let samples = sample(&mean, &cov_sqrt, &noise);
        assert_eq!(samples, array![[3., 1.], [4., 1.]]);
    }

    #[test]
    fn test_sample_dimension_mismatch() {
        let mean = Array1::from_elem(3, 1.);
        let cov_sqrt = Array2::<f64>::eye(3);
        let noise = Array2::ones((2, 5));
        let samples = sample(&mean, &cov_sqrt, &noise);
        assert_eq!(samples, Array2::<f64>::zeros((3, 5)));
        assert!(matches!(
            try_sample(&mean, &cov_sqrt, &noise),
            Err(GpError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_sample_statistics() {
        let xs = Array::linspace(0., 5., 6);
        let cov = covariance_matrix(&Kernel::squared_exponential(1., 1.).with_jitter(1e-6), &xs);
        let cov_sqrt = matrix_sqrt(&cov).expect("matrix sqrt");
        let mean = Array1::from_elem(6, 1.);
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let n = 20000;
        let noise = draw_standard_normal_using(6, n, &mut rng);
        let samples = sample(&mean, &cov_sqrt, &noise);
        let centered = &samples - &mean.view().insert_axis(Axis(1));
        let emp_cov = centered.dot(&centered.t()) / n as f64;
        assert_abs_diff_eq!(emp_cov, cov, epsilon = 0.05);
    }
}
