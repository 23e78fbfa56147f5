use crate::errors::{GpError, Result};
use linfa::Float;
use linfa_linalg::eigh::EighInto;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_stats::QuantileExt;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A linear system solver for symmetric matrices based on the eigen decomposition `A = W.diag(v).Wt`.
///
/// Solutions are computed as `W.diag(v)^+.Wt.b` where `diag(v)^+` inverts eigenvalues whose
/// magnitude is above `max(|v|) * n * epsilon` and zeroes the others,
/// hence near singular or rank deficient matrices are handled as a least-squares problem.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct PinvSolver<F: Float> {
    w: Array2<F>,
    v_inv: Array1<F>,
    rank: usize,
}

impl<F: Float> PinvSolver<F> {
    /// Factorize the given square `a` matrix, only its symmetric part `(a + at) / 2` is used
    pub fn new(a: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<PinvSolver<F>> {
        if a.nrows() != a.ncols() {
            return Err(GpError::DimensionMismatch {
                expected: a.nrows(),
                actual: a.ncols(),
            });
        }
        if a.is_empty() {
            return Ok(PinvSolver {
                w: Array2::zeros((0, 0)),
                v_inv: Array1::zeros(0),
                rank: 0,
            });
        }
        let sym = (&a.view() + &a.t()) * F::cast(0.5);
        let (v, w) = sym.eigh_into()?;

        let v_max = *v
            .mapv(|val| val.abs())
            .max()
            .map_err(|e| GpError::InvalidValueError(e.to_string()))?;
        let cond = v_max * F::cast(a.nrows()) * F::epsilon();
        let v_inv = v.mapv(|val| if val.abs() > cond { F::one() / val } else { F::zero() });
        let rank = v.iter().filter(|val| val.abs() > cond).count();

        Ok(PinvSolver { w, v_inv, rank })
    }

    /// Numerical rank of the factorized matrix
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Solve `A.X = B` for the given (n, m) `b` matrix
    pub fn solve(&self, b: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut wt_b = self.w.t().dot(b);
        wt_b *= &self.v_inv.view().insert_axis(Axis(1));
        self.w.dot(&wt_b)
    }

    /// Solve `A.x = b` for the given (n,) `b` vector
    pub fn solve_vec(&self, b: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let wt_b = self.w.t().dot(b) * &self.v_inv;
        self.w.dot(&wt_b)
    }
}

/// Creates `num` evenly spaced values from `start` to `stop`.
/// When `endpoint` is false `stop` is excluded and the step is `(stop - start) / num`.
pub fn linspace<F: Float>(start: F, stop: F, num: usize, endpoint: bool) -> Array1<F> {
    match num {
        0 => return Array1::zeros(0),
        1 => return Array1::from_elem(1, start),
        _ => {}
    }
    let div = if endpoint { num - 1 } else { num };
    let step = (stop - start) / F::cast(div);
    Array1::from_shape_fn(num, |i| start + step * F::cast(i))
}

/// Density of the normal distribution `N(mean, variance)` evaluated at `y`
pub fn gaussian_pdf<F: Float>(mean: F, variance: F, y: F) -> F {
    let two = F::cast(2.);
    let pi = F::cast(std::f64::consts::PI);
    F::exp(-(y - mean) * (y - mean) / (two * variance)) / (two * pi * variance).sqrt()
}
