use crate::covariance::{covariance_matrix, cross_covariance};
use crate::errors::{GpError, Result};
use crate::kernels::{CovarianceFunction, Jittered, Kernel};
use crate::parameters::{GpParams, GpValidParams};
use crate::sampling::{draw_standard_normal_using, matrix_sqrt, sample};
use crate::utils::PinvSolver;

use linfa::prelude::{DatasetBase, Fit, Float, PredictInplace};
use ndarray::{array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use log::debug;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed data a posterior is conditioned on, together with
/// the factorization of `K_yy = K(X, X) + noise_variance * I`
/// and the solution `alpha` of `K_yy.alpha = Y`.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub(crate) struct Conditioning<F: Float> {
    /// Observed inputs
    x: Array1<F>,
    /// Observed outputs
    y: Array1<F>,
    /// Eigen factorization of K_yy
    kyy: PinvSolver<F>,
    /// K_yy^-1.Y
    alpha: Array1<F>,
}

/// A one-dimensional gaussian process, either a zero mean prior governed by a kernel
/// or the posterior obtained by conditioning that prior on noisy observations.
///
/// With observed inputs `X`, outputs `Y` and noise variance `s2`, the posterior
/// mean and covariance at query points `xs` are
///
/// `mean(xs) = K(X, xs)^T . K_yy^-1 . Y`
///
/// `cov(xs) = K(xs, xs) - K(X, xs)^T . K_yy^-1 . K(X, xs)`
///
/// where `K_yy = K(X, X) + s2 * I`. Linear systems with `K_yy` are solved using
/// its pseudo-inverse from an eigen decomposition which stays robust when `K_yy` is near singular
/// (large lengthscales, close or duplicated observations).
///
/// The model is immutable: mean and covariance are recomputed from the kernel and
/// observations for each set of query points.
///
/// # Example
///
/// ```no_run
/// use gpanim_gp::{kernels::Kernel, GaussianProcess};
/// use ndarray::array;
///
/// let kernel = Kernel::squared_exponential(1., 1.).with_jitter(1e-6);
/// let gp = GaussianProcess::posterior(kernel, &array![2., 5.], &array![1., -1.], 0.01)
///     .expect("GP conditioning");
///
/// let xs = gpanim_gp::utils::linspace(0., 10., 100, true);
/// let means = gp.mean(&xs);
/// let cov = gp.cov(&xs);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct GaussianProcess<F: Float> {
    /// Covariance function of the prior
    kernel: Jittered<F>,
    /// Observation noise variance
    noise_variance: F,
    /// Observations, none for a prior
    conditioning: Option<Conditioning<F>>,
}

impl<F: Float> fmt::Display for GaussianProcess<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.conditioning {
            None => write!(f, "GP(kernel={})", self.kernel),
            Some(cond) => write!(
                f,
                "GP(kernel={}, noise_variance={}, n_obs={})",
                self.kernel,
                self.noise_variance,
                cond.x.len()
            ),
        }
    }
}

impl<F: Float> GaussianProcess<F> {
    /// Gp parameters constructor
    pub fn params(kernel: Kernel<F>) -> GpParams<F> {
        GpParams::new(kernel)
    }

    /// Zero mean gaussian process prior with the given covariance function.
    ///
    /// A plain [`Kernel`] is wrapped with the default jitter.
    pub fn prior(kernel: impl Into<Jittered<F>>) -> Self {
        GaussianProcess {
            kernel: kernel.into(),
            noise_variance: F::zero(),
            conditioning: None,
        }
    }

    /// Gaussian process posterior given `x` observed inputs, `y` observed outputs
    /// and `noise_variance` added on the diagonal of the observations covariance.
    ///
    /// An empty observation set gives back the prior.
    /// Errors when `x` and `y` lengths differ or when the decomposition fails.
    pub fn posterior(
        kernel: impl Into<Jittered<F>>,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        noise_variance: F,
    ) -> Result<Self> {
        let kernel = kernel.into();
        if x.len() != y.len() {
            return Err(GpError::DimensionMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        if x.is_empty() {
            debug!("No observation, fall back to prior");
            return Ok(GaussianProcess::prior(kernel));
        }

        let mut kyy = covariance_matrix(&kernel, x);
        kyy.diag_mut().mapv_inplace(|v| v + noise_variance);
        let solver = PinvSolver::new(&kyy)?;
        let alpha = solver.solve_vec(y);
        debug!(
            "Posterior conditioned on {} observations (noise variance={}, rank={})",
            x.len(),
            noise_variance,
            solver.rank()
        );

        Ok(GaussianProcess {
            kernel,
            noise_variance,
            conditioning: Some(Conditioning {
                x: x.to_owned(),
                y: y.to_owned(),
                kyy: solver,
                alpha,
            }),
        })
    }

    /// Covariance function of the prior
    pub fn kernel(&self) -> &Jittered<F> {
        &self.kernel
    }

    /// Observation noise variance (zero for a prior)
    pub fn noise_variance(&self) -> F {
        self.noise_variance
    }

    /// Whether the process is conditioned on observations
    pub fn is_posterior(&self) -> bool {
        self.conditioning.is_some()
    }

    /// Observed (x, y) data, none for a prior
    pub fn observations(&self) -> Option<(&Array1<F>, &Array1<F>)> {
        self.conditioning.as_ref().map(|c| (&c.x, &c.y))
    }

    /// Mean values at the given `xs` query points
    pub fn mean(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        match &self.conditioning {
            None => Array1::zeros(xs.len()),
            Some(cond) => {
                let kyf = cross_covariance(&self.kernel, &cond.x, xs);
                kyf.t().dot(&cond.alpha)
            }
        }
    }

    /// Covariance matrix (|xs|, |xs|) at the given `xs` query points.
    ///
    /// For a posterior the result is symmetric up to floating point errors only.
    pub fn cov(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array2<F> {
        let kff = covariance_matrix(&self.kernel, xs);
        match &self.conditioning {
            None => kff,
            Some(cond) => {
                let kyf = cross_covariance(&self.kernel, &cond.x, xs);
                let kyyinv_kyf = cond.kyy.solve(&kyf);
                kff - kyf.t().dot(&kyyinv_kyf)
            }
        }
    }

    /// Marginal variances at the given `xs` query points, ie the diagonal of [`GaussianProcess::cov`]
    pub fn variances(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let vars = match &self.conditioning {
            None => xs.mapv(|x| self.kernel.value(x, x)),
            Some(cond) => {
                let kyf = cross_covariance(&self.kernel, &cond.x, xs);
                let kyyinv_kyf = cond.kyy.solve(&kyf);
                let reduction = (&kyf * &kyyinv_kyf).sum_axis(Axis(0));
                xs.mapv(|x| self.kernel.value(x, x)) - reduction
            }
        };
        // Variances might be slightly negative depending on
        // machine precision: set to zero in that case
        vars.mapv(|v| if v < F::zero() { F::zero() } else { v })
    }

    /// Predict both mean and marginal variances at the given `xs` query points
    pub fn predict_valvar(
        &self,
        xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> (Array1<F>, Array1<F>) {
        (self.mean(xs), self.variances(xs))
    }

    /// Covariance between `x1` and `x2` under this process.
    /// For a prior this is the (jittered) kernel value.
    pub fn kernel_value(&self, x1: F, x2: F) -> F {
        match self.conditioning {
            None => self.kernel.value(x1, x2),
            Some(_) => self.cov(&array![x1, x2])[[1, 0]],
        }
    }

    /// Draw `n_traj` trajectories at `xs` query points as a (|xs|, n_traj) matrix
    pub fn sample(
        &self,
        xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_traj: usize,
    ) -> Result<Array2<F>> {
        self.sample_using(xs, n_traj, &mut Xoshiro256Plus::from_entropy())
    }

    /// Draw `n_traj` trajectories at `xs` query points using the given random generator
    pub fn sample_using<R: Rng>(
        &self,
        xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_traj: usize,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        let mean = self.mean(xs);
        let cov_sqrt = matrix_sqrt(&self.cov(xs))?;
        let noise = draw_standard_normal_using(cov_sqrt.ncols(), n_traj, rng);
        Ok(sample(&mean, &cov_sqrt, &noise))
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for GaussianProcess<F>
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        *y = self.mean(&x.column(0));
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError>
    for GpValidParams<F>
{
    type Object = GaussianProcess<F>;

    /// Condition the prior defined by these parameters on the given dataset
    /// of (n, 1) observed inputs and (n,) observed outputs.
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        if x.ncols() != 1 {
            return Err(GpError::InvalidValueError(format!(
                "Observed inputs should be a (n, 1) matrix, got (n, {})",
                x.ncols()
            )));
        }
        GaussianProcess::posterior(
            self.kernel().with_jitter(self.jitter()),
            &x.column(0),
            dataset.targets(),
            self.noise_variance(),
        )
    }
}
