use crate::animation::frames_per_cycle;
use crate::errors::{GpError, Result};
use crate::kernels::{Kernel, DEFAULT_JITTER};
use linfa::{Float, ParamGuard};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GpValidParams<F: Float> {
    /// Covariance function of the prior
    pub(crate) kernel: Kernel<F>,
    /// Constant added on the covariance diagonal to improve numerical stability
    pub(crate) jitter: F,
    /// Variance of the noise on observed outputs
    pub(crate) noise_variance: F,
}

impl<F: Float> Default for GpValidParams<F> {
    fn default() -> GpValidParams<F> {
        GpValidParams {
            kernel: Kernel::default(),
            jitter: F::cast(DEFAULT_JITTER),
            noise_variance: F::zero(),
        }
    }
}

impl<F: Float> GpValidParams<F> {
    /// Get covariance function
    pub fn kernel(&self) -> &Kernel<F> {
        &self.kernel
    }

    /// Get diagonal jitter
    pub fn jitter(&self) -> F {
        self.jitter
    }

    /// Get observation noise variance
    pub fn noise_variance(&self) -> F {
        self.noise_variance
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP conditioning](struct.GaussianProcess.html).
pub struct GpParams<F: Float>(GpValidParams<F>);

impl<F: Float> Default for GpParams<F> {
    fn default() -> Self {
        GpParams(GpValidParams::default())
    }
}

impl<F: Float> GpParams<F> {
    /// A constructor for GP parameters given a kernel
    pub fn new(kernel: Kernel<F>) -> GpParams<F> {
        Self(GpValidParams {
            kernel,
            ..Default::default()
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F>) -> Self {
        Self(params.clone())
    }

    /// Set kernel.
    pub fn kernel(mut self, kernel: Kernel<F>) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set jitter.
    ///
    /// Jitter is added on the covariance diagonal to keep it positive definite
    pub fn jitter(mut self, jitter: F) -> Self {
        self.0.jitter = jitter;
        self
    }

    /// Set noise variance of observed outputs, ie the squared noise scale.
    pub fn noise_variance(mut self, noise_variance: F) -> Self {
        self.0.noise_variance = noise_variance;
        self
    }
}

impl<F: Float> From<GpValidParams<F>> for GpParams<F> {
    fn from(valid: GpValidParams<F>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float> ParamGuard for GpParams<F> {
    type Checked = GpValidParams<F>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.kernel.with_jitter(self.0.jitter).check()?;
        let noise = self.0.noise_variance;
        if !noise.is_finite() || noise < F::zero() {
            return Err(GpError::InvalidValueError(format!(
                "`noise_variance` should be positive, got {noise}"
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Default number of animated trajectories
pub const DEFAULT_N_SAMPLES: usize = 5;
/// Default animation speed
pub const DEFAULT_SPEED: f64 = 0.5;

/// A set of validated animation parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct AnimationValidParams {
    /// Number of animated trajectories
    pub(crate) n_samples: usize,
    /// Animation speed, a full cycle lasts `120 / speed` frames
    pub(crate) speed: f64,
}

impl Default for AnimationValidParams {
    fn default() -> Self {
        AnimationValidParams {
            n_samples: DEFAULT_N_SAMPLES,
            speed: DEFAULT_SPEED,
        }
    }
}

impl AnimationValidParams {
    /// Get number of animated trajectories
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Get animation speed
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Number of frames of one animation cycle
    pub fn frames_per_cycle(&self) -> usize {
        frames_per_cycle(self.speed)
    }
}

/// The set of parameters of an [animation](crate::Animator).
#[derive(Clone, Debug, Default)]
pub struct AnimationParams(AnimationValidParams);

impl AnimationParams {
    /// A constructor for animation parameters given the number of trajectories
    pub fn new(n_samples: usize) -> Self {
        Self(AnimationValidParams {
            n_samples,
            ..Default::default()
        })
    }

    /// Set number of animated trajectories
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.0.n_samples = n_samples;
        self
    }

    /// Set animation speed.
    ///
    /// Higher speed means fewer frames per cycle.
    pub fn speed(mut self, speed: f64) -> Self {
        self.0.speed = speed;
        self
    }
}

impl ParamGuard for AnimationParams {
    type Checked = AnimationValidParams;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_samples == 0 {
            return Err(GpError::InvalidValueError(
                "`n_samples` should be at least 1".to_string(),
            ));
        }
        if !self.0.speed.is_finite() || self.0.speed <= 0. {
            return Err(GpError::InvalidValueError(format!(
                "`speed` should be strictly positive, got {}",
                self.0.speed
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
