//! A module for covariance functions (kernels) of one-dimensional gaussian processes.
//!
//! The following kernels are implemented:
//! * squared exponential,
//! * linear,
//! * periodic,
//! * matern 3/2.
//!
//! Any kernel can be wrapped in a [`Jittered`] kernel which adds a small constant on the
//! diagonal to keep covariance matrices strictly positive definite.

use crate::errors::{GpError, Result};
use linfa::Float;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default jitter added on the diagonal of covariance matrices
pub const DEFAULT_JITTER: f64 = 1e-6;

/// A trait for covariance functions k(x, x') used to build covariance matrices
pub trait CovarianceFunction<F: Float>: Clone + fmt::Display + Sync {
    /// Covariance between the two scalar inputs `x1` and `x2`
    fn value(&self, x1: F, x2: F) -> F;
}

/// Kernel variants as a tagged value: kernel kind and its hyperparameters.
///
/// Hyperparameters are not checked on evaluation, a lengthscale or a period
/// lower or equal to zero gives garbage values (NaN or inf).
/// Use [`Kernel::check`] to validate them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(tag = "kind")
)]
pub enum Kernel<F: Float> {
    /// `variance * exp(-(x1-x2)^2 / (2*lengthscale^2))`
    SquaredExponential {
        /// Process variance
        variance: F,
        /// Correlation length
        lengthscale: F,
    },
    /// `variance * x1*x2 + bias`
    Linear {
        /// Slope variance
        variance: F,
        /// Constant offset
        bias: F,
    },
    /// `variance * exp(-2*sin^2(pi*|x1-x2|/period) / lengthscale^2)`
    Periodic {
        /// Process variance
        variance: F,
        /// Correlation length
        lengthscale: F,
        /// Distance between repetitions
        period: F,
    },
    /// `variance * (1 + s) * exp(-s)` with `s = sqrt(3)*|x1-x2|/lengthscale`
    Matern32 {
        /// Process variance
        variance: F,
        /// Correlation length
        lengthscale: F,
    },
}

impl<F: Float> Default for Kernel<F> {
    fn default() -> Self {
        Kernel::squared_exponential(F::one(), F::one())
    }
}

impl<F: Float> Kernel<F> {
    /// Squared exponential (RBF) kernel constructor
    pub fn squared_exponential(variance: F, lengthscale: F) -> Self {
        Kernel::SquaredExponential {
            variance,
            lengthscale,
        }
    }

    /// Linear kernel constructor
    pub fn linear(variance: F, bias: F) -> Self {
        Kernel::Linear { variance, bias }
    }

    /// Periodic kernel constructor
    pub fn periodic(variance: F, lengthscale: F, period: F) -> Self {
        Kernel::Periodic {
            variance,
            lengthscale,
            period,
        }
    }

    /// Matern 3/2 kernel constructor
    pub fn matern32(variance: F, lengthscale: F) -> Self {
        Kernel::Matern32 {
            variance,
            lengthscale,
        }
    }

    /// Wrap the kernel adding `jitter` on the diagonal
    pub fn with_jitter(self, jitter: F) -> Jittered<F> {
        Jittered {
            kernel: self,
            jitter,
        }
    }

    /// Process variance of the kernel
    pub fn variance(&self) -> F {
        match *self {
            Kernel::SquaredExponential { variance, .. }
            | Kernel::Linear { variance, .. }
            | Kernel::Periodic { variance, .. }
            | Kernel::Matern32 { variance, .. } => variance,
        }
    }

    /// Check hyperparameters: finite values, variance >= 0, lengthscale > 0 and period > 0
    pub fn check(&self) -> Result<()> {
        let positive = |name: &str, v: F| {
            if v.is_finite() && v > F::zero() {
                Ok(())
            } else {
                Err(GpError::InvalidValueError(format!(
                    "{self} kernel: `{name}` should be strictly positive, got {v}"
                )))
            }
        };
        let variance = self.variance();
        if !variance.is_finite() || variance < F::zero() {
            return Err(GpError::InvalidValueError(format!(
                "{self} kernel: `variance` should be positive, got {variance}"
            )));
        }
        match *self {
            Kernel::SquaredExponential { lengthscale, .. } | Kernel::Matern32 { lengthscale, .. } => {
                positive("lengthscale", lengthscale)
            }
            Kernel::Periodic {
                lengthscale,
                period,
                ..
            } => {
                positive("lengthscale", lengthscale)?;
                positive("period", period)
            }
            Kernel::Linear { bias, .. } => {
                if bias.is_finite() {
                    Ok(())
                } else {
                    Err(GpError::InvalidValueError(format!(
                        "{self} kernel: `bias` should be finite, got {bias}"
                    )))
                }
            }
        }
    }
}

impl<F: Float> CovarianceFunction<F> for Kernel<F> {
    fn value(&self, x1: F, x2: F) -> F {
        match *self {
            Kernel::SquaredExponential {
                variance,
                lengthscale,
            } => {
                let twosqlength = F::cast(2.) * lengthscale * lengthscale;
                let d = x1 - x2;
                variance * F::exp(-d * d / twosqlength)
            }
            Kernel::Linear { variance, bias } => variance * x1 * x2 + bias,
            Kernel::Periodic {
                variance,
                lengthscale,
                period,
            } => {
                let pi = F::cast(std::f64::consts::PI);
                let sin = (pi * (x1 - x2).abs() / period).sin();
                variance * F::exp(F::cast(-2.) * sin * sin / (lengthscale * lengthscale))
            }
            Kernel::Matern32 {
                variance,
                lengthscale,
            } => {
                let s = F::cast(3.).sqrt() * (x1 - x2).abs() / lengthscale;
                variance * (F::one() + s) * F::exp(-s)
            }
        }
    }
}

impl<F: Float> fmt::Display for Kernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kernel::SquaredExponential { .. } => write!(f, "SquaredExponential"),
            Kernel::Linear { .. } => write!(f, "Linear"),
            Kernel::Periodic { .. } => write!(f, "Periodic"),
            Kernel::Matern32 { .. } => write!(f, "Matern32"),
        }
    }
}

/// A kernel decorated with a constant added only when `x1 == x2`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Jittered<F: Float> {
    kernel: Kernel<F>,
    jitter: F,
}

impl<F: Float> Default for Jittered<F> {
    fn default() -> Self {
        Jittered::new(Kernel::default())
    }
}

impl<F: Float> From<Kernel<F>> for Jittered<F> {
    fn from(kernel: Kernel<F>) -> Self {
        Jittered::new(kernel)
    }
}

impl<F: Float> Jittered<F> {
    /// Wrap `kernel` with the [`DEFAULT_JITTER`]
    pub fn new(kernel: Kernel<F>) -> Self {
        kernel.with_jitter(F::cast(DEFAULT_JITTER))
    }

    /// Underlying kernel
    pub fn kernel(&self) -> &Kernel<F> {
        &self.kernel
    }

    /// Diagonal jitter
    pub fn jitter(&self) -> F {
        self.jitter
    }

    /// Check kernel hyperparameters and jitter positivity
    pub fn check(&self) -> Result<()> {
        self.kernel.check()?;
        if !self.jitter.is_finite() || self.jitter < F::zero() {
            return Err(GpError::InvalidValueError(format!(
                "`jitter` should be positive, got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

impl<F: Float> CovarianceFunction<F> for Jittered<F> {
    fn value(&self, x1: F, x2: F) -> F {
        let k = self.kernel.value(x1, x2);
        if x1 == x2 {
            k + self.jitter
        } else {
            k
        }
    }
}

impl<F: Float> fmt::Display for Jittered<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(jitter={})", self.kernel, self.jitter)
    }
}
