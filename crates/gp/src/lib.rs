//! This library implements one-dimensional [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! priors and posteriors together with the numerical tools needed to visualize them:
//! drawing correlated trajectories, animating them smoothly and measuring how much they disagree.
//!
//! A prior or a posterior is implemented by [GaussianProcess], either built directly from a
//! [kernel](kernels::Kernel) and observations or fitted on a linfa dataset given [GpParams].
//!
//! From the mean vector and covariance matrix of a process at some query points:
//! * [matrix_sqrt] computes a square root `L` of the covariance such that `L.Lt = C`,
//! * [sample] turns standard normal noise into trajectories `mean + L.v`,
//! * [Animator] rotates the noise so that trajectories morph continuously from frame to frame,
//! * the [disagreement] module quantifies the spread of trajectories at each point,
//! * the [confidence] module gives one and two standard deviations bands.
//!
//! ```no_run
//! use gpanim_gp::{kernels::Kernel, matrix_sqrt, targets::TargetFunction, utils::linspace, GaussianProcess};
//! use ndarray::array;
//!
//! let x_obs = array![1., 4., 7.];
//! let y_obs = TargetFunction::Sine.values(&x_obs);
//! let gp = GaussianProcess::posterior(Kernel::squared_exponential(1., 1.), &x_obs, &y_obs, 0.01)
//!     .expect("GP conditioning");
//!
//! let xs = linspace(0., 10., 100, true);
//! let cov_sqrt = matrix_sqrt(&gp.cov(&xs)).expect("matrix sqrt");
//! let noise = gpanim_gp::draw_standard_normal(cov_sqrt.ncols(), 5);
//! let trajectories = gpanim_gp::sample(&gp.mean(&xs), &cov_sqrt, &noise);
//! let spread = gpanim_gp::disagreement::disagreement_from_samples(&trajectories);
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod animation;
pub mod confidence;
pub mod covariance;
pub mod disagreement;
mod errors;
pub mod kernels;
mod parameters;
pub mod sampling;
pub mod targets;
pub mod utils;

pub use algorithm::*;
pub use animation::{frames_per_cycle, interpolate, AnimationState, Animator};
pub use errors::*;
pub use parameters::*;
pub use sampling::{draw_standard_normal, draw_standard_normal_using, matrix_sqrt, sample, try_sample};
