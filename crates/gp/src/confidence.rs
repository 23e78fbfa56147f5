use linfa::Float;
use ndarray::{ArrayBase, Data, Ix1, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// One and two standard deviations bands around the mean at a given point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ConfidenceBand<F: Float> {
    /// Query point
    pub x: F,
    /// Mean at x
    pub mean: F,
    /// mean - sigma
    pub lower1: F,
    /// mean + sigma
    pub upper1: F,
    /// mean - 2 sigma
    pub lower2: F,
    /// mean + 2 sigma
    pub upper2: F,
}

/// Compute confidence bands at `xs` points given `means`, marginal `variances`
/// and the observation `noise_scale`, with `sigma = sqrt(variance + noise_scale^2)`.
///
/// *Panics* if `xs`, `means` and `variances` lengths differ.
pub fn confidence_bands<F: Float>(
    xs: &ArrayBase<impl Data<Elem = F>, Ix1>,
    means: &ArrayBase<impl Data<Elem = F>, Ix1>,
    variances: &ArrayBase<impl Data<Elem = F>, Ix1>,
    noise_scale: F,
) -> Vec<ConfidenceBand<F>> {
    let two = F::cast(2.);
    let noise_var = noise_scale * noise_scale;
    let mut bands = Vec::with_capacity(xs.len());
    Zip::from(xs)
        .and(means)
        .and(variances)
        .for_each(|&x, &mean, &var| {
            let sigma = (var + noise_var).sqrt();
            bands.push(ConfidenceBand {
                x,
                mean,
                lower1: mean - sigma,
                upper1: mean + sigma,
                lower2: mean - two * sigma,
                upper2: mean + two * sigma,
            });
        });
    bands
}
