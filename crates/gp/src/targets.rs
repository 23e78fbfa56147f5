//! Reference functions used to synthesize observed outputs.

use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target function y = f(x)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub enum TargetFunction {
    /// No function, y = 0
    #[default]
    None,
    /// y = sin(x)
    Sine,
    /// y = x^2 / 100
    Quadratic,
    /// y = x / 10
    Linear,
}

impl TargetFunction {
    /// Function value at `x`
    pub fn value<F: Float>(&self, x: F) -> F {
        match self {
            TargetFunction::None => F::zero(),
            TargetFunction::Sine => x.sin(),
            TargetFunction::Quadratic => x * x / F::cast(100.),
            TargetFunction::Linear => x / F::cast(10.),
        }
    }

    /// Function values at `xs`
    pub fn values<F: Float>(&self, xs: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        xs.mapv(|x| self.value(x))
    }
}

impl fmt::Display for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TargetFunction::None => "none",
            TargetFunction::Sine => "sine",
            TargetFunction::Quadratic => "quadratic",
            TargetFunction::Linear => "linear",
        };
        write!(f, "{name}")
    }
}

impl From<TargetFunction> for String {
    fn from(item: TargetFunction) -> String {
        item.to_string()
    }
}

impl TryFrom<String> for TargetFunction {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "none" => Ok(TargetFunction::None),
            "sine" => Ok(TargetFunction::Sine),
            "quadratic" => Ok(TargetFunction::Quadratic),
            "linear" => Ok(TargetFunction::Linear),
            _ => Err(format!(
                "Bad string value for TargetFunction, should be one of 'none', 'sine', 'quadratic', 'linear', got '{s}'"
            )),
        }
    }
}
