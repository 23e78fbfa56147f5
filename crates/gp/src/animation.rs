//! Smooth animation of gaussian process trajectories.
//!
//! Two independent standard normal matrices `v` and `u` are rotated on the unit circle:
//! `v' = v.cos(theta) + u.sin(theta)` is still standard normal for any `theta`
//! (as `cos^2 + sin^2 = 1`), so every frame `mean + L.v'` is a valid sample and
//! `theta` going from 0 to 2pi gives a closed loop of continuously morphing trajectories.
//! At the end of each cycle both `v` and `u` are drawn again.
//!
//! Frame scheduling is left to the caller which just requests frames at its own pace.

use crate::errors::{GpError, Result};
use crate::parameters::AnimationValidParams;
use crate::sampling::{draw_standard_normal_using, sample};
use linfa::Float;
use log::trace;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Number of frames of a cycle at speed 1
pub const BASE_FRAME_COUNT: usize = 120;
/// Number of frames of a cycle for very low speeds
pub const MAX_FRAME_COUNT: usize = 10 * BASE_FRAME_COUNT;

/// Number of frames of one animation cycle given the animation `speed`:
/// `round(120 / speed)`, capped to 1200 frames when speed is lower than 0.1.
pub fn frames_per_cycle(speed: f64) -> usize {
    if speed.is_nan() || speed < 0.1 {
        MAX_FRAME_COUNT
    } else {
        ((BASE_FRAME_COUNT as f64 / speed).round() as usize).max(1)
    }
}

/// Interpolated noise `v.cos(theta) + u.sin(theta)`.
///
/// *Panics* if `v` and `u` shapes differ.
pub fn interpolate<F: Float>(
    v: &ArrayBase<impl Data<Elem = F>, Ix2>,
    u: &ArrayBase<impl Data<Elem = F>, Ix2>,
    theta: F,
) -> Array2<F> {
    let (sin, cos) = theta.sin_cos();
    Zip::from(v)
        .and(u)
        .map_collect(|&vi, &ui| vi * cos + ui * sin)
}

fn check_total_frames(total_frames: usize) -> Result<()> {
    if total_frames == 0 {
        return Err(GpError::InvalidValueError(
            "`total_frames` should be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Animation state: the two noise matrices and the position in the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState<F: Float> {
    v: Array2<F>,
    u: Array2<F>,
    frame_index: usize,
    total_frames: usize,
}

impl<F: Float> AnimationState<F> {
    /// State at the start of a cycle with freshly drawn (rows, cols) noise matrices.
    ///
    /// Errors when `total_frames` is 0.
    pub fn new_using<R: Rng>(
        rows: usize,
        cols: usize,
        total_frames: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_total_frames(total_frames)?;
        Ok(Self::drawn(rows, cols, total_frames, rng))
    }

    /// `total_frames` is expected to be at least 1
    fn drawn<R: Rng>(rows: usize, cols: usize, total_frames: usize, rng: &mut R) -> Self {
        AnimationState {
            v: draw_standard_normal_using(rows, cols, rng),
            u: draw_standard_normal_using(rows, cols, rng),
            frame_index: 0,
            total_frames,
        }
    }

    /// State at the start of a cycle with given noise matrices.
    ///
    /// Errors when `v` and `u` shapes differ or when `total_frames` is 0.
    pub fn from_noise(v: Array2<F>, u: Array2<F>, total_frames: usize) -> Result<Self> {
        if v.dim() != u.dim() {
            return Err(GpError::DimensionMismatch {
                expected: v.len(),
                actual: u.len(),
            });
        }
        check_total_frames(total_frames)?;
        Ok(AnimationState {
            v,
            u,
            frame_index: 0,
            total_frames,
        })
    }

    /// Index of the next frame in the current cycle
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Number of frames of a cycle
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Rotation angle of the next frame: `2pi * frame_index / total_frames`
    pub fn theta(&self) -> F {
        F::cast(2. * std::f64::consts::PI * self.frame_index as f64 / self.total_frames as f64)
    }

    /// Noise of the next frame
    pub fn noise(&self) -> Array2<F> {
        interpolate(&self.v, &self.u, self.theta())
    }

    /// Transition to the next state, returning it with the trajectories of the current frame.
    ///
    /// When the cycle is over, noise matrices are drawn again using `rng` and a new cycle starts.
    pub fn next_frame<R: Rng>(
        mut self,
        mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
        cov_sqrt: &ArrayBase<impl Data<Elem = F>, Ix2>,
        rng: &mut R,
    ) -> (Self, Array2<F>) {
        if self.frame_index >= self.total_frames {
            trace!("Animation cycle of {} frames over, resample", self.total_frames);
            let (rows, cols) = self.v.dim();
            self.v = draw_standard_normal_using(rows, cols, rng);
            self.u = draw_standard_normal_using(rows, cols, rng);
            self.frame_index = 0;
        }
        let samples = sample(mean, cov_sqrt, &self.noise());
        self.frame_index += 1;
        (self, samples)
    }
}

/// An animation of gaussian process trajectories given a mean and a covariance square root,
/// yielding a (|mean|, n_samples) matrix of trajectories per frame.
///
/// ```no_run
/// use gpanim_gp::{kernels::Kernel, matrix_sqrt, Animator, AnimationParams, GaussianProcess};
/// use linfa::ParamGuard;
/// use ndarray::Array;
///
/// let gp = GaussianProcess::prior(Kernel::squared_exponential(1., 1.));
/// let xs = Array::linspace(0., 10., 100);
/// let cov_sqrt = matrix_sqrt(&gp.cov(&xs)).expect("matrix sqrt");
/// let params = AnimationParams::new(5).speed(1.).check().expect("valid params");
/// let mut animator = Animator::new(gp.mean(&xs), cov_sqrt, &params).expect("animator");
/// let frame = animator.next_frame();
/// ```
#[derive(Debug, Clone)]
pub struct Animator<F: Float, R: Rng = Xoshiro256Plus> {
    mean: Array1<F>,
    cov_sqrt: Array2<F>,
    n_samples: usize,
    total_frames: usize,
    state: Option<AnimationState<F>>,
    rng: R,
}

impl<F: Float> Animator<F, Xoshiro256Plus> {
    /// Constructor given the `mean` vector and `cov_sqrt` square root of the covariance matrix
    pub fn new(mean: Array1<F>, cov_sqrt: Array2<F>, params: &AnimationValidParams) -> Result<Self> {
        Self::new_with_rng(mean, cov_sqrt, params, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng> Animator<F, R> {
    /// Constructor with a random generator for reproducibility.
    ///
    /// Errors when `mean` length differs from `cov_sqrt` rows number.
    pub fn new_with_rng(
        mean: Array1<F>,
        cov_sqrt: Array2<F>,
        params: &AnimationValidParams,
        rng: R,
    ) -> Result<Self> {
        if mean.len() != cov_sqrt.nrows() {
            return Err(GpError::DimensionMismatch {
                expected: cov_sqrt.nrows(),
                actual: mean.len(),
            });
        }
        Ok(Animator {
            mean,
            cov_sqrt,
            n_samples: params.n_samples(),
            total_frames: params.frames_per_cycle(),
            state: None,
            rng,
        })
    }

    /// Set random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Animator<F, R2> {
        Animator {
            mean: self.mean,
            cov_sqrt: self.cov_sqrt,
            n_samples: self.n_samples,
            total_frames: self.total_frames,
            state: self.state,
            rng,
        }
    }

    /// Current animation state, none before the first frame
    pub fn state(&self) -> Option<&AnimationState<F>> {
        self.state.as_ref()
    }

    /// Independent (not animated) trajectories drawn from fresh noise
    pub fn draw(&mut self) -> Array2<F> {
        let noise = draw_standard_normal_using(self.cov_sqrt.ncols(), self.n_samples, &mut self.rng);
        sample(&self.mean, &self.cov_sqrt, &noise)
    }

    /// Trajectories of the next animation frame
    pub fn next_frame(&mut self) -> Array2<F> {
        let state = match self.state.take() {
            Some(state) => state,
            None => AnimationState::drawn(
                self.cov_sqrt.ncols(),
                self.n_samples,
                self.total_frames,
                &mut self.rng,
            ),
        };
        let (state, frame) = state.next_frame(&self.mean, &self.cov_sqrt, &mut self.rng);
        self.state = Some(state);
        frame
    }
}

impl<F: Float, R: Rng> Iterator for Animator<F, R> {
    type Item = Array2<F>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::AnimationParams;
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::{array, Array};

    fn noise_pair(rows: usize, cols: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        (
            draw_standard_normal_using(rows, cols, &mut rng),
            draw_standard_normal_using(rows, cols, &mut rng),
        )
    }

    #[test]
    fn test_interpolate_closed_loop() {
        let (v, u) = noise_pair(10, 3, 42);
        assert_eq!(interpolate(&v, &u, 0.), v);
        assert_abs_diff_eq!(interpolate(&v, &u, 2. * std::f64::consts::PI), v, epsilon = 1e-12);
        assert_abs_diff_eq!(interpolate(&v, &u, std::f64::consts::FRAC_PI_2), u, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_keeps_unit_variance() {
        let (v, u) = noise_pair(200, 50, 0);
        let n = v.len() as f64;
        for theta in [0.3, 1.2, 2.5, 4.0] {
            let w = interpolate(&v, &u, theta);
            let mean = w.sum() / n;
            let var = w.mapv(|x| (x - mean) * (x - mean)).sum() / n;
            assert_abs_diff_eq!(var, 1., epsilon = 0.05);
        }
    }

    #[test]
    fn test_frames_per_cycle() {
        assert_eq!(frames_per_cycle(1.), 120);
        assert_eq!(frames_per_cycle(0.5), 240);
        assert_eq!(frames_per_cycle(0.7), 171);
        assert_eq!(frames_per_cycle(0.05), 1200);
        assert_eq!(frames_per_cycle(1000.), 1);
    }

    #[test]
    fn test_state_cycle() {
        let (v, u) = noise_pair(3, 2, 1);
        let mean = array![0., 1., 2.];
        let cov_sqrt = Array2::<f64>::eye(3);
        let state = AnimationState::from_noise(v.clone(), u.clone(), 4).expect("state");
        let mut rng = Xoshiro256Plus::seed_from_u64(2);

        let (state, frame) = state.next_frame(&mean, &cov_sqrt, &mut rng);
        assert_abs_diff_eq!(frame, &v + &mean.view().insert_axis(ndarray::Axis(1)), epsilon = 1e-12);
        assert_eq!(state.frame_index(), 1);

        let (state, frame) = state.next_frame(&mean, &cov_sqrt, &mut rng);
        assert_abs_diff_eq!(frame, &u + &mean.view().insert_axis(ndarray::Axis(1)), epsilon = 1e-12);

        let (state, _) = state.next_frame(&mean, &cov_sqrt, &mut rng);
        let (state, _) = state.next_frame(&mean, &cov_sqrt, &mut rng);
        assert_eq!(state.frame_index(), 4);

        // cycle over: noise is drawn again
        let (state, frame) = state.next_frame(&mean, &cov_sqrt, &mut rng);
        assert_eq!(state.frame_index(), 1);
        assert_eq!(frame.dim(), (3, 2));
        assert!(state.v != v && state.u != u);
    }

    #[test]
    fn test_new_using() {
        let mut rng = Xoshiro256Plus::seed_from_u64(5);
        let state = AnimationState::<f64>::new_using(4, 3, 10, &mut rng).expect("state");
        assert_eq!(state.frame_index(), 0);
        assert_eq!(state.total_frames(), 10);
        assert_eq!(state.noise().dim(), (4, 3));
        assert!(matches!(
            AnimationState::<f64>::new_using(4, 3, 0, &mut rng),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_from_noise_errors() {
        assert!(AnimationState::<f64>::from_noise(Array2::zeros((2, 2)), Array2::zeros((3, 2)), 5).is_err());
        assert!(AnimationState::<f64>::from_noise(Array2::zeros((2, 2)), Array2::zeros((2, 2)), 0).is_err());
    }

    #[test]
    fn test_animator() {
        let xs = Array::linspace(0., 10., 20);
        let mean = xs.mapv(f64::sin);
        let cov_sqrt = Array2::eye(20) * 0.1;
        let params = AnimationParams::new(4).speed(12.).check().expect("params");
        let mut animator =
            Animator::new_with_rng(mean, cov_sqrt, &params, Xoshiro256Plus::seed_from_u64(42))
                .expect("animator");
        assert!(animator.state().is_none());
        let frames: Vec<_> = animator.by_ref().take(11).collect();
        assert!(frames.iter().all(|f| f.dim() == (20, 4)));
        // 10 frames per cycle, the 11th starts a new cycle
        assert_eq!(animator.state().map(|s| s.frame_index()), Some(1));
        assert_eq!(animator.state().map(|s| s.total_frames()), Some(10));
        // consecutive frames are close to each other
        let step = (&frames[1] - &frames[0]).mapv(f64::abs).sum() / 80.;
        let jump = (&frames[10] - &frames[9]).mapv(f64::abs).sum() / 80.;
        assert!(step < 0.1);
        assert!(jump > 0.);

        let drawn = animator.draw();
        assert_eq!(drawn.dim(), (20, 4));
    }

    #[test]
    fn test_animator_dimension_mismatch() {
        let params = AnimationParams::default().check().expect("params");
        let res = Animator::new(Array1::<f64>::zeros(3), Array2::eye(4), &params);
        assert!(matches!(
            res,
            Err(GpError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
