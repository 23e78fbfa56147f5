use gpanim_gp::confidence::confidence_bands;
use gpanim_gp::disagreement::{disagreement_at_x, max_disagreement_point};
use gpanim_gp::kernels::Kernel;
use gpanim_gp::targets::TargetFunction;
use gpanim_gp::utils::linspace;
use gpanim_gp::{matrix_sqrt, AnimationParams, Animator, GaussianProcess};
use linfa::ParamGuard;
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn main() {
    env_logger::init();

    let noise_scale = 0.1;
    let x_obs = array![1., 3., 4.5, 8.];
    let y_obs = TargetFunction::Sine.values(&x_obs);
    let gp = GaussianProcess::posterior(
        Kernel::squared_exponential(1., 1.2),
        &x_obs,
        &y_obs,
        noise_scale * noise_scale,
    )
    .expect("GP conditioning");
    println!("{gp}");

    let xs = linspace(0., 10., 101, true);
    let mean = gp.mean(&xs);
    let variances = gp.variances(&xs);
    let bands = confidence_bands(&xs, &mean, &variances, noise_scale);
    for band in bands.iter().step_by(20) {
        println!(
            "x={:5.2} mean={:6.3} 1sd=[{:6.3}, {:6.3}] 2sd=[{:6.3}, {:6.3}]",
            band.x, band.mean, band.lower1, band.upper1, band.lower2, band.upper2
        );
    }

    let cov_sqrt = matrix_sqrt(&gp.cov(&xs)).expect("matrix sqrt");
    let params = AnimationParams::new(5)
        .speed(4.)
        .check()
        .expect("valid animation params");
    let animator = Animator::new(mean, cov_sqrt, &params)
        .expect("animator")
        .with_rng(Xoshiro256Plus::seed_from_u64(42));

    for (i, frame) in animator.take(params.frames_per_cycle()).enumerate().step_by(10) {
        let (x_max, d_max) = max_disagreement_point(&xs, &frame);
        let d = disagreement_at_x(&xs, &frame, 6.);
        println!(
            "frame {i:3}: max disagreement {d_max:.4} at x={x_max:.2}, std disagreement at x=6: {:.4}",
            d.std
        );
    }
}
