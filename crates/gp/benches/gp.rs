use criterion::{criterion_group, criterion_main, Criterion};
use gpanim_gp::kernels::Kernel;
use gpanim_gp::utils::linspace;
use gpanim_gp::{draw_standard_normal_using, matrix_sqrt, sample, AnimationParams, Animator, GaussianProcess};
use linfa::ParamGuard;
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let nxs = [100, 200];
    let x_obs = array![1., 2.5, 4., 6., 8.5];
    let y_obs = x_obs.mapv(f64::sin);
    let kernel = Kernel::squared_exponential(1., 1.).with_jitter(1e-6);

    let mut group = c.benchmark_group("gp");
    group.sample_size(20);
    for nx in nxs {
        let xs = linspace(0., 10., nx, true);
        let gp = GaussianProcess::posterior(kernel, &x_obs, &y_obs, 0.01)
            .expect("GP conditioning");

        group.bench_function(format!("posterior cov {nx}"), |b| {
            b.iter(|| std::hint::black_box(gp.cov(&xs)));
        });

        let cov = gp.cov(&xs);
        group.bench_function(format!("matrix sqrt {nx}"), |b| {
            b.iter(|| std::hint::black_box(matrix_sqrt(&cov).expect("matrix sqrt")));
        });

        let mean = gp.mean(&xs);
        let cov_sqrt = matrix_sqrt(&cov).expect("matrix sqrt");
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        group.bench_function(format!("sample {nx}"), |b| {
            b.iter(|| {
                let noise = draw_standard_normal_using(nx, 5, &mut rng);
                std::hint::black_box(sample(&mean, &cov_sqrt, &noise))
            });
        });

        let params = AnimationParams::new(5).check().expect("valid params");
        let mut animator = Animator::new(mean.clone(), cov_sqrt.clone(), &params)
            .expect("animator")
            .with_rng(Xoshiro256Plus::seed_from_u64(42));
        group.bench_function(format!("animation frame {nx}"), |b| {
            b.iter(|| std::hint::black_box(animator.next_frame()));
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
