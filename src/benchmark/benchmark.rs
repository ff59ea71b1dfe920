use std::time::Instant;

use crate::configuration::config::{DiffusionConfig, VelocityConfig};
use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::engine::Engine;
use crate::simulation::influence_tree::InfluenceTree;
use crate::simulation::params::Parameters;
use crate::simulation::states::NVec3;
use crate::simulation::velocity::{compute_velocity_grid, DirectSummation};
use crate::simulation::vorton::Vorton;
use crate::simulation::vorton_sim::VortonSim;

/// Time one velocity-grid evaluation, tree against direct summation
pub fn bench_velocity() {
    // Different population sizes to test
    let ns = [256, 512, 1024, 2048, 4096, 8192];

    for n in ns {
        let vortons = make_vortons(n);
        let (min, max) = bounds(&vortons);

        let mut tree = InfluenceTree::new(Parameters::default().margin_factor);
        tree.build(&vortons, min, max);
        let Some(base) = tree.base_geometry().cloned() else {
            continue;
        };
        let mut grid: UniformGrid<NVec3> = UniformGrid::new();
        let direct = DirectSummation { vortons: &vortons };

        // Warm up
        compute_velocity_grid(&mut grid, &base, &tree);

        // Time direct
        let t0 = Instant::now();
        compute_velocity_grid(&mut grid, &base, &direct);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Time tree, including the rebuild it needs every step
        let t1 = Instant::now();
        tree.build(&vortons, min, max);
        compute_velocity_grid(&mut grid, &base, &tree);
        let dt_tree = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {:8.6} s, tree = {:8.6} s", dt_direct, dt_tree);
    }
}

/// Time full simulation steps for a range of n
/// Paste output directly into a spreadsheet to graph
pub fn bench_update_curve() {
    println!("N,direct_ms,tree_ms");

    for n in (256..=8192).step_by(256) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 2048 { 3 } else { 1 };

        let ms_direct = time_steps(n, VelocityConfig::Direct, steps);
        let ms_tree = time_steps(n, VelocityConfig::Tree, steps);

        println!("{},{:.6},{:.6}", n, ms_direct, ms_tree);
    }
}

/// Mean wall time in ms of one `update` with the given velocity method
fn time_steps(n: usize, velocity: VelocityConfig, steps: usize) -> f64 {
    let engine = Engine {
        velocity,
        diffusion: DiffusionConfig::Pse,
        threads: None,
    };
    let params = Parameters::default();
    let dt = params.time_step;

    let mut sim = VortonSim::with_vortons(engine, params, make_vortons(n));
    sim.initialize(1);

    let t0 = Instant::now();
    for frame in 0..steps {
        sim.update(dt, frame as u32);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}

/// Helper to build a deterministic population of size `n`
fn make_vortons(n: usize) -> Vec<Vorton> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let position = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            let vorticity = NVec3::new((i_f * 0.11).cos(), (i_f * 0.23).sin(), 1.0);
            Vorton::new(position, vorticity, 0.05)
        })
        .collect()
}

fn bounds(vortons: &[Vorton]) -> (NVec3, NVec3) {
    let mut min = NVec3::repeat(f64::MAX);
    let mut max = NVec3::repeat(-f64::MAX);
    for v in vortons {
        min = min.inf(&v.position);
        max = max.sup(&v.position);
    }
    (min, max)
}
