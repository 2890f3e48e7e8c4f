use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use epigrid::{GridSize, MeasureKind, Parameters, Simulation};
use epigrid::measures::MeasureParameters;

static SEED: u64 = 123;
static DAYS: u32 = 100;

fn parameters(size: usize) -> Parameters {
    let mut parameters = Parameters {
        grid_size: GridSize::square(size),
        initial_case_count: 10,
        ..Parameters::default()
    };
    *parameters.measures.get_mut(MeasureKind::Lockdown) = MeasureParameters::enabled();
    *parameters.measures.get_mut(MeasureKind::Ventilators) = MeasureParameters::enabled();
    parameters
}

fn seeded_simulation(size: usize) -> Simulation {
    let mut simulation = Simulation::new(parameters(size), SEED).expect("valid parameters");
    simulation.seed_initial_cases();
    simulation
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("populate 200x200", |bencher| {
        bencher.iter_with_large_drop(|| seeded_simulation(200));
    });

    c.bench_function("run 100 days on 100x100", |bencher| {
        bencher.iter_batched(
            || seeded_simulation(100),
            |mut simulation| {
                simulation.run(DAYS);
                simulation
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(grid_update_benches, criterion_benchmark);
criterion_main!(grid_update_benches);
