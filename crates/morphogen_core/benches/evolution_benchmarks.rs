use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morphogen_core::compatibility::neat_distance;
use morphogen_core::config::{EvolutionConfig, NeuralMode};
use morphogen_core::innovation::InnovationRegistry;
use morphogen_core::neat::NeatLogic;
use morphogen_core::population::{create_initial_population, evolve_population};
use morphogen_data::NeatGenome;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn config(mode: NeuralMode) -> EvolutionConfig {
    let mut config = EvolutionConfig {
        population_size: 100,
        ..EvolutionConfig::default()
    };
    config.neural.mode = mode;
    config
}

/// Benchmark one generation with fixed-topology controllers.
fn bench_evolve_fixed(c: &mut Criterion) {
    let config = config(NeuralMode::Fixed);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut registry = InnovationRegistry::new();
    let population = create_initial_population(&config, &mut registry, &mut rng).unwrap();
    let fitness: Vec<f64> = (0..population.len()).map(|i| i as f64).collect();

    c.bench_function("evolve_fixed_100", |b| {
        b.iter(|| {
            let out = evolve_population(
                black_box(&population),
                &fitness,
                &config,
                0,
                &mut registry,
                &mut rng,
            )
            .unwrap();
            registry.clear_generation_cache();
            black_box(out)
        })
    });
}

/// Benchmark one generation with NEAT controllers (speciation included).
fn bench_evolve_neat(c: &mut Criterion) {
    let config = config(NeuralMode::Neat);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut registry = InnovationRegistry::new();
    let population = create_initial_population(&config, &mut registry, &mut rng).unwrap();
    let fitness: Vec<f64> = (0..population.len()).map(|i| i as f64).collect();

    c.bench_function("evolve_neat_100", |b| {
        b.iter(|| {
            let out = evolve_population(
                black_box(&population),
                &fitness,
                &config,
                0,
                &mut registry,
                &mut rng,
            )
            .unwrap();
            registry.clear_generation_cache();
            black_box(out)
        })
    });
}

/// Benchmark NEAT compatibility distance between grown genomes.
fn bench_neat_distance(c: &mut Criterion) {
    let config = config(NeuralMode::Neat);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut registry = InnovationRegistry::new();
    let mut a = NeatGenome::new_minimal_with_rng(&config.neural, &config.neat, &mut registry, &mut rng);
    let mut b = a.clone();
    let mut neat = config.neat.clone();
    neat.add_node_rate = 0.5;
    neat.add_connection_rate = 0.5;
    for _ in 0..20 {
        a.mutate_with_config(&neat, &mut registry, &mut rng);
        b.mutate_with_config(&neat, &mut registry, &mut rng);
    }

    c.bench_function("neat_distance", |bench| {
        bench.iter(|| black_box(neat_distance(black_box(&a), black_box(&b), &config.neat)))
    });
}

criterion_group!(benches, bench_evolve_fixed, bench_evolve_neat, bench_neat_distance);
criterion_main!(benches);
