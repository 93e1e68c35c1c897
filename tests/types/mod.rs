use naor_queue::{CustomerMix, Simulation, SimulationConfig, SimulationOutcome};

/// Seeds the property tests sweep over.
pub const SEEDS: [u64; 5] = [1, 7, 42, 1_000, 0xDEAD_BEEF];

pub fn config(arrival_rate: f64, horizon: f64, mix: CustomerMix, seed: u64) -> SimulationConfig {
    SimulationConfig::builder()
        .arrival_rate(arrival_rate)
        .service_rate(1.0)
        .horizon(horizon)
        .mix(mix)
        .seed(seed)
        .build()
}

pub fn run(config: SimulationConfig) -> SimulationOutcome {
    Simulation::new(config)
        .expect("config should be valid")
        .run()
        .expect("run should complete")
}

/// A spread of loads and customer mixes.
pub fn scenarios() -> Vec<(f64, CustomerMix)> {
    vec![
        (0.5, CustomerMix::Unconditional),
        (1.5, CustomerMix::Unconditional),
        (2.0, CustomerMix::Selfish { balking_cost: 7.0 }),
        (
            0.9,
            CustomerMix::Mixed {
                balking_cost: 4.0,
                selfish_proportion: 0.3,
            },
        ),
        (
            2.0,
            CustomerMix::Mixed {
                balking_cost: 7.0,
                selfish_proportion: 0.5,
            },
        ),
    ]
}

/// Run every scenario with every seed.
pub fn outcomes(horizon: f64) -> impl Iterator<Item = SimulationOutcome> {
    scenarios().into_iter().flat_map(move |(arrival_rate, mix)| {
        SEEDS
            .into_iter()
            .map(move |seed| run(config(arrival_rate, horizon, mix, seed)))
    })
}
