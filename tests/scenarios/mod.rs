use naor_queue::{run_replications, CustomerMix, PolicyKind, Simulation};

use crate::types::{config, run};

/// Given an M/M/1 queue with rho = 0.5 and no balking
/// When it runs for a long time
/// Then the means approach rho / (1 - rho) in the system and rho^2 / (1 - rho) in the queue
#[test]
fn mm1_long_run_means() {
    let outcome = run(config(0.5, 100_000.0, CustomerMix::Unconditional, 2024));
    let summary = outcome.summary(1_000.0).unwrap();

    let occupancy = summary.overall.mean_system_occupancy.unwrap();
    let queue_length = summary.overall.mean_queue_length.unwrap();
    let utilization = summary.utilization.unwrap();

    assert!((occupancy - 1.0).abs() < 0.1, "mean system occupancy {occupancy}");
    assert!((queue_length - 0.5).abs() < 0.1, "mean queue length {queue_length}");
    assert!((utilization - 0.5).abs() < 0.05, "utilization {utilization}");
}

/// Given selfish customers with lambda = 2, mu = 1 and c = 7
/// When the run is repeated with the same seed
/// Then every arrival, decision and service is identical
#[test]
fn selfish_run_is_reproducible() {
    let mix = CustomerMix::Selfish { balking_cost: 7.0 };
    let first = run(config(2.0, 500.0, mix, 99));
    let second = run(config(2.0, 500.0, mix, 99));

    assert_eq!(
        first.statistics().customer_rows(),
        second.statistics().customer_rows()
    );
    assert_eq!(first.statistics().balked(), second.statistics().balked());
    assert_eq!(first.statistics().samples(), second.statistics().samples());

    assert!(!first.statistics().balked().is_empty());
    assert!(first
        .statistics()
        .samples()
        .iter()
        .all(|s| s.system_occupancy <= 6));

    let other = run(config(2.0, 500.0, mix, 100));
    assert_ne!(
        first.statistics().customer_rows(),
        other.statistics().customer_rows()
    );
}

/// Given customers that never balk
/// When the simulation runs
/// Then no threshold is computed and nobody balks
#[test]
fn unconditional_customers_all_join() {
    let simulation = Simulation::new(config(2.0, 500.0, CustomerMix::Unconditional, 5)).unwrap();
    assert_eq!(simulation.threshold(), None);

    let outcome = simulation.run().unwrap();
    assert!(outcome.statistics().balked().is_empty());

    let summary = outcome.summary(0.0).unwrap();
    assert_eq!(summary.overall.balk_probability, Some(0.0));
    assert_eq!(summary.overall.balked, 0);
    assert!(summary.by_policy.is_empty());
}

/// Given an even mix of selfish and socially optimal customers under heavy load
/// When the run is summarised
/// Then the socially optimal customers balk more often
#[test]
fn socially_optimal_customers_balk_more() {
    let mix = CustomerMix::Mixed {
        balking_cost: 7.0,
        selfish_proportion: 0.5,
    };
    let outcome = run(config(2.0, 5_000.0, mix, 11));
    assert_eq!(outcome.threshold(), Some(2));

    let summary = outcome.summary(100.0).unwrap();
    let selfish = summary.policy(PolicyKind::Selfish).unwrap();
    let optimal = summary.policy(PolicyKind::SociallyOptimal).unwrap();

    assert!(optimal.balk_probability.unwrap() > selfish.balk_probability.unwrap());
    assert_eq!(selfish.served + optimal.served, summary.overall.served);
    assert_eq!(selfish.balked + optimal.balked, summary.overall.balked);
    assert!(selfish.mean_cost.is_some() && optimal.mean_cost.is_some());

    let report = outcome.report(100.0).unwrap().to_string();
    assert!(report.contains("Naor threshold:           2"));
    assert!(report.contains("Mean cost per customer"));
}

#[tokio::test]
async fn replications_agree_with_theory() {
    let report = run_replications(
        config(0.5, 10_000.0, CustomerMix::Unconditional, 7),
        8,
        500.0,
    )
    .await
    .unwrap();

    assert_eq!(report.summaries().len(), 8);

    let occupancy = report.mean_system_occupancy().unwrap();
    assert_eq!(occupancy.samples, 8);
    assert!((occupancy.mean - 1.0).abs() < 0.15, "{occupancy:?}");
    assert!(occupancy.std_dev.unwrap() > 0.0);

    let balks = report.balk_probability().unwrap();
    assert_eq!(balks.mean, 0.0);
}
