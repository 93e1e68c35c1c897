use naor_queue::{
    naor_threshold, threshold::discounted_wait, BalkingPolicy, Customer, Decision, Occupancy,
    OccupancyBasis, PolicyKind,
};

use crate::types::outcomes;

/// Given any valid run
/// When the queue is sampled
/// Then the system holds the queue plus at most one customer in service
#[test]
fn occupancy_is_queue_plus_server() {
    for outcome in outcomes(300.0) {
        for sample in outcome.statistics().samples() {
            let in_service = sample.system_occupancy - sample.queue_length;
            assert!(in_service <= 1, "seed {}: {sample:?}", outcome.seed());
            if sample.queue_length > 0 {
                assert_eq!(in_service, 1, "nobody waits while the server is idle");
            }

            for kind in [
                PolicyKind::Unconditional,
                PolicyKind::Selfish,
                PolicyKind::SociallyOptimal,
            ] {
                assert!(sample.queue_by_policy.get(kind) <= sample.system_by_policy.get(kind));
            }
            let total: usize = [
                PolicyKind::Unconditional,
                PolicyKind::Selfish,
                PolicyKind::SociallyOptimal,
            ]
            .into_iter()
            .map(|kind| *sample.system_by_policy.get(kind))
            .sum();
            assert_eq!(total, sample.system_occupancy);
        }
    }
}

#[test]
fn every_customer_is_served_xor_balked() {
    for outcome in outcomes(300.0) {
        let stats = outcome.statistics();

        for customer in stats.completed() {
            assert!(customer.is_served() && !customer.is_balked());
            let start = customer.service_start_time().unwrap();
            assert_eq!(
                customer.service_end_time(),
                Some(start + customer.service_time())
            );
        }
        for customer in stats.balked() {
            assert!(customer.is_balked() && !customer.is_served());
            assert_eq!(customer.service_start_time(), None);
        }

        let mut ids: Vec<usize> = stats
            .completed()
            .iter()
            .chain(stats.balked())
            .map(Customer::id)
            .collect();
        ids.sort_unstable();
        assert_eq!(
            ids,
            (0..ids.len()).collect::<Vec<_>>(),
            "no customer should be lost or duplicated"
        );
    }
}

/// Given customers that join in some order
/// When they are served
/// Then they start service in the order they joined
#[test]
fn service_is_first_come_first_served() {
    for outcome in outcomes(300.0) {
        let completed = outcome.statistics().completed();

        for pair in completed.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.arrival_time() < b.arrival_time());
            assert!(a.service_start_time() <= b.service_start_time());
            assert!(a.service_end_time() <= b.service_start_time());
        }
    }
}

#[test]
fn waiting_times_are_non_negative() {
    for outcome in outcomes(300.0) {
        for row in outcome.statistics().customer_rows() {
            assert!(row.waiting_time >= 0.0);
            assert!(row.service_start_time >= row.arrival_time);
        }
    }
}

#[test]
fn utilization_is_a_fraction() {
    for outcome in outcomes(300.0) {
        for warmup in [0.0, 50.0, 299.0] {
            let utilization = outcome.summary(warmup).unwrap().utilization.unwrap();
            assert!(
                (0.0..=1.0).contains(&utilization),
                "seed {}: utilization {utilization}",
                outcome.seed()
            );
        }
    }
}

#[test]
fn threshold_brackets_mu_c() {
    for (lambda, mu) in [(0.2, 1.0), (0.5, 1.0), (0.9, 1.0), (1.0, 1.0), (3.0, 4.0), (1.5, 1.0)] {
        for c in [0.5, 1.0, 2.0, 7.0, 25.0] {
            let n = naor_threshold(lambda, mu, c).unwrap();
            let rho = lambda / mu;
            assert!(discounted_wait(n, rho) <= mu * c, "lambda {lambda}, mu {mu}, c {c}");
            assert!(mu * c < discounted_wait(n + 1, rho), "lambda {lambda}, mu {mu}, c {c}");
        }
    }
}

/// Given a fixed load
/// When the value of service increases
/// Then neither policy becomes less willing to join
#[test]
fn higher_balking_cost_never_deters_joining() {
    let costs = [0.5, 1.0, 2.0, 3.5, 7.0, 12.0, 30.0];

    for lambda in [0.3, 0.8, 1.0, 2.0] {
        let thresholds: Vec<usize> = costs
            .iter()
            .map(|&c| naor_threshold(lambda, 1.0, c).unwrap())
            .collect();
        assert!(thresholds.windows(2).all(|w| w[0] <= w[1]), "{thresholds:?}");
    }

    for queue_length in 0..10 {
        let occupancy = Occupancy {
            queue_length,
            in_service: 1,
        };
        let joins: Vec<bool> = costs
            .iter()
            .map(|&balking_cost| {
                let policy = BalkingPolicy::Selfish {
                    balking_cost,
                    service_rate: 1.0,
                    basis: OccupancyBasis::SystemOccupancy,
                };
                policy.decide(occupancy) == Decision::Join
            })
            .collect();
        assert!(joins.windows(2).all(|w| w[0] <= w[1]), "{joins:?}");
    }
}
