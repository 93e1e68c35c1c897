//! Plain-text reporting of simulation results

use std::fmt::{self, Display};

use crate::{
    config::SimulationConfig,
    policy::PolicyKind,
    stats::{PolicySummary, Summary},
};

/// A summary of one run, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    config: SimulationConfig,
    seed: u64,
    threshold: Option<usize>,
    summary: Summary,
}

impl SummaryReport {
    /// Create a new report.
    pub fn new(
        config: SimulationConfig,
        seed: u64,
        threshold: Option<usize>,
        summary: Summary,
    ) -> Self {
        Self {
            config,
            seed,
            threshold,
            summary,
        }
    }

    /// The summary being reported.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

struct Value(Option<f64>);

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.3}"),
            None => f.write_str("n/a"),
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, summary: &PolicySummary) -> fmt::Result {
    writeln!(f, "Customers served:         {}", summary.served)?;
    writeln!(f, "Customers balked:         {}", summary.balked)?;
    writeln!(
        f,
        "Mean queue length:        {}",
        Value(summary.mean_queue_length)
    )?;
    writeln!(
        f,
        "Mean system occupancy:    {}",
        Value(summary.mean_system_occupancy)
    )?;
    writeln!(
        f,
        "Mean waiting time:        {}",
        Value(summary.mean_waiting_time)
    )?;
    writeln!(
        f,
        "Waiting time p50 / p99:   {} / {}",
        Value(summary.median_waiting_time),
        Value(summary.p99_waiting_time)
    )?;
    writeln!(
        f,
        "Mean service time:        {}",
        Value(summary.mean_service_time)
    )?;
    writeln!(
        f,
        "Mean time in system:      {}",
        Value(summary.mean_system_time)
    )?;
    writeln!(
        f,
        "Balk probability:         {}",
        Value(summary.balk_probability)
    )
}

impl Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Configuration ===")?;
        writeln!(f, "Arrival rate:             {}", self.config.arrival_rate)?;
        writeln!(f, "Service rate:             {}", self.config.service_rate)?;
        writeln!(
            f,
            "Traffic intensity:        {:.3}",
            self.config.traffic_intensity()
        )?;
        writeln!(f, "Horizon:                  {}", self.config.horizon)?;
        writeln!(f, "Customers:                {}", self.config.mix)?;
        if self.config.mix.balking_cost().is_some() {
            writeln!(f, "Selfish basis:            {}", self.config.selfish_basis)?;
        }
        if let Some(threshold) = self.threshold {
            writeln!(f, "Naor threshold:           {threshold}")?;
        }
        writeln!(f, "Seed:                     {}", self.seed)?;

        writeln!(f)?;
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(f, "Warm-up:                  {}", self.summary.warmup)?;
        writeln!(
            f,
            "Utilization:              {}",
            Value(self.summary.utilization)
        )?;
        write_block(f, &self.summary.overall)?;

        for (kind, summary) in &self.summary.by_policy {
            writeln!(f)?;
            writeln!(f, "--- {kind} customers ---")?;
            write_block(f, summary)?;
        }

        if self.config.mix.is_mixed() {
            writeln!(f)?;
            writeln!(f, "Mean cost per customer:")?;
            for kind in [PolicyKind::Selfish, PolicyKind::SociallyOptimal] {
                let cost = self.summary.policy(kind).and_then(|s| s.mean_cost);
                writeln!(f, "  {:<22}{}", format!("{kind}:"), Value(cost))?;
            }
            writeln!(
                f,
                "  {:<22}{}",
                "Overall:",
                Value(self.summary.overall.mean_cost)
            )?;
        }

        Ok(())
    }
}
