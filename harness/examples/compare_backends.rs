//! Load a synthetic dataset into every backend and compare the results.
//!
//! ```text
//! cargo run --release -p echt-harness --example compare_backends -- 100000
//! ```

use echt::{BackendKind, ResolveKind};
use echt_harness::{compare, verify_agreement, Dataset, DatasetSpec, TrialConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let size = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(50_000);

    let dataset = Dataset::synthetic(DatasetSpec {
        size,
        ..DatasetSpec::default()
    });
    let config = TrialConfig::default();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut queries = dataset.sample(1_000, &mut rng);
    queries.extend(dataset.negatives(1_000, &mut rng));
    queries.extend(dataset.lpm_queries(1_000, &mut rng));
    match verify_agreement(&BackendKind::ALL, &dataset, &queries) {
        Ok(checked) => println!("All backends agree on {checked} queries\n"),
        Err(disagreement) => {
            eprintln!("{disagreement}");
            std::process::exit(1);
        }
    }

    println!(
        "{:<20} {:>10} {:>10} {:>12} {:>12} {:>10}",
        "Backend", "Nodes", "Depth", "Size (B)", "Load", "Unexpected"
    );
    println!("{}", "-".repeat(80));

    let reports = compare(&BackendKind::ALL, &dataset, &config);
    for report in &reports {
        println!(
            "{:<20} {:>10} {:>10} {:>12} {:>12.2?} {:>10}",
            report.backend.name(),
            report.stats.total_nodes,
            report.depth,
            report.approximate_size,
            report.journal.total_load_duration(),
            report.unexpected,
        );
    }

    println!();
    for report in &reports {
        report.journal.log_summary();
        for kind in ResolveKind::ALL {
            let (count, duration) = report.journal.total_resolved(kind);
            let per_query = duration.as_nanos() as f64 / count.max(1) as f64;
            println!(
                "{:<20} {:<14} {:>8} queries {:>10.1} ns/query",
                report.backend.name(),
                kind.label(),
                count,
                per_query
            );
        }
    }
}
