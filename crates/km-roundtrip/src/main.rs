//! Runs the built-in round-trip suite against the local engine
//!
//! ```bash
//! RUST_LOG=km_roundtrip=debug km-roundtrip [case filter]
//! ```

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use km_config::KmConfig;
use km_roundtrip::{builtin_cases, EngineClient, FileLogTail, RoundTripHarness, RoundTripSuite};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let config = KmConfig::from_env().context("loading configuration")?;
    let log = FileLogTail::new(&config.engine.log_path, &config.engine.error_pattern)?;
    info!("Watching engine log {}", log.path().display());

    let mut suite = RoundTripSuite::new(builtin_cases()?);
    if let Some(filter) = std::env::args().nth(1) {
        suite = suite.filtered(&filter);
        info!("{} cases match {:?}", suite.cases.len(), filter);
    }

    let client = EngineClient::system(config.engine.clone());
    let mut harness = RoundTripHarness::new(client, log, config.harness.clone());
    let report = suite.run(&mut harness).context("preparing the scratch group")?;

    let path = report.write_json(&config.harness.artifacts_dir)?;
    info!("Report written to {}", path.display());
    report.print_summary();

    if !report.all_passed() {
        bail!("{} of {} cases failed", report.failed(), report.results.len());
    }
    Ok(())
}
