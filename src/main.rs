use anyhow::Context;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use perp_settlement::config::loader::AppConfig;
use perp_settlement::observability::metrics::{register_metrics, REGISTRY};
use perp_settlement::observability::tracing::init_tracing;
use perp_settlement::{Clock, FundingOracle, ManualPriceOracle, Perpetual, Price, SystemClock};

/// Boots an engine from configuration, refreshes the funding index once at
/// the price given on the command line and prints the committed events and
/// metrics.
fn main() -> anyhow::Result<()> {
    let env = std::env::var("PERPETUAL_ENV").unwrap_or_else(|_| "development".to_string());
    let app = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&app.logging.level, app.logging.json);
    register_metrics().context("registering metrics")?;

    let price_arg = std::env::args().nth(1).unwrap_or_else(|| "1".to_string());
    let price = Price::from_decimal_str(&price_arg)
        .with_context(|| format!("parsing price {:?}", price_arg))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let funder = FundingOracle::new(app.funding.clone(), clock.now());
    let oracle = ManualPriceOracle::new(price);
    let mut perpetual = Perpetual::new(app.engine(), oracle, funder, clock);

    perpetual.settle_accounts(&[]).context("refreshing funding index")?;
    let snapshot = perpetual.snapshot().context("capturing snapshot")?;

    tracing::info!(
        index = %perpetual.get_global_index(),
        funding_rate = %perpetual.get_funding_rate(),
        snapshot_checksum = %snapshot.checksum,
        "Engine ready"
    );

    for record in perpetual.drain_events() {
        println!("{}", serde_json::to_string(&record).context("encoding event")?);
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("encoding metrics")?;
    println!("{}", String::from_utf8_lossy(&buffer));
    Ok(())
}
