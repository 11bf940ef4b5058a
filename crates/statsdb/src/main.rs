// Stats database entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (config/statsdb.toml, or built-in defaults)
// 3. Fetch stats and WAR, merge, write the database

use statsdb::config;
use statsdb::model::StatGroup;
use statsdb::pipeline;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season={}, output={}",
        config.season,
        config.output_path.display()
    );

    // 3. Run
    let db = pipeline::run(&config)
        .await
        .with_context(|| format!("stats database run for season {} failed", config.season))?;

    let season = config.season.to_string();
    info!(
        "Done: {} hitters, {} pitchers written to {}",
        db.season(StatGroup::Hitting, &season).len(),
        db.season(StatGroup::Pitching, &season).len(),
        config.output_path.display()
    );
    Ok(())
}

/// Initialize tracing to stderr, filtered by `RUST_LOG`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("statsdb=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
