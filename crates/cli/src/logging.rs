use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
///
/// `RUST_LOG` wins over `--log-level`. Logs go to stderr so command output on
/// stdout stays machine readable.
pub fn init_logging(log_level: Level, json: bool) -> Result<()> {
    let level_str = level_filter(log_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("folio={level_str},folio_http={level_str},folio_core={level_str}").into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

fn level_filter(level: Level) -> String {
    level.as_str().to_lowercase()
}
