use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Installs the global fmt subscriber shared by the `backlog` CLI and the API server.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Set
/// `LOG_SOURCE_LOCATION=0` to drop file and line numbers from each record.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let with_location = crate::util::env::env_flag("LOG_SOURCE_LOCATION", true);

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(with_location)
        .with_file(with_location)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}
