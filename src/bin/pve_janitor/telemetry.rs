use tracing::{Level, Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

/// Subscriber filtered by `RUST_LOG`, falling back to `default_level`.
pub fn get_subscriber<Sink>(default_level: Level, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(sink)
        .finish()
}

/// Installs the global subscriber. Call once.
pub fn init_subscriber(
    subscriber: impl Subscriber + Send + Sync + 'static,
) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber)
}
