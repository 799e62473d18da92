use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder, Debug)]
pub struct TracingConfig {
    // Has to be passed in from the actual binary or the release field is wrong
    pub package: &'static str,
    pub version: &'static str,
    #[builder(setter(into), default = String::from("dev"))]
    pub env: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    TracingInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber: fmt layer plus an `EnvFilter` that
/// defaults to INFO and can be overridden through `RUST_LOG`.
pub fn setup(config: &TracingConfig) -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()?;
    ::tracing::info!(
        package = config.package,
        version = config.version,
        env = config.env,
        "tracing initialized"
    );
    Ok(())
}
