use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
