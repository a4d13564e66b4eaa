use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level (`-v` count)
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "dinheiro_data=info",
        1 => "dinheiro_data=debug",
        _ => "dinheiro_data=trace",
    }
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity default. Stdout stays
/// reserved for reports.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A second initialization, e.g. from tests, keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(console_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_directives() {
        assert_eq!(default_directive(0), "dinheiro_data=info");
        assert_eq!(default_directive(1), "dinheiro_data=debug");
        assert_eq!(default_directive(5), "dinheiro_data=trace");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(0);
        init_logging(2);
        tracing::info!("logging initialized");
    }
}
