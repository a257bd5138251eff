use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives when `RUST_LOG` is unset.
pub fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "cafe_etl=debug,info"
    } else {
        "cafe_etl=info"
    }
}

/// One filter for both outputs; `json` only swaps the line format
/// (container runners ship stdout to a log collector).
pub fn init_logger(verbose: bool, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));

    let json_layer = json.then(|| fmt::layer().with_target(false).json());
    let compact_layer = (!json).then(|| fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert_eq!(log_filter(true), "cafe_etl=debug,info");
        assert_eq!(log_filter(false), "cafe_etl=info");
    }

    #[test]
    fn test_filters_parse() {
        assert!(EnvFilter::try_new(log_filter(true)).is_ok());
        assert!(EnvFilter::try_new(log_filter(false)).is_ok());
    }
}
