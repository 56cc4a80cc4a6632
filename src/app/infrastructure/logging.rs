use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Default directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "py_edit=info";
const VERBOSE_FILTER: &str = "py_edit=debug";

/// Pick the filter directive: `RUST_LOG` wins, then `--verbose`, then the default.
pub fn filter_directive(env_value: Option<&str>, verbose: bool) -> String {
    match env_value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global tracing subscriber. Logs go to stderr so they never
/// mix with the console panel, which only shows child process output.
pub fn init(verbose: bool) {
    let env_value = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(env_value.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(filter_directive(None, false), "py_edit=info");
    }

    #[test]
    fn test_verbose_filter() {
        assert_eq!(filter_directive(None, true), "py_edit=debug");
    }

    #[test]
    fn test_env_overrides_verbose() {
        assert_eq!(filter_directive(Some("py_edit=trace"), true), "py_edit=trace");
    }

    #[test]
    fn test_blank_env_ignored() {
        assert_eq!(filter_directive(Some("  "), false), "py_edit=info");
    }
}
