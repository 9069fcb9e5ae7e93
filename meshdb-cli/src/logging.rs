use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub fn default_directive(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "meshdb_core=debug,meshdb_cli=debug"
    } else if verbose {
        "meshdb_core=info,meshdb_cli=info"
    } else {
        "meshdb_core=warn,meshdb_cli=warn"
    }
}

/// Install the global subscriber; logs go to stderr so `--json` output
/// stays parseable
pub fn init(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbose, debug).into());

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "meshdb_core=warn,meshdb_cli=warn");
        assert_eq!(default_directive(true, false), "meshdb_core=info,meshdb_cli=info");
        assert_eq!(default_directive(true, true), "meshdb_core=debug,meshdb_cli=debug");
    }
}
