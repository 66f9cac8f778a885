//! Diagnostic logging to stderr
//!
//! Stdout is reserved for command output so results stay pipeable.

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Environment variable that overrides the level chosen by flags
pub const LOG_ENV: &str = "PLM_LOG";

/// Log filter for the given flags: `error` when quiet, `debug` when verbose,
/// `warn` otherwise
pub fn default_level(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("plm={}", default_level(global))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn opts(quiet: bool, verbose: bool) -> GlobalOpts {
        GlobalOpts {
            format: OutputFormat::Auto,
            quiet,
            verbose,
            project: None,
        }
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(&opts(false, false)), "warn");
        assert_eq!(default_level(&opts(false, true)), "debug");
        assert_eq!(default_level(&opts(true, true)), "error");
    }
}
