//! Logging setup.
//!
//! Output goes to one [`LogTarget`] through a `tracing` fmt subscriber.
//! `RUST_LOG` takes precedence over the default directives.

use anyhow::{Result, anyhow};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Appended to, ANSI colours disabled.
    File(PathBuf),
}

impl From<&str> for LogTarget {
    /// Accepts `0`/`off`, `1`/`stdout`, `2`/`stderr`; anything else is a filename.
    fn from(value: &str) -> Self {
        match value {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Default directives when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "taskapi=debug,tower_http=debug"
    } else {
        "taskapi=info,tower_http=info"
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(target: &LogTarget, verbose: bool) -> Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
    };

    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stdout => install(std::io::stdout, filter(), true),
        LogTarget::Stderr => install(std::io::stderr, filter(), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(Mutex::new(file), filter(), false)
        }
    }
}

fn install<W>(writer: W, filter: EnvFilter, ansi: bool) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_target_parsing() {
        assert_eq!(LogTarget::from("0"), LogTarget::Off);
        assert_eq!(LogTarget::from("off"), LogTarget::Off);
        assert_eq!(LogTarget::from("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::from("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::from("2"), LogTarget::Stderr);
        assert_eq!(LogTarget::from("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::from("server.log"),
            LogTarget::File(PathBuf::from("server.log"))
        );
    }

    #[test]
    fn test_verbose_raises_default_level() {
        assert!(default_directives(true).contains("taskapi=debug"));
        assert!(default_directives(false).contains("taskapi=info"));
    }

    #[test]
    fn test_off_installs_nothing() {
        assert!(init_logging(&LogTarget::Off, false).is_ok());
    }
}
