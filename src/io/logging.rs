use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::io::config_io;
use crate::model::config::LogConfig;

/// Environment variable holding a filter directive, e.g. `bridge=debug`
pub const LOG_ENV: &str = "BRIDGE_LOG";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// CLI commands
    Stderr,
    /// The TUI owns the terminal, so it logs to a file
    File(PathBuf),
}

impl LogTarget {
    /// File target from config, defaulting to the state directory
    pub fn tui_file(config: &LogConfig) -> Self {
        LogTarget::File(
            config
                .file
                .clone()
                .unwrap_or_else(|| config_io::state_dir().join("bridge.log")),
        )
    }
}

/// `BRIDGE_LOG` when set and non-empty, else the configured level
fn filter_directive(env: Option<String>, config: &LogConfig) -> String {
    env.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(config: &LogConfig, target: LogTarget) -> std::io::Result<()> {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), config);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_config_level() {
        let config = LogConfig {
            level: "info".into(),
            file: None,
        };
        assert_eq!(filter_directive(Some("bridge=trace".into()), &config), "bridge=trace");
        assert_eq!(filter_directive(Some("  ".into()), &config), "info");
        assert_eq!(filter_directive(None, &config), "info");
    }

    #[test]
    fn tui_file_prefers_configured_path() {
        let config = LogConfig {
            level: "warn".into(),
            file: Some("/tmp/b.log".into()),
        };
        assert_eq!(LogTarget::tui_file(&config), LogTarget::File("/tmp/b.log".into()));
        let default = LogTarget::tui_file(&LogConfig::default());
        match default {
            LogTarget::File(p) => assert!(p.ends_with("bridge/bridge.log")),
            other => panic!("unexpected target {:?}", other),
        }
    }
}
