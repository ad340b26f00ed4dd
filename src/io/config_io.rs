use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::BridgeConfig;

/// Error type for config file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config: {0}")]
    EditError(#[from] toml_edit::TomlError),
}

/// Locate the config file: `$BRIDGE_CONFIG`, else
/// `$XDG_CONFIG_HOME/bridge/config.toml`, else `~/.config/bridge/config.toml`
pub fn config_path() -> PathBuf {
    resolve_config_path(
        std::env::var_os("BRIDGE_CONFIG").map(PathBuf::from),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
    )
}

fn resolve_config_path(explicit: Option<PathBuf>, xdg_config: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }
    let config_dir = xdg_config
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| home_dir().join(".config"));
    config_dir.join("bridge").join("config.toml")
}

/// Directory for the TUI log file, respecting XDG_STATE_HOME
pub fn state_dir() -> PathBuf {
    std::env::var_os("XDG_STATE_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("state"))
        .join("bridge")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing. A missing file yields
/// defaults and an empty document.
pub fn read_config(path: &Path) -> Result<(BridgeConfig, toml_edit::DocumentMut), ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let config: BridgeConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Parsed config only
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    read_config(path).map(|(config, _)| config)
}

/// Write the document back atomically, creating the parent directory
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(doc.to_string().as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Set `[api] base_url`, keeping the rest of the document intact
pub fn set_base_url(doc: &mut toml_edit::DocumentMut, url: &str) {
    if !doc.contains_key("api") {
        doc["api"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["api"]["base_url"] = toml_edit::value(url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r##"# Bridge settings
[api]
base_url = "http://planner.internal/api"  # staging
timeout_secs = 5

[ui.colors]
highlight = "#FB4196"

[log]
level = "debug"
"##
    }

    #[test]
    fn test_round_trip_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, sample_config()).unwrap();

        let (config, doc) = read_config(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.ui.colors["highlight"], "#FB4196");
        write_config(&path, &doc).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), sample_config());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_set_base_url_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_base_url(&mut doc, "https://bridge.example.com/api");
        let result = doc.to_string();
        assert!(result.contains("# Bridge settings"));
        assert!(result.contains("base_url = \"https://bridge.example.com/api\""));
        let config: BridgeConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn test_set_base_url_on_empty_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let (_, mut doc) = read_config(&path).unwrap();
        set_base_url(&mut doc, "http://10.0.0.2:8000/api");
        write_config(&path, &doc).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:8000/api");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_secs = \"soon\"\n").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_path_resolution_order() {
        assert_eq!(
            resolve_config_path(Some("/etc/b.toml".into()), Some("/x".into())),
            PathBuf::from("/etc/b.toml")
        );
        assert_eq!(
            resolve_config_path(None, Some("/x".into())),
            PathBuf::from("/x/bridge/config.toml")
        );
        assert!(
            resolve_config_path(Some("".into()), None).ends_with(".config/bridge/config.toml")
        );
    }
}
