pub mod schema;

pub use schema::{
    ConnectionConfig, HistoryConfig, IngestConfig, PresenterConfig, ViewerConfig,
};

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tview_core::{Result, ViewerError};

/// Read and validate the config at `path`. A missing file is not an error:
/// the viewer falls back to [`ViewerConfig::default`].
pub fn load(path: impl AsRef<Path>) -> Result<ViewerConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => parse(&raw),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "No config file; using defaults");
            Ok(ViewerConfig::default())
        }
        Err(e) => Err(ViewerError::Config(format!("cannot read '{}': {e}", path.display()))),
    }
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<ViewerConfig> {
    let config: ViewerConfig =
        toml::from_str(raw).map_err(|e| ViewerError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// `$XDG_CONFIG_HOME/tview/tview.toml`, or `~/.config/tview/tview.toml`.
pub fn default_path() -> PathBuf {
    config_home(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
        .join("tview")
        .join("tview.toml")
}

/// An empty `XDG_CONFIG_HOME` counts as unset.
fn config_home(xdg: Option<OsString>, home: Option<OsString>) -> PathBuf {
    match xdg.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.unwrap_or_else(|| ".".into())).join(".config"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load("/nonexistent/tview/tview.toml").unwrap();
        assert_eq!(config.history.capacity, 1000);
        assert_eq!(config.ingest.batch_size, 100);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = parse(
            r#"
            [connection]
            uri = "ws://sensor.local:9000/ws"

            [presenter]
            clear_on_reconnect = true
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.uri, "ws://sensor.local:9000/ws");
        assert!(config.presenter.clear_on_reconnect);
        assert_eq!(config.presenter.recent_count, 100);
        assert_eq!(config.history.capacity, 1000);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = parse("[history]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn config_home_prefers_xdg() {
        let dir = config_home(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/xdg"));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let dir = config_home(Some("".into()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/home/me/.config"));
        assert_eq!(config_home(None, None), PathBuf::from("./.config"));
    }

    #[test]
    fn unreadable_path_is_a_config_error() {
        // A directory exists but cannot be read as a file.
        let err = load(std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = parse("[ingest\nbatch_size = ").unwrap_err();
        assert!(err.to_string().starts_with("config error: TOML parse error"));
    }
}
