use crate::{
    cli::PathArgs,
    common::IconFormat,
    error::Result,
    service::SERVICE_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The config file
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Name the host platform service is registered under
    pub service_name: String,
    /// Directory holding service sockets
    /// Defaults to `$XDG_RUNTIME_DIR/applist-sync`
    pub socket_dir: Option<PathBuf>,
    /// Directory holding the package registry manifest
    /// Defaults to `$XDG_DATA_HOME/applist-sync/registry`
    pub registry_dir: Option<PathBuf>,
    /// Format icons are compressed to
    pub icon_format: IconFormat,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            service_name: SERVICE_NAME.into(),
            socket_dir: None,
            registry_dir: None,
            icon_format: IconFormat::Png,
        }
    }
}

impl ConfigFile {
    /// Load ~/.config/applist-sync/applist-sync.toml
    #[mutants::skip] // Cannot test directly, depends on system state
    pub fn load() -> Result<Self> {
        Ok(confy::load("applist-sync")?)
    }

    /// Override the configured directories
    /// Currently assumes the config file will never be saved to
    pub fn override_paths(&mut self, path_args: PathArgs) {
        if let Some(dir) = path_args.socket_dir {
            self.socket_dir = Some(dir);
        }

        if let Some(dir) = path_args.registry_dir {
            self.registry_dir = Some(dir);
        }
    }
}
