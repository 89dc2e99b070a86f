use std::{
    fs,
    io::{BufRead, IsTerminal, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    apps::{build_entries, ManifestRegistry},
    cli::PathArgs,
    common::{entry_table, message_table, SyncMessage},
    config::config_file::ConfigFile,
    error::{Error, Result},
    service::{
        bind, EventSource, PackageEvent, PlatformHost, PlatformService,
        SocketServiceManager,
    },
};

/// Name used for the config file and the default directories
const APP_NAME: &str = "applist-sync";

/// A single struct that holds the config and output state.
/// Used to streamline explicitly passing state.
#[derive(Default, Debug)]
pub struct Config {
    /// applist-sync's config file
    config: ConfigFile,
    /// Whether or not stdout is a terminal
    pub terminal_output: bool,
}

impl Config {
    /// Create a new instance of Config
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: ConfigFile::load()?,
            terminal_output: std::io::stdout().is_terminal(),
        })
    }

    /// Override the configured directories with the ones given on the command line
    pub fn override_paths(&mut self, path_args: PathArgs) {
        self.config.override_paths(path_args);
    }

    /// Directory the platform service socket lives in
    fn socket_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.config.socket_dir {
            return Ok(dir.clone());
        }

        let dirs = xdg::BaseDirectories::with_prefix(APP_NAME)?;
        Ok(match dirs.get_runtime_directory() {
            Ok(runtime) => runtime.join(APP_NAME),
            Err(e) => {
                debug!("No runtime directory, using the cache directory: {e}");
                dirs.get_cache_home()
            }
        })
    }

    /// Directory holding the package registry manifest
    fn registry_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.config.registry_dir {
            return Ok(dir.clone());
        }

        Ok(xdg::BaseDirectories::with_prefix(APP_NAME)?
            .get_data_home()
            .join("registry"))
    }

    /// Open the package registry, or `None` if there is none
    fn registry(&self) -> Option<ManifestRegistry> {
        self.registry_dir()
            .and_then(|dir| ManifestRegistry::open(&dir))
            .map_err(|e| debug!("Package registry unavailable: {e}"))
            .ok()
    }

    /// Open the package registry, failing if there is none
    fn require_registry(&self) -> Result<ManifestRegistry> {
        ManifestRegistry::open(&self.registry_dir()?)
    }

    fn service_manager(&self) -> Result<SocketServiceManager> {
        Ok(SocketServiceManager::new(&self.socket_dir()?))
    }

    /// Client of the host platform service, set up as configured
    fn platform_service(
        &self,
    ) -> Result<PlatformService<ManifestRegistry, SocketServiceManager>> {
        Ok(
            PlatformService::new(self.registry(), self.service_manager()?)
                .with_service_name(self.config.service_name.clone())
                .with_icon_format(self.config.icon_format),
        )
    }

    fn event_source(
        &self,
    ) -> Result<EventSource<ManifestRegistry, SocketServiceManager>> {
        Ok(EventSource::new(self.platform_service()?))
    }

    /// Handle a single package event
    /// Failing to reach the host is not an error
    pub fn handle_event(&self, event: &PackageEvent) -> Result<()> {
        self.event_source()?.handle(event);
        Ok(())
    }

    /// Sync on startup, then handle events read from the given input until it ends
    pub fn watch<B: BufRead>(&self, input: B) -> Result<()> {
        self.event_source()?.run(input)
    }

    /// List the applications that would be sent to the host
    pub fn list<W: Write>(&self, writer: &mut W, output_json: bool) -> Result<()> {
        let entries =
            build_entries(&self.require_registry()?, self.config.icon_format)?;
        entry_table(writer, &entries, output_json, self.terminal_output)
    }

    /// Write the full application list message to a file
    pub fn dump(&self, path: &Path) -> Result<()> {
        let entries =
            build_entries(&self.require_registry()?, self.config.icon_format)?;
        let message = SyncMessage::full(entries);
        fs::write(path, message.encode()?.as_bytes())?;

        info!(
            path = %path.display(),
            applications = message.added.len(),
            "Wrote application list message"
        );
        Ok(())
    }

    /// Show the contents of an application list message stored in a file
    pub fn decode<W: Write>(
        &self,
        writer: &mut W,
        path: &Path,
        output_json: bool,
    ) -> Result<()> {
        let message = SyncMessage::decode(&fs::read(path)?)?;
        message_table(writer, &message, output_json, self.terminal_output)
    }

    /// Act as the host platform service, showing every update received
    #[mutants::skip] // Cannot test directly, serves forever
    pub fn host<W: Write>(&self, writer: &mut W, output_json: bool) -> Result<()> {
        let path = self
            .service_manager()?
            .service_path(&self.config.service_name);
        let listener = bind(&path)?;
        let terminal_output = self.terminal_output;

        PlatformHost::new(|message: SyncMessage| {
            message_table(&mut *writer, &message, output_json, terminal_output)?;
            writer.flush().map_err(Error::from)
        })
        .serve(&listener)
    }
}
