use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::{engine::ArgValueCompleter, PathCompleter};
use std::path::PathBuf;

/// Keep a host's application launcher in sync with the guest
///
/// Sends the list of launchable applications, including their launch intents and icons,
/// to the host platform service whenever packages are installed, changed, or removed.
///
/// Delivery is best effort: if the host cannot be reached, the update is skipped
/// and the next one brings it up to date.
#[derive(Parser)]
#[clap(disable_help_subcommand = true)]
#[clap(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
    /// Log more, may be repeated
    ///
    /// `RUST_LOG` takes precedence when set.
    #[clap(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(flatten)]
    pub paths: PathArgs,
}

#[deny(missing_docs)]
#[derive(Subcommand)]
pub enum Cmd {
    /// Send the full application list, as done on startup
    Sync,

    /// Handle a package having been installed
    Added {
        /// Package identifier
        package: String,
    },

    /// Handle a package having been changed, e.g. a component was enabled
    Changed {
        /// Package identifier
        package: String,
    },

    /// Handle a package having been removed
    ///
    /// Removals that are part of an upgrade are ignored,
    /// the matching `added` event takes care of them.
    Removed {
        /// Package identifier
        package: String,
        /// The package is being replaced by a newer version
        #[clap(long)]
        replacing: bool,
    },

    /// Sync on startup, then handle events read line by line from stdin
    ///
    /// Each line holds one event:
    ///
    ///   added <package>
    ///   changed <package>
    ///   removed <package> [replacing]
    ///   start
    ///
    /// Events are handled one at a time, in the order they are read.
    #[clap(verbatim_doc_comment)]
    Watch,

    /// List the applications that would be sent to the host
    ///
    /// When using `--json`, output will be in the form:
    ///
    /// [
    ///   {
    ///     "name": "Settings",
    ///     "package": "com.android.settings",
    ///     "component": "com.android.settings/com.android.settings.Settings",
    ///     "data": null,
    ///     "type": null,
    ///     "categories": ["android.intent.category.LAUNCHER"],
    ///     "icon_bytes": 2143
    ///   },
    ///   ...
    /// ]
    #[clap(verbatim_doc_comment)]
    List {
        /// Output application info as json
        #[clap(long)]
        json: bool,
    },

    /// Write the full application list message to a file instead of sending it
    Dump {
        /// File to write the encoded message to
        #[clap(add = ArgValueCompleter::new(PathCompleter::file()))]
        output: PathBuf,
    },

    /// Decode an application list message and show its contents
    Decode {
        /// File holding the encoded message
        #[clap(add = ArgValueCompleter::new(PathCompleter::file()))]
        input: PathBuf,
        /// Output message contents as json
        #[clap(long)]
        json: bool,
    },

    /// Act as the host platform service and show every update received
    Host {
        /// Output updates as json, one per line
        #[clap(long)]
        json: bool,
    },
}

#[derive(Clone, Default, Args)]
pub struct PathArgs {
    /// Directory holding service sockets, overrides `socket_dir`
    #[clap(long, global = true, add = ArgValueCompleter::new(PathCompleter::dir()))]
    pub socket_dir: Option<PathBuf>,
    /// Directory holding the package registry, overrides `registry_dir`
    #[clap(long, global = true, add = ArgValueCompleter::new(PathCompleter::dir()))]
    pub registry_dir: Option<PathBuf>,
}
