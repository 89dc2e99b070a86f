mod apps;
mod cli;
mod common;
mod config;
mod error;
mod service;
#[cfg(test)]
mod testing;
mod utils;

use cli::{Cli, Cmd};
use config::Config;
use error::Result;
use service::PackageEvent;

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;

#[mutants::skip] // Cannot test directly at the moment
fn main() -> Result<()> {
    CompleteEnv::with_factory(|| Cli::command().name("applist-sync"))
        .completer("applist-sync")
        .complete();

    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let mut config = Config::new()?;
    config.override_paths(cli.paths);
    let mut stdout = std::io::stdout().lock();

    match cli.cmd {
        Cmd::Sync => config.handle_event(&PackageEvent::Started),
        Cmd::Added { package } => {
            config.handle_event(&PackageEvent::Added(package))
        }
        Cmd::Changed { package } => {
            config.handle_event(&PackageEvent::Changed(package))
        }
        Cmd::Removed { package, replacing } => {
            config.handle_event(&PackageEvent::Removed { package, replacing })
        }
        Cmd::Watch => config.watch(std::io::stdin().lock()),
        Cmd::List { json } => config.list(&mut stdout, json),
        Cmd::Dump { output } => config.dump(&output),
        Cmd::Decode { input, json } => config.decode(&mut stdout, &input, json),
        Cmd::Host { json } => config.host(&mut stdout, json),
    }
}
