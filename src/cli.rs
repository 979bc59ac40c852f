//! Clap adapter for plugfig.
//!
//! This module is the optional integration layer between plugfig's
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`GlobalArgs`] carries the flags every invocation understands and feeds
//! them into a [`PlugfigBuilder`]. [`ConfigArgs`] gives an app
//! `config list|get` subcommands; [`ConfigArgs::into_action()`] converts them
//! into a [`ConfigAction`] handled by
//! [`Composition::handle()`](crate::Composition::handle).
//!
//! Extension flags are not clap arguments: their names come from metadata at
//! run time, so hosts collect them as raw key/value pairs and hand them to
//! [`Composition::bind()`](crate::Composition::bind).

use std::path::PathBuf;

use clap::{ArgAction, Args, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::builder::PlugfigBuilder;
use crate::types::ConfigAction;

/// Flags shared by every invocation.
///
/// Flatten into the top-level parser, which must set a version and disable
/// clap's own version flag so `-v` is free:
/// ```ignore
/// #[derive(Parser)]
/// #[command(version, disable_version_flag = true)]
/// struct Cli {
///     #[command(flatten)]
///     global: GlobalArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Print debug logging to stderr.
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Use this configuration file instead of the default.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Run against this directory instead of the current one.
    #[arg(short = 'D', long, value_name = "PATH", global = true)]
    pub directory: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: (),
}

impl GlobalArgs {
    /// Apply `--config` and `--directory` to a builder.
    pub fn configure(&self, mut builder: PlugfigBuilder) -> PlugfigBuilder {
        if let Some(dir) = &self.directory {
            builder = builder.directory(dir.clone());
        }
        if let Some(path) = &self.config {
            builder = builder.config_file(path.clone());
        }
        builder
    }
}

/// Clap-derived args for the `config` subcommand group.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every composed configuration value.
    List,
    /// Show the composed value and description for a key.
    Get {
        /// Dotted key path (e.g. "docker.image").
        key: String,
    },
}

impl ConfigArgs {
    /// Bare `config` and explicit `config list` both map to
    /// `ConfigAction::List`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None | Some(ConfigSubcommand::List) => ConfigAction::List,
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
        }
    }
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` always takes precedence; otherwise `--debug` selects DEBUG and
/// the default is WARN. Safe to call more than once.
pub fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
