//! Extension-composed configuration and CLI flag binding for pluggable
//! command-line platforms.
//!
//! A plugfig host is a command-line tool whose settings are contributed by
//! independently installed extensions. Each extension ships sample defaults
//! and metadata describing them; plugfig folds those into one configuration,
//! derives the command-line flags from the metadata, and binds user input
//! back onto the configuration with coercion and validation.
//!
//! ```ignore
//! let composition = Plugfig::builder()
//!     .app_name("acme")
//!     .load()?;
//!
//! let mut diagnostics = Diagnostics::new();
//! let config = composition.apply([("--port", "9000")], &mut diagnostics)?;
//! ```
//!
//! That call reads `acme.toml` in the working directory, discovers
//! `acme-ext-*` dependencies in `Cargo.toml`, loads each extension from
//! `extensions/{id}.toml` (or the platform data directory), and merges them
//! in declaration order with the application file on top.
//!
//! # Layer precedence
//!
//! ```text
//! First extension       [config] of the first listed extension
//!        ↑ overridden by
//! Later extensions      each one in list order
//!        ↑ overridden by
//! Application file      {app_name}.toml, or --config
//!        ↑ overridden by
//! Bound flags           Composition::apply
//! ```
//!
//! Every layer is sparse and merged with [`deep_merge`]: tables merge key by
//! key, everything else (arrays included) is replaced whole. The order of the
//! extension list is the only source of precedence, so the same list always
//! produces the same configuration, documentation and flags.
//!
//! # Extension files
//!
//! ```toml
//! [config]
//! port = 3000
//! [config.docker]
//! image = "alpine"
//!
//! [meta.port]
//! description = "Port the container exposes"
//! cli = "port"
//! validate = { min = 1, max = 65535 }
//!
//! [meta.docker.image]
//! description = "Base image"
//! cli = "image"
//!
//! [commands.deploy]
//! description = "Deploy the container"
//! settings = ["docker", "port"]
//! [[commands.deploy.options]]
//! name = "target"
//! required = true
//! validate = { one_of = ["staging", "production"] }
//! ```
//!
//! Values under `[config]` are samples as much as defaults: their runtime
//! shape decides how flag input is coerced (see [`Shape`]). A leaf without
//! `[meta]` still appears in the configuration but never becomes a flag.
//!
//! # Selecting extensions
//!
//! An explicit list wins: [`extensions()`](PlugfigBuilder::extensions) on the
//! builder, or `extensions = [...]` at the top of the application file. With
//! neither, the [`DependencyLister`] (by default [`CargoManifest`]) reports
//! declared dependencies and those named `{app_name}-ext-*` are loaded in
//! declaration order.
//!
//! # Failure model
//!
//! Composition is fail-soft. An extension that cannot be resolved, an
//! application key no extension declares, an unknown flag, or a flag value
//! that fails validation is recorded as a [`Diagnostic`] and the run
//! continues. Hard failures are reserved for an unreadable application file,
//! malformed structured flag input, and command options that are missing or
//! invalid. See [`PlugfigError`].
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`GlobalArgs`] for `--debug`, `--config`, `--directory` and `-v`, the
//! [`ConfigArgs`] `config list|get` subcommands, and [`init_logging`] for a
//! stderr `tracing` subscriber. To use plugfig without clap:
//!
//! ```toml
//! plugfig = { version = "...", default-features = false }
//! ```

pub mod aggregate;
pub mod bind;
pub mod coerce;
pub mod diagnostics;
pub mod error;
pub mod extension;
pub mod file;
pub mod flags;
pub mod merge;
pub mod meta;
pub mod ops;
pub mod options;
pub mod schema;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod overrides;
mod validate;

#[cfg(test)]
mod fixtures;

pub use aggregate::Aggregate;
pub use builder::{Composition, Plugfig, PlugfigBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand, GlobalArgs, init_logging};
pub use coerce::Shape;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::PlugfigError;
pub use extension::{DependencyLister, Extension, ExtensionResolver, StaticResolver};
pub use file::{CargoManifest, DirResolver};
pub use flags::{FlagBinding, FlagMap};
pub use merge::deep_merge;
pub use meta::{FieldMeta, MetaNode, MetaTree, Validator};
pub use ops::ConfigResult;
pub use options::ParsedCommand;
pub use overrides::set_path;
pub use schema::{DocNode, DocTree, PathFilter};
pub use types::{CommandSpec, Commands, ConfigAction, OptionSpec, SearchPath};
