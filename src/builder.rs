use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::aggregate::{self, Aggregate};
use crate::bind;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::PlugfigError;
use crate::extension::{DependencyLister, ExtensionResolver, select_extensions};
use crate::file::{self, CargoManifest, DirResolver};
use crate::flags::{self, FlagMap};
use crate::merge::deep_merge;
use crate::meta::MetaTree;
use crate::ops::{self, ConfigResult};
use crate::options::{self, ParsedCommand};
use crate::schema::{self, DocTree, PathFilter};
use crate::types::{Commands, ConfigAction, SearchPath};

/// Entry point for composing a plugfig configuration.
pub struct Plugfig;

impl Plugfig {
    pub fn builder() -> PlugfigBuilder {
        PlugfigBuilder::new()
    }
}

/// Builder for discovering extensions and composing their configuration.
///
/// Controls three axes:
///
/// - **Selection**: [`extensions()`](Self::extensions) or dependency discovery
///   filtered by [`extension_prefix()`](Self::extension_prefix).
/// - **Resolution**: [`extension_roots()`](Self::extension_roots) or a custom
///   [`resolver()`](Self::resolver).
/// - **Overrides**: the application file, `{directory}/{app_name}.toml` or
///   [`config_file()`](Self::config_file).
pub struct PlugfigBuilder {
    app_name: Option<String>,
    directory: Option<PathBuf>,
    config_file: Option<PathBuf>,
    extension_prefix: Option<String>,
    extensions: Option<Vec<String>>,
    extension_roots: Option<Vec<SearchPath>>,
    resolver: Option<Box<dyn ExtensionResolver>>,
    lister: Option<Box<dyn DependencyLister>>,
}

impl PlugfigBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            directory: None,
            config_file: None,
            extension_prefix: None,
            extensions: None,
            extension_roots: None,
            resolver: None,
            lister: None,
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - application file → `"{app_name}.toml"` in the working directory
    /// - extension prefix → `"{app_name}-ext-"`
    /// - extension roots → `[Base("extensions"), Platform]`
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Directory the invocation runs against (default: the current directory).
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Use this application file instead of `{app_name}.toml`. It must exist.
    /// Relative paths are taken from the directory.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the dependency name prefix that marks an extension.
    pub fn extension_prefix(mut self, prefix: &str) -> Self {
        self.extension_prefix = Some(prefix.to_string());
        self
    }

    /// Load exactly these extensions, in this order. Skips discovery and
    /// takes precedence over the application file's list.
    pub fn extensions<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        self.extensions = Some(ids.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Replace the roots searched by the default [`DirResolver`].
    pub fn extension_roots(mut self, roots: Vec<SearchPath>) -> Self {
        self.extension_roots = Some(roots);
        self
    }

    pub fn resolver(mut self, resolver: Box<dyn ExtensionResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn dependency_lister(mut self, lister: Box<dyn DependencyLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    /// Resolve the effective app name, or error if not set.
    fn effective_app_name(&self) -> Result<&str, PlugfigError> {
        self.app_name
            .as_deref()
            .ok_or(PlugfigError::AppNameRequired)
    }

    fn effective_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn effective_prefix(&self) -> Result<String, PlugfigError> {
        if let Some(prefix) = &self.extension_prefix {
            return Ok(prefix.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}-ext-"))
    }

    /// The application file and whether the user named it explicitly.
    fn effective_config_file(&self, base_dir: &Path) -> Result<(PathBuf, bool), PlugfigError> {
        if let Some(path) = &self.config_file {
            return Ok((base_dir.join(path), true));
        }
        let app = self.effective_app_name()?;
        Ok((base_dir.join(format!("{app}.toml")), false))
    }

    /// Load the application file, select and aggregate extensions.
    ///
    /// Extension problems are collected on the returned
    /// [`Composition::diagnostics`]; only an unreadable or malformed
    /// application file fails the load.
    pub fn load(self) -> Result<Composition, PlugfigError> {
        let app_name = self.effective_app_name()?.to_string();
        let prefix = self.effective_prefix()?;
        let base_dir = self.effective_directory();
        let (config_path, explicit_file) = self.effective_config_file(&base_dir)?;

        let app = file::load_app_config(&config_path, explicit_file)?;
        let mut diagnostics = Diagnostics::new();

        let explicit = self.extensions.or(app.extensions);
        let declared = match explicit {
            Some(_) => Vec::new(),
            None => {
                let lister = self.lister.unwrap_or_else(|| Box::new(CargoManifest));
                lister.dependencies(&base_dir).unwrap_or_else(|e| {
                    diagnostics.push(Diagnostic::DiscoveryFailed {
                        reason: e.to_string(),
                    });
                    Vec::new()
                })
            }
        };
        let ids = select_extensions(explicit.as_deref(), &declared, &prefix);
        tracing::debug!(extensions = ?ids, "selected extensions");

        let resolver = self.resolver.unwrap_or_else(|| {
            let mut dir = DirResolver::new(&app_name);
            if let Some(roots) = self.extension_roots {
                dir = dir.roots(roots);
            }
            Box::new(dir)
        });

        let aggregate = aggregate::aggregate(
            &ids,
            &base_dir,
            resolver.as_ref(),
            app.overrides,
            &mut diagnostics,
        );
        Ok(Composition::new(aggregate, diagnostics))
    }

    /// Load, then handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), PlugfigError> {
        let result = self.load()?.handle(action)?;
        println!("{result}");
        Ok(())
    }
}

/// The composed configuration of one invocation.
///
/// Immutable once loaded: binding produces fresh tables rather than
/// changing `config`.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Configuration contributed by extensions alone.
    pub extension_config: Table,
    /// Extensions plus the application's overrides.
    pub config: Table,
    pub meta: MetaTree,
    pub commands: Commands,
    /// Extensions that resolved, in precedence order.
    pub loaded: Vec<String>,
    /// Everything that went wrong without failing the load.
    pub diagnostics: Diagnostics,
}

impl Composition {
    fn new(aggregate: Aggregate, diagnostics: Diagnostics) -> Self {
        Self {
            extension_config: aggregate.extension_config,
            config: aggregate.config,
            meta: aggregate.meta,
            commands: aggregate.commands,
            loaded: aggregate.loaded,
            diagnostics,
        }
    }

    pub fn docs(&self, filter: &PathFilter) -> DocTree {
        schema::build(&self.config, &self.meta, filter)
    }

    /// The settings a command exposes. Commands without a `settings` list
    /// see everything.
    pub fn command_filter(&self, command: &str) -> PathFilter {
        match self.commands.get(command).and_then(|c| c.settings.as_ref()) {
            Some(paths) => PathFilter::only(paths),
            None => PathFilter::All,
        }
    }

    pub fn flags(&self) -> FlagMap {
        flags::flatten(&self.docs(&PathFilter::All))
    }

    /// Flags visible to one command.
    pub fn command_flags(&self, command: &str) -> FlagMap {
        flags::flatten(&self.docs(&self.command_filter(command)))
    }

    /// Bind raw flag values into a sparse patch.
    pub fn bind<I, K, V>(&self, raw: I, diagnostics: &mut Diagnostics) -> Result<Table, PlugfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        bind::bind(raw, &self.flags(), diagnostics)
    }

    /// Bind raw flag values and merge them onto a copy of the composed
    /// configuration.
    pub fn apply<I, K, V>(&self, raw: I, diagnostics: &mut Diagnostics) -> Result<Table, PlugfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let patch = self.bind(raw, diagnostics)?;
        Ok(deep_merge(self.config.clone(), patch))
    }

    pub fn parse_command<S: AsRef<str>>(
        &self,
        command: &str,
        positionals: &[S],
    ) -> Result<ParsedCommand, PlugfigError> {
        options::parse(command, &self.commands, positionals)
    }

    /// Handle a `ConfigAction` (list / get).
    pub fn handle(&self, action: &ConfigAction) -> Result<ConfigResult, PlugfigError> {
        match action {
            ConfigAction::List => Ok(ops::list_values(&self.config)),
            ConfigAction::Get { key } => ops::get_value(&self.config, &self.meta, key),
        }
    }
}
