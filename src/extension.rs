//! Extensions and the collaborators that find them.
//!
//! An [`Extension`] contributes default configuration, the metadata that
//! documents it, and optionally commands. Hosts plug in an
//! [`ExtensionResolver`] to turn identifiers into extensions and a
//! [`DependencyLister`] to discover identifiers when the application does not
//! list them explicitly.

use std::path::Path;

use indexmap::IndexMap;
use toml::{Table, Value};

use crate::error::PlugfigError;
use crate::meta::MetaTree;
use crate::overrides::dotted;
use crate::types::{CommandSpec, Commands};

#[derive(Debug, Clone, Default)]
pub struct Extension {
    pub config: Table,
    pub meta: MetaTree,
    pub commands: Commands,
}

impl Extension {
    pub fn new(config: Table, meta: MetaTree) -> Self {
        Self {
            config,
            meta,
            commands: Commands::new(),
        }
    }

    pub fn command(mut self, name: &str, spec: CommandSpec) -> Self {
        self.commands.insert(name.to_string(), spec);
        self
    }

    /// Parse an extension file with `[config]`, `[meta]` and `[commands.*]` tables.
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, PlugfigError> {
        let mut table: Table = toml::from_str(content).map_err(|e| PlugfigError::ParseError {
            path: origin.to_path_buf(),
            source: e,
        })?;

        let config = match table.remove("config") {
            Some(Value::Table(t)) => {
                reject_dotted_keys(&t, "config")?;
                t
            }
            Some(other) => return Err(section_error("config", &other)),
            None => Table::new(),
        };
        let meta = match table.remove("meta") {
            Some(Value::Table(t)) => MetaTree::from_table(&t)?,
            Some(other) => return Err(section_error("meta", &other)),
            None => MetaTree::new(),
        };
        let commands = match table.remove("commands") {
            Some(value) => {
                let commands: Commands =
                    value.try_into().map_err(|e| PlugfigError::ParseError {
                        path: origin.to_path_buf(),
                        source: e,
                    })?;
                commands
            }
            None => Commands::new(),
        };
        if let Some(key) = table.keys().next() {
            return Err(PlugfigError::InvalidMeta {
                path: key.clone(),
                reason: "unknown section, expected config, meta or commands".into(),
            });
        }

        Ok(Self {
            config,
            meta,
            commands,
        })
    }
}

fn section_error(section: &str, value: &Value) -> PlugfigError {
    PlugfigError::InvalidMeta {
        path: section.to_string(),
        reason: format!("expected a table, found {}", value.type_str()),
    }
}

/// Keys are addressed by dotted paths, so a key holding a `.` could never be
/// bound back to itself.
fn reject_dotted_keys(table: &Table, prefix: &str) -> Result<(), PlugfigError> {
    for (key, value) in table {
        let path = dotted(prefix, key);
        if key.contains('.') {
            return Err(PlugfigError::InvalidMeta {
                path,
                reason: "keys must not contain '.'".into(),
            });
        }
        if let Value::Table(inner) = value {
            reject_dotted_keys(inner, &path)?;
        }
    }
    Ok(())
}

/// Turns an extension identifier into an [`Extension`].
pub trait ExtensionResolver {
    fn resolve(&self, id: &str, base_dir: &Path) -> Result<Extension, PlugfigError>;
}

/// Lists the host project's declared runtime and development dependencies,
/// in declaration order.
pub trait DependencyLister {
    fn dependencies(&self, base_dir: &Path) -> Result<Vec<String>, PlugfigError>;
}

/// Resolver over extensions compiled into the host.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    extensions: IndexMap<String, Extension>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, extension: Extension) -> Self {
        self.extensions.insert(id.to_string(), extension);
        self
    }
}

impl ExtensionResolver for StaticResolver {
    fn resolve(&self, id: &str, _base_dir: &Path) -> Result<Extension, PlugfigError> {
        self.extensions
            .get(id)
            .cloned()
            .ok_or_else(|| PlugfigError::ExtensionNotFound {
                id: id.to_string(),
                searched: vec![],
            })
    }
}

/// Decide which extensions to load.
///
/// An explicit list is used verbatim, repeats included. Otherwise, declared
/// dependencies whose name starts with `prefix` are selected in declaration
/// order, each once.
pub fn select_extensions(explicit: Option<&[String]>, declared: &[String], prefix: &str) -> Vec<String> {
    if let Some(list) = explicit {
        return list.to_vec();
    }
    let mut selected: Vec<String> = Vec::new();
    for dep in declared {
        if dep.starts_with(prefix) && dep.len() > prefix.len() && !selected.contains(dep) {
            selected.push(dep.clone());
        }
    }
    selected
}
