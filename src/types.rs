use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::meta::Validator;

/// Where to look for extension files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// A directory relative to the invocation's base directory, e.g. `Base("extensions")`.
    Base(&'static str),
    /// Platform data directory (XDG on Linux, ~/Library/Application Support on macOS),
    /// `extensions` subdirectory.
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp/extensions")`.
    Home(&'static str),
    /// An explicit absolute path.
    Path(PathBuf),
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    List,
    Get { key: String },
}

/// One positional option of a command.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "validate")]
    pub validation: Option<Validator>,
}

impl OptionSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validation(mut self, validator: Validator) -> Self {
        self.validation = Some(validator);
        self
    }
}

/// A command contributed by an extension.
///
/// `settings` scopes which configuration paths the command shows in its help;
/// `None` means all of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub settings: Option<Vec<String>>,
}

impl CommandSpec {
    pub fn new(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn settings(mut self, paths: &[&str]) -> Self {
        self.settings = Some(paths.iter().map(|p| p.to_string()).collect());
        self
    }
}

/// Commands by name, in declaration order.
pub type Commands = IndexMap<String, CommandSpec>;
