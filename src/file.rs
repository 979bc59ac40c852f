//! Filesystem collaborators: extension discovery and the application file.
//!
//! # Extension roots
//!
//! [`DirResolver`] looks for `{root}/{id}.toml` under each [`SearchPath`] in
//! order and uses the first file it finds, so list project-local roots before
//! user-wide ones. Missing files are skipped; other I/O errors are returned.
//!
//! # Dependency discovery
//!
//! [`CargoManifest`] reads the host project's `Cargo.toml` and lists the keys
//! of `[dependencies]` then `[dev-dependencies]` in declaration order.
//!
//! # Application file
//!
//! [`load_app_config`] reads the application's own TOML file. A top-level
//! `extensions` array is the explicit extension list; everything else is the
//! override tree merged on top of the extensions.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::PlugfigError;
use crate::extension::{DependencyLister, Extension, ExtensionResolver};
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// data directory (e.g. `~/.local/share/{app_name}/extensions` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str, base_dir: &Path) -> Option<PathBuf> {
    match sp {
        SearchPath::Base(rel) => Some(base_dir.join(rel)),
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.data_dir().join("extensions"))
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<String>, PlugfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlugfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads extensions from `{root}/{id}.toml` files.
#[derive(Debug, Clone)]
pub struct DirResolver {
    app_name: String,
    roots: Vec<SearchPath>,
}

impl DirResolver {
    /// Default roots: `{base}/extensions`, then the platform data directory.
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            roots: vec![SearchPath::Base("extensions"), SearchPath::Platform],
        }
    }

    /// Replace the search roots. Earlier roots win.
    pub fn roots(mut self, roots: Vec<SearchPath>) -> Self {
        self.roots = roots;
        self
    }

    fn candidate_dirs(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.roots
            .iter()
            .filter_map(|sp| resolve_search_path(sp, &self.app_name, base_dir))
            .collect()
    }
}

impl ExtensionResolver for DirResolver {
    fn resolve(&self, id: &str, base_dir: &Path) -> Result<Extension, PlugfigError> {
        let dirs = self.candidate_dirs(base_dir);
        for dir in &dirs {
            let file_path = dir.join(format!("{id}.toml"));
            if let Some(content) = read_optional(&file_path)? {
                tracing::debug!(extension = %id, path = %file_path.display(), "resolved extension");
                return Extension::from_toml_str(&content, &file_path);
            }
        }
        Err(PlugfigError::ExtensionNotFound {
            id: id.to_string(),
            searched: dirs,
        })
    }
}

/// Lists dependencies declared in `{base_dir}/Cargo.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CargoManifest;

impl DependencyLister for CargoManifest {
    fn dependencies(&self, base_dir: &Path) -> Result<Vec<String>, PlugfigError> {
        let path = base_dir.join("Cargo.toml");
        let content = std::fs::read_to_string(&path).map_err(|e| PlugfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let manifest: Table =
            toml::from_str(&content).map_err(|e| PlugfigError::ParseError { path, source: e })?;

        let mut deps: Vec<String> = Vec::new();
        for section in ["dependencies", "dev-dependencies"] {
            if let Some(Value::Table(table)) = manifest.get(section) {
                for name in table.keys() {
                    if !deps.contains(name) {
                        deps.push(name.clone());
                    }
                }
            }
        }
        Ok(deps)
    }
}

/// The application's own configuration file, split into its two roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Explicit extension list, if the file has one.
    pub extensions: Option<Vec<String>>,
    /// Everything else: overrides merged on top of the extensions.
    pub overrides: Table,
}

impl AppConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, PlugfigError> {
        let mut overrides: Table = toml::from_str(content).map_err(|e| PlugfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let extensions = match overrides.remove("extensions") {
            None => None,
            Some(value) => {
                let list: Vec<String> =
                    value.try_into().map_err(|e| PlugfigError::ParseError {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                Some(list)
            }
        };
        Ok(Self {
            extensions,
            overrides,
        })
    }
}

/// Load the application file.
///
/// With `explicit = false` a missing file yields an empty [`AppConfig`]; with
/// `explicit = true` (the user passed `--config`) it is an error.
pub fn load_app_config(path: &Path, explicit: bool) -> Result<AppConfig, PlugfigError> {
    if explicit {
        let content = std::fs::read_to_string(path).map_err(|e| PlugfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        return AppConfig::from_toml_str(&content, path);
    }
    match read_optional(path)? {
        Some(content) => AppConfig::from_toml_str(&content, path),
        None => Ok(AppConfig::default()),
    }
}
