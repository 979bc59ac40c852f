//! Folding extensions into one configuration.
//!
//! Steps, strictly in list order:
//!
//! 1. Resolve each extension; failures are skipped with a diagnostic
//! 2. Deep-merge its config, metadata, and commands on top of the running result
//! 3. Deep-merge the application's overrides on top (application wins)
//! 4. Report override paths no extension declares
//!
//! The order of the list is the precedence contract: later extensions override
//! earlier ones key by key.

use std::path::Path;

use toml::Table;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::extension::ExtensionResolver;
use crate::merge::{deep_merge, merge_meta};
use crate::meta::MetaTree;
use crate::types::Commands;
use crate::validate::structural_mismatches;

/// The composed result of a set of extensions plus application overrides.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Configuration contributed by extensions alone.
    pub extension_config: Table,
    /// `extension_config` with the application's overrides applied.
    pub config: Table,
    pub meta: MetaTree,
    pub commands: Commands,
    /// Identifiers that resolved, in merge order.
    pub loaded: Vec<String>,
}

pub fn aggregate(
    ids: &[String],
    base_dir: &Path,
    resolver: &dyn ExtensionResolver,
    app_overrides: Table,
    diagnostics: &mut Diagnostics,
) -> Aggregate {
    let mut extension_config = Table::new();
    let mut meta = MetaTree::new();
    let mut commands = Commands::new();
    let mut loaded = Vec::new();

    for id in ids {
        let extension = match resolver.resolve(id, base_dir) {
            Ok(extension) => extension,
            Err(e) => {
                diagnostics.push(Diagnostic::ExtensionSkipped {
                    id: id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        tracing::debug!(extension = %id, "merging extension");
        extension_config = deep_merge(extension_config, extension.config);
        meta = merge_meta(meta, extension.meta);
        commands.extend(extension.commands);
        loaded.push(id.clone());
    }

    let mismatches = structural_mismatches(&extension_config, &app_overrides);
    if !mismatches.is_empty() {
        diagnostics.push(Diagnostic::StructuralMismatch { paths: mismatches });
    }

    let config = deep_merge(extension_config.clone(), app_overrides);

    Aggregate {
        extension_config,
        config,
        meta,
        commands,
        loaded,
    }
}
