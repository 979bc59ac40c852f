//! Structural-mismatch detection between the application's overrides and the
//! schema contributed by extensions.
//!
//! A mismatch is advisory: the application's value is still merged, but no
//! extension declares that setting, so nothing will read it. The usual cause
//! is a typo or a setting left behind after an extension was removed.

use toml::Table;

use crate::overrides::{leaf_paths, table_get};

/// List leaf paths of `overrides` that `schema` does not contain.
///
/// A path counts as present when the schema holds any value at it, whatever
/// its shape. Paths are returned in the override's key order.
pub fn structural_mismatches(schema: &Table, overrides: &Table) -> Vec<String> {
    leaf_paths(overrides)
        .into_iter()
        .filter(|path| table_get(schema, path).is_none())
        .collect()
}
