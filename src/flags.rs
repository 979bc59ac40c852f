//! Flattening of the documentation tree into a flag-name lookup.

use indexmap::IndexMap;
use toml::Value;

use crate::coerce::{self, Shape};
use crate::diagnostics::Diagnostics;
use crate::error::PlugfigError;
use crate::meta::Validator;
use crate::schema::{DocNode, DocTree};

/// How one flag maps onto the configuration.
#[derive(Debug, Clone)]
pub struct FlagBinding {
    pub path: String,
    pub shape: Shape,
    pub default: Value,
    pub validator: Validator,
}

impl FlagBinding {
    pub fn coerce(
        &self,
        flag: &str,
        raw: &Value,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, PlugfigError> {
        coerce::coerce(self.shape, flag, raw, &self.default, diagnostics)
    }

    pub fn validate(&self, value: &Value) -> bool {
        self.validator.check(value)
    }
}

/// Flag name (without dashes) to binding, in first-declaration order.
#[derive(Debug, Clone, Default)]
pub struct FlagMap {
    bindings: IndexMap<String, FlagBinding>,
}

impl FlagMap {
    pub fn get(&self, flag: &str) -> Option<&FlagBinding> {
        self.bindings.get(flag)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagBinding)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Derive the flag map from a documentation tree.
///
/// Only leaves with a CLI name contribute. When two leaves claim the same
/// name, the one visited later wins, matching extension precedence.
pub fn flatten(tree: &DocTree) -> FlagMap {
    let mut map = FlagMap::default();
    collect(&tree.nodes, &mut map);
    map
}

fn collect(nodes: &[DocNode], map: &mut FlagMap) {
    for node in nodes {
        if node.is_group() {
            collect(&node.children, map);
            continue;
        }
        let (Some(name), Some(default), Some(shape)) = (&node.cli_name, &node.default, node.shape)
        else {
            continue;
        };
        let binding = FlagBinding {
            path: node.path.clone(),
            shape,
            default: default.clone(),
            validator: node.validator.clone().unwrap_or_else(Validator::any),
        };
        if let Some(previous) = map.bindings.insert(name.clone(), binding) {
            tracing::debug!(
                flag = %name,
                shadowed = %previous.path,
                by = %node.path,
                "flag name declared twice, later declaration wins"
            );
        }
    }
}
