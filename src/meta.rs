//! Metadata trees: the shadow structure describing configurable leaves.
//!
//! A [`MetaTree`] mirrors the nesting of a configuration table. Each key maps
//! to either a [`FieldMeta`] (a documented, bindable leaf) or a nested
//! section. Extensions ship metadata as TOML:
//!
//! ```toml
//! [meta.port]
//! description = "Port the dev server listens on"
//! cli = "port"
//! validate = { min = 1, max = 65535 }
//!
//! [meta.docker.image]
//! description = "Base image"
//! cli = "image"
//! ```
//!
//! A table holding a string `description`, a string `cli`, a boolean
//! `required` or a `validate` rules table is a field; any other table is a
//! section. Keys containing `.` are rejected.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use toml::{Table, Value};

use crate::error::PlugfigError;
use crate::overrides::dotted;

/// Documentation and binding rules for one configuration leaf.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMeta {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "cli")]
    pub cli_name: Option<String>,
    #[serde(default, rename = "validate")]
    pub validator: Option<Validator>,
    #[serde(default)]
    pub required: bool,
}

impl FieldMeta {
    pub fn new(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    pub fn cli(mut self, name: &str) -> Self {
        self.cli_name = Some(name.to_string());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// The flag name with leading dashes stripped, or `None` if it is blank.
    pub fn flag(&self) -> Option<&str> {
        let name = self.cli_name.as_deref()?.trim().trim_start_matches('-');
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone)]
pub enum MetaNode {
    Field(FieldMeta),
    Section(MetaTree),
}

/// Ordered metadata tree. Key order follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct MetaTree {
    nodes: IndexMap<String, MetaNode>,
}

impl MetaTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: &str, field: FieldMeta) -> Self {
        self.insert(key, MetaNode::Field(field));
        self
    }

    pub fn with_section(mut self, key: &str, section: MetaTree) -> Self {
        self.insert(key, MetaNode::Section(section));
        self
    }

    pub fn insert(&mut self, key: &str, node: MetaNode) {
        self.nodes.insert(key.to_string(), node);
    }

    pub fn get(&self, key: &str) -> Option<&MetaNode> {
        self.nodes.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut MetaNode> {
        self.nodes.get_mut(key)
    }

    /// Look up the field documented at a dotted path.
    pub fn field(&self, dotted_key: &str) -> Option<&FieldMeta> {
        let mut current = self;
        let mut segments = dotted_key.split('.').peekable();
        while let Some(segment) = segments.next() {
            match (current.get(segment)?, segments.peek()) {
                (MetaNode::Field(field), None) => return Some(field),
                (MetaNode::Section(section), Some(_)) => current = section,
                _ => return None,
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parse a `[meta]` table from an extension file.
    pub fn from_table(table: &Table) -> Result<Self, PlugfigError> {
        Self::from_table_at(table, "")
    }

    fn from_table_at(table: &Table, prefix: &str) -> Result<Self, PlugfigError> {
        let mut tree = MetaTree::new();
        for (key, value) in table {
            let path = dotted(prefix, key);
            if key.contains('.') {
                return Err(PlugfigError::InvalidMeta {
                    path,
                    reason: "keys must not contain '.'".into(),
                });
            }
            let Value::Table(inner) = value else {
                return Err(PlugfigError::InvalidMeta {
                    path,
                    reason: format!("expected a table, found {}", value.type_str()),
                });
            };
            let node = if is_field(inner) {
                let field: FieldMeta =
                    value
                        .clone()
                        .try_into()
                        .map_err(|e: toml::de::Error| PlugfigError::InvalidMeta {
                            path: path.clone(),
                            reason: e.to_string(),
                        })?;
                MetaNode::Field(field)
            } else {
                MetaNode::Section(Self::from_table_at(inner, &path)?)
            };
            tree.insert(key, node);
        }
        Ok(tree)
    }
}

impl IntoIterator for MetaTree {
    type Item = (String, MetaNode);
    type IntoIter = indexmap::map::IntoIter<String, MetaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

fn is_field(table: &Table) -> bool {
    matches!(table.get("description"), Some(Value::String(_)))
        || matches!(table.get("cli"), Some(Value::String(_)))
        || matches!(table.get("required"), Some(Value::Boolean(_)))
        || matches!(table.get("validate"), Some(Value::Table(rules)) if is_rules(rules))
}

/// Validation rules hold scalars and arrays. A `validate` table with nested
/// tables is a section that happens to be named `validate`.
fn is_rules(table: &Table) -> bool {
    table.values().all(|v| !v.is_table())
}

/// A predicate over a configuration value that can explain itself.
#[derive(Clone)]
pub struct Validator {
    description: String,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Validator {
    pub fn new<F>(description: &str, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.to_string(),
            check: Arc::new(check),
        }
    }

    /// Accepts everything.
    pub fn any() -> Self {
        Self::new("any value", |_| true)
    }

    /// Numeric bounds, inclusive. Strings holding a number are accepted too.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        let description = match (min, max) {
            (Some(lo), Some(hi)) => format!("between {lo} and {hi}"),
            (Some(lo), None) => format!("at least {lo}"),
            (None, Some(hi)) => format!("at most {hi}"),
            (None, None) => "a number".to_string(),
        };
        Self::new(&description, move |value| match as_number(value) {
            Some(n) => min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi),
            None => false,
        })
    }

    pub fn one_of(choices: Vec<Value>) -> Self {
        let listed: Vec<String> = choices.iter().map(display_scalar).collect();
        let description = format!("one of [{}]", listed.join(", "));
        Self::new(&description, move |value| {
            let shown = display_scalar(value);
            choices
                .iter()
                .any(|c| c == value || display_scalar(c) == shown)
        })
    }

    pub fn non_empty() -> Self {
        Self::new("non-empty", |value| match value {
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Table(t) => !t.is_empty(),
            _ => true,
        })
    }

    /// Every validator must accept.
    pub fn all(validators: Vec<Validator>) -> Self {
        let description = validators
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join(" and ");
        Self::new(&description, move |value| {
            validators.iter().all(|v| v.check(value))
        })
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    fn from_rules(rules: Rules) -> Self {
        let mut parts = Vec::new();
        if rules.min.is_some() || rules.max.is_some() {
            parts.push(Validator::range(rules.min, rules.max));
        }
        if let Some(choices) = rules.one_of {
            parts.push(Validator::one_of(choices));
        }
        if rules.non_empty {
            parts.push(Validator::non_empty());
        }
        match parts.len() {
            0 => Validator::any(),
            1 => parts.remove(0),
            _ => Validator::all(parts),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Declarative validation rules as written in extension files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Rules {
    min: Option<f64>,
    max: Option<f64>,
    one_of: Option<Vec<Value>>,
    #[serde(default)]
    non_empty: bool,
}

impl<'de> Deserialize<'de> for Validator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Rules::deserialize(deserializer).map(Validator::from_rules)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a value the way a user would type it.
pub(crate) fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
