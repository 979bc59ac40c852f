//! Inspection operations: key lookup, listing, and help presentation.
//!
//! Provides the logic behind `config list` and `config get`, the
//! [`ConfigResult`] enum callers display, and the column specification handed
//! to whatever renders the help table.

use std::fmt;

use toml::{Table, Value};

use crate::error::PlugfigError;
use crate::meta::MetaTree;
use crate::overrides::{leaf_paths, table_get};
use crate::schema::{DocNode, DocTree};

/// Result of an inspection operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A key's composed value and its description.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Every composed leaf in configuration order.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Get a composed value by dotted key, with its description as doc lines.
pub fn get_value(config: &Table, meta: &MetaTree, key: &str) -> Result<ConfigResult, PlugfigError> {
    let value = table_get(config, key).ok_or_else(|| PlugfigError::KeyNotFound(key.into()))?;
    let doc = meta
        .field(key)
        .and_then(|field| field.description.as_deref())
        .map(|d| d.lines().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: format_value(value),
        doc,
    })
}

/// List all composed leaves as dotted key-value pairs.
pub fn list_values(config: &Table) -> ConfigResult {
    let entries = leaf_paths(config)
        .into_iter()
        .filter_map(|path| {
            let display = table_get(config, &path).map(format_value)?;
            Some((path, display))
        })
        .collect();
    ConfigResult::Listing { entries }
}

/// Format a value for display. Strings are shown bare.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One column of the help table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub render: fn(&DocNode) -> String,
}

/// Flag / Description / Default, in that order.
pub fn help_columns() -> Vec<Column> {
    vec![
        Column {
            header: "Flag",
            render: |node| {
                node.cli_name
                    .as_deref()
                    .map(|name| format!("--{name}"))
                    .unwrap_or_default()
            },
        },
        Column {
            header: "Description",
            render: |node| node.description.clone().unwrap_or_default(),
        },
        Column {
            header: "Default",
            render: |node| node.default.as_ref().map(format_value).unwrap_or_default(),
        },
    ]
}

/// Rows of the help table under one heading.
#[derive(Debug, Clone)]
pub struct HelpSection<'a> {
    /// `None` for top-level settings that belong to no group.
    pub title: Option<&'a str>,
    pub rows: Vec<&'a DocNode>,
}

/// Split a documentation tree into presentation sections.
///
/// Top-level leaves form an untitled first section, each top-level group its
/// own section. Only documented leaves become rows; sections left empty are
/// dropped.
pub fn help_sections(tree: &DocTree) -> Vec<HelpSection<'_>> {
    let mut loose = Vec::new();
    let mut grouped = Vec::new();
    for node in &tree.nodes {
        if node.is_group() {
            let mut rows = Vec::new();
            documented_leaves(&node.children, &mut rows);
            if !rows.is_empty() {
                grouped.push(HelpSection {
                    title: Some(node.key.as_str()),
                    rows,
                });
            }
        } else if node.is_documented() {
            loose.push(node);
        }
    }

    let mut sections = Vec::with_capacity(grouped.len() + 1);
    if !loose.is_empty() {
        sections.push(HelpSection {
            title: None,
            rows: loose,
        });
    }
    sections.extend(grouped);
    sections
}

fn documented_leaves<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a DocNode>) {
    for node in nodes {
        if node.is_group() {
            documented_leaves(&node.children, out);
        } else if node.is_documented() {
            out.push(node);
        }
    }
}

/// Render one section as cells, one row per node, using `columns`.
pub fn render_rows(section: &HelpSection<'_>, columns: &[Column]) -> Vec<Vec<String>> {
    section
        .rows
        .iter()
        .map(|node| columns.iter().map(|c| (c.render)(node)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{web_config, web_meta};
    use crate::schema::{PathFilter, build};

    #[test]
    fn get_scalar_with_doc() {
        let result = get_value(&web_config(), &web_meta(), "port").unwrap();
        assert_eq!(
            result,
            ConfigResult::KeyValue {
                key: "port".into(),
                value: "8080".into(),
                doc: vec!["Port the dev server listens on".into()],
            }
        );
    }

    #[test]
    fn get_nested_string_shown_bare() {
        match get_value(&web_config(), &web_meta(), "docker.image").unwrap() {
            ConfigResult::KeyValue { value, .. } => assert_eq!(value, "alpine"),
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_undocumented_has_no_doc() {
        match get_value(&web_config(), &web_meta(), "docker.tag").unwrap() {
            ConfigResult::KeyValue { doc, .. } => assert!(doc.is_empty()),
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_unknown_key_errors() {
        let err = get_value(&web_config(), &web_meta(), "nope.nope").unwrap_err();
        assert!(matches!(err, PlugfigError::KeyNotFound(k) if k == "nope.nope"));
    }

    #[test]
    fn list_in_config_order() {
        let ConfigResult::Listing { entries } = list_values(&web_config()) else {
            panic!("Expected Listing");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "port",
                "verbose",
                "plugins",
                "headers",
                "docker.image",
                "docker.tag",
                "docker.build.args"
            ]
        );
        assert_eq!(entries[2].1, "[\"sass\"]");
    }

    #[test]
    fn display_key_value() {
        let result = ConfigResult::KeyValue {
            key: "port".into(),
            value: "8080".into(),
            doc: vec!["Port".into()],
        };
        assert_eq!(result.to_string(), "# Port\nport = 8080");
    }

    #[test]
    fn display_listing() {
        let result = ConfigResult::Listing {
            entries: vec![("a".into(), "1".into()), ("b.c".into(), "x".into())],
        };
        assert_eq!(result.to_string(), "a = 1\nb.c = x");
    }

    #[test]
    fn help_columns_order() {
        let headers: Vec<_> = help_columns().iter().map(|c| c.header).collect();
        assert_eq!(headers, vec!["Flag", "Description", "Default"]);
    }

    #[test]
    fn sections_group_by_top_level() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        let sections = help_sections(&tree);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[0].rows.len(), 4);
        assert_eq!(sections[1].title, Some("docker"));
        // docker.tag is undocumented
        let paths: Vec<_> = sections[1].rows.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["docker.image", "docker.build.args"]);
    }

    #[test]
    fn rendered_cells() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::only(&["port"]));
        let sections = help_sections(&tree);
        let rows = render_rows(&sections[0], &help_columns());
        assert_eq!(
            rows,
            vec![vec![
                "--port".to_string(),
                "Port the dev server listens on".to_string(),
                "8080".to_string()
            ]]
        );
    }

    #[test]
    fn filtered_out_tree_has_no_sections() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::only::<&str>(&[]));
        assert!(help_sections(&tree).is_empty());
    }
}
