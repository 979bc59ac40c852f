//! The documentation tree: configuration values paired with their metadata.
//!
//! [`build`] walks a configuration table and its [`MetaTree`] in lock-step.
//! Non-empty tables become groups; every other value becomes a leaf carrying
//! the value as its default, the [`Shape`] used later for coercion, and the
//! field's metadata when there is any. Node order follows the configuration's
//! key order, so the same extension set always yields the same tree.
//!
//! The tree feeds two consumers: help rendering (see [`crate::ops`]) and flag
//! derivation (see [`crate::flags`]).

use toml::{Table, Value};

use crate::coerce::Shape;
use crate::meta::{FieldMeta, MetaNode, MetaTree, Validator};
use crate::overrides::dotted;

/// Which configuration paths a tree should retain.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PathFilter {
    /// Keep everything.
    #[default]
    All,
    /// Keep leaves at or below one of these dotted paths. Empty keeps nothing.
    Only(Vec<String>),
}

impl PathFilter {
    pub fn only<S: AsRef<str>>(paths: &[S]) -> Self {
        PathFilter::Only(paths.iter().map(|p| p.as_ref().to_string()).collect())
    }

    /// Whether a leaf at `path` is retained.
    pub fn includes(&self, path: &str) -> bool {
        match self {
            PathFilter::All => true,
            PathFilter::Only(paths) => paths.iter().any(|p| is_within(path, p)),
        }
    }

    /// Whether anything at or below `path` can be retained.
    fn reaches(&self, path: &str) -> bool {
        match self {
            PathFilter::All => true,
            PathFilter::Only(paths) => paths
                .iter()
                .any(|p| is_within(path, p) || is_within(p, path)),
        }
    }
}

/// `path` equals `ancestor` or lies below it.
fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[derive(Debug, Clone)]
pub struct DocNode {
    pub key: String,
    pub path: String,
    pub cli_name: Option<String>,
    pub description: Option<String>,
    /// The current value. `None` for groups.
    pub default: Option<Value>,
    pub shape: Option<Shape>,
    pub validator: Option<Validator>,
    pub required: bool,
    pub children: Vec<DocNode>,
}

impl DocNode {
    fn group(key: &str, path: String, children: Vec<DocNode>) -> Self {
        Self {
            key: key.to_string(),
            path,
            cli_name: None,
            description: None,
            default: None,
            shape: None,
            validator: None,
            required: false,
            children,
        }
    }

    fn leaf(key: &str, path: String, value: &Value, field: Option<&FieldMeta>) -> Self {
        Self {
            key: key.to_string(),
            path,
            cli_name: field.and_then(FieldMeta::flag).map(str::to_string),
            description: field.and_then(|f| f.description.clone()),
            default: Some(value.clone()),
            shape: Some(Shape::of(value)),
            validator: field.and_then(|f| f.validator.clone()),
            required: field.is_some_and(|f| f.required),
            children: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.default.is_none()
    }

    /// Undocumented leaves have no metadata and never become flags.
    pub fn is_documented(&self) -> bool {
        self.description.is_some() || self.cli_name.is_some()
    }
}

/// Ordered documentation tree. Top-level nodes are the presentation groups.
#[derive(Debug, Clone, Default)]
pub struct DocTree {
    pub nodes: Vec<DocNode>,
}

impl DocTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the node at a dotted path.
    pub fn find(&self, path: &str) -> Option<&DocNode> {
        let mut current = &self.nodes;
        let mut found = None;
        for segment in path.split('.') {
            let node = current.iter().find(|n| n.key == segment)?;
            current = &node.children;
            found = Some(node);
        }
        found
    }

    /// All leaves, depth-first in tree order.
    pub fn leaves(&self) -> Vec<&DocNode> {
        fn walk<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a DocNode>) {
            for node in nodes {
                if node.is_group() {
                    walk(&node.children, out);
                } else {
                    out.push(node);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }
}

/// Build the documentation tree for `config` described by `meta`.
pub fn build(config: &Table, meta: &MetaTree, filter: &PathFilter) -> DocTree {
    DocTree {
        nodes: walk(config, Some(meta), "", filter),
    }
}

fn walk(config: &Table, meta: Option<&MetaTree>, prefix: &str, filter: &PathFilter) -> Vec<DocNode> {
    let mut nodes = Vec::new();
    for (key, value) in config {
        let path = dotted(prefix, key);
        if !filter.reaches(&path) {
            continue;
        }
        let node_meta = meta.and_then(|m| m.get(key));
        match value {
            Value::Table(children) if !children.is_empty() => {
                let section = match node_meta {
                    Some(MetaNode::Section(section)) => Some(section),
                    _ => None,
                };
                let kids = walk(children, section, &path, filter);
                if !kids.is_empty() {
                    nodes.push(DocNode::group(key, path, kids));
                }
            }
            _ => {
                if !filter.includes(&path) {
                    continue;
                }
                let field = match node_meta {
                    Some(MetaNode::Field(field)) => Some(field),
                    _ => None,
                };
                nodes.push(DocNode::leaf(key, path, value, field));
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{web_config, web_meta};

    fn paths(tree: &DocTree) -> Vec<&str> {
        tree.leaves().iter().map(|n| n.path.as_str()).collect()
    }

    #[test]
    fn leaves_follow_config_order() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        assert_eq!(
            paths(&tree),
            vec![
                "port",
                "verbose",
                "plugins",
                "headers",
                "docker.image",
                "docker.tag",
                "docker.build.args",
            ]
        );
    }

    #[test]
    fn groups_hold_children() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        let docker = tree.find("docker").unwrap();
        assert!(docker.is_group());
        assert_eq!(docker.children.len(), 3);
        assert!(tree.find("docker.build").unwrap().is_group());
    }

    #[test]
    fn leaf_carries_meta_and_default() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        let port = tree.find("port").unwrap();
        assert_eq!(port.cli_name.as_deref(), Some("port"));
        assert_eq!(port.default, Some(Value::Integer(8080)));
        assert_eq!(port.shape, Some(Shape::Integer));
        assert!(port.validator.is_some());
        assert!(port.is_documented());
    }

    #[test]
    fn required_flag_reaches_leaf() {
        let meta = web_meta().with_section(
            "docker",
            MetaTree::new().with_field("tag", FieldMeta::new("Image tag").required(true)),
        );
        let tree = build(&web_config(), &meta, &PathFilter::All);
        assert!(tree.find("docker.tag").unwrap().required);
        assert!(!tree.find("port").unwrap().required);
        assert!(!tree.find("docker").unwrap().required);
    }

    #[test]
    fn undocumented_leaf_still_present() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        let tag = tree.find("docker.tag").unwrap();
        assert!(!tag.is_documented());
        assert_eq!(tag.cli_name, None);
    }

    #[test]
    fn empty_table_is_structured_leaf() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::All);
        let headers = tree.find("headers").unwrap();
        assert!(!headers.is_group());
        assert_eq!(headers.shape, Some(Shape::Structured));
    }

    #[test]
    fn filter_keeps_subtrees_and_exact_leaves() {
        let filter = PathFilter::only(&["docker.build", "port"]);
        let tree = build(&web_config(), &web_meta(), &filter);
        assert_eq!(paths(&tree), vec!["port", "docker.build.args"]);
    }

    #[test]
    fn filter_does_not_match_prefix_of_sibling_name() {
        let filter = PathFilter::only(&["dock"]);
        let tree = build(&web_config(), &web_meta(), &filter);
        assert!(tree.is_empty());
    }

    #[test]
    fn empty_filter_excludes_everything() {
        let tree = build(&web_config(), &web_meta(), &PathFilter::Only(vec![]));
        assert!(tree.is_empty());
    }

    #[test]
    fn meta_without_config_is_ignored() {
        let meta = MetaTree::new().with_field("ghost", FieldMeta::new("nothing").cli("ghost"));
        let tree = build(&web_config(), &meta, &PathFilter::All);
        assert!(tree.find("ghost").is_none());
    }

    #[test]
    fn build_is_deterministic() {
        let a = build(&web_config(), &web_meta(), &PathFilter::All);
        let b = build(&web_config(), &web_meta(), &PathFilter::All);
        assert_eq!(paths(&a), paths(&b));
    }
}
