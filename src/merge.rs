use toml::{Table, Value};

use crate::meta::{MetaNode, MetaTree};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise `overlay`'s value wins; arrays are replaced, never concatenated.
///
/// Keys keep their position in `base`; keys new in `overlay` are appended.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.get_mut(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                let taken = std::mem::replace(base_tbl, Table::new());
                Value::Table(deep_merge(taken, overlay_tbl))
            }
            (_, overlay_val) => overlay_val,
        };
        base.insert(key, merged);
    }
    base
}

/// Same rule as [`deep_merge`] for metadata: sections recurse, fields replace.
pub fn merge_meta(mut base: MetaTree, overlay: MetaTree) -> MetaTree {
    for (key, overlay_node) in overlay {
        let merged = match (base.get_mut(&key), overlay_node) {
            (Some(MetaNode::Section(base_sec)), MetaNode::Section(overlay_sec)) => {
                let taken = std::mem::take(base_sec);
                MetaNode::Section(merge_meta(taken, overlay_sec))
            }
            (_, overlay_node) => overlay_node,
        };
        base.insert(&key, merged);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FieldMeta;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn base_only_keys_survive() {
        let base = table(
            r#"
            name = "site"
            [server]
            port = 8080
            "#,
        );
        let overlay = table("[build]\nminify = true\n");
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["name"].as_str().unwrap(), "site");
        assert_eq!(merged["server"]["port"].as_integer().unwrap(), 8080);
        assert!(merged["build"]["minify"].as_bool().unwrap());
    }

    #[test]
    fn overlay_scalar_wins() {
        let merged = deep_merge(table("port = 8080"), table("port = 3000"));
        assert_eq!(merged["port"].as_integer().unwrap(), 3000);
    }

    #[test]
    fn nested_tables_recurse() {
        let base = table(
            r#"
            [docker]
            image = "alpine"
            tag = "3"
            "#,
        );
        let overlay = table("[docker]\ntag = \"edge\"\n");
        let merged = deep_merge(base, overlay);
        let docker = merged["docker"].as_table().unwrap();
        assert_eq!(docker["image"].as_str().unwrap(), "alpine");
        assert_eq!(docker["tag"].as_str().unwrap(), "edge");
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let base = table(r#"plugins = ["a", "b"]"#);
        let overlay = table(r#"plugins = ["c"]"#);
        let merged = deep_merge(base, overlay);
        let plugins = merged["plugins"].as_array().unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].as_str().unwrap(), "c");
    }

    #[test]
    fn scalar_replaces_table_and_table_replaces_scalar() {
        let merged = deep_merge(table("[docker]\nimage = \"x\"\n"), table("docker = false"));
        assert!(!merged["docker"].as_bool().unwrap());

        let merged = deep_merge(table("docker = false"), table("[docker]\nimage = \"x\"\n"));
        assert_eq!(merged["docker"]["image"].as_str().unwrap(), "x");
    }

    #[test]
    fn key_order_is_base_then_new() {
        let base = table("zeta = 1\nalpha = 2\nmid = 3\n");
        let overlay = table("alpha = 20\nnew = 4\n");
        let merged = deep_merge(base, overlay);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid", "new"]);
        assert_eq!(merged["alpha"].as_integer().unwrap(), 20);
    }

    #[test]
    fn inputs_are_untouched_when_cloned_in() {
        let base = table("[a]\nx = 1\n");
        let overlay = table("[a]\ny = 2\n");
        let _ = deep_merge(base.clone(), overlay.clone());
        assert!(base["a"].as_table().unwrap().get("y").is_none());
        assert!(overlay["a"].as_table().unwrap().get("x").is_none());
    }

    #[test]
    fn empty_sides() {
        let t = table("port = 1");
        assert_eq!(deep_merge(t.clone(), Table::new()), t);
        assert_eq!(deep_merge(Table::new(), t.clone()), t);
    }

    #[test]
    fn sequential_merges_left_to_right() {
        let merged = deep_merge(
            deep_merge(table(r#"host = "a""#), table("port = 1000")),
            table(r#"host = "c""#),
        );
        assert_eq!(merged["host"].as_str().unwrap(), "c");
        assert_eq!(merged["port"].as_integer().unwrap(), 1000);
    }

    #[test]
    fn meta_sections_recurse_and_fields_replace() {
        let base = MetaTree::new()
            .with_field("port", FieldMeta::new("old port").cli("port"))
            .with_section(
                "docker",
                MetaTree::new().with_field("image", FieldMeta::new("image").cli("image")),
            );
        let overlay = MetaTree::new()
            .with_field("port", FieldMeta::new("new port").cli("p"))
            .with_section(
                "docker",
                MetaTree::new().with_field("tag", FieldMeta::new("tag").cli("tag")),
            );
        let merged = merge_meta(base, overlay);
        assert_eq!(merged.field("port").unwrap().flag(), Some("p"));
        assert!(merged.field("docker.image").is_some());
        assert!(merged.field("docker.tag").is_some());
        let keys: Vec<_> = merged.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["port", "docker"]);
    }
}
