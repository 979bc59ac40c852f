//! Dotted-path helpers over `toml::Table`.
//!
//! Binding writes each accepted flag value at its dotted path, building the
//! nested table structure needed to deep-merge the patch onto the composed
//! configuration. The mismatch check walks the other way, listing leaf paths.

use toml::{Table, Value};

pub(crate) fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Write `value` at a dotted path, creating intermediate tables as needed.
///
/// `("docker.image", "node")` becomes `{docker = {image = "node"}}`. A
/// non-table value sitting where an intermediate table is needed is replaced.
pub fn set_path(table: &mut Table, dotted_key: &str, value: Value) {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    insert_nested(table, &segments, value);
}

fn insert_nested(table: &mut Table, segments: &[&str], value: Value) {
    debug_assert!(!segments.is_empty());

    let key = segments[0];

    if segments.len() == 1 {
        table.insert(key.to_string(), value);
        return;
    }

    let sub = table
        .entry(key)
        .or_insert_with(|| Value::Table(Table::new()));
    if !sub.is_table() {
        *sub = Value::Table(Table::new());
    }
    if let Value::Table(sub_table) = sub {
        insert_nested(sub_table, &segments[1..], value);
    }
}

/// Navigate a table by dotted key path (e.g. `"docker.image"`).
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

/// Collect every leaf path of a table, in key order.
///
/// Non-empty tables are descended into; everything else, empty tables
/// included, is a leaf.
pub fn leaf_paths(table: &Table) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(table, "", &mut paths);
    paths
}

fn collect_leaves(table: &Table, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in table {
        let path = dotted(prefix, key);
        match value {
            Value::Table(inner) if !inner.is_empty() => collect_leaves(inner, &path, paths),
            _ => paths.push(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries_to_table(pairs: &[(&str, Value)]) -> Table {
        let mut table = Table::new();
        for (dotted_key, value) in pairs {
            set_path(&mut table, dotted_key, value.clone());
        }
        table
    }

    #[test]
    fn flat_key() {
        let table = entries_to_table(&[("port", Value::Integer(3000))]);
        assert_eq!(table["port"].as_integer().unwrap(), 3000);
    }

    #[test]
    fn nested_key_creates_tables() {
        let table = entries_to_table(&[(
            "docker.image",
            Value::String("node".into()),
        )]);
        assert_eq!(table["docker"]["image"].as_str().unwrap(), "node");
    }

    #[test]
    fn sibling_paths_share_parent() {
        let table = entries_to_table(&[
            ("docker.image", Value::String("node".into())),
            ("docker.tag", Value::String("20".into())),
        ]);
        let docker = table["docker"].as_table().unwrap();
        assert_eq!(docker.len(), 2);
    }

    #[test]
    fn scalar_in_the_way_is_replaced() {
        let mut table = Table::new();
        set_path(&mut table, "docker", Value::Boolean(true));
        set_path(&mut table, "docker.image", Value::String("node".into()));
        assert_eq!(table["docker"]["image"].as_str().unwrap(), "node");
    }

    #[test]
    fn last_entry_wins_for_same_key() {
        let table = entries_to_table(&[
            ("port", Value::Integer(3000)),
            ("port", Value::Integer(5000)),
        ]);
        assert_eq!(table["port"].as_integer().unwrap(), 5000);
    }

    #[test]
    fn table_get_walks_sections() {
        let table = "[a.b]\nc = 1\n".parse::<Table>().unwrap();
        assert_eq!(table_get(&table, "a.b.c").unwrap().as_integer(), Some(1));
        assert!(table_get(&table, "a.b").unwrap().is_table());
        assert!(table_get(&table, "a.x.c").is_none());
        assert!(table_get(&table, "a.b.c.d").is_none());
    }

    #[test]
    fn leaf_paths_in_order() {
        let table = r#"
            name = "x"
            tags = ["a"]
            headers = {}
            [docker]
            image = "alpine"
            [docker.build]
            args = 1
        "#
        .parse::<Table>()
        .unwrap();
        assert_eq!(
            leaf_paths(&table),
            vec!["name", "tags", "headers", "docker.image", "docker.build.args"]
        );
    }
}
