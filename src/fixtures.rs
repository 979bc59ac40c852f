#[cfg(test)]
pub mod test {
    use std::path::Path;

    use toml::Table;

    use crate::extension::{Extension, StaticResolver};

    fn extension(content: &str) -> Extension {
        Extension::from_toml_str(content, Path::new("fixture.toml")).unwrap()
    }

    /// A single-extension style config touching every shape.
    pub fn web_config() -> Table {
        r#"
port = 8080
verbose = false
plugins = ["sass"]
headers = {}

[docker]
image = "alpine"
tag = "3"

[docker.build]
args = 1
"#
        .parse()
        .unwrap()
    }

    pub fn web_meta() -> crate::meta::MetaTree {
        let table: Table = r#"
[port]
description = "Port the dev server listens on"
cli = "port"
validate = { min = 1, max = 65535 }

[verbose]
description = "Log every request"
cli = "verbose"

[plugins]
description = "Build plugins to enable"
cli = "plugins"

[headers]
description = "Extra response headers as JSON"
cli = "header"

[docker.image]
description = "Base image"
cli = "image"

[docker.build.args]
description = "Build argument count"
cli = "build-args"
"#
        .parse()
        .unwrap();
        crate::meta::MetaTree::from_table(&table).unwrap()
    }

    pub fn node_extension() -> Extension {
        extension(
            r#"
[config]
port = 8080
[config.node]
version = "20"

[meta.port]
description = "Node port"
cli = "port"

[meta.node.version]
description = "Node.js version"
cli = "node-version"
"#,
        )
    }

    pub fn docker_extension() -> Extension {
        extension(
            r#"
[config]
port = 3000
[config.docker]
image = "alpine"
tag = "3"

[meta.port]
description = "Docker port"
cli = "port"
validate = { min = 1, max = 65535 }

[meta.docker.image]
description = "Base image"
cli = "image"

[commands.deploy]
description = "Deploy the container"
settings = ["docker", "port"]

[[commands.deploy.options]]
name = "target"
required = true
validate = { one_of = ["staging", "production"] }
"#,
        )
    }

    pub fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with("acme-ext-node", node_extension())
            .with("acme-ext-docker", docker_extension())
    }

    #[test]
    fn fixtures_parse() {
        assert_eq!(web_config()["port"].as_integer().unwrap(), 8080);
        assert_eq!(web_meta().len(), 5);
        assert!(docker_extension().commands.contains_key("deploy"));
        assert!(node_extension().meta.field("node.version").is_some());
    }
}
