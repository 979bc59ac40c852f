use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlugfigError {
    #[error("Extension '{id}' not found (searched {})", display_paths(searched))]
    ExtensionNotFound { id: String, searched: Vec<PathBuf> },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid metadata at '{path}': {reason}")]
    InvalidMeta { path: String, reason: String },

    #[error("Invalid structured value for --{flag}: {reason}")]
    StructuredInput { flag: String, reason: String },

    #[error("Missing required option '{option}' for command '{command}'")]
    MissingRequiredOption { command: String, option: String },

    #[error("Validation failed for option '{option}' of command '{command}': '{value}' is not {expected}")]
    ValidationFailed {
        command: String,
        option: String,
        value: String,
        expected: String,
    },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("App name is required: call .app_name() on the builder")]
    AppNameRequired,
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search paths".into();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_not_found_lists_searched_paths() {
        let err = PlugfigError::ExtensionNotFound {
            id: "acme-ext-docker".into(),
            searched: vec!["/work/extensions".into(), "/home/u/.local/share/acme".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("acme-ext-docker"));
        assert!(msg.contains("/work/extensions"));
        assert!(msg.contains(".local/share/acme"));
    }

    #[test]
    fn extension_not_found_without_paths() {
        let err = PlugfigError::ExtensionNotFound {
            id: "x".into(),
            searched: vec![],
        };
        assert!(err.to_string().contains("no search paths"));
    }

    #[test]
    fn missing_required_option_formats() {
        let err = PlugfigError::MissingRequiredOption {
            command: "deploy".into(),
            option: "target".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("target"));
    }

    #[test]
    fn validation_failed_includes_explanation() {
        let err = PlugfigError::ValidationFailed {
            command: "deploy".into(),
            option: "target".into(),
            value: "moon".into(),
            expected: "one of [staging, production]".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("moon"));
        assert!(msg.contains("one of [staging, production]"));
    }

    #[test]
    fn app_name_required_formats() {
        let err = PlugfigError::AppNameRequired;
        assert!(err.to_string().contains("app_name"));
    }
}
