//! Advisory and recoverable conditions collected while composing and binding.
//!
//! Nothing in the pipeline prints. Each operation takes a `&mut Diagnostics`
//! and records what it skipped, ignored, or degraded; the CLI layer decides how
//! to show them. Every recorded entry is also emitted as a `tracing` event so
//! hosts that install a subscriber see them without extra wiring.

use std::fmt;

/// A single non-fatal condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An extension could not be resolved and was left out of the composition.
    ExtensionSkipped { id: String, reason: String },
    /// Leaf paths set by the application that no extension declares.
    StructuralMismatch { paths: Vec<String> },
    /// A flag with no binding in the flag map.
    UnrecognizedFlag { flag: String },
    /// A value that could not be coerced and was replaced by a fallback.
    CoercionFallback {
        flag: String,
        input: String,
        fallback: String,
    },
    /// A coerced value rejected by its validator; nothing was written.
    ValidationRejected {
        flag: String,
        path: String,
        expected: String,
    },
    /// The dependency lister failed, so no extensions were discovered.
    DiscoveryFailed { reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ExtensionSkipped { id, reason } => {
                write!(f, "Skipping extension '{id}': {reason}")
            }
            Diagnostic::StructuralMismatch { paths } => write!(
                f,
                "Settings not declared by any extension (ignored by extensions): {}",
                paths.join(", ")
            ),
            Diagnostic::UnrecognizedFlag { flag } => write!(f, "Unrecognized flag --{flag}"),
            Diagnostic::CoercionFallback {
                flag,
                input,
                fallback,
            } => write!(
                f,
                "Could not interpret '{input}' for --{flag}, using {fallback}"
            ),
            Diagnostic::ValidationRejected {
                flag,
                path,
                expected,
            } => write!(
                f,
                "Ignoring --{flag}: value for '{path}' must be {expected}"
            ),
            Diagnostic::DiscoveryFailed { reason } => {
                write!(f, "Extension discovery failed: {reason}")
            }
        }
    }
}

/// Ordered collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to `tracing`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::ValidationRejected { .. } => tracing::debug!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for d in iter {
            self.push(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::UnrecognizedFlag { flag: "a".into() });
        diags.push(Diagnostic::UnrecognizedFlag { flag: "b".into() });
        let flags: Vec<_> = diags
            .iter()
            .map(|d| match d {
                Diagnostic::UnrecognizedFlag { flag } => flag.as_str(),
                other => panic!("Expected UnrecognizedFlag, got: {other:?}"),
            })
            .collect();
        assert_eq!(flags, vec!["a", "b"]);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn mismatch_lists_all_paths() {
        let d = Diagnostic::StructuralMismatch {
            paths: vec!["foo.bar".into(), "baz".into()],
        };
        let msg = d.to_string();
        assert!(msg.contains("foo.bar"));
        assert!(msg.contains("baz"));
    }

    #[test]
    fn unrecognized_flag_shows_dashes() {
        let d = Diagnostic::UnrecognizedFlag {
            flag: "prot".into(),
        };
        assert_eq!(d.to_string(), "Unrecognized flag --prot");
    }

    #[test]
    fn extend_collects_everything() {
        let mut diags = Diagnostics::new();
        diags.extend(vec![
            Diagnostic::DiscoveryFailed {
                reason: "no manifest".into(),
            },
            Diagnostic::ExtensionSkipped {
                id: "x".into(),
                reason: "not found".into(),
            },
        ]);
        assert_eq!(diags.len(), 2);
        assert!(!diags.is_empty());
    }
}
