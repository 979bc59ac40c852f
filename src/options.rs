//! Binding positional arguments to a command's declared options.

use indexmap::IndexMap;
use toml::Value;

use crate::error::PlugfigError;
use crate::types::Commands;

/// Positional arguments split into named options and leftovers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCommand {
    pub arguments: IndexMap<String, String>,
    pub rest: Vec<String>,
}

/// Consume one positional per declared option of `command`, in order.
///
/// A required option without a value, or a value its validator rejects,
/// aborts the parse. Optional options without a value are omitted. Whatever
/// is left over comes back in `rest`; a command that declares no options (or
/// is unknown) returns every positional there.
pub fn parse<S: AsRef<str>>(
    command: &str,
    commands: &Commands,
    positionals: &[S],
) -> Result<ParsedCommand, PlugfigError> {
    let mut remaining = positionals.iter().map(|s| s.as_ref().to_string());
    let mut arguments = IndexMap::new();

    let options = commands
        .get(command)
        .map(|spec| spec.options.as_slice())
        .unwrap_or_default();

    for option in options {
        let Some(value) = remaining.next() else {
            if option.required {
                return Err(PlugfigError::MissingRequiredOption {
                    command: command.to_string(),
                    option: option.name.clone(),
                });
            }
            continue;
        };
        if let Some(validator) = &option.validation
            && !validator.check(&Value::String(value.clone()))
        {
            return Err(PlugfigError::ValidationFailed {
                command: command.to_string(),
                option: option.name.clone(),
                value,
                expected: validator.describe().to_string(),
            });
        }
        arguments.insert(option.name.clone(), value);
    }

    Ok(ParsedCommand {
        arguments,
        rest: remaining.collect(),
    })
}
