//! Binding raw flag values onto a configuration patch.

use toml::{Table, Value};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::PlugfigError;
use crate::flags::FlagMap;
use crate::overrides::set_path;

/// Turn raw flag values into a sparse configuration patch.
///
/// Keys may carry leading dashes. Each recognised flag is coerced and
/// validated; accepted values are written at the flag's path. Rejected values
/// are left out entirely, so merging the patch keeps whatever was there
/// before. Unknown flags are reported and dropped.
///
/// Only malformed structured input is an error.
pub fn bind<I, K, V>(
    raw: I,
    flags: &FlagMap,
    diagnostics: &mut Diagnostics,
) -> Result<Table, PlugfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let mut patch = Table::new();
    for (key, value) in raw {
        let flag = key.as_ref().trim_start_matches('-');
        let Some(binding) = flags.get(flag) else {
            diagnostics.push(Diagnostic::UnrecognizedFlag {
                flag: flag.to_string(),
            });
            continue;
        };
        let coerced = binding.coerce(flag, &value.into(), diagnostics)?;
        if !binding.validate(&coerced) {
            diagnostics.push(Diagnostic::ValidationRejected {
                flag: flag.to_string(),
                path: binding.path.clone(),
                expected: binding.validator.describe().to_string(),
            });
            continue;
        }
        set_path(&mut patch, &binding.path, coerced);
    }
    Ok(patch)
}
