//! Stable identity of a form field

use std::fmt;

use crate::domain::abi::ParameterSpec;

/// Key of one field in a function's form.
///
/// Layout: `{function}_{name}_{internal type}_{declared type}`, where an
/// unnamed parameter uses `input_{index}_` as its name. The declared type is
/// always the last `_`-separated segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn derive(function_name: &str, param: &ParameterSpec, index: usize) -> Self {
        let name = match &param.name {
            Some(name) => name.clone(),
            None => format!("input_{index}_"),
        };
        FieldKey(format!(
            "{}_{}_{}_{}",
            function_name, name, param.internal_type, param.declared_type
        ))
    }

    /// The declared ABI type embedded at the end of the key
    pub fn base_type(&self) -> &str {
        self.0.rsplit('_').next().unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
