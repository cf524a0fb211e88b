//! Per-form field values

use std::fmt;

use alloy_dyn_abi::DynSolValue;

use crate::domain::abi::{
    classify, is_valid_integer, BigInteger, FunctionSpec, ParameterSpec, WidgetKind,
};

use crate::domain::display::to_form_text;

use super::FieldKey;

/// What a field currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Produced by the integer widget's ×10^18 action
    Integer(BigInteger),
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Inline validation state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Ok,
    Invalid,
}

/// Validation as the user types: only integer widgets are checked, leniently
pub fn field_status(param: &ParameterSpec, value: &FieldValue) -> FieldStatus {
    let WidgetKind::Integer(variant) = classify(param) else {
        return FieldStatus::Ok;
    };
    let valid = match value {
        FieldValue::Text(text) => is_valid_integer(variant, text, false),
        FieldValue::Integer(integer) => variant.contains(integer),
    };
    if valid {
        FieldStatus::Ok
    } else {
        FieldStatus::Invalid
    }
}

/// Ordered field values of one function form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    entries: Vec<(FieldKey, FieldValue)>,
}

impl FormState {
    /// One empty entry per parameter, in declaration order
    pub fn for_function(function: &FunctionSpec) -> Self {
        let mut state = Self::default();
        state.reset(function);
        state
    }

    pub fn reset(&mut self, function: &FunctionSpec) {
        self.entries = function
            .field_keys()
            .into_iter()
            .map(|key| (key, FieldValue::empty()))
            .collect();
    }

    /// Fill every field from decoded values, e.g. a previous call result
    pub fn populate(&mut self, function: &FunctionSpec, values: &[DynSolValue]) {
        self.reset(function);
        for ((_, slot), value) in self.entries.iter_mut().zip(values) {
            *slot = FieldValue::Text(to_form_text(value));
        }
    }

    /// Replace one field's value, leaving every other field untouched
    pub fn update(&mut self, key: &FieldKey, value: FieldValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.clone(), value)),
        }
    }

    /// Apply an edit derived from the field's current value
    pub fn edit(&mut self, key: &FieldKey, f: impl FnOnce(&FieldValue) -> FieldValue) {
        let current = self.get(key).cloned().unwrap_or_else(FieldValue::empty);
        self.update(key, f(&current));
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
