//! Rendering call results for display

use std::fmt;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::utils::format_ether;
use serde_json::{json, Value};

use crate::domain::abi::BigInteger;

/// Glyph prefixed to amounts shown in ether
pub const CURRENCY_GLYPH: &str = "Ξ";

/// A value returned by a call or carried in a receipt
#[derive(Debug, Clone, PartialEq)]
pub enum CallValue {
    Null,
    Bool(bool),
    Int(BigInteger),
    Text(String),
    List(Vec<CallValue>),
    Record(Vec<(String, CallValue)>),
}

impl CallValue {
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, CallValue)>) -> Self {
        CallValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Decoded outputs of a call: one output stands alone, several form a list
    pub fn from_outputs(values: &[DynSolValue]) -> Self {
        match values {
            [] => CallValue::Null,
            [single] => CallValue::from(single),
            many => CallValue::List(many.iter().map(CallValue::from).collect()),
        }
    }
}

impl From<&DynSolValue> for CallValue {
    fn from(value: &DynSolValue) -> Self {
        match value {
            DynSolValue::Bool(b) => CallValue::Bool(*b),
            DynSolValue::Uint(u, _) => CallValue::Int(BigInteger::positive(*u)),
            DynSolValue::Int(i, _) => CallValue::Int(BigInteger::new(i.is_negative(), i.unsigned_abs())),
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
                CallValue::List(items.iter().map(CallValue::from).collect())
            }
            other => CallValue::Text(to_form_text(other)),
        }
    }
}

/// How a result is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayResult {
    Empty,
    Number(i64),
    /// Ether amount with the currency glyph
    Ether(String),
    /// A 20-byte address, shown as an address reference
    Address(String),
    Text(String),
}

impl fmt::Display for DisplayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayResult::Empty => Ok(()),
            DisplayResult::Number(n) => write!(f, "{}", n),
            DisplayResult::Ether(s) | DisplayResult::Address(s) | DisplayResult::Text(s) => {
                f.write_str(s)
            }
        }
    }
}

fn looks_like_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x")
}

/// Format a wei amount as ether with the currency glyph
pub fn format_wei(value: &BigInteger) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    format!("{}{}{}", CURRENCY_GLYPH, sign, trim_ether(&format_ether(value.magnitude())))
}

fn trim_ether(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => formatted.to_string(),
    }
}

/// Render a value. `as_text` suppresses address references and keeps lists on
/// one line.
pub fn render(value: &CallValue, as_text: bool) -> DisplayResult {
    match value {
        CallValue::Null => DisplayResult::Empty,
        CallValue::Int(int) => match int.as_safe_integer() {
            Some(n) => DisplayResult::Number(n),
            None => DisplayResult::Ether(format_wei(int)),
        },
        CallValue::Text(s) if looks_like_address(s) => {
            if as_text {
                DisplayResult::Text(s.clone())
            } else {
                DisplayResult::Address(s.clone())
            }
        }
        CallValue::List(items) => {
            let items: Vec<Value> = items.iter().map(list_item).collect();
            let text = Value::Array(items).to_string();
            if as_text {
                DisplayResult::Text(text)
            } else {
                DisplayResult::Text(text.replace(',', ",\n"))
            }
        }
        other => DisplayResult::Text(
            serde_json::to_string_pretty(&to_json(other)).unwrap_or_default(),
        ),
    }
}

/// Elements of a rendered list: bools and safe numbers stay as they are,
/// everything else is rendered as text
fn list_item(value: &CallValue) -> Value {
    match value {
        CallValue::Bool(b) => Value::Bool(*b),
        CallValue::Null => Value::Null,
        CallValue::Text(s) => Value::String(s.clone()),
        CallValue::List(items) => Value::Array(items.iter().map(list_item).collect()),
        CallValue::Record(_) => to_json(value),
        CallValue::Int(_) => match render(value, true) {
            DisplayResult::Number(n) => json!(n),
            other => Value::String(other.to_string()),
        },
    }
}

/// Generic serialization; integers become decimal strings so 256-bit values
/// survive
fn to_json(value: &CallValue) -> Value {
    match value {
        CallValue::Null => Value::Null,
        CallValue::Bool(b) => Value::Bool(*b),
        CallValue::Int(int) => Value::String(int.to_string()),
        CallValue::Text(s) => Value::String(s.clone()),
        CallValue::List(items) => Value::Array(items.iter().map(to_json).collect()),
        CallValue::Record(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Text that, typed back into a form field, reproduces `value`
pub fn to_form_text(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Function(f) => format!("0x{}", hex::encode(f.as_slice())),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(form_json).collect()).to_string()
        }
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

fn form_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(form_json).collect())
        }
        other => Value::String(to_form_text(other)),
    }
}
