//! Form state to call arguments

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::domain::abi::FunctionSpec;
use crate::domain::error::ScaffoldError;

use super::{FieldValue, FormState};

/// Literal spellings that count as `true` for a bool parameter
const TRUTHY: [&str; 5] = ["true", "1", "0x1", "0x01", "0x0001"];

/// One decoded argument, ready to be encoded against its parameter type
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgument {
    /// Arrays and tuples, parsed from a JSON literal
    Structured(Value),
    Bool(bool),
    /// Passed through as the widget produced it
    Raw(FieldValue),
}

fn is_structured(base_type: &str) -> bool {
    base_type == "tuple" || (base_type.ends_with(']') && base_type.contains('['))
}

/// Turn the form into an ordered argument list. Fields that fail to decode are
/// left out instead of failing the whole call; the call attempt reports the
/// mismatch.
pub fn marshal(form: &FormState) -> Vec<CallArgument> {
    form.iter()
        .filter_map(|(key, value)| {
            let base_type = key.base_type();
            if is_structured(base_type) {
                serde_json::from_str(&value.to_string())
                    .map(CallArgument::Structured)
                    .ok()
            } else if base_type == "bool" {
                let text = value.to_string();
                Some(CallArgument::Bool(TRUTHY.contains(&text.as_str())))
            } else {
                Some(CallArgument::Raw(value.clone()))
            }
        })
        .collect()
}

/// Encode marshalled arguments against the function's parameter types
pub fn encode_arguments(
    function: &FunctionSpec,
    arguments: &[CallArgument],
) -> Result<Vec<DynSolValue>, ScaffoldError> {
    let params = &function.function.inputs;
    if params.len() != arguments.len() {
        return Err(ScaffoldError::Decode {
            field: function.name().to_string(),
            reason: format!(
                "expected {} arguments, got {}",
                params.len(),
                arguments.len()
            ),
        });
    }

    params
        .iter()
        .zip(arguments)
        .enumerate()
        .map(|(index, (param, argument))| {
            let field = if param.name.is_empty() {
                format!("input {index}")
            } else {
                param.name.clone()
            };
            let ty = param.resolve().map_err(|e| ScaffoldError::Decode {
                field: field.clone(),
                reason: e.to_string(),
            })?;
            encode_argument(&ty, argument).map_err(|e| ScaffoldError::Decode {
                field,
                reason: format!("{e:#}"),
            })
        })
        .collect()
}

fn encode_argument(ty: &DynSolType, argument: &CallArgument) -> Result<DynSolValue> {
    match argument {
        CallArgument::Bool(value) => match ty {
            DynSolType::Bool => Ok(DynSolValue::Bool(*value)),
            other => bail!("bool given for {}", other),
        },
        // Strings pass through as typed; the literal parser would strip quotes
        CallArgument::Raw(value) => match ty {
            DynSolType::String => Ok(DynSolValue::String(value.to_string())),
            _ => {
                let text = value.to_string();
                ty.coerce_str(text.trim())
                    .with_context(|| format!("'{}' is not a valid {}", text, ty))
            }
        },
        CallArgument::Structured(value) => json_to_sol(ty, value),
    }
}

/// Build a value of type `ty` from a parsed JSON literal
fn json_to_sol(ty: &DynSolType, value: &Value) -> Result<DynSolValue> {
    match (ty, value) {
        (DynSolType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| json_to_sol(inner, item))
            .collect::<Result<Vec<_>>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                bail!("expected {} elements, got {}", len, items.len());
            }
            items
                .iter()
                .map(|item| json_to_sol(inner, item))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                bail!("expected {} tuple members, got {}", types.len(), items.len());
            }
            types
                .iter()
                .zip(items)
                .map(|(ty, item)| json_to_sol(ty, item))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::Tuple)
        }
        (DynSolType::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (DynSolType::String, Value::String(s)) => Ok(DynSolValue::String(s.clone())),
        (_, Value::String(s)) => ty
            .coerce_str(s)
            .with_context(|| format!("'{}' is not a valid {}", s, ty)),
        (_, Value::Number(n)) => ty
            .coerce_str(&n.to_string())
            .with_context(|| format!("{} is not a valid {}", n, ty)),
        (_, Value::Bool(b)) => Err(anyhow!("{} given for {}", b, ty)),
        (_, other) => Err(anyhow!("cannot use {} as {}", other, ty)),
    }
}

#[cfg(test)]
mod tests {
    use alloy_json_abi::Function;
    use alloy_primitives::{Address, FixedBytes, I256, U256};

    use super::*;

    fn spec(signature: &str) -> FunctionSpec {
        FunctionSpec::new(Function::parse(signature).unwrap())
    }

    fn filled(function: &FunctionSpec, values: &[&str]) -> FormState {
        let mut form = FormState::for_function(function);
        for (key, value) in function.field_keys().iter().zip(values) {
            form.update(key, (*value).into());
        }
        form
    }

    #[test]
    fn test_bool_normalization() {
        let function = spec("function f(bool a, bool b, bool c, bool d, bool e, bool g)");
        let form = filled(&function, &["true", "0x0001", "TRUE", "2", "false", ""]);
        assert_eq!(
            marshal(&form),
            vec![
                CallArgument::Bool(true),
                CallArgument::Bool(true),
                CallArgument::Bool(false),
                CallArgument::Bool(false),
                CallArgument::Bool(false),
                CallArgument::Bool(false),
            ]
        );
    }

    #[test]
    fn test_malformed_tuple_is_dropped_in_order() {
        let function = spec(
            "function f(uint256 a, (uint256,address) pos, address[] who, string note)",
        );
        let form = filled(&function, &["7", "[1, 0x", r#"["0x0000000000000000000000000000000000000001"]"#, "hi"]);
        let args = marshal(&form);
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], CallArgument::Raw("7".into()));
        assert!(matches!(args[1], CallArgument::Structured(Value::Array(_))));
        assert_eq!(args[2], CallArgument::Raw("hi".into()));
    }

    #[test]
    fn test_one_bad_tuple_among_three_valid_fields() {
        let function = spec("function f((uint8,bool) a, (uint8,bool) b, uint8 c, string d)");
        let form = filled(&function, &["[1, true]", "{oops", "3", "x"]);
        // three valid fields survive, the bad one is gone
        assert_eq!(marshal(&form).len(), 3);

        let function = spec("function f((uint8,bool) a, uint8 c, string d)");
        let form = filled(&function, &["not json", "3", "x"]);
        let args = marshal(&form);
        assert_eq!(
            args,
            vec![CallArgument::Raw("3".into()), CallArgument::Raw("x".into())]
        );
    }

    #[test]
    fn test_encode_structured_and_raw() {
        let function = spec("function f(uint256[] xs, (uint8,address) pair, bool ok, int16 n)");
        let form = filled(
            &function,
            &[
                "[1, \"2\"]",
                r#"[5, "0x0000000000000000000000000000000000000002"]"#,
                "1",
                "-300",
            ],
        );
        let values = encode_arguments(&function, &marshal(&form)).unwrap();
        assert_eq!(
            values[0],
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(1u64), 256),
                DynSolValue::Uint(U256::from(2u64), 256),
            ])
        );
        assert_eq!(
            values[1],
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(5u64), 8),
                DynSolValue::Address(Address::with_last_byte(2)),
            ])
        );
        assert_eq!(values[2], DynSolValue::Bool(true));
        assert!(matches!(values[3], DynSolValue::Int(_, 16)));
    }

    #[test]
    fn test_dropped_field_surfaces_at_encode_time() {
        let function = spec("function f(uint256[] xs, uint256 y)");
        let form = filled(&function, &["[1,", "2"]);
        let err = encode_arguments(&function, &marshal(&form)).unwrap_err();
        assert!(err.to_string().contains("expected 2 arguments, got 1"));
    }

    #[test]
    fn test_invalid_scalar_reports_field() {
        let function = spec("function f(address to)");
        let form = filled(&function, &["0x12"]);
        let err = encode_arguments(&function, &marshal(&form)).unwrap_err();
        assert!(err.to_string().contains("to"));
    }

    #[test]
    fn test_populated_form_encodes_back_to_the_same_values() {
        let function = spec(
            "function f(uint256 a, int16 b, address c, bool d, bool e, bytes g, bytes4 h, \
             string i, string j, string k, (uint8,string,bool,int8) t, string[] s)",
        );
        let values = vec![
            DynSolValue::Uint(U256::from(1000u64), 256),
            DynSolValue::Int("-300".parse::<I256>().unwrap(), 16),
            DynSolValue::Address(Address::with_last_byte(7)),
            DynSolValue::Bool(true),
            DynSolValue::Bool(false),
            DynSolValue::Bytes(vec![0x01, 0x02, 0xff]),
            DynSolValue::FixedBytes(FixedBytes::right_padding_from(&[0xde, 0xad, 0xbe, 0xef]), 4),
            DynSolValue::String("plain".into()),
            DynSolValue::String("\"quoted\"".into()),
            DynSolValue::String(" padded ".into()),
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(5u64), 8),
                DynSolValue::String(" \"inner\" ".into()),
                DynSolValue::Bool(true),
                DynSolValue::Int("-5".parse::<I256>().unwrap(), 8),
            ]),
            DynSolValue::Array(vec![
                DynSolValue::String("\"q\"".into()),
                DynSolValue::String("x ".into()),
            ]),
        ];

        let mut form = FormState::for_function(&function);
        form.populate(&function, &values);

        assert_eq!(encode_arguments(&function, &marshal(&form)).unwrap(), values);
    }

    #[test]
    fn test_string_fields_are_not_unquoted() {
        let function = spec("function f(string note)");
        let form = filled(&function, &["\"hi\"  "]);
        assert_eq!(
            encode_arguments(&function, &marshal(&form)).unwrap(),
            vec![DynSolValue::String("\"hi\"  ".into())]
        );
    }
}
