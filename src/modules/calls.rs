//! Building and decoding contract calls from function forms

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::Function;
use anyhow::{Context, Result};

use crate::domain::abi::{coerce_integer, Coercion, FunctionSpec};
use crate::domain::display::CallValue;
use crate::domain::error::ScaffoldError;
use crate::domain::form::{encode_arguments, marshal, FormState};
use crate::infrastructure::ethereum::EthereumProvider;

/// Selector followed by the encoded form arguments
pub fn build_calldata(function: &FunctionSpec, form: &FormState) -> Result<Bytes, ScaffoldError> {
    let values = encode_arguments(function, &marshal(form))?;
    function
        .function
        .abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| ScaffoldError::Decode {
            field: function.name().to_string(),
            reason: e.to_string(),
        })
}

/// Wei amount typed into a payable function's value field; empty means zero
pub fn parse_value(text: &str) -> Result<U256, ScaffoldError> {
    let invalid = |reason: &str| ScaffoldError::Validation {
        field: "value".to_string(),
        reason: reason.to_string(),
    };
    match coerce_integer(text) {
        Coercion::Value(value) if value.is_negative() => Err(invalid("must not be negative")),
        Coercion::Value(value) => Ok(value.magnitude()),
        Coercion::Overflow => Err(invalid("exceeds uint256")),
        Coercion::NotInteger => Err(invalid("not an integer amount of wei")),
    }
}

pub fn read_request(to: Address, calldata: Bytes) -> TransactionRequest {
    TransactionRequest::default().to(to).input(calldata.into())
}

/// A write sent from `from`; `None` leaves the sender unset so the transactor
/// reports the missing account
pub fn write_request(
    from: Option<Address>,
    to: Address,
    calldata: Bytes,
    value: U256,
) -> TransactionRequest {
    let request = TransactionRequest::default()
        .to(to)
        .value(value)
        .input(calldata.into());
    match from {
        Some(from) => request.from(from),
        None => request,
    }
}

pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<DynSolValue>> {
    function
        .abi_decode_output(data)
        .with_context(|| format!("decode output of {}", function.name))
}

/// `eth_call` a view function and decode what it returns
pub async fn read_function(
    provider: &dyn EthereumProvider,
    to: Address,
    function: &FunctionSpec,
    form: &FormState,
) -> Result<(Vec<DynSolValue>, CallValue)> {
    let calldata = build_calldata(function, form)?;
    call_prepared(provider, to, &function.function, calldata).await
}

/// `eth_call` with calldata that was already encoded
pub async fn call_prepared(
    provider: &dyn EthereumProvider,
    to: Address,
    function: &Function,
    calldata: Bytes,
) -> Result<(Vec<DynSolValue>, CallValue)> {
    let data = provider
        .call(read_request(to, calldata))
        .await
        .with_context(|| format!("call {}", function.signature()))?;
    let values = decode_output(function, &data)?;
    let rendered = CallValue::from_outputs(&values);
    Ok((values, rendered))
}
