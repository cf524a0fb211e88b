//! ABI domain models
//!
//! Contract metadata, function partitioning, input widget selection and
//! integer range rules. Nothing here talks to a node.

mod contract;
mod function;
mod integer;
mod widget;

pub use contract::{parse_contracts_file, ContractCodeStatus, DeployedContract};
pub use function::{ContractFunctions, FunctionKind, FunctionSpec, ParameterSpec};
pub use integer::{
    coerce_integer, is_plain_number, is_valid_integer, multiply_by_1e18, BigInteger, Coercion,
    IntegerVariant,
};
pub use widget::{classify, convert_bytes, convert_bytes32, placeholder, WidgetKind};
