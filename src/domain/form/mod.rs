//! Function forms: field keys, field state and argument marshalling

mod key;
mod marshal;
mod state;

pub use key::FieldKey;
pub use marshal::{encode_arguments, marshal, CallArgument};
pub use state::{field_status, FieldStatus, FieldValue, FormState};
