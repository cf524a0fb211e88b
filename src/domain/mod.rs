//! Domain layer - pure models with no I/O

pub mod abi;
pub mod display;
pub mod error;
pub mod form;

pub use error::ScaffoldError;
