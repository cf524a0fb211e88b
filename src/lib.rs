//! Scaffold: a terminal debug UI for the contracts of a local Ethereum
//! development chain.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod ui;
