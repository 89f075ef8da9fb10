//! CLI command implementations.

pub mod common;
pub mod decompose;
pub mod gates;
pub mod run;
