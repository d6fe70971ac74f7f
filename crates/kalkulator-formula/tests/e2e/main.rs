//! End-to-end tests for kalkulator-formula.
//!
//! Each test builds a formula the way the admin form stores it (raw JSON or
//! the `RawFormula` helpers), runs it through a `Calculator`, and asserts on
//! the rendered `Outcome`.

mod common;
mod conditional;
mod normalization;
mod single;
mod whitelist;

// Re-export common utilities for submodules
pub use common::*;
