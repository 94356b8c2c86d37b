//! Shared test helpers for `autopost-core` integration tests.
//!
//! Lightweight mocks for the automation ports so cycle tests can focus on
//! behaviour instead of boilerplate.

pub mod mocks;
