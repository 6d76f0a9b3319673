//! Adapta CLI library: the command implementations behind the `adapta`
//! binary, exposed so they can be exercised from integration tests.

pub mod commands;
