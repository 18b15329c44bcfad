//! Shared helpers: external command execution and path handling.

pub mod exec;
pub mod path;
