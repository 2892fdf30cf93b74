//! Command implementations for the sagekit CLI.

pub mod config;
pub mod demo;
pub mod fields;
pub mod validate;
