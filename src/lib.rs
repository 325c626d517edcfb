// ABOUTME: Library root for convoy - exposes operations and types for testing.
// ABOUTME: The binaries live in src/bin.

pub mod aws;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod metadata;
pub mod output;
pub mod presence;
pub mod types;
