//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP clients (probe and discovery)
//! - DNS resolver
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::{init_discovery_client, init_probe_client};
pub use logger::{init_logger_to_file, init_logger_with};
pub use resolver::init_resolver;
