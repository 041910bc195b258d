//! Shared building blocks for `edgescan`.
//!
//! * [`network`]: IPv4 ranges and input-target parsing (the address expander).
//! * [`edge`]: datacenter directory and probe/measurement records.
//! * [`config`]: the run configuration, built once at startup.
//! * [`error`]: error types for target parsing and per-candidate probing.

pub mod config;
pub mod edge;
pub mod error;
pub mod log;
pub mod network;
