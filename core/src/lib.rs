//! # edgescan core
//!
//! The measurement pipeline:
//!
//! 1. [`probe`]: connect, time the handshake, ask the node who it is.
//! 2. [`speed`]: download a reference file from every survivor.
//! 3. [`rank`]: order the records by the active key.
//!
//! [`pipeline`] wires the stages together through the bounded [`pool`].
//! Everything that touches a socket goes through the [`network::transport`]
//! seam so the stages can be driven by a fake network in tests.

pub mod directory;
pub mod network;
pub mod pipeline;
pub mod pool;
pub mod probe;
pub mod progress;
pub mod rank;
pub mod report;
pub mod speed;
pub mod trace;
