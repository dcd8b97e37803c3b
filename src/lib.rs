//! Offline-tolerant news reader client.
//!
//! Lists are read from a hosted PostgREST backend through a cache-aside
//! path: the remote answer is persisted to a local slot, and a failed read
//! is answered from that slot instead of surfacing an error.

pub mod cache;
pub mod config;
pub mod models;
pub mod output;
pub mod reader;
pub mod remote;
pub mod storage;
