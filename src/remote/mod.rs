//! Client for the hosted relational data store (PostgREST over HTTPS).

mod client;
mod query;
mod tables;

pub use client::{RemoteError, SupabaseClient, DEFAULT_TIMEOUT};
pub use query::{sanitize_term, Direction, Query};
