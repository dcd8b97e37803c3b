//! Cache-aside reads with a single persisted snapshot per key.
//!
//! - [`CacheKey`]: the registry of slot names
//! - [`CachedFetch`]: remote first, snapshot on failure, empty as last resort
//! - [`FallbackOnError`]: the error policy behind it
//! - [`Connectivity`]: injected network status
//!
//! Snapshots carry no expiry and no staleness marker. A snapshot is served
//! until it is overwritten by the next successful read or cleared.

mod cached_fetch;
mod connectivity;
mod fallback;
mod keys;

pub use cached_fetch::CachedFetch;
pub use connectivity::{AlwaysOnline, Connectivity, ManualConnectivity};
pub use fallback::FallbackOnError;
pub use keys::{CacheKey, CacheKeyError};
