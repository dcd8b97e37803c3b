use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Network-status capability injected into [`CachedFetch`](super::CachedFetch).
///
/// Reporting offline makes a read skip the remote call and go straight to
/// the cached snapshot.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Assumes the network is reachable and lets the transport decide.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

#[async_trait]
impl Connectivity for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Connectivity flag flipped by the caller (`--offline`, tests).
#[derive(Debug)]
pub struct ManualConnectivity {
    online: AtomicBool,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

#[async_trait]
impl Connectivity for ManualConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}
