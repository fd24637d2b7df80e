//! Signals the node store delivers to the engine

/// Notifications the node store is contracted to forward to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSignal {
    /// Bulk invalidation: every counter and cache is reset
    CacheCleared,
    /// Bootstrap is over; the process is in steady state
    BootstrapFinished,
    /// A node was created or replaced with new content
    NodeChanged {
        /// Node id
        id: String,
        /// Content version of the new content
        content_digest: String,
    },
}
