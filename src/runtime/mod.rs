//! Runtime adapters.

#[cfg(feature = "tokio-runtime")]
mod tokio_bridge;
