//! Once-only engine initialization.
//!
//! Starting the engines is expensive (tool discovery, version checks). The handle
//! guarantees at most one successful initialization per handle: concurrent
//! callers arriving while it is in flight wait for that same attempt. A failed
//! attempt leaves the handle empty, so the next caller starts over.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::engine::{EngineProvider, EngineSet};
use crate::error::{EngineError, Result};

/// Lazily-initialized, shared engine set.
pub struct EngineHandle {
    provider: Arc<dyn EngineProvider>,
    engines: OnceCell<EngineSet>,
    init_timeout: Option<Duration>,
}

impl EngineHandle {
    /// Create a handle that initializes through `provider` on first use.
    #[must_use]
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        Self {
            provider,
            engines: OnceCell::new(),
            init_timeout: None,
        }
    }

    /// Bound each initialization attempt; `None` waits indefinitely.
    #[must_use]
    pub fn with_init_timeout(mut self, init_timeout: Option<Duration>) -> Self {
        self.init_timeout = init_timeout;
        self
    }

    /// True once an initialization attempt has succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.engines.initialized()
    }

    /// Get the engines, initializing them if no attempt has succeeded yet.
    ///
    /// # Errors
    /// Returns [`EngineError::Init`] (or whatever the provider reports) when
    /// initialization fails, and [`EngineError::InitTimeout`] when it exceeds
    /// the configured bound. Neither is cached.
    pub async fn ready(&self) -> Result<&EngineSet> {
        self.engines.get_or_try_init(|| self.initialize()).await
    }

    async fn initialize(&self) -> Result<EngineSet> {
        info!("initializing engines");
        let attempt = self.provider.initialize();
        let result = match self.init_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::InitTimeout(limit)),
            },
            None => attempt.await,
        };

        match &result {
            Ok(_) => info!("engines ready"),
            Err(error) => warn!(%error, "engine initialization failed; next request retries"),
        }
        result
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("ready", &self.is_ready())
            .field("init_timeout", &self.init_timeout)
            .finish_non_exhaustive()
    }
}
