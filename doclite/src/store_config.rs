//! Engine configuration.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::DEFAULT_MAX_PIPELINE_STAGES;
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

/// Settings of a [Store](crate::Store).
///
/// `StoreConfig` is shared by the store and every clone of it; changes made
/// through [StoreConfig::set_auto_create_collections] or
/// [StoreConfig::set_max_pipeline_stages] are seen by subsequent operations.
///
/// | setting                   | default | effect                                                |
/// |---------------------------|---------|-------------------------------------------------------|
/// | `auto_create_collections` | `true`  | writes to an unknown collection create it             |
/// | `max_pipeline_stages`     | `64`    | longer pipelines fail with [ErrorKind::InvalidStage]  |
#[derive(Clone)]
pub struct StoreConfig {
    inner: Arc<StoreConfigInner>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        StoreConfig {
            inner: Arc::new(StoreConfigInner::new()),
        }
    }
}

impl Deref for StoreConfig {
    type Target = Arc<StoreConfigInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct StoreConfigInner {
    auto_create_collections: AtomicBool,
    max_pipeline_stages: AtomicUsize,
}

impl StoreConfigInner {
    fn new() -> Self {
        StoreConfigInner {
            auto_create_collections: AtomicBool::new(true),
            max_pipeline_stages: AtomicUsize::new(DEFAULT_MAX_PIPELINE_STAGES),
        }
    }

    pub fn auto_create_collections(&self) -> bool {
        self.auto_create_collections.load(Ordering::Relaxed)
    }

    pub fn set_auto_create_collections(&self, enabled: bool) {
        self.auto_create_collections.store(enabled, Ordering::Relaxed);
    }

    pub fn max_pipeline_stages(&self) -> usize {
        self.max_pipeline_stages.load(Ordering::Relaxed)
    }

    /// Sets the maximum number of stages a pipeline may have.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if `max_stages` is zero.
    pub fn set_max_pipeline_stages(&self, max_stages: usize) -> DocliteResult<()> {
        if max_stages == 0 {
            log::error!("Maximum pipeline stages must be positive");
            return Err(DocliteError::new(
                "Maximum pipeline stages must be positive",
                ErrorKind::InvalidOperation,
            ));
        }
        self.max_pipeline_stages.store(max_stages, Ordering::Relaxed);
        Ok(())
    }
}
