use crate::errors::{DocliteError, DocliteResult};
use crate::store::Store;
use crate::store_config::StoreConfig;

/// Fluent builder for a [Store].
///
/// The first invalid setting is remembered and reported by
/// [StoreBuilder::open]; later settings are ignored once an error is captured.
///
/// ```rust
/// use doclite::Store;
///
/// let store = Store::builder()
///     .auto_create_collections(false)
///     .max_pipeline_stages(8)
///     .open()
///     .unwrap();
/// assert!(store.insert("items", doclite::doc! { "a": 1 }).is_err());
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    error: Option<DocliteError>,
    config: StoreConfig,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder {
            error: None,
            config: StoreConfig::new(),
        }
    }

    pub fn auto_create_collections(self, enabled: bool) -> Self {
        if self.error.is_none() {
            self.config.set_auto_create_collections(enabled);
        }
        self
    }

    pub fn max_pipeline_stages(mut self, max_stages: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_max_pipeline_stages(max_stages) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn open(self) -> DocliteResult<Store> {
        if let Some(error) = self.error {
            return Err(error);
        }
        log::debug!(
            "Opening store with auto_create_collections = {}, max_pipeline_stages = {}",
            self.config.auto_create_collections(),
            self.config.max_pipeline_stages()
        );
        Ok(Store::with_config(self.config))
    }
}
