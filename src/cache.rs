use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::PredictResult;
use crate::model::ModelParameters;

/// Holds the model parameters for the lifetime of the process.
///
/// The first successful load is retained and shared; there is no refresh.
/// Cold-start callers serialize on `init` so the loader runs at most once per
/// successful population. A failed load leaves the cache empty.
#[derive(Debug, Default)]
pub struct ModelCache {
    slot: RwLock<Option<Arc<ModelParameters>>>,
    init: Mutex<()>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<ModelParameters>> {
        self.slot.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    pub fn get_or_load<F>(&self, loader: F) -> PredictResult<Arc<ModelParameters>>
    where
        F: FnOnce() -> PredictResult<ModelParameters>,
    {
        if let Some(params) = self.get() {
            return Ok(params);
        }

        let _guard = self.init.lock();
        // Another caller may have finished loading while we waited.
        if let Some(params) = self.get() {
            return Ok(params);
        }

        let params = Arc::new(loader()?);
        *self.slot.write() = Some(params.clone());
        Ok(params)
    }
}
