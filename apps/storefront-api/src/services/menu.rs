//! Menu catalog reads.

use std::sync::Arc;

use toohot_core::MenuItem;
use tracing::debug;

use crate::error::ServiceResult;
use crate::AppState;

pub struct MenuService {
    state: Arc<AppState>,
}

impl MenuService {
    pub fn new(state: Arc<AppState>) -> Self {
        MenuService { state }
    }

    /// Orderable items, by category then English name.
    pub async fn list_available(&self) -> ServiceResult<Vec<MenuItem>> {
        let items = self.state.db.menu().list_available().await?;
        debug!(count = items.len(), "Serving menu");
        Ok(items)
    }

    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.state.db.menu().categories().await?)
    }
}
