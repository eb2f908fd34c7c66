//! Shared application state
//!
//! Handed to every request handler through axum's `State` extractor.

use std::sync::Arc;

use crate::storage::StoreRoot;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<StoreRoot>,
}

impl AppState {
    pub fn new(store: StoreRoot) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
