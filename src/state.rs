use std::sync::Arc;

use crate::app::ports::RecordStore;

/// Shared handler state. The store is the only dependency; nothing else is
/// kept between requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
