use std::sync::Arc;

use common::notify::Notifier;
use configs::AppConfig;
use service::records::{RecordService, RecordStore};

/// Shared handler state; everything in it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordService<dyn RecordStore>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Option<Arc<dyn Notifier>>, config: Arc<AppConfig>) -> Self {
        Self { records: Arc::new(RecordService::new(store)), notifier, config }
    }
}
