use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::JsonStore;
use crate::services::messaging::MessagingProvider;
use crate::services::notify::AdminNotifier;

pub struct AppState {
    pub store: JsonStore,
    pub config: AppConfig,
    pub messaging: Arc<dyn MessagingProvider>,
    pub notifier: AdminNotifier,
}

impl AppState {
    pub fn new(store: JsonStore, config: AppConfig, messaging: Arc<dyn MessagingProvider>) -> Self {
        let notifier = AdminNotifier::new(Arc::clone(&messaging), config.admin_ids.clone());
        Self {
            store,
            config,
            messaging,
            notifier,
        }
    }
}
