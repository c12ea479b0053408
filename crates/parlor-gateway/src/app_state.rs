//! Shared application state for the parlor gateway.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::directory::SessionDirectory;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    directory: SessionDirectory,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Self {
        let capacity = match cfg.matching.queue_capacity {
            0 => None,
            n => Some(n),
        };
        let directory = SessionDirectory::new(capacity, cfg.matching.table_id_prefix.clone());
        Self {
            inner: Arc::new(AppStateInner { cfg, directory }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.inner.directory
    }
}
