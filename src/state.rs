use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, MessageService, SeaOrmAccountService, SeaOrmMessageService,
    SeaOrmSocialService, SocialService,
};

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub accounts: Arc<dyn AccountService>,

    pub social: Arc<dyn SocialService>,

    pub messages: Arc<dyn MessageService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Connects to the database (applying migrations) and wires the services.
    pub async fn from_config(
        config: Config,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Arc<Self>> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Arc::new(Self::with_store(config, store, prometheus_handle)))
    }

    #[must_use]
    pub fn with_store(
        config: Config,
        store: Store,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        let accounts = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService>;
        let social = Arc::new(SeaOrmSocialService::new(store.clone())) as Arc<dyn SocialService>;
        let messages =
            Arc::new(SeaOrmMessageService::new(store.clone())) as Arc<dyn MessageService>;

        Self {
            config: Arc::new(config),
            store,
            accounts,
            social,
            messages,
            prometheus_handle,
        }
    }
}
