use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use std::sync::Arc;

        use axum::extract::FromRef;
        use leptos::prelude::LeptosOptions;

        use crate::config::ServerConfig;
        use crate::database::DbPool;
        use crate::services::PhotoStore;
        use crate::visitors::VisitorRegistry;

        /// Everything the `/api/v1` handlers share.
        #[derive(Clone)]
        pub struct ApiState {
            pub config: Arc<ServerConfig>,
            pub pool: DbPool,
            pub photos: PhotoStore,
            pub visitors: Arc<VisitorRegistry>,
        }

        impl ApiState {
            pub fn new(config: ServerConfig, pool: DbPool) -> Self {
                Self {
                    photos: PhotoStore::new(config.photo_dir.clone()),
                    config: Arc::new(config),
                    pool,
                    visitors: Arc::new(VisitorRegistry::new()),
                }
            }
        }

        #[derive(FromRef, Clone)]
        pub struct AppState {
            pub leptos_options: LeptosOptions,
            pub api: ApiState,
        }
    }
}
