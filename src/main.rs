use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use std::net::SocketAddr;

        use anyhow::Context;
        use axum::{middleware, Router};
        use dotenv::dotenv;
        use env_logger::Env;
        use gdn::api;
        use gdn::app::*;
        use gdn::config::ServerConfig;
        use gdn::database::establish_connection;
        use gdn::middleware::trace_requests;
        use gdn::state::{ApiState, AppState};
        use leptos::prelude::*;
        use leptos_axum::{generate_route_list, LeptosRoutes};
        use tokio_util::sync::CancellationToken;

        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            dotenv().ok();
            env_logger::init_from_env(Env::default().default_filter_or("info"));

            let conf = get_configuration(None)?;
            let addr = conf.leptos_options.site_addr;
            let leptos_options = conf.leptos_options;

            let config = ServerConfig::from_env()?;
            let pool = establish_connection(&config.database_url)
                .context("Failed to create database pool")?;
            let api_state = ApiState::new(config, pool);
            api_state
                .photos
                .ensure_dir()
                .await
                .with_context(|| format!("Cannot create {}", api_state.photos.dir().display()))?;

            let shutdown = CancellationToken::new();
            let janitor = api_state.visitors.clone().spawn_janitor(shutdown.clone());

            let routes = generate_route_list(App);

            let app_state = AppState {
                leptos_options: leptos_options.clone(),
                api: api_state.clone(),
            };

            let app = Router::new()
                .nest("/api/v1", api::router(api_state))
                .leptos_routes(&app_state, routes, {
                    let leptos_options = leptos_options.clone();
                    move || shell(leptos_options.clone())
                })
                .fallback(leptos_axum::file_and_error_handler::<AppState, _>(shell))
                .layer(middleware::from_fn(trace_requests))
                .with_state(app_state);

            log::info!("Starting server at {addr}");

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            log::info!("listening on http://{}", &addr);
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for shutdown signal: {e}");
                    }
                    log::info!("Shutting down");
                })
                .await?;

            shutdown.cancel();
            janitor.await?;
            Ok(())
        }
    } else {
        pub fn main() {
            // no client-side main function
            // see lib.rs for hydration function instead
        }
    }
}
