// SPDX-License-Identifier: GPL-2.0-or-later
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use earmark::cli::{self, Backend};
use earmark::config::{Config, HttpApi};
use earmark::store::{ClipStore, MemoryStore, PostgrestStore};
use earmark::{web, Error};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let opts = cli::Earmark::parse();
    let config = opts.config();

    if let Err(e) = process_command(opts.command, config).await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn process_command(command: cli::Command, config: Config) -> Result<(), Error> {
    match command {
        cli::Command::Run { backend } => match backend {
            Backend::Postgrest => {
                let store = PostgrestStore::new(&config.store)?;
                serve(config.http_api, web::create_router(store)).await
            }
            Backend::Memory => {
                info!("Using the in-memory store; clips will be lost on exit");
                serve(config.http_api, web::create_router(MemoryStore::new())).await
            }
        },
        cli::Command::Check {} => {
            let store = PostgrestStore::new(&config.store)?;
            let clips = store.count().await?;
            println!("The clip store is reachable and holds {clips} clips");
            Ok(())
        }
    }
}

async fn serve(http_api: HttpApi, router: Router) -> Result<(), Error> {
    let http_handle = axum_server::Handle::new();
    let handle = http_handle.clone();
    tokio::spawn(async move {
        let _shutdown_signal = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received; beginning graceful shutdown.");
        handle.graceful_shutdown(Some(Duration::from_secs(15)));
    });

    match (http_api.tls_certificate, http_api.tls_key) {
        (None, None) => {
            info!("Starting HTTP server on {:?}", &http_api.url);
            axum_server::bind(http_api.url)
                .handle(http_handle)
                .serve(router.into_make_service())
                .await
                .map_err(Error::Server)
        }
        (Some(cert), Some(key)) => {
            info!("Starting HTTPS server on {:?}", &http_api.url);
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
                .await
                .map_err(Error::Server)?;
            axum_server::bind_rustls(http_api.url, tls_config)
                .handle(http_handle)
                .serve(router.into_make_service())
                .await
                .map_err(Error::Server)
        }
        _ => Err(Error::ConfigValueError(
            "'tls_certificate' and 'tls_key' must both be set or neither should be set.".into(),
        )),
    }
}
