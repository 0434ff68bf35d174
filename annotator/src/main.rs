//! Binary entrypoint for the namespace-annotator webhook.

use std::sync::Arc;

use annotator::{config::Config, service, webhook::NamespaceAnnotator};
use annotator_core::admission::Decoder;
use anyhow::Result;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::parse();

    let handler = Arc::new(NamespaceAnnotator::new(Decoder::new()));
    let app = service::app(handler);

    match (&config.tls_cert, &config.tls_key) {
        (Some(cert), Some(key)) => {
            if rustls::crypto::CryptoProvider::get_default().is_none() {
                // the only error here is a concurrent install, which we can ignore
                let _ = rustls::crypto::ring::default_provider().install_default();
            }
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!(addr = %config.addr, path = service::MUTATE_PATH, "serving admission reviews over TLS");
            axum_server::bind_rustls(config.addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            info!(addr = %config.addr, path = service::MUTATE_PATH, "serving admission reviews over plain HTTP");
            axum_server::bind(config.addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}
