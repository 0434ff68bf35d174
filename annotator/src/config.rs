//! Command line configuration for the webhook server.

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Serving options for the namespace-annotator webhook.
#[derive(Parser, Debug)]
#[command(name = "namespace-annotator", version)]
pub struct Config {
    /// Socket address to serve admission reviews on.
    #[arg(long, default_value = "0.0.0.0:8443")]
    pub addr: SocketAddr,

    /// PEM certificate chain used to terminate TLS.
    ///
    /// When the TLS flags are omitted the server binds plain HTTP, for use
    /// behind a TLS-terminating proxy or in local testing.
    #[arg(long, requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key matching `--tls-cert`.
    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}
