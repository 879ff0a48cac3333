//! The `serve` command: run the credential proxy.

use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::proxy;
use std::net::{IpAddr, SocketAddr};

/// Handles `serve`.
pub async fn run(config: &Config, port: Option<u16>) -> Result<()> {
    let addr: IpAddr = config
        .proxy
        .listen_addr
        .parse()
        .map_err(|e| ProbeError::config(format!("Invalid proxy listen address: {e}")))?;
    let addr = SocketAddr::new(addr, port.unwrap_or(config.proxy.port));

    proxy::start(addr)
        .await
        .map_err(|e| ProbeError::internal(format!("Proxy server failed: {e}")))
}
