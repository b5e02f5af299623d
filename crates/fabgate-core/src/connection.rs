//! TLS channel to the gateway peer

use crate::config::Config;
use crate::error::Result;
use crate::identity::check_certificate;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::info;

/// build a lazily connected channel trusting only `ca_pem`
///
/// the server certificate must be issued for the host part of the peer address.
/// nothing is dialed until the first RPC, so errors here are configuration errors.
pub fn connect(config: &Config, ca_pem: &[u8]) -> Result<Channel> {
    check_certificate(ca_pem)?;

    let tls = ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(ca_pem))
        .domain_name(config.gateway_host());

    let endpoint = Endpoint::from_shared(config.endpoint())?.tls_config(tls)?;

    info!(
        "gateway endpoint {} (tls server name {})",
        config.endpoint(),
        config.gateway_host()
    );
    Ok(endpoint.connect_lazy())
}
