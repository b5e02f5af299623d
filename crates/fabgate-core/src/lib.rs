//! fabgate core - client side of the Fabric gateway protocol
//!
//! everything a single-shot gateway client needs:
//! - environment configuration ([`Config`])
//! - msp credential store reading and X.509 identity / P-256 signer bootstrap
//! - TLS channel construction pinned to one CA
//! - proposal assembly and the evaluate / endorse / submit / commit-status flow
//!
//! the network itself (ordering, endorsement, validation) is remote; this crate only
//! builds, signs and sends the messages.

pub mod action;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod output;
pub mod proposal;
pub mod proto;
pub mod sign;
pub mod store;

pub use action::Action;
pub use client::{GatewayClient, GatewayRpc};
pub use config::Config;
pub use error::{GatewayError, Result};
pub use gateway::{Contract, Gateway, GatewayOptions, Network};
pub use identity::X509Identity;
pub use output::format_result;
pub use sign::{HashAlgorithm, Signer};

use tracing::debug;

/// identity from the msp `signcerts` directory
pub fn load_identity(config: &Config) -> Result<X509Identity> {
    let dir = config.cert_dir();
    debug!("loading certificate from {}", dir.display());
    let pem = store::read_single_file(&dir)?;
    X509Identity::new(config.msp_id.clone(), pem)
}

/// signer from the msp `keystore` directory
pub fn load_signer(config: &Config) -> Result<Signer> {
    let dir = config.key_dir();
    debug!("loading private key from {}", dir.display());
    let pem = store::read_single_file(&dir)?;
    Signer::from_pem(&pem)
}

/// TLS root certificate bytes
pub fn load_tls_ca(config: &Config) -> Result<Vec<u8>> {
    let path = config.tls_ca_file();
    debug!("loading TLS root certificate from {}", path.display());
    std::fs::read(&path).map_err(|e| GatewayError::io(&path, e))
}
