//! environment configuration
//!
//! every value the client needs is read once from the process environment into an
//! immutable [`Config`], which is then passed down explicitly.

use crate::error::{GatewayError, Result};
use std::path::{Path, PathBuf};

pub const ENV_MSP_ID: &str = "CORE_PEER_LOCALMSPID";
pub const ENV_MSP_CONFIG_PATH: &str = "CORE_PEER_MSPCONFIGPATH";
pub const ENV_PEER_ADDRESS: &str = "CORE_PEER_ADDRESS";
pub const ENV_CHAINCODE_NAME: &str = "CHAINCODE_NAME";
pub const ENV_CHANNEL_NAME: &str = "CHANNEL_NAME";

/// optional override for the TLS root certificate location
pub const ENV_TLS_ROOT_CERT: &str = "CORE_PEER_TLS_ROOTCERT_FILE";

/// variables that must be present and non-empty, in reporting order
pub const REQUIRED_VARS: [&str; 5] = [
    ENV_MSP_ID,
    ENV_MSP_CONFIG_PATH,
    ENV_PEER_ADDRESS,
    ENV_CHAINCODE_NAME,
    ENV_CHANNEL_NAME,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub msp_id: String,
    pub msp_config_path: PathBuf,
    pub peer_address: String,
    pub chaincode_name: String,
    pub channel_name: String,
    pub tls_root_cert: Option<PathBuf>,
}

impl Config {
    /// load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// load through an arbitrary lookup; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|&&key| get(key).is_none())
            .map(|key| key.to_string())
            .collect();

        match missing.len() {
            0 => {}
            1 => return Err(GatewayError::MissingEnvVar(missing.remove(0))),
            _ => return Err(GatewayError::MissingEnvVars(missing)),
        }

        let required = |key: &str| get(key).unwrap_or_default();

        Ok(Self {
            msp_id: required(ENV_MSP_ID),
            msp_config_path: PathBuf::from(required(ENV_MSP_CONFIG_PATH)),
            peer_address: required(ENV_PEER_ADDRESS),
            chaincode_name: required(ENV_CHAINCODE_NAME),
            channel_name: required(ENV_CHANNEL_NAME),
            tls_root_cert: get(ENV_TLS_ROOT_CERT).map(PathBuf::from),
        })
    }

    /// directory holding the signing certificate
    pub fn cert_dir(&self) -> PathBuf {
        self.msp_config_path.join("signcerts")
    }

    /// directory holding the private key
    pub fn key_dir(&self) -> PathBuf {
        self.msp_config_path.join("keystore")
    }

    /// TLS root certificate, next to the msp directory unless overridden
    pub fn tls_ca_file(&self) -> PathBuf {
        match &self.tls_root_cert {
            Some(path) => path.clone(),
            None => self.msp_config_path.join(Path::new("../tls/ca.crt")),
        }
    }

    /// hostname the gateway's TLS certificate must be issued for
    pub fn gateway_host(&self) -> &str {
        gateway_host(&self.peer_address)
    }

    /// endpoint URI handed to the transport
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.peer_address)
    }
}

/// text before the first `:` of a `host:port` address
pub fn gateway_host(address: &str) -> &str {
    address.split(':').next().unwrap_or(address)
}
