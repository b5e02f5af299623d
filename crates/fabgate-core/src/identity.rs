//! client identity: msp id plus X.509 signing certificate

use crate::error::{GatewayError, Result};
use crate::proto::msp::SerializedIdentity;
use prost::Message;
use x509_parser::pem::parse_x509_pem;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Identity {
    msp_id: String,
    certificate: Vec<u8>,
}

impl X509Identity {
    /// `certificate_pem` must start with a PEM `CERTIFICATE` block holding valid X.509
    pub fn new(msp_id: impl Into<String>, certificate_pem: Vec<u8>) -> Result<Self> {
        check_certificate(&certificate_pem)?;
        Ok(Self {
            msp_id: msp_id.into(),
            certificate: certificate_pem,
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM bytes as read from the credential store
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// creator bytes placed in signature headers and commit status requests
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.clone(),
        }
        .encode_to_vec()
    }
}

/// validate that `pem` holds an X.509 certificate
pub fn check_certificate(pem: &[u8]) -> Result<()> {
    let (_, block) =
        parse_x509_pem(pem).map_err(|e| GatewayError::Certificate(format!("bad PEM: {}", e)))?;

    if block.label != CERTIFICATE_LABEL {
        return Err(GatewayError::Certificate(format!(
            "expected {} block, found {}",
            CERTIFICATE_LABEL, block.label
        )));
    }

    block
        .parse_x509()
        .map_err(|e| GatewayError::Certificate(e.to_string()))?;
    Ok(())
}
