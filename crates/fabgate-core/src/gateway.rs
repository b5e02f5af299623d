//! gateway session: Gateway -> Network -> Contract
//!
//! a session binds a client identity and signer to one gateway peer. contracts built
//! from it run evaluate (query) or endorse/submit/commit (state change) flows, each
//! RPC bounded by its own timeout.

use crate::client::{GatewayClient, GatewayRpc};
use crate::error::{GatewayError, Result};
use crate::identity::X509Identity;
use crate::proposal::{transaction_result, ProposalBuilder, UnsignedProposal};
use crate::proto::gateway::{
    CommitStatusRequest, EndorseRequest, ErrorDetail, EvaluateRequest, SignedCommitStatusRequest,
    SubmitRequest, ERROR_DETAIL_TYPE_URL,
};
use crate::proto::protos::{SignedProposal, TxValidationCode};
use crate::proto::rpc;
use crate::sign::{HashAlgorithm, Signer};
use prost::Message;
use std::future::Future;
use std::time::Duration;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

pub const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_ENDORSE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_COMMIT_STATUS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayOptions {
    pub hash: HashAlgorithm,
    pub evaluate_timeout: Duration,
    pub endorse_timeout: Duration,
    pub submit_timeout: Duration,
    pub commit_status_timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::Sha256,
            evaluate_timeout: DEFAULT_EVALUATE_TIMEOUT,
            endorse_timeout: DEFAULT_ENDORSE_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            commit_status_timeout: DEFAULT_COMMIT_STATUS_TIMEOUT,
        }
    }
}

pub struct Gateway<R = GatewayClient> {
    identity: X509Identity,
    creator: Vec<u8>,
    signer: Signer,
    rpc: R,
    options: GatewayOptions,
}

impl<R: GatewayRpc> Gateway<R> {
    /// no RPC is made here; the transport connects on first use
    pub fn connect(identity: X509Identity, signer: Signer, rpc: R, options: GatewayOptions) -> Self {
        info!("gateway session for {}", identity.msp_id());
        let creator = identity.serialize();
        Self {
            identity,
            creator,
            signer,
            rpc,
            options,
        }
    }

    pub fn network(&self, channel: impl Into<String>) -> Network<'_, R> {
        Network {
            gateway: self,
            channel: channel.into(),
        }
    }

    /// end the session and release the transport
    pub fn close(self) {
        debug!("closing gateway session for {}", self.identity.msp_id());
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.signer.sign(&self.options.hash.digest(message))
    }

    fn signed_proposal(&self, unsigned: UnsignedProposal) -> Result<SignedProposal> {
        let signature = self.sign(&unsigned.bytes)?;
        Ok(SignedProposal {
            proposal_bytes: unsigned.bytes,
            signature,
        })
    }
}

/// a channel on the network
pub struct Network<'a, R> {
    gateway: &'a Gateway<R>,
    channel: String,
}

impl<'a, R: GatewayRpc> Network<'a, R> {
    pub fn contract(&self, chaincode: impl Into<String>) -> Contract<'a, R> {
        Contract {
            gateway: self.gateway,
            channel: self.channel.clone(),
            chaincode: chaincode.into(),
        }
    }
}

/// a chaincode deployed on a channel
pub struct Contract<'a, R> {
    gateway: &'a Gateway<R>,
    channel: String,
    chaincode: String,
}

impl<'a, R: GatewayRpc> Contract<'a, R> {
    pub fn chaincode_name(&self) -> &str {
        &self.chaincode
    }

    pub fn channel_name(&self) -> &str {
        &self.channel
    }

    fn proposal(&self, function: &str, args: &[String]) -> UnsignedProposal {
        ProposalBuilder {
            creator: &self.gateway.creator,
            channel: &self.channel,
            chaincode: &self.chaincode,
            function,
            args,
        }
        .build()
    }

    /// run a read-only transaction and return its result; nothing is committed
    pub async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let gateway = self.gateway;
        let unsigned = self.proposal(function, args);
        let transaction_id = unsigned.transaction_id.clone();
        info!("evaluating {}:{} ({})", self.chaincode, function, transaction_id);

        let request = EvaluateRequest {
            transaction_id,
            channel_id: self.channel.clone(),
            proposed_transaction: Some(gateway.signed_proposal(unsigned)?),
            target_organizations: Vec::new(),
        };

        let timeout = gateway.options.evaluate_timeout;
        let response = call(
            "evaluate",
            timeout,
            gateway.rpc.evaluate(with_deadline(request, timeout)),
        )
        .await?;

        Ok(response.result.map(|r| r.payload).unwrap_or_default())
    }

    /// endorse, submit and wait for commit; returns the endorsed result
    pub async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let gateway = self.gateway;
        let options = &gateway.options;
        let unsigned = self.proposal(function, args);
        let transaction_id = unsigned.transaction_id.clone();
        info!("submitting {}:{} ({})", self.chaincode, function, transaction_id);

        // endorse
        let request = EndorseRequest {
            transaction_id: transaction_id.clone(),
            channel_id: self.channel.clone(),
            proposed_transaction: Some(gateway.signed_proposal(unsigned)?),
            endorsing_organizations: Vec::new(),
        };
        let endorsed = call(
            "endorse",
            options.endorse_timeout,
            gateway
                .rpc
                .endorse(with_deadline(request, options.endorse_timeout)),
        )
        .await?;

        let mut prepared = endorsed.prepared_transaction.ok_or_else(|| {
            GatewayError::InvalidResponse("endorse returned no prepared transaction".into())
        })?;
        let result = transaction_result(&prepared)?;
        debug!("endorsed {} ({} byte result)", transaction_id, result.len());

        // submit
        prepared.signature = gateway.sign(&prepared.payload)?;
        let request = SubmitRequest {
            transaction_id: transaction_id.clone(),
            channel_id: self.channel.clone(),
            prepared_transaction: Some(prepared),
        };
        call(
            "submit",
            options.submit_timeout,
            gateway
                .rpc
                .submit(with_deadline(request, options.submit_timeout)),
        )
        .await?;
        debug!("submitted {}", transaction_id);

        // commit status
        let status_request = CommitStatusRequest {
            transaction_id: transaction_id.clone(),
            channel_id: self.channel.clone(),
            identity: gateway.creator.clone(),
        }
        .encode_to_vec();
        let request = SignedCommitStatusRequest {
            signature: gateway.sign(&status_request)?,
            request: status_request,
        };
        let status = call(
            "commit status",
            options.commit_status_timeout,
            gateway
                .rpc
                .commit_status(with_deadline(request, options.commit_status_timeout)),
        )
        .await?;

        match TxValidationCode::try_from(status.result) {
            Ok(TxValidationCode::Valid) => {
                info!("committed {} in block {}", transaction_id, status.block_number);
                Ok(result)
            }
            Ok(code) => Err(GatewayError::Commit {
                tx_id: transaction_id,
                code: status.result,
                status: code.as_str_name().to_string(),
            }),
            Err(_) => Err(GatewayError::Commit {
                tx_id: transaction_id,
                code: status.result,
                status: "UNKNOWN".to_string(),
            }),
        }
    }
}

fn with_deadline<T>(message: T, timeout: Duration) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    request
}

/// await an RPC, bounding it locally as well as by the deadline header
async fn call<T, F>(operation: &'static str, timeout: Duration, rpc: F) -> Result<T>
where
    F: Future<Output = std::result::Result<Response<T>, Status>>,
{
    match tokio::time::timeout(timeout, rpc).await {
        Ok(Ok(response)) => Ok(response.into_inner()),
        Ok(Err(status)) => Err(rpc_error(operation, &status)),
        Err(_) => Err(GatewayError::Timeout { operation, timeout }),
    }
}

/// flatten a gRPC status and any per-peer details into one error
pub fn rpc_error(operation: &'static str, status: &Status) -> GatewayError {
    let mut message = format!("{:?}: {}", status.code(), status.message());
    for detail in error_details(status) {
        message.push_str(&format!(
            "\n    address: {}, mspId: {}, message: {}",
            detail.address, detail.msp_id, detail.message
        ));
    }
    GatewayError::Rpc { operation, message }
}

fn error_details(status: &Status) -> Vec<ErrorDetail> {
    if status.details().is_empty() {
        return Vec::new();
    }
    let Ok(rpc_status) = rpc::Status::decode(status.details()) else {
        return Vec::new();
    };
    rpc_status
        .details
        .iter()
        .filter(|any| any.type_url == ERROR_DETAIL_TYPE_URL)
        .filter_map(|any| ErrorDetail::decode(any.value.as_slice()).ok())
        .collect()
}
