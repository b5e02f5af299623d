//! transaction proposal assembly and prepared transaction parsing

use crate::error::{GatewayError, Result};
use crate::proto::common::{ChannelHeader, Envelope, Header, HeaderType, Payload, SignatureHeader};
use crate::proto::protos::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput,
    ChaincodeInvocationSpec, ChaincodeProposalPayload, ChaincodeSpec, Proposal,
    ProposalResponsePayload, Transaction,
};
use prost::Message;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

/// random bytes mixed into every transaction id
pub const NONCE_LENGTH: usize = 24;

/// unsigned proposal ready to be hashed and signed
#[derive(Debug, Clone)]
pub struct ProposalBuilder<'a> {
    pub creator: &'a [u8],
    pub channel: &'a str,
    pub chaincode: &'a str,
    pub function: &'a str,
    pub args: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedProposal {
    pub transaction_id: String,
    pub bytes: Vec<u8>,
}

impl<'a> ProposalBuilder<'a> {
    pub fn build(&self) -> UnsignedProposal {
        let mut nonce = vec![0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce);
        self.build_with_nonce(nonce, SystemTime::now())
    }

    pub fn build_with_nonce(&self, nonce: Vec<u8>, now: SystemTime) -> UnsignedProposal {
        let transaction_id = transaction_id(&nonce, self.creator);

        let chaincode_id = ChaincodeId {
            name: self.chaincode.to_string(),
            ..Default::default()
        };

        let channel_header = ChannelHeader {
            r#type: HeaderType::EndorserTransaction as i32,
            timestamp: Some(now.into()),
            channel_id: self.channel.to_string(),
            tx_id: transaction_id.clone(),
            extension: ChaincodeHeaderExtension {
                chaincode_id: Some(chaincode_id.clone()),
            }
            .encode_to_vec(),
            ..Default::default()
        };

        let signature_header = SignatureHeader {
            creator: self.creator.to_vec(),
            nonce,
        };

        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.function.as_bytes().to_vec());
        args.extend(self.args.iter().map(|a| a.as_bytes().to_vec()));

        let invocation = ChaincodeInvocationSpec {
            chaincode_spec: Some(ChaincodeSpec {
                chaincode_id: Some(chaincode_id),
                input: Some(ChaincodeInput {
                    args,
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };

        let proposal = Proposal {
            header: Header {
                channel_header: channel_header.encode_to_vec(),
                signature_header: signature_header.encode_to_vec(),
            }
            .encode_to_vec(),
            payload: ChaincodeProposalPayload {
                input: invocation.encode_to_vec(),
                ..Default::default()
            }
            .encode_to_vec(),
            ..Default::default()
        };

        UnsignedProposal {
            transaction_id,
            bytes: proposal.encode_to_vec(),
        }
    }
}

/// hex(sha256(nonce || creator))
pub fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

/// chaincode return value carried inside an endorsed, not yet submitted, transaction
pub fn transaction_result(prepared: &Envelope) -> Result<Vec<u8>> {
    let payload = Payload::decode(prepared.payload.as_slice())?;
    let transaction = Transaction::decode(payload.data.as_slice())?;

    let action = transaction
        .actions
        .first()
        .ok_or_else(|| GatewayError::InvalidResponse("transaction has no actions".into()))?;

    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())?;
    let endorsed = action_payload
        .action
        .ok_or_else(|| GatewayError::InvalidResponse("missing endorsed action".into()))?;

    let response_payload =
        ProposalResponsePayload::decode(endorsed.proposal_response_payload.as_slice())?;
    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())?;

    Ok(chaincode_action
        .response
        .map(|r| r.payload)
        .unwrap_or_default())
}
