//! evaluate / submit flows against an in-process gateway

use fabgate_core::proto::common::{ChannelHeader, Envelope, Header, Payload};
use fabgate_core::proto::gateway::{
    CommitStatusRequest, CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest,
    EvaluateResponse, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use fabgate_core::proto::protos::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction, ChaincodeInvocationSpec,
    ChaincodeProposalPayload, Proposal, ProposalResponsePayload, Response as ChaincodeResponse,
    SignedProposal, Transaction, TransactionAction, TxValidationCode,
};
use fabgate_core::{
    Action, Gateway, GatewayError, GatewayOptions, GatewayRpc, HashAlgorithm, Signer,
    X509Identity,
};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use prost::Message;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tonic::{Code, Request, Response, Status};

const CERT: &[u8] = include_bytes!("fixtures/msp/signcerts/cert.pem");
const KEY: &[u8] = include_bytes!("fixtures/msp/keystore/priv_sk");

#[derive(Default)]
struct Seen {
    evaluate: Vec<EvaluateRequest>,
    endorse: Vec<EndorseRequest>,
    submit: Vec<SubmitRequest>,
    commit: Vec<SignedCommitStatusRequest>,
    deadlines: usize,
}

#[derive(Default)]
struct FakeGateway {
    payload: Vec<u8>,
    commit_code: i32,
    block_number: u64,
    fail_with: Option<(Code, &'static str)>,
    delay: Option<Duration>,
    seen: Arc<Mutex<Seen>>,
}

impl FakeGateway {
    fn returning(payload: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            block_number: 7,
            ..Default::default()
        }
    }

    fn note_deadline<T>(&self, request: &Request<T>) {
        if request.metadata().get("grpc-timeout").is_some() {
            self.seen.lock().unwrap().deadlines += 1;
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn fail(&self) -> Result<(), Status> {
        match self.fail_with {
            Some((code, message)) => Err(Status::new(code, message)),
            None => Ok(()),
        }
    }

    fn prepared_transaction(&self, proposal: &SignedProposal) -> Envelope {
        let proposal = Proposal::decode(proposal.proposal_bytes.as_slice()).unwrap();
        let header = Header::decode(proposal.header.as_slice()).unwrap();

        let chaincode_action = ChaincodeAction {
            response: Some(ChaincodeResponse {
                status: 200,
                message: String::new(),
                payload: self.payload.clone(),
            }),
            ..Default::default()
        };
        let action_payload = ChaincodeActionPayload {
            chaincode_proposal_payload: proposal.payload.clone(),
            action: Some(ChaincodeEndorsedAction {
                proposal_response_payload: ProposalResponsePayload {
                    proposal_hash: HashAlgorithm::Sha256.digest(&proposal.payload),
                    extension: chaincode_action.encode_to_vec(),
                }
                .encode_to_vec(),
                endorsements: Vec::new(),
            }),
        };
        let transaction = Transaction {
            actions: vec![TransactionAction {
                header: header.signature_header.clone(),
                payload: action_payload.encode_to_vec(),
            }],
        };

        Envelope {
            payload: Payload {
                header: Some(header),
                data: transaction.encode_to_vec(),
            }
            .encode_to_vec(),
            signature: Vec::new(),
        }
    }
}

impl GatewayRpc for FakeGateway {
    async fn evaluate(
        &self,
        request: Request<EvaluateRequest>,
    ) -> Result<Response<EvaluateResponse>, Status> {
        self.note_deadline(&request);
        self.pause().await;
        self.fail()?;
        self.seen.lock().unwrap().evaluate.push(request.into_inner());
        Ok(Response::new(EvaluateResponse {
            result: Some(ChaincodeResponse {
                status: 200,
                message: String::new(),
                payload: self.payload.clone(),
            }),
        }))
    }

    async fn endorse(
        &self,
        request: Request<EndorseRequest>,
    ) -> Result<Response<EndorseResponse>, Status> {
        self.note_deadline(&request);
        self.pause().await;
        self.fail()?;
        let request = request.into_inner();
        let prepared = self.prepared_transaction(request.proposed_transaction.as_ref().unwrap());
        self.seen.lock().unwrap().endorse.push(request);
        Ok(Response::new(EndorseResponse {
            prepared_transaction: Some(prepared),
        }))
    }

    async fn submit(
        &self,
        request: Request<SubmitRequest>,
    ) -> Result<Response<SubmitResponse>, Status> {
        self.note_deadline(&request);
        self.seen.lock().unwrap().submit.push(request.into_inner());
        Ok(Response::new(SubmitResponse {}))
    }

    async fn commit_status(
        &self,
        request: Request<SignedCommitStatusRequest>,
    ) -> Result<Response<CommitStatusResponse>, Status> {
        self.note_deadline(&request);
        self.seen.lock().unwrap().commit.push(request.into_inner());
        Ok(Response::new(CommitStatusResponse {
            result: self.commit_code,
            block_number: self.block_number,
        }))
    }
}

fn identity() -> X509Identity {
    X509Identity::new("Org1MSP", CERT.to_vec()).unwrap()
}

fn cert_key() -> VerifyingKey {
    let (_, block) = x509_parser::pem::parse_x509_pem(CERT).unwrap();
    let cert = block.parse_x509().unwrap();
    VerifyingKey::from_sec1_bytes(&cert.public_key().subject_public_key.data).unwrap()
}

fn assert_signed(message: &[u8], der: &[u8]) {
    let digest = HashAlgorithm::Sha256.digest(message);
    let signature = Signature::from_der(der).unwrap();
    cert_key().verify_prehash(&digest, &signature).unwrap();
}

fn gateway(fake: FakeGateway) -> Gateway<FakeGateway> {
    Gateway::connect(
        identity(),
        Signer::from_pem(KEY).unwrap(),
        fake,
        GatewayOptions::default(),
    )
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn proposal_args(signed: &SignedProposal) -> Vec<Vec<u8>> {
    let proposal = Proposal::decode(signed.proposal_bytes.as_slice()).unwrap();
    let payload = ChaincodeProposalPayload::decode(proposal.payload.as_slice()).unwrap();
    let invocation = ChaincodeInvocationSpec::decode(payload.input.as_slice()).unwrap();
    invocation.chaincode_spec.unwrap().input.unwrap().args
}

#[tokio::test]
async fn test_evaluate_returns_payload() {
    let fake = FakeGateway::returning(br#"{"ID":"asset1","Owner":"Tom"}"#);
    let seen = fake.seen.clone();
    let gateway = gateway(fake);
    let contract = gateway.network("mychannel").contract("basic");
    assert_eq!(contract.channel_name(), "mychannel");
    assert_eq!(contract.chaincode_name(), "basic");

    let result = contract
        .evaluate_transaction("ReadAsset", &args(&["asset1"]))
        .await
        .unwrap();
    assert_eq!(result, br#"{"ID":"asset1","Owner":"Tom"}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.evaluate.len(), 1);
    assert!(seen.endorse.is_empty() && seen.submit.is_empty() && seen.commit.is_empty());
    assert_eq!(seen.deadlines, 1);

    let request = &seen.evaluate[0];
    assert_eq!(request.channel_id, "mychannel");
    let signed = request.proposed_transaction.as_ref().unwrap();
    assert_signed(&signed.proposal_bytes, &signed.signature);
    assert_eq!(
        proposal_args(signed),
        vec![b"ReadAsset".to_vec(), b"asset1".to_vec()]
    );

    let proposal = Proposal::decode(signed.proposal_bytes.as_slice()).unwrap();
    let header = Header::decode(proposal.header.as_slice()).unwrap();
    let channel_header = ChannelHeader::decode(header.channel_header.as_slice()).unwrap();
    assert_eq!(channel_header.tx_id, request.transaction_id);
}

#[tokio::test]
async fn test_submit_endorses_submits_and_waits_for_commit() {
    let fake = FakeGateway::returning(b"created");
    let seen = fake.seen.clone();
    let gateway = gateway(fake);
    let contract = gateway.network("mychannel").contract("basic");

    let result = contract
        .submit_transaction("CreateAsset", &args(&["asset9", "blue", "5"]))
        .await
        .unwrap();
    assert_eq!(result, b"created");

    let seen = seen.lock().unwrap();
    assert!(seen.evaluate.is_empty());
    assert_eq!(seen.endorse.len(), 1);
    assert_eq!(seen.submit.len(), 1);
    assert_eq!(seen.commit.len(), 1);
    assert_eq!(seen.deadlines, 3);

    let tx_id = &seen.endorse[0].transaction_id;
    assert_eq!(&seen.submit[0].transaction_id, tx_id);

    // prepared transaction signed by the client before submit
    let envelope = seen.submit[0].prepared_transaction.as_ref().unwrap();
    assert!(!envelope.signature.is_empty());
    assert_signed(&envelope.payload, &envelope.signature);

    // commit status request is signed and names the creator
    let signed = &seen.commit[0];
    assert_signed(&signed.request, &signed.signature);
    let status = CommitStatusRequest::decode(signed.request.as_slice()).unwrap();
    assert_eq!(&status.transaction_id, tx_id);
    assert_eq!(status.channel_id, "mychannel");
    assert_eq!(status.identity, identity().serialize());
}

#[tokio::test]
async fn test_submit_reports_commit_failure() {
    let mut fake = FakeGateway::returning(b"");
    fake.commit_code = TxValidationCode::MvccReadConflict as i32;
    let gateway = gateway(fake);
    let contract = gateway.network("mychannel").contract("basic");

    let err = contract
        .submit_transaction("TransferAsset", &args(&["asset1", "Max"]))
        .await
        .unwrap_err();

    match &err {
        GatewayError::Commit { code, status, .. } => {
            assert_eq!(*code, 11);
            assert_eq!(status, "MVCC_READ_CONFLICT");
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(err.to_string().contains("failed to commit with status code 11"));
}

#[tokio::test]
async fn test_endorse_failure_stops_before_submit() {
    let mut fake = FakeGateway::returning(b"");
    fake.fail_with = Some((Code::Aborted, "failed to endorse transaction"));
    let seen = fake.seen.clone();
    let gateway = gateway(fake);
    let contract = gateway.network("mychannel").contract("basic");

    let err = contract
        .submit_transaction("DeleteAsset", &args(&["asset1"]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "endorse failed: Aborted: failed to endorse transaction"
    );

    let seen = seen.lock().unwrap();
    assert!(seen.submit.is_empty());
    assert!(seen.commit.is_empty());
}

#[tokio::test]
async fn test_evaluate_times_out() {
    let mut fake = FakeGateway::returning(b"late");
    fake.delay = Some(Duration::from_secs(30));
    let options = GatewayOptions {
        evaluate_timeout: Duration::from_millis(50),
        ..GatewayOptions::default()
    };
    let gateway = Gateway::connect(identity(), Signer::from_pem(KEY).unwrap(), fake, options);
    let contract = gateway.network("mychannel").contract("basic");

    let err = contract
        .evaluate_transaction("GetAllAssets", &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Timeout {
            operation: "evaluate",
            ..
        }
    ));
}

#[tokio::test]
async fn test_each_call_gets_a_fresh_transaction_id() {
    let fake = FakeGateway::returning(b"[]");
    let seen = fake.seen.clone();
    let gateway = gateway(fake);
    let contract = gateway.network("mychannel").contract("basic");

    contract.evaluate_transaction("GetAllAssets", &[]).await.unwrap();
    contract.evaluate_transaction("GetAllAssets", &[]).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_ne!(seen.evaluate[0].transaction_id, seen.evaluate[1].transaction_id);
}

#[tokio::test]
async fn test_dispatch_by_action() {
    for (raw, expect_commit) in [("Submit", true), ("EVALUATE", false)] {
        let fake = FakeGateway::returning(b"ok");
        let seen = fake.seen.clone();
        let gateway = gateway(fake);
        let contract = gateway.network("mychannel").contract("basic");

        let result = match raw.parse::<Action>().unwrap() {
            Action::Submit => contract.submit_transaction("Init", &[]).await,
            Action::Evaluate => contract.evaluate_transaction("Init", &[]).await,
        };
        assert_eq!(result.unwrap(), b"ok");
        assert_eq!(seen.lock().unwrap().commit.len() == 1, expect_commit);
        gateway.close();
    }
}
