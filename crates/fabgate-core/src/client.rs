//! gateway gRPC client

use crate::proto::gateway::{
    gateway_client::GatewayClient as GrpcClient, CommitStatusResponse, EndorseRequest,
    EndorseResponse, EvaluateRequest, EvaluateResponse, SignedCommitStatusRequest, SubmitRequest,
    SubmitResponse,
};
use std::future::Future;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

/// the four unary calls of the gateway service
///
/// implemented over tonic by [`GatewayClient`]; tests substitute an in-process fake.
pub trait GatewayRpc {
    fn evaluate(
        &self,
        request: Request<EvaluateRequest>,
    ) -> impl Future<Output = Result<Response<EvaluateResponse>, Status>> + Send;

    fn endorse(
        &self,
        request: Request<EndorseRequest>,
    ) -> impl Future<Output = Result<Response<EndorseResponse>, Status>> + Send;

    fn submit(
        &self,
        request: Request<SubmitRequest>,
    ) -> impl Future<Output = Result<Response<SubmitResponse>, Status>> + Send;

    fn commit_status(
        &self,
        request: Request<SignedCommitStatusRequest>,
    ) -> impl Future<Output = Result<Response<CommitStatusResponse>, Status>> + Send;
}

/// gateway client over a tonic channel
#[derive(Clone)]
pub struct GatewayClient {
    client: GrpcClient<Channel>,
}

impl GatewayClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: GrpcClient::new(channel),
        }
    }
}

// each call runs on its own handle so the returned future owns it
impl GatewayRpc for GatewayClient {
    fn evaluate(
        &self,
        request: Request<EvaluateRequest>,
    ) -> impl Future<Output = Result<Response<EvaluateResponse>, Status>> + Send {
        let mut client = self.client.clone();
        async move { client.evaluate(request).await }
    }

    fn endorse(
        &self,
        request: Request<EndorseRequest>,
    ) -> impl Future<Output = Result<Response<EndorseResponse>, Status>> + Send {
        let mut client = self.client.clone();
        async move { client.endorse(request).await }
    }

    fn submit(
        &self,
        request: Request<SubmitRequest>,
    ) -> impl Future<Output = Result<Response<SubmitResponse>, Status>> + Send {
        let mut client = self.client.clone();
        async move { client.submit(request).await }
    }

    fn commit_status(
        &self,
        request: Request<SignedCommitStatusRequest>,
    ) -> impl Future<Output = Result<Response<CommitStatusResponse>, Status>> + Send {
        let mut client = self.client.clone();
        async move { client.commit_status(request).await }
    }
}
