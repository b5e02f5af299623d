//! generated protobuf types for the gateway service
//!
//! compiled from the subsets of the network's published protos under `proto/`.

/// `common` package: envelopes and headers
pub mod common {
    tonic::include_proto!("common");
}

/// `msp` package
pub mod msp {
    tonic::include_proto!("msp");
}

/// `protos` package: peer proposals and transactions
pub mod protos {
    tonic::include_proto!("protos");
}

/// `gateway` package: messages and the generated client
pub mod gateway {
    tonic::include_proto!("gateway");

    pub const ERROR_DETAIL_TYPE_URL: &str = "type.googleapis.com/gateway.ErrorDetail";
}

/// `google.rpc` status carried in gRPC error details
pub mod rpc {
    tonic::include_proto!("google.rpc");
}
