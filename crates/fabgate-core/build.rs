fn main() -> Result<(), Box<dyn std::error::Error>> {
    // fall back to the bundled protoc when none is configured
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }
    let well_known = protoc_bin_vendored::include_path()?;

    // compile gateway protos (client only)
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile(
            &[
                "proto/common/common.proto",
                "proto/msp/identities.proto",
                "proto/peer/chaincode.proto",
                "proto/peer/proposal.proto",
                "proto/peer/proposal_response.proto",
                "proto/peer/transaction.proto",
                "proto/gateway/gateway.proto",
                "proto/google/rpc/status.proto",
            ],
            &[std::path::PathBuf::from("proto"), well_known],
        )?;

    Ok(())
}
