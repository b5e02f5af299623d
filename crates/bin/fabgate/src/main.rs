use anyhow::{Context, Result};
use clap::Parser;
use fabgate_core::{
    connection, format_result, Action, Config, Gateway, GatewayClient, GatewayOptions,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fabgate")]
#[command(about = "submit or evaluate a chaincode transaction through a fabric gateway peer")]
#[command(long_about = "Identity and network settings come from the environment: \
CORE_PEER_LOCALMSPID, CORE_PEER_MSPCONFIGPATH, CORE_PEER_ADDRESS, CHAINCODE_NAME and \
CHANNEL_NAME (optionally CORE_PEER_TLS_ROOTCERT_FILE).")]
struct Args {
    /// submit or evaluate (case-insensitive)
    action: String,

    /// chaincode function name
    function: String,

    /// function arguments, passed through verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // logs go to stderr, stdout carries the result only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabgate=info,fabgate_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let result = run(&args, |key| std::env::var(key).ok()).await?;

    if let Some(text) = format_result(&result) {
        println!("{}", text);
    }
    Ok(())
}

/// configuration and action are checked before any file or network access
async fn run<F>(args: &Args, lookup: F) -> Result<Vec<u8>>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    let action: Action = args.action.parse()?;

    info!("msp: {}", config.msp_id);
    info!("peer: {}", config.peer_address);

    let ca_pem = fabgate_core::load_tls_ca(&config).context("failed to read TLS certificate file")?;
    let channel = connection::connect(&config, &ca_pem)?;

    let identity =
        fabgate_core::load_identity(&config).context("failed to read certificate file")?;
    let signer = fabgate_core::load_signer(&config).context("failed to read private key file")?;

    let gateway = Gateway::connect(
        identity,
        signer,
        GatewayClient::new(channel),
        GatewayOptions::default(),
    );

    let network = gateway.network(config.channel_name.as_str());
    let contract = network.contract(config.chaincode_name.as_str());
    info!(
        "{} {} on {}/{}",
        action,
        args.function,
        contract.channel_name(),
        contract.chaincode_name()
    );

    let result = match action {
        Action::Submit => contract.submit_transaction(&args.function, &args.args).await?,
        Action::Evaluate => contract.evaluate_transaction(&args.function, &args.args).await?,
    };

    gateway.close();
    Ok(result)
}
