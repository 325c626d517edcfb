// ABOUTME: Entry point for route53-presence.
// ABOUTME: Registers this EC2 instance's address under a name, replacing any existing record.

use clap::Parser;
use convoy::aws::{AwsContext, Route53Client};
use convoy::cli::{GlobalArgs, exit_with_error};
use convoy::error::Result;
use convoy::metadata::{AddressScope, InstanceMetadata};
use convoy::output::Output;
use convoy::presence::{DEFAULT_TTL, PresenceRequest, register_presence};
use convoy::types::HostName;

#[derive(Parser)]
#[command(name = "route53-presence")]
#[command(about = "Register this instance's address under a name in Route53")]
#[command(version)]
struct Cli {
    /// Fully-qualified name to register
    hostname: String,

    /// Record TTL in seconds
    #[arg(long, default_value_t = DEFAULT_TTL)]
    ttl: u32,

    /// Use the local IP instead of the public one
    #[arg(long)]
    local: bool,

    #[command(flatten)]
    global: GlobalArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.global.init_tracing();
    let mut output = cli.global.output();
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        exit_with_error(&output, &e);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let request = PresenceRequest {
        hostname: HostName::new(&cli.hostname)?,
        scope: AddressScope::from_local_flag(cli.local),
        ttl: cli.ttl,
    };

    let settings = cli.global.aws_settings()?;
    let metadata = InstanceMetadata::new(&settings.metadata_endpoint)?;
    let context = AwsContext::load(&settings).await;
    let dns = Route53Client::new(context.route53_client());

    let registration = register_presence(&dns, &metadata, &request, output).await?;

    output.success(&format!(
        "Registered {} ({}): {}",
        request.hostname, registration.address, registration.change.status
    ));
    Ok(())
}
