// ABOUTME: Entry point for ecs-update-service.
// ABOUTME: Rolls a service to the newest active task definition and waits for it to settle.

use clap::Parser;
use convoy::aws::{AwsContext, EcsClient};
use convoy::cli::{GlobalArgs, exit_with_error};
use convoy::deploy::{RolloutPolicy, ServiceTarget, update_service};
use convoy::error::Result;
use convoy::output::Output;

#[derive(Parser)]
#[command(name = "ecs-update-service")]
#[command(about = "Deploy the newest revision of a service's task definition")]
#[command(version)]
struct Cli {
    /// ECS cluster to work on
    #[arg(long)]
    cluster: String,

    /// Service to update
    #[arg(long)]
    service: String,

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
    let settings = cli.global.aws_settings()?;
    let context = AwsContext::load(&settings).await;
    let ecs = EcsClient::new(context.ecs_client());

    let target = ServiceTarget {
        cluster: cli.cluster,
        service: cli.service,
    };
    let update = update_service(&ecs, &target, &RolloutPolicy::default(), output).await?;

    output.success(&format!(
        "All done: {} is running {}",
        target.service, update.target
    ));
    Ok(())
}
