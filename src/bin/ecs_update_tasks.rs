// ABOUTME: Entry point for ecs-update-tasks.
// ABOUTME: Registers new task definition revisions with retagged container images.

use clap::Parser;
use convoy::aws::{AwsContext, EcsClient};
use convoy::cli::{GlobalArgs, exit_with_error};
use convoy::deploy::{TaskImageUpdate, update_task_images};
use convoy::error::{Error, Result};
use convoy::output::Output;
use convoy::types::ImageTag;
use nonempty::NonEmpty;

#[derive(Parser)]
#[command(name = "ecs-update-tasks")]
#[command(about = "Register new versions of container images in task definitions")]
#[command(version)]
struct Cli {
    /// Docker tag of the new image version
    #[arg(long)]
    tag: String,

    /// Task definition families to update
    #[arg(long, num_args = 1.., required = true)]
    tasks: Vec<String>,

    /// Container images to update within the tasks
    #[arg(long, num_args = 1.., required = true)]
    images: Vec<String>,

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
    let tag = ImageTag::new(&cli.tag)?;
    let families = NonEmpty::from_vec(cli.tasks)
        .ok_or_else(|| Error::InvalidArgument("--tasks needs at least one family".into()))?;
    let image_filters = NonEmpty::from_vec(cli.images)
        .ok_or_else(|| Error::InvalidArgument("--images needs at least one filter".into()))?;

    let settings = cli.global.aws_settings()?;
    let context = AwsContext::load(&settings).await;
    let ecs = EcsClient::new(context.ecs_client());

    let request = TaskImageUpdate {
        tag,
        families,
        image_filters,
    };
    let changes = update_task_images(&ecs, &request, output).await?;

    output.success(&format!(
        "Registered {} task definition revision(s) with tag {}",
        changes.len(),
        request.tag
    ));
    Ok(())
}
