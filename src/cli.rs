// ABOUTME: Command-line options shared by every convoy binary.
// ABOUTME: Verbosity, output mode, region override, and tracing setup.

use crate::config::AwsSettings;
use crate::error::Result;
use crate::output::{Output, OutputMode};
use clap::Args;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long)]
    pub json: bool,

    /// AWS region (defaults to AWS_EC2_REGION, AWS_REGION, then us-east-1)
    #[arg(long)]
    pub region: Option<String>,
}

impl GlobalArgs {
    /// Initialize the tracing subscriber based on the verbose flag.
    pub fn init_tracing(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }

    pub fn output(&self) -> Output {
        if self.json {
            Output::new(OutputMode::Json)
        } else if self.quiet {
            Output::quiet()
        } else {
            Output::new(OutputMode::Normal)
        }
    }

    pub fn aws_settings(&self) -> Result<AwsSettings> {
        AwsSettings::from_env(self.region.as_deref())
    }
}

/// Report a failed run and exit non-zero.
pub fn exit_with_error(output: &Output, error: &crate::error::Error) -> ! {
    output.error(&error.to_string());
    tracing::debug!(kind = ?error.kind(), "Command failed");
    std::process::exit(1);
}
