use crate::cli::inputs::ActionInputs;
use crate::cli::sink::GithubActionsSink;
use crate::core::{Result, ResultSink, RunOutcome, RunnerConfig};
use crate::runtime::{CloudWatchLogsClient, Orchestrator, SsmClient};
use clap::Parser;
use std::sync::Arc;
use url::Url;

/// Run a command on an EC2 instance through SSM and report its exit code
///
/// Step inputs (`command`, `instance-id`, `powershell`, `wait-for-agent`) are
/// read from the `INPUT_*` environment variables set by the CI runner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// AWS region of the target instance
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Override the SSM endpoint
    #[arg(long, env = "SSM_COMMAND_SSM_ENDPOINT")]
    pub ssm_endpoint: Option<Url>,

    /// Override the CloudWatch Logs endpoint
    #[arg(long, env = "SSM_COMMAND_LOGS_ENDPOINT")]
    pub logs_endpoint: Option<Url>,

    /// Disable ANSI colors in the job log
    #[arg(long, env = "SSM_COMMAND_NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Build the orchestrator from the parsed flags
    pub fn orchestrator(&self) -> Result<Orchestrator> {
        let ssm = match &self.ssm_endpoint {
            Some(endpoint) => SsmClient::new(endpoint.clone()),
            None => SsmClient::for_region(&self.region)?,
        };
        let logs = match &self.logs_endpoint {
            Some(endpoint) => CloudWatchLogsClient::new(endpoint.clone()),
            None => CloudWatchLogsClient::for_region(&self.region)?,
        };

        Orchestrator::builder()
            .remote(Arc::new(ssm))
            .logs(Arc::new(logs))
            .config(RunnerConfig {
                color: !self.no_color,
                ..RunnerConfig::default()
            })
            .build()
    }

    /// Execute the step
    ///
    /// Returns `true` when the job was marked failed.
    pub async fn execute(self) -> bool {
        let sink = GithubActionsSink::from_env();
        if !self.no_color {
            // stdout is a pipe on CI runners; colors would otherwise be dropped
            colored::control::set_override(true);
        }

        let orchestrator = match self.orchestrator() {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                sink.set_failed(&e);
                return true;
            }
        };

        let inputs = ActionInputs::from_env();
        match orchestrator.run(&inputs, &sink).await {
            Ok(RunOutcome::NotDispatched) => {
                tracing::debug!("command was not dispatched; no exit code produced");
            }
            Ok(RunOutcome::Completed(result)) => {
                tracing::info!(exit_code = result.exit_code, status = %result.status, "run completed");
            }
            // Already reported to the sink
            Err(_) => {}
        }
        sink.failed()
    }
}
