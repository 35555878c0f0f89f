use crate::core::{
    CommandSpec, Error, ExecutionResult, InvocationDetails, ParameterSource, Result,
    ResultSink, RunOutcome, RunnerConfig, StreamContent, StreamKind, INSTANCE_ID_ENV,
    OUTPUT_EXIT_CODE,
};
use crate::output::OutputFormatter;
use crate::runtime::agent::AgentProber;
use crate::runtime::dispatch::CommandDispatcher;
use crate::runtime::logs::{LogLocator, LogPaginator};
use crate::runtime::poller::StatusPoller;
use crate::runtime::service::{LogService, RemoteExecutionService};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    AwaitingAgent,
    Dispatching,
    Polling,
    Terminal,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = %state, to = %next, "run state");
    *state = next;
}

/// Runs one command on one target from start to finish
///
/// The orchestrator owns no global state: both service handles are passed in,
/// so any implementation of [`RemoteExecutionService`] and [`LogService`]
/// can be plugged in.
///
/// # Examples
///
/// ```rust,no_run
/// # use ssm_command::core::{CommandSpec, MemorySink, ShellKind};
/// # use ssm_command::runtime::{CloudWatchLogsClient, Orchestrator, SsmClient};
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> ssm_command::core::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .remote(Arc::new(SsmClient::for_region("eu-west-1")?))
///     .logs(Arc::new(CloudWatchLogsClient::for_region("eu-west-1")?))
///     .color(false)
///     .build()?;
///
/// let spec = CommandSpec::new("uptime", ShellKind::Shell, "i-0123456789abcdef0", false)?;
/// let sink = MemorySink::new();
/// let outcome = orchestrator.execute(&spec, &sink).await?;
/// println!("exit code: {:?}", outcome.exit_code());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    remote: Arc<dyn RemoteExecutionService>,
    logs: Arc<dyn LogService>,
    config: Arc<RunnerConfig>,
    formatter: OutputFormatter,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator with the given services and configuration
    pub fn new(
        remote: Arc<dyn RemoteExecutionService>,
        logs: Arc<dyn LogService>,
        config: RunnerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            remote,
            logs,
            formatter: OutputFormatter::new(config.color),
            config: Arc::new(config),
        })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the step end to end against the CI binding
    ///
    /// Reads the inputs, executes the command and writes `exit-code` when
    /// one was produced. Any error is reported through
    /// [`ResultSink::set_failed`] and returned.
    pub async fn run(
        &self,
        params: &dyn ParameterSource,
        sink: &dyn ResultSink,
    ) -> Result<RunOutcome> {
        let fallback_target = std::env::var(INSTANCE_ID_ENV).ok();
        self.run_with_fallback(params, fallback_target, sink).await
    }

    /// Same as [`run`](Self::run) with an explicit fallback target id
    pub async fn run_with_fallback(
        &self,
        params: &dyn ParameterSource,
        fallback_target: Option<String>,
        sink: &dyn ResultSink,
    ) -> Result<RunOutcome> {
        let result = self.run_inner(params, fallback_target, sink).await;
        if let Err(err) = &result {
            error!(error = %err, "run failed");
            sink.set_failed(err);
        }
        result
    }

    async fn run_inner(
        &self,
        params: &dyn ParameterSource,
        fallback_target: Option<String>,
        sink: &dyn ResultSink,
    ) -> Result<RunOutcome> {
        let spec = CommandSpec::from_parameters(params, fallback_target)?;
        let outcome = self.execute(&spec, sink).await?;

        if let RunOutcome::Completed(result) = outcome {
            sink.set_output(OUTPUT_EXIT_CODE, &result.exit_code.to_string())?;
            sink.info(&format!(
                "Remote command invocation has completed with exit code: {}",
                result.exit_code
            ));
        }
        Ok(outcome)
    }

    /// Execute a validated command spec
    ///
    /// Does not touch the `exit-code` output; [`run`](Self::run) does that.
    pub async fn execute(&self, spec: &CommandSpec, sink: &dyn ResultSink) -> Result<RunOutcome> {
        let mut state = RunState::Idle;
        info!(target_id = %spec.target_id, shell = ?spec.shell, "running remote command");

        if spec.wait_for_agent {
            transition(&mut state, RunState::AwaitingAgent);
            AgentProber::new(self.remote.as_ref(), self.config.agent_poll_interval)
                .wait_until_online(&spec.target_id, sink)
                .await?;
        }

        transition(&mut state, RunState::Dispatching);
        let dispatcher = CommandDispatcher::new(
            self.remote.as_ref(),
            self.config.end_marker.as_deref(),
            self.config.mirror_output,
        );
        let Some(invocation) = dispatcher.dispatch(spec, sink).await? else {
            transition(&mut state, RunState::Terminal);
            return Ok(RunOutcome::NotDispatched);
        };

        transition(&mut state, RunState::Polling);
        sink.info("Waiting for remote command invocation to complete...");
        let details = StatusPoller::new(self.remote.as_ref(), self.config.poll_interval)
            .poll_until_terminal(&invocation, sink)
            .await?;

        transition(&mut state, RunState::Terminal);
        sink.info(&format!(
            "Remote command invocation completed with status: \"{}\". Output is printed below.",
            details.status
        ));

        let stdout = self.resolve_stream(&details, StreamKind::Stdout).await?;
        let stderr = self.resolve_stream(&details, StreamKind::Stderr).await?;
        for line in self.formatter.render(&stdout, &stderr) {
            sink.info(&line);
        }

        Ok(RunOutcome::Completed(ExecutionResult::from_details(&details)))
    }

    /// Full text of one stream
    ///
    /// Streams with no inline content are never fetched. Otherwise the
    /// mirrored log stream is read when mirroring is on, and the inline text
    /// is used when the log store has nothing.
    async fn resolve_stream(
        &self,
        details: &InvocationDetails,
        stream: StreamKind,
    ) -> Result<StreamContent> {
        let inline = details.content(stream);
        if inline.is_empty() || !self.config.mirror_output {
            return Ok(inline.clone());
        }

        let Some(locator) = LogLocator::for_stream(&self.config.log_group_prefix, details, stream)
        else {
            debug!(%stream, "no plugin name, using inline output");
            return Ok(inline.clone());
        };

        let text = LogPaginator::new(self.logs.as_ref())
            .collect_stream(&locator)
            .await?
            .concat();
        if text.trim().is_empty() {
            Ok(inline.clone())
        } else {
            Ok(StreamContent::Inline(text))
        }
    }
}

/// Builder for creating `Orchestrator` instances with fluent configuration
///
/// # Examples
///
/// ```rust,no_run
/// # use ssm_command::runtime::{CloudWatchLogsClient, Orchestrator, SsmClient};
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # fn main() -> ssm_command::core::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .remote(Arc::new(SsmClient::for_region("us-east-1")?))
///     .logs(Arc::new(CloudWatchLogsClient::for_region("us-east-1")?))
///     .poll_interval(Duration::from_secs(10))
///     .end_marker(None)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    remote: Option<Arc<dyn RemoteExecutionService>>,
    logs: Option<Arc<dyn LogService>>,
    config: RunnerConfig,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remote execution service
    pub fn remote(mut self, remote: Arc<dyn RemoteExecutionService>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Set the log service
    pub fn logs(mut self, logs: Arc<dyn LogService>) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Set the configuration directly
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn agent_poll_interval(mut self, interval: Duration) -> Self {
        self.config.agent_poll_interval = interval;
        self
    }

    /// Set or disable the end marker line appended to the command
    pub fn end_marker(mut self, marker: Option<String>) -> Self {
        self.config.end_marker = marker;
        self
    }

    pub fn mirror_output(mut self, mirror: bool) -> Self {
        self.config.mirror_output = mirror;
        self
    }

    pub fn log_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_group_prefix = prefix.into();
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a service is missing or the
    /// configuration is invalid
    pub fn build(self) -> Result<Orchestrator> {
        let remote = self
            .remote
            .ok_or_else(|| Error::configuration("remote execution service is required"))?;
        let logs = self
            .logs
            .ok_or_else(|| Error::configuration("log service is required"))?;
        Orchestrator::new(remote, logs, self.config)
    }
}
