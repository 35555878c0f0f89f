//! In-memory fakes of the two services
//!
//! Responses are scripted up front and every call is recorded so tests can
//! assert on call counts, request contents and the (paused) clock at each
//! call.

use crate::core::{
    Error, InvocationDetails, InvocationStatus, Result, StreamContent,
};
use crate::runtime::service::{
    AgentStatus, LogEvent, LogPage, LogPageRequest, LogService, RemoteExecutionService,
    SubmitCommandRequest, SubmitCommandResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::time::Instant;

fn scripted_failure(operation: &str) -> Error {
    Error::Api {
        operation: operation.to_string(),
        status: 500,
        code: Some("InternalServerError".to_string()),
        message: "scripted failure".to_string(),
    }
}

/// Build invocation details for `c-1` on `i-0abc`
pub fn details(
    status: InvocationStatus,
    response_code: Option<i32>,
    stdout: Option<&str>,
    stderr: Option<&str>,
) -> InvocationDetails {
    InvocationDetails {
        invocation_id: "c-1".to_string(),
        target_id: "i-0abc".to_string(),
        status,
        response_code,
        stdout: StreamContent::from_field(stdout.map(str::to_string)),
        stderr: StreamContent::from_field(stderr.map(str::to_string)),
        document_name: "AWS-RunShellScript".to_string(),
        plugin_name: Some("aws:runShellScript".to_string()),
        raw: None,
    }
}

/// Scripted remote execution service
pub struct FakeRemoteExecution {
    agent_statuses: Mutex<VecDeque<std::result::Result<Option<String>, String>>>,
    agent_probes: Mutex<Vec<Instant>>,
    submit_response: Mutex<std::result::Result<SubmitCommandResponse, String>>,
    submissions: Mutex<Vec<SubmitCommandRequest>>,
    statuses: Mutex<VecDeque<std::result::Result<InvocationDetails, String>>>,
    polls: Mutex<Vec<Instant>>,
}

impl Default for FakeRemoteExecution {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemoteExecution {
    /// Accepts submits with command id `c-1`; agents are online unless scripted otherwise
    pub fn new() -> Self {
        Self {
            agent_statuses: Mutex::new(VecDeque::new()),
            agent_probes: Mutex::new(Vec::new()),
            submit_response: Mutex::new(Ok(SubmitCommandResponse {
                invocation_id: Some("c-1".to_string()),
                http_success: true,
                raw: None,
            })),
            submissions: Mutex::new(Vec::new()),
            statuses: Mutex::new(VecDeque::new()),
            polls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_agent_status(&self, ping_status: Option<&str>) {
        self.agent_statuses
            .lock()
            .push_back(Ok(ping_status.map(str::to_string)));
    }

    pub fn push_agent_error(&self, operation: &str) {
        self.agent_statuses
            .lock()
            .push_back(Err(operation.to_string()));
    }

    pub fn set_submit_response(&self, invocation_id: Option<&str>, http_success: bool) {
        *self.submit_response.lock() = Ok(SubmitCommandResponse {
            invocation_id: invocation_id.map(str::to_string),
            http_success,
            raw: None,
        });
    }

    pub fn fail_submit(&self, operation: &str) {
        *self.submit_response.lock() = Err(operation.to_string());
    }

    pub fn push_status(&self, details: InvocationDetails) {
        self.statuses.lock().push_back(Ok(details));
    }

    pub fn push_status_error(&self, operation: &str) {
        self.statuses.lock().push_back(Err(operation.to_string()));
    }

    pub fn agent_probe_count(&self) -> usize {
        self.agent_probes.lock().len()
    }

    pub fn agent_probe_times(&self) -> Vec<Instant> {
        self.agent_probes.lock().clone()
    }

    pub fn submissions(&self) -> Vec<SubmitCommandRequest> {
        self.submissions.lock().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().clone()
    }

    /// Total number of calls of any kind
    pub fn call_count(&self) -> usize {
        self.agent_probe_count() + self.submissions.lock().len() + self.poll_count()
    }
}

#[async_trait]
impl RemoteExecutionService for FakeRemoteExecution {
    async fn describe_agent_status(&self, _target_id: &str) -> Result<AgentStatus> {
        self.agent_probes.lock().push(Instant::now());
        match self.agent_statuses.lock().pop_front() {
            Some(Ok(ping_status)) => Ok(AgentStatus::from_ping_status(ping_status)),
            Some(Err(operation)) => Err(scripted_failure(&operation)),
            None => Ok(AgentStatus::from_ping_status(Some("Online".to_string()))),
        }
    }

    async fn submit_command(
        &self,
        request: &SubmitCommandRequest,
    ) -> Result<SubmitCommandResponse> {
        self.submissions.lock().push(request.clone());
        self.submit_response
            .lock()
            .clone()
            .map_err(|operation| scripted_failure(&operation))
    }

    async fn get_invocation_status(
        &self,
        _target_id: &str,
        _invocation_id: &str,
    ) -> Result<InvocationDetails> {
        self.polls.lock().push(Instant::now());
        match self.statuses.lock().pop_front() {
            Some(Ok(details)) => Ok(details),
            Some(Err(operation)) => Err(scripted_failure(&operation)),
            None => Err(scripted_failure("GetCommandInvocation (unscripted)")),
        }
    }
}

/// Scripted log service keyed by log stream name and request token
#[derive(Default)]
pub struct FakeLogService {
    pages: Mutex<Vec<(String, Option<String>, LogPage)>>,
    failing_streams: Mutex<Vec<String>>,
    requests: Mutex<Vec<LogPageRequest>>,
}

impl FakeLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a stream split across pages, chained with generated tokens
    pub fn add_stream(&self, log_stream: &str, pages: &[&[&str]]) {
        for (index, messages) in pages.iter().enumerate() {
            let request_token = (index > 0).then(|| format!("{log_stream}#{index}"));
            let next_token = (index + 1 < pages.len()).then(|| format!("{log_stream}#{}", index + 1));
            let page = LogPage {
                events: messages
                    .iter()
                    .map(|m| LogEvent {
                        message: Some(m.to_string()),
                    })
                    .collect(),
                next_token,
            };
            self.add_page(log_stream, request_token.as_deref(), page);
        }
    }

    /// Script the page returned for one exact request token
    pub fn add_page(&self, log_stream: &str, request_token: Option<&str>, page: LogPage) {
        self.pages.lock().push((
            log_stream.to_string(),
            request_token.map(str::to_string),
            page,
        ));
    }

    pub fn fail_stream(&self, log_stream: &str) {
        self.failing_streams.lock().push(log_stream.to_string());
    }

    pub fn requests(&self) -> Vec<LogPageRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LogService for FakeLogService {
    async fn get_log_page(&self, request: &LogPageRequest) -> Result<LogPage> {
        self.requests.lock().push(request.clone());

        if self.failing_streams.lock().contains(&request.log_stream) {
            return Err(scripted_failure("GetLogEvents"));
        }

        // Unknown streams read as empty
        Ok(self
            .pages
            .lock()
            .iter()
            .find(|(stream, token, _)| {
                stream == &request.log_stream && token == &request.next_token
            })
            .map(|(_, _, page)| page.clone())
            .unwrap_or_default())
    }
}
