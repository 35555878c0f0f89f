//! HTTP clients for SSM and CloudWatch Logs
//!
//! Both services speak the AWS JSON 1.1 protocol: every operation is a `POST`
//! to the service root with the operation named in the `X-Amz-Target` header.
//! Requests are not signed. Point the endpoints at something that signs on
//! the way through (a signing proxy or a local emulator).

use crate::core::{Error, InvocationDetails, InvocationStatus, Result, StreamContent};
use crate::runtime::service::{
    AgentStatus, LogEvent, LogPage, LogPageRequest, LogService, RemoteExecutionService,
    SubmitCommandRequest, SubmitCommandResponse,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const AMZ_JSON_1_1: &str = "application/x-amz-json-1.1";
const SSM_TARGET_PREFIX: &str = "AmazonSSM";
const LOGS_TARGET_PREFIX: &str = "Logs_20140328";

/// Public endpoint of an AWS service in a region, e.g. `https://ssm.eu-west-1.amazonaws.com/`
pub fn regional_endpoint(service: &str, region: &str) -> Result<Url> {
    if region.trim().is_empty() {
        return Err(Error::configuration("AWS region must not be empty"));
    }
    Ok(Url::parse(&format!("https://{service}.{region}.amazonaws.com/"))?)
}

/// Error body returned by AWS JSON services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Clone)]
struct JsonProtocol {
    http: Client,
    endpoint: Url,
    target_prefix: &'static str,
}

impl JsonProtocol {
    async fn call<B, T>(&self, operation: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.call_raw(operation, body).await?)?)
    }

    /// Same as [`call`](Self::call), keeping the body as sent by the service
    async fn call_raw<B>(&self, operation: &str, body: &B) -> Result<serde_json::Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("X-Amz-Target", format!("{}.{}", self.target_prefix, operation))
            .header(header::CONTENT_TYPE, AMZ_JSON_1_1)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(operation, status = status.as_u16(), bytes = bytes.len(), "service response");

        if !status.is_success() {
            let parsed = serde_json::from_slice::<ErrorBody>(&bytes).ok();
            let code = parsed
                .as_ref()
                .and_then(|b| b.kind.as_deref())
                .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string());
            let message = parsed
                .and_then(|b| b.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            warn!(operation, status = status.as_u16(), ?code, "service call failed");
            return Err(Error::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

// =============================================================================
// SSM
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstanceInformationInput<'a> {
    filters: [InstanceInformationFilter<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceInformationFilter<'a> {
    key: &'a str,
    values: [&'a str; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstanceInformationOutput {
    #[serde(default)]
    instance_information_list: Vec<InstanceInformation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceInformation {
    ping_status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendCommandInput<'a> {
    document_name: &'a str,
    instance_ids: [&'a str; 1],
    parameters: SendCommandParameters<'a>,
    cloud_watch_output_config: CloudWatchOutputConfig,
}

#[derive(Serialize)]
struct SendCommandParameters<'a> {
    commands: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CloudWatchOutputConfig {
    cloud_watch_output_enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendCommandOutput {
    command: Option<CommandInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CommandInfo {
    command_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetCommandInvocationInput<'a> {
    command_id: &'a str,
    instance_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCommandInvocationOutput {
    command_id: Option<String>,
    instance_id: Option<String>,
    document_name: Option<String>,
    plugin_name: Option<String>,
    response_code: Option<i32>,
    status: Option<InvocationStatus>,
    standard_output_content: Option<String>,
    standard_error_content: Option<String>,
}

/// SSM Run Command client
#[derive(Debug, Clone)]
pub struct SsmClient {
    protocol: JsonProtocol,
}

impl SsmClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_http_client(Client::new(), endpoint)
    }

    pub fn for_region(region: &str) -> Result<Self> {
        Ok(Self::new(regional_endpoint("ssm", region)?))
    }

    pub fn with_http_client(http: Client, endpoint: Url) -> Self {
        Self {
            protocol: JsonProtocol {
                http,
                endpoint,
                target_prefix: SSM_TARGET_PREFIX,
            },
        }
    }
}

#[async_trait]
impl RemoteExecutionService for SsmClient {
    async fn describe_agent_status(&self, target_id: &str) -> Result<AgentStatus> {
        let input = DescribeInstanceInformationInput {
            filters: [InstanceInformationFilter {
                key: "InstanceIds",
                values: [target_id],
            }],
        };
        let raw = self
            .protocol
            .call_raw("DescribeInstanceInformation", &input)
            .await?;
        let output: DescribeInstanceInformationOutput = serde_json::from_value(raw.clone())?;

        let ping_status = output
            .instance_information_list
            .into_iter()
            .next()
            .and_then(|info| info.ping_status);
        Ok(AgentStatus::from_ping_status(ping_status).with_raw(raw))
    }

    async fn submit_command(
        &self,
        request: &SubmitCommandRequest,
    ) -> Result<SubmitCommandResponse> {
        let input = SendCommandInput {
            document_name: request.shell.document_name(),
            instance_ids: [request.target_id.as_str()],
            parameters: SendCommandParameters {
                commands: &request.commands,
            },
            cloud_watch_output_config: CloudWatchOutputConfig {
                cloud_watch_output_enabled: request.mirror_output,
            },
        };
        let raw = self.protocol.call_raw("SendCommand", &input).await?;
        let output: SendCommandOutput = serde_json::from_value(raw.clone())?;

        // Non-2xx responses were turned into errors by the protocol layer
        Ok(SubmitCommandResponse {
            invocation_id: output.command.and_then(|c| c.command_id),
            http_success: true,
            raw: Some(raw),
        })
    }

    async fn get_invocation_status(
        &self,
        target_id: &str,
        invocation_id: &str,
    ) -> Result<InvocationDetails> {
        let input = GetCommandInvocationInput {
            command_id: invocation_id,
            instance_id: target_id,
        };
        let raw = self.protocol.call_raw("GetCommandInvocation", &input).await?;
        let output: GetCommandInvocationOutput = serde_json::from_value(raw.clone())?;

        Ok(InvocationDetails {
            invocation_id: output
                .command_id
                .unwrap_or_else(|| invocation_id.to_string()),
            target_id: output.instance_id.unwrap_or_else(|| target_id.to_string()),
            status: output.status.unwrap_or(InvocationStatus::Unknown),
            response_code: output.response_code,
            stdout: StreamContent::from_field(output.standard_output_content),
            stderr: StreamContent::from_field(output.standard_error_content),
            document_name: output.document_name.unwrap_or_default(),
            plugin_name: output.plugin_name,
            raw: Some(raw),
        })
    }
}

// =============================================================================
// CloudWatch Logs
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetLogEventsInput<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
    start_from_head: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetLogEventsOutput {
    #[serde(default)]
    events: Vec<OutputLogEvent>,
    next_forward_token: Option<String>,
}

#[derive(Deserialize)]
struct OutputLogEvent {
    message: Option<String>,
}

/// CloudWatch Logs client
#[derive(Debug, Clone)]
pub struct CloudWatchLogsClient {
    protocol: JsonProtocol,
}

impl CloudWatchLogsClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_http_client(Client::new(), endpoint)
    }

    pub fn for_region(region: &str) -> Result<Self> {
        Ok(Self::new(regional_endpoint("logs", region)?))
    }

    pub fn with_http_client(http: Client, endpoint: Url) -> Self {
        Self {
            protocol: JsonProtocol {
                http,
                endpoint,
                target_prefix: LOGS_TARGET_PREFIX,
            },
        }
    }
}

#[async_trait]
impl LogService for CloudWatchLogsClient {
    async fn get_log_page(&self, request: &LogPageRequest) -> Result<LogPage> {
        let input = GetLogEventsInput {
            log_group_name: &request.log_group,
            log_stream_name: &request.log_stream,
            next_token: request.next_token.as_deref(),
            start_from_head: true,
        };
        let output: GetLogEventsOutput = self.protocol.call("GetLogEvents", &input).await?;

        Ok(LogPage {
            events: output
                .events
                .into_iter()
                .map(|e| LogEvent { message: e.message })
                .collect(),
            next_token: output.next_forward_token,
        })
    }
}
