use crate::core::{InvocationDetails, Result, StreamKind};
use crate::runtime::service::{LogPageRequest, LogService};
use tracing::debug;

/// Where SSM mirrors one output stream of an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocator {
    pub log_group: String,
    pub log_stream: String,
}

impl LogLocator {
    /// Build the locator, or `None` when the plugin name is unknown
    ///
    /// Plugin names look like `aws:runShellScript`; the first `:` becomes `-`
    /// in the stream name.
    pub fn for_stream(
        log_group_prefix: &str,
        details: &InvocationDetails,
        stream: StreamKind,
    ) -> Option<Self> {
        let plugin = details.plugin_name.as_deref()?.replacen(':', "-", 1);
        Some(Self {
            log_group: format!("{log_group_prefix}{}", details.document_name),
            log_stream: format!(
                "{}/{}/{}/{}",
                details.invocation_id, details.target_id, plugin, stream
            ),
        })
    }
}

/// Reads a whole log stream by following continuation tokens
pub struct LogPaginator<'a> {
    service: &'a dyn LogService,
}

impl<'a> LogPaginator<'a> {
    pub fn new(service: &'a dyn LogService) -> Self {
        Self { service }
    }

    /// Fetch every page of the stream, in order
    ///
    /// Events without a message are skipped; empty messages are kept. Stops
    /// when a page carries no token, or echoes back the token it was fetched
    /// with (CloudWatch's end-of-stream marker). There is no page limit.
    pub async fn collect_stream(&self, locator: &LogLocator) -> Result<Vec<String>> {
        let mut chunks = Vec::new();
        let mut request = LogPageRequest {
            log_group: locator.log_group.clone(),
            log_stream: locator.log_stream.clone(),
            next_token: None,
        };
        let mut pages = 0usize;

        loop {
            let page = self.service.get_log_page(&request).await?;
            pages += 1;
            chunks.extend(page.events.into_iter().filter_map(|event| event.message));

            match page.next_token {
                Some(token) if request.next_token.as_deref() != Some(token.as_str()) => {
                    request.next_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(
            log_stream = %locator.log_stream,
            pages,
            chunks = chunks.len(),
            "log stream collected"
        );
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InvocationStatus;
    use crate::runtime::service::{LogEvent, LogPage};
    use crate::testing::mocks::{details, FakeLogService};
    use proptest::prelude::*;

    const STDOUT_STREAM: &str = "c-1/i-0abc/aws-runShellScript/stdout";

    fn locator() -> LogLocator {
        LogLocator {
            log_group: "/aws/ssm/AWS-RunShellScript".to_string(),
            log_stream: STDOUT_STREAM.to_string(),
        }
    }

    #[test]
    fn test_locator_naming() {
        let details = details(InvocationStatus::Success, Some(0), Some("x"), None);

        let stdout = LogLocator::for_stream("/aws/ssm/", &details, StreamKind::Stdout).unwrap();
        assert_eq!(stdout.log_group, "/aws/ssm/AWS-RunShellScript");
        assert_eq!(stdout.log_stream, STDOUT_STREAM);

        let stderr = LogLocator::for_stream("/aws/ssm/", &details, StreamKind::Stderr).unwrap();
        assert_eq!(stderr.log_stream, "c-1/i-0abc/aws-runShellScript/stderr");
    }

    #[test]
    fn test_locator_replaces_only_first_separator() {
        let mut details = details(InvocationStatus::Success, Some(0), Some("x"), None);
        details.plugin_name = Some("aws:runShellScript:step".to_string());

        let locator = LogLocator::for_stream("/aws/ssm/", &details, StreamKind::Stdout).unwrap();
        assert_eq!(locator.log_stream, "c-1/i-0abc/aws-runShellScript:step/stdout");

        details.plugin_name = None;
        assert_eq!(
            LogLocator::for_stream("/aws/ssm/", &details, StreamKind::Stdout),
            None
        );
    }

    #[tokio::test]
    async fn test_single_page_stream() {
        let logs = FakeLogService::new();
        logs.add_stream(STDOUT_STREAM, &[&["hi\n"]]);

        let chunks = LogPaginator::new(&logs)
            .collect_stream(&locator())
            .await
            .unwrap();

        assert_eq!(chunks, vec!["hi\n".to_string()]);
        assert_eq!(logs.request_count(), 1);
        assert_eq!(logs.requests()[0].next_token, None);
    }

    #[tokio::test]
    async fn test_missing_messages_are_skipped_but_empty_ones_kept() {
        let logs = FakeLogService::new();
        logs.add_page(
            STDOUT_STREAM,
            None,
            LogPage {
                events: vec![
                    LogEvent {
                        message: Some("a".to_string()),
                    },
                    LogEvent { message: None },
                    LogEvent {
                        message: Some(String::new()),
                    },
                    LogEvent {
                        message: Some("b".to_string()),
                    },
                ],
                next_token: None,
            },
        );

        let chunks = LogPaginator::new(&logs)
            .collect_stream(&locator())
            .await
            .unwrap();

        assert_eq!(chunks, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn test_echoed_token_ends_the_stream() {
        let logs = FakeLogService::new();
        logs.add_page(
            STDOUT_STREAM,
            None,
            LogPage {
                events: vec![LogEvent {
                    message: Some("first".to_string()),
                }],
                next_token: Some("f/1".to_string()),
            },
        );
        logs.add_page(
            STDOUT_STREAM,
            Some("f/1"),
            LogPage {
                events: vec![LogEvent {
                    message: Some("second".to_string()),
                }],
                next_token: Some("f/1".to_string()),
            },
        );

        let chunks = LogPaginator::new(&logs)
            .collect_stream(&locator())
            .await
            .unwrap();

        assert_eq!(chunks, vec!["first", "second"]);
        assert_eq!(logs.request_count(), 2);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let logs = FakeLogService::new();
        logs.fail_stream(STDOUT_STREAM);

        let result = LogPaginator::new(&logs).collect_stream(&locator()).await;
        tokio_test::assert_err!(result);
    }

    proptest! {
        #[test]
        fn prop_pages_concatenate_in_fetch_order(
            pages in prop::collection::vec(prop::collection::vec("[a-z \n]{0,12}", 0..4), 1..8)
        ) {
            let logs = FakeLogService::new();
            let borrowed: Vec<Vec<&str>> = pages
                .iter()
                .map(|page| page.iter().map(String::as_str).collect())
                .collect();
            let slices: Vec<&[&str]> = borrowed.iter().map(Vec::as_slice).collect();
            logs.add_stream(STDOUT_STREAM, &slices);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let chunks = runtime
                .block_on(LogPaginator::new(&logs).collect_stream(&locator()))
                .unwrap();

            let expected: Vec<String> = pages.iter().flatten().cloned().collect();
            prop_assert_eq!(chunks.concat(), expected.concat());
            prop_assert_eq!(chunks, expected);
            prop_assert_eq!(logs.request_count(), pages.len());
        }
    }
}
