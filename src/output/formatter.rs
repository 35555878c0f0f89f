use crate::core::{StreamContent, StreamKind};
use crate::output::StreamStyle;
use colored::Colorize;

/// Printed instead of empty marker blocks when neither stream has content
pub const NO_OUTPUT_NOTICE: &str = "The remote command produced no output.";

/// Split captured output into display lines
///
/// Both `\n` and `\r\n` end a line. Blank lines at the start and end are
/// dropped, blank lines in between are kept as they are.
pub fn display_lines(content: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    lines.drain(..leading);

    lines
}

/// Renders captured streams for the job log
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    color: bool,
}

impl OutputFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, style: StreamStyle, line: &str) -> String {
        if self.color {
            style.paint(line).to_string()
        } else {
            line.to_string()
        }
    }

    fn render_block(&self, stream: StreamKind, lines: &[&str], out: &mut Vec<String>) {
        let style = StreamStyle(stream);
        out.push(self.paint(style, &style.marker("BEGIN")));
        out.extend(lines.iter().map(|line| self.paint(style, line)));
        out.push(self.paint(style, &style.marker("END")));
    }

    /// Render both streams into log lines
    ///
    /// A stream is shown only when it has at least one non-blank line. When
    /// neither does, the result is the single [`NO_OUTPUT_NOTICE`] line.
    pub fn render(&self, stdout: &StreamContent, stderr: &StreamContent) -> Vec<String> {
        let mut out = Vec::new();

        for (stream, content) in [(StreamKind::Stdout, stdout), (StreamKind::Stderr, stderr)] {
            let lines = content.text().map(display_lines).unwrap_or_default();
            if !lines.is_empty() {
                self.render_block(stream, &lines, &mut out);
            }
        }

        if out.is_empty() {
            out.push(if self.color {
                NO_OUTPUT_NOTICE.bright_black().bold().to_string()
            } else {
                NO_OUTPUT_NOTICE.to_string()
            });
        }
        out
    }
}
