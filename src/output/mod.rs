//! Output formatting and display utilities
//!
//! This module handles:
//! - Framing captured stdout/stderr between BEGIN/END markers
//! - Color coding per stream
//! - Line splitting and blank-line trimming of captured output

pub mod formatter;

// Re-export key types for convenience
pub use formatter::{display_lines, OutputFormatter, NO_OUTPUT_NOTICE};

use crate::core::StreamKind;
use colored::{ColoredString, Colorize};

/// Visual treatment of one output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStyle(pub StreamKind);

impl StreamStyle {
    /// Get the color for this stream
    pub fn color(&self) -> colored::Color {
        match self.0 {
            StreamKind::Stdout => colored::Color::Cyan,
            StreamKind::Stderr => colored::Color::Red,
        }
    }

    /// Apply this stream's color, bold for stderr
    pub fn paint(&self, line: &str) -> ColoredString {
        let painted = line.color(self.color());
        match self.0 {
            StreamKind::Stdout => painted,
            StreamKind::Stderr => painted.bold(),
        }
    }

    /// Marker line that opens or closes the stream's block
    pub fn marker(&self, edge: &str) -> String {
        format!(
            "----- {edge} {} CONTENT -----",
            self.0.as_str().to_uppercase()
        )
    }
}
