use crate::core::{Error, Result, ResultSink};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use uuid::Uuid;

/// Reports to the GitHub Actions runner through workflow commands on stdout
/// and the `GITHUB_OUTPUT` file
pub struct GithubActionsSink {
    output_file: Option<PathBuf>,
    out: Mutex<Box<dyn Write + Send>>,
    failed: AtomicBool,
}

impl GithubActionsSink {
    /// Sink writing to stdout, with outputs going to `$GITHUB_OUTPUT` when set
    ///
    /// An empty `GITHUB_OUTPUT` counts as unset.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            Box::new(std::io::stdout()),
        )
    }

    /// File outputs are appended to, if any
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn new(output_file: Option<PathBuf>, out: Box<dyn Write + Send>) -> Self {
        Self {
            output_file,
            out: Mutex::new(out),
            failed: AtomicBool::new(false),
        }
    }

    /// Whether the job was marked failed
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!("Failed to write to job log: {}", e);
        }
    }

    fn append_output_file(path: &Path, name: &str, value: &str) -> Result<()> {
        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(Error::configuration(format!(
                "output {name} collides with the generated delimiter"
            )));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")?;
        Ok(())
    }
}

/// Escape data for a workflow command, as the runner expects
fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value
fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

impl ResultSink for GithubActionsSink {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        debug!(name, value, "setting output");
        match &self.output_file {
            Some(path) => Self::append_output_file(path, name, value),
            None => {
                self.write_line(&format!(
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                ));
                Ok(())
            }
        }
    }

    fn set_failed(&self, error: &Error) {
        self.failed.store(true, Ordering::SeqCst);
        self.write_line(&format!("::error::{}", escape_data(&error.user_message())));
    }

    fn info(&self, line: &str) {
        self.write_line(line);
    }

    fn debug(&self, line: &str) {
        self.write_line(&format!("::debug::{}", escape_data(line)));
    }
}
