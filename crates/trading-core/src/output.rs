//! Output destinations for performance data and logs.
//!
//! A destination token resolves to one [`OutputTarget`]:
//! - `-` writes to the console (stdout for data, stderr for logs)
//! - `--` suppresses the write entirely; the caller keeps the in-memory result
//! - the platform null device discards
//! - anything else is a file path that receives the full artifact

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::PerformanceReport;

/// Conventional discard sentinel.
#[cfg(windows)]
pub const DISCARD: &str = "nul";
#[cfg(not(windows))]
pub const DISCARD: &str = "/dev/null";

/// Token selecting the console.
pub const CONSOLE_TOKEN: &str = "-";
/// Token suppressing the default write.
pub const SUPPRESS_TOKEN: &str = "--";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write to the console: {0}")]
    Console(#[from] io::Error),

    #[error("Failed to write {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize performance data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which console stream `-` means for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    /// Standard output; performance data.
    Primary,
    /// Standard error; logs.
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Stderr,
    File(PathBuf),
    Suppressed,
    Discard,
}

impl OutputTarget {
    /// Resolve a destination token for an artifact whose console is `console`.
    pub fn resolve(token: &str, console: ConsoleStream) -> Self {
        match token {
            CONSOLE_TOKEN => match console {
                ConsoleStream::Primary => OutputTarget::Stdout,
                ConsoleStream::Secondary => OutputTarget::Stderr,
            },
            SUPPRESS_TOKEN => OutputTarget::Suppressed,
            _ if Path::new(token) == Path::new(DISCARD) => OutputTarget::Discard,
            _ => OutputTarget::File(PathBuf::from(token)),
        }
    }

    /// Write a text artifact (logs).
    pub fn write_text(&self, console: &mut Console<'_>, text: &str) -> Result<(), OutputError> {
        match self {
            OutputTarget::Stdout => writeln!(console.out, "{}", text)?,
            OutputTarget::Stderr => writeln!(console.err, "{}", text)?,
            OutputTarget::File(path) => write_file(path, text.as_bytes())?,
            OutputTarget::Suppressed | OutputTarget::Discard => {}
        }
        Ok(())
    }

    /// Write performance data: a text summary (after `label`, if given) on
    /// the console, pretty JSON in a file.
    pub fn write_report(
        &self,
        console: &mut Console<'_>,
        report: &PerformanceReport,
        label: Option<&str>,
    ) -> Result<(), OutputError> {
        let rendered = match label {
            Some(label) => format!("{}\n{}", label, report.summary()),
            None => report.summary(),
        };
        match self {
            OutputTarget::Stdout => writeln!(console.out, "{}", rendered)?,
            OutputTarget::Stderr => writeln!(console.err, "{}", rendered)?,
            OutputTarget::File(path) => write_file(path, report.to_json()?.as_bytes())?,
            OutputTarget::Suppressed | OutputTarget::Discard => {}
        }
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    std::fs::write(path, bytes).map_err(|source| OutputError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// The two console streams of an invocation.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }

    /// Print a line to stdout.
    pub fn say(&mut self, line: impl AsRef<str>) -> Result<(), OutputError> {
        writeln!(self.out, "{}", line.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_tokens() {
        assert_eq!(OutputTarget::resolve("-", ConsoleStream::Primary), OutputTarget::Stdout);
        assert_eq!(OutputTarget::resolve("-", ConsoleStream::Secondary), OutputTarget::Stderr);
        assert_eq!(OutputTarget::resolve("--", ConsoleStream::Primary), OutputTarget::Suppressed);
        assert_eq!(OutputTarget::resolve(DISCARD, ConsoleStream::Secondary), OutputTarget::Discard);
        assert_eq!(
            OutputTarget::resolve("perf.json", ConsoleStream::Primary),
            OutputTarget::File(PathBuf::from("perf.json"))
        );
    }

    #[test]
    fn test_resolution_is_stable() {
        for token in ["-", "--", DISCARD, "out.json"] {
            assert_eq!(
                OutputTarget::resolve(token, ConsoleStream::Primary),
                OutputTarget::resolve(token, ConsoleStream::Primary)
            );
        }
    }

    #[test]
    fn test_suppressed_and_discard_never_write() {
        let report = PerformanceReport::new(json!({"sharpe": 1.0}));
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut console = Console::new(&mut out, &mut err);

        for target in [OutputTarget::Suppressed, OutputTarget::Discard] {
            target.write_report(&mut console, &report, Some("label")).unwrap();
            target.write_text(&mut console, "log").unwrap();
        }

        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_console_report_has_label() {
        let report = PerformanceReport::new(json!({"sharpe": 1.5}));
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut console = Console::new(&mut out, &mut err);

        OutputTarget::Stdout
            .write_report(&mut console, &report, Some("the performance data is:"))
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("the performance data is:\n"));
        assert!(out.contains("1.5"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_file_target_persists_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf.json");
        let report = PerformanceReport::new(json!({"sharpe": 2.0}));
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut console = Console::new(&mut out, &mut err);

        OutputTarget::File(path.clone())
            .write_report(&mut console, &report, None)
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"sharpe": 2.0}));
        assert!(out.is_empty());
    }

    #[test]
    fn test_file_write_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("log.txt");
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut console = Console::new(&mut out, &mut err);

        let result = OutputTarget::File(path.clone()).write_text(&mut console, "hello");
        match result {
            Err(OutputError::File { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
