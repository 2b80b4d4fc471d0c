use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

pub type UromanResult<T> = Result<T, UromanError>;

#[derive(Debug, Clone)]
pub struct UromanError(pub String);

impl Error for UromanError {}

impl fmt::Display for UromanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uroman Error: {}", self.0)
    }
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace runs to single spaces and trims both ends.
pub fn normalize_whitespace(line: &str) -> String {
    WHITESPACE_RUN.replace_all(line, " ").trim().to_string()
}

/// Takes line 1 of the tool output, whitespace-normalized. Later lines are
/// discarded; that truncation matches the tool's established usage. `None`
/// when the output holds no line at all.
pub fn first_output_line(raw: &str) -> Option<String> {
    raw.lines().next().map(normalize_whitespace)
}

/// Invokes the `uroman.pl` transliteration script through its interpreter,
/// feeding text in and reading text out via transient files. Both files are
/// removed on every exit path.
pub struct UromanTool {
    script_path: PathBuf,
    interpreter: PathBuf,
}

impl UromanTool {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            interpreter: PathBuf::from("perl"),
        }
    }

    /// Replaces the `perl` interpreter, for scripts carried by another runtime.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn romanize(&self, text: &str, language: &str) -> UromanResult<String> {
        let input_file = NamedTempFile::new()
            .map_err(|e| UromanError(format!("Failed to create input file: {}", e)))?;
        let output_file = NamedTempFile::new()
            .map_err(|e| UromanError(format!("Failed to create output file: {}", e)))?;
        fs::write(input_file.path(), text)
            .map_err(|e| UromanError(format!("Failed to write input text: {}", e)))?;

        let stdin = File::open(input_file.path())
            .map_err(|e| UromanError(format!("Failed to open input file: {}", e)))?;
        let stdout = File::create(output_file.path())
            .map_err(|e| UromanError(format!("Failed to open output file: {}", e)))?;
        let status = Command::new(&self.interpreter)
            .arg(&self.script_path)
            .arg("-l")
            .arg(language)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                UromanError(format!(
                    "Failed to run `{} {}`: {}",
                    self.interpreter.display(),
                    self.script_path.display(),
                    e
                ))
            })?;
        if !status.success() {
            return Err(UromanError(format!(
                "`{}` exited with status {}",
                self.script_path.display(),
                status
            )));
        }

        let raw = fs::read_to_string(output_file.path())
            .map_err(|e| UromanError(format!("Failed to read tool output: {}", e)))?;
        first_output_line(&raw).ok_or_else(|| {
            UromanError(format!(
                "`{}` produced no output",
                self.script_path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn shell_tool(dir: &Path, script_body: &str) -> UromanTool {
        let script_path = dir.join("fake_uroman.sh");
        let mut file = File::create(&script_path).unwrap();
        file.write_all(script_body.as_bytes()).unwrap();
        UromanTool::new(script_path).with_interpreter("/bin/sh")
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  foo \t bar "), "foo bar");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_first_line_only() {
        assert_eq!(first_output_line("foo   bar\nbaz\n").unwrap(), "foo bar");
        assert_eq!(first_output_line("\nfoo").unwrap(), "");
        assert_eq!(first_output_line(""), None);
    }

    #[test]
    fn test_round_trip_through_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        let tool = shell_tool(dir.path(), "cat\n");
        let out = tool.romanize("foo   bar", "xxx").unwrap();
        assert_eq!(out, "foo bar");
    }

    #[test]
    fn test_multi_line_output_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let tool = shell_tool(dir.path(), "cat\n");
        let out = tool.romanize("foo   bar\nbaz", "xxx").unwrap();
        assert_eq!(out, "foo bar");
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = shell_tool(dir.path(), "exit 3\n");
        assert!(tool.romanize("text", "xxx").is_err());
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = shell_tool(dir.path(), "true\n");
        assert!(tool.romanize("text", "xxx").is_err());
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let tool = UromanTool::new("/nonexistent/uroman.pl").with_interpreter("/bin/sh");
        assert!(tool.romanize("text", "xxx").is_err());
    }
}
