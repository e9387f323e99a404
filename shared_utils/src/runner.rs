//! External command execution
//!
//! Every ripper and encoder is driven through [`CommandRunner`]. Commands are
//! argument vectors, never shell strings, so titles and paths containing
//! quotes or spaces reach the tool untouched.

use crate::errors::{Result, RipError};
use crate::logging::log_external_tool;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Path argument, guarded against being read as a flag.
    pub fn path_arg(self, path: &Path) -> Self {
        let arg = crate::path_safety::safe_path_arg(path).into_owned();
        self.arg(arg)
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following `flag`, if present.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a probe-style command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr; several tools print their tables on stderr.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            _ => self.stderr.clone(),
        }
    }
}

/// Exit status of a command run with inherited stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub exit_code: Option<i32>,
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub trait CommandRunner {
    /// Run to completion, capturing stdout and stderr.
    fn capture(&self, cmd: &ToolCommand) -> Result<ToolOutput>;

    /// Run attached to the terminal so the tool can show progress or ask
    /// its own questions (abcde, HandBrakeCLI, makemkvcon).
    fn run_attached(&self, cmd: &ToolCommand) -> Result<ToolStatus>;

    /// Where `program` would be found on PATH.
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(cmd: &ToolCommand, e: std::io::Error) -> RipError {
    if e.kind() == ErrorKind::NotFound {
        RipError::ToolNotFound(cmd.program.clone())
    } else {
        RipError::Io(e)
    }
}

impl CommandRunner for SystemRunner {
    fn capture(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        let command_line = cmd.to_string();
        tracing::debug!(command = %command_line, "Executing external command");

        let start = Instant::now();
        let output = cmd
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(cmd, e))?;

        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log_external_tool(
            &cmd.program,
            &command_line,
            &result.combined(),
            result.exit_code,
            start.elapsed(),
        );
        Ok(result)
    }

    fn run_attached(&self, cmd: &ToolCommand) -> Result<ToolStatus> {
        let command_line = cmd.to_string();
        tracing::info!(command = %command_line, "Executing attached command");

        let start = Instant::now();
        let status = cmd
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(cmd, e))?;

        log_external_tool(&cmd.program, &command_line, "", status.code(), start.elapsed());
        Ok(ToolStatus {
            exit_code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_spaces() {
        let cmd = ToolCommand::new("HandBrakeCLI")
            .args(["--input", "/dev/sr0", "--output"])
            .arg("/rips/My Band/01 - Intro.mp4");
        assert_eq!(
            cmd.to_string(),
            "HandBrakeCLI --input /dev/sr0 --output '/rips/My Band/01 - Intro.mp4'"
        );
    }

    #[test]
    fn test_display_escapes_single_quote() {
        let cmd = ToolCommand::new("ffmpeg").arg("Don't Stop.mov");
        assert_eq!(cmd.to_string(), r"ffmpeg 'Don'\''t Stop.mov'");
    }

    #[test]
    fn test_arg_after() {
        let cmd = ToolCommand::new("HandBrakeCLI").args(["--title", "3", "--markers"]);
        assert_eq!(cmd.arg_after("--title"), Some("3"));
        assert_eq!(cmd.arg_after("--markers"), None);
        assert!(cmd.has_arg("--markers"));
    }

    #[test]
    fn test_path_arg_guards_leading_dash() {
        let cmd = ToolCommand::new("ffmpeg").path_arg(Path::new("-weird.mov"));
        assert_eq!(cmd.args, vec!["./-weird.mov"]);
    }

    #[test]
    fn test_combined_output() {
        let out = ToolOutput {
            exit_code: Some(0),
            stdout: "a".into(),
            stderr: "b".into(),
        };
        assert_eq!(out.combined(), "a\nb");
        let only_err = ToolOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "b".into(),
        };
        assert_eq!(only_err.combined(), "b");
        assert!(!only_err.success());
    }

    #[test]
    fn test_system_runner_captures_echo() {
        let out = SystemRunner::new()
            .capture(&ToolCommand::new("echo").args(["hello", "world"]))
            .unwrap();
        assert!(out.success());
        assert!(out.stdout.contains("hello world"));
    }

    #[test]
    fn test_system_runner_missing_tool() {
        let err = SystemRunner::new()
            .capture(&ToolCommand::new("nonexistent_command_xyz"))
            .unwrap_err();
        assert!(matches!(err, RipError::ToolNotFound(ref t) if t == "nonexistent_command_xyz"));
    }
}
