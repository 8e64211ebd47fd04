use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Invalid command line {line:?}: {source}")]
    InvalidCommandLine {
        line: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    /// Build a spec from a configured command line such as `code --wait`.
    /// Words are split with shell quoting rules, so a quoted program path
    /// may contain spaces. No shell is involved in running it.
    pub fn from_command_line(line: &str) -> Result<Self, ExecError> {
        let words = shell_words::split(line).map_err(|source| ExecError::InvalidCommandLine {
            line: line.to_string(),
            source,
        })?;
        let mut words = words.into_iter();
        let program = words.next().ok_or(ExecError::EmptyCommand)?;
        Ok(Self::new(program).args(words))
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve on exit code 0; anything else is an error carrying stderr.
    async fn run(&self, spec: &CommandSpec) -> Result<(), ExecError>;
}

/// Runs commands as real child processes. Their stdout is discarded so it
/// doesn't interleave with status output; stderr is captured for errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), ExecError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        debug!(command = %spec, dir = ?spec.current_dir, "running command");
        let output = command.output().await.map_err(|source| ExecError::Spawn {
            command: spec.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                command: spec.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
