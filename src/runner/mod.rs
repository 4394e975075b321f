//! External command execution
//!
//! All kind and kubectl calls go through [`CommandRunner`] so transitions can
//! be tested without a container runtime. [`RealCommandRunner`] is the only
//! production implementation and blocks until the child exits.

use std::process::{Command, Output};

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::{Error, Result};

/// A program, its arguments and any extra environment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run (looked up on PATH)
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
    /// Variables added to the inherited environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Start an invocation of `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of the argument following `flag`, if any
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Whether the arguments start with `prefix`
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }

    /// Command line for diagnostics (environment is not shown)
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Command output for testability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether command succeeded
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout followed by stderr, for diagnostics
    ///
    /// The streams are captured separately, so lines are not interleaved in
    /// the order the child wrote them. All of stdout comes first.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Trait for executing external commands (allows mocking in tests)
///
/// `Err` means the command could not be run at all; a command that ran and
/// exited non-zero is `Ok` with `success == false`.
#[cfg_attr(test, automock)]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Real command runner that executes actual system commands
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        debug!(command = %invocation, "Executing command");

        let output = cmd.output().map_err(|e| {
            Error::backend(invocation.command_line(), format!("failed to execute: {}", e))
        })?;

        Ok(CommandOutput::from(output))
    }
}
