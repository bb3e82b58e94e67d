//! External command execution.
//!
//! Every `npm` and `databricks` call goes through [`CommandRunner`] so the
//! build and deploy workflows can be driven by a scripted runner in tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// A command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Inherit stdout/stderr instead of capturing them
    pub stream: bool,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stream: false,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// The command as a single shell-like line, for logs and messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Like [`command_line`](Self::command_line) with secret values masked.
    pub fn redacted_line(&self) -> String {
        let mut hide_next = false;
        let args = self.args.iter().map(|arg| {
            let shown = if hide_next { "****" } else { arg.as_str() };
            hide_next = arg == "--string-value";
            shown
        });
        std::iter::once(self.program.as_str())
            .chain(args)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over process execution for testability.
/// Real implementation: `SystemRunner`. Test double: `testing::ScriptedRunner`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. Errors only when the process cannot be spawned.
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        tracing::debug!("Running: {}", invocation.redacted_line());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        if invocation.stream {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await?;
            return Ok(CommandOutput {
                exit_code: status.code().unwrap_or(-1),
                ..CommandOutput::default()
            });
        }

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Rule {
        prefix: String,
        responses: VecDeque<std::io::Result<CommandOutput>>,
    }

    /// Replays canned outputs keyed by command-line prefix and records every call.
    ///
    /// The last queued response for a prefix repeats; commands with no rule succeed
    /// with empty output.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Mutex<Vec<Rule>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, prefix: &str, output: CommandOutput) -> Self {
            self.push(prefix, Ok(output));
            self
        }

        pub fn spawn_error(self, prefix: &str) -> Self {
            self.push(
                prefix,
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "not found")),
            );
            self
        }

        fn push(&self, prefix: &str, response: std::io::Result<CommandOutput>) {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|r| r.prefix == prefix) {
                Some(rule) => rule.responses.push_back(response),
                None => rules.push(Rule {
                    prefix: prefix.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }

        pub fn invocations(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn clone_response(r: &std::io::Result<CommandOutput>) -> std::io::Result<CommandOutput> {
        match r {
            Ok(out) => Ok(out.clone()),
            Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
            let line = invocation.command_line();
            self.calls.lock().unwrap().push(invocation.clone());

            let mut rules = self.rules.lock().unwrap();
            let rule = rules
                .iter_mut()
                .filter(|r| line.starts_with(&r.prefix))
                .max_by_key(|r| r.prefix.len());
            match rule {
                Some(rule) if rule.responses.len() > 1 => {
                    rule.responses.pop_front().unwrap_or_else(|| Ok(CommandOutput::ok("")))
                }
                Some(rule) => rule
                    .responses
                    .front()
                    .map(clone_response)
                    .unwrap_or_else(|| Ok(CommandOutput::ok(""))),
                None => Ok(CommandOutput::ok("")),
            }
        }
    }
}
