use std::process::{Command, Stdio};

use crate::error::{LoginError, LoginResult};

/// Substituted for an empty stdout when a command fails.
pub const NO_STDOUT: &str = "(no output on stdout)";
/// Substituted for an empty stderr when a command fails.
pub const NO_STDERR: &str = "(no output on stderr)";

/// Captured result of a finished command. Output is decoded
/// lossily as UTF-8 and kept untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `-1` when the child was killed by a signal.
    pub code: i32,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Options for [`run_with`].
///
/// # Example
///
/// ```
/// use horizon_login::cmd::RunOptions;
///
/// let opts = RunOptions::new().env("LANG", "C").unchecked();
///
/// assert!(!opts.check);
/// assert_eq!(opts.env, Some(vec![("LANG".into(), "C".into())]));
/// ```
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Replacement environment. When set, the child sees only
    /// these variables.
    pub env: Option<Vec<(String, String)>>,
    /// Fail on a non-zero exit code.
    pub check: bool,
}

impl RunOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            env: None,
            check: true,
        }
    }

    #[must_use]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env
            .get_or_insert_with(Vec::new)
            .push((key.to_string(), value.to_string()));
        self
    }

    /// Return the output regardless of the exit code.
    #[must_use]
    pub const fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a command and capture its output. Fails if the command
/// returns a non-zero exit code.
pub fn run(program: &str, args: &[&str]) -> LoginResult<CommandOutput> {
    run_with(program, args, &RunOptions::new())
}

/// Run a command with explicit [`RunOptions`].
///
/// On a non-zero exit, empty streams are replaced by
/// [`NO_STDOUT`] and [`NO_STDERR`] so diagnostics are never blank.
pub fn run_with(program: &str, args: &[&str], options: &RunOptions) -> LoginResult<CommandOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(env) = &options.env {
        command
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    let output = command.output().map_err(|source| LoginError::Launch {
        command: program.to_string(),
        source,
    })?;

    let mut result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().unwrap_or(-1),
    };

    if output.status.success() {
        return Ok(result);
    }

    if result.stdout.is_empty() {
        result.stdout = NO_STDOUT.to_string();
    }
    if result.stderr.is_empty() {
        result.stderr = NO_STDERR.to_string();
    }

    if options.check {
        return Err(LoginError::CommandFailed {
            command: program.to_string(),
            code: result.code,
            stdout: result.stdout,
            stderr: result.stderr,
        });
    }

    Ok(result)
}
