use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::docker::DockerError;

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a docker command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Execute a docker command, streaming output to the terminal.
    /// A non-zero exit is an error.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;

    /// Execute a docker command attached to the terminal and return its
    /// exit code untouched.
    async fn exec_passthrough(&self, args: &[String]) -> Result<i32, DockerError>;
}

/// Runs the `docker` binary found on `PATH`.
pub struct RealExecutor;

impl RealExecutor {
    fn command(args: &[String]) -> Command {
        let mut cmd = Command::new("docker");
        cmd.args(args);
        cmd
    }

    async fn status(mut cmd: Command) -> Result<ExitStatus, DockerError> {
        cmd.status()
            .await
            .map_err(|e| DockerError::NotFound { source: e })
    }
}

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(?args, "docker");
        let output = Self::command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        require_success(args, output.status, &output.stderr)?;
        String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 { source: e })
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        tracing::debug!(?args, "docker (streaming)");
        let status = Self::status(Self::command(args)).await?;
        require_success(args, status, &[])
    }

    async fn exec_passthrough(&self, args: &[String]) -> Result<i32, DockerError> {
        tracing::debug!(?args, "docker (attached)");
        let mut cmd = Self::command(args);
        cmd.stdin(Stdio::inherit());
        let status = Self::status(cmd).await?;
        exit_code(args, status)
    }
}

/// Captured stderr when there is any, the exit status otherwise.
fn require_success(args: &[String], status: ExitStatus, stderr: &[u8]) -> Result<(), DockerError> {
    if status.success() {
        return Ok(());
    }
    let stderr = if stderr.is_empty() {
        format!("exit status: {status}")
    } else {
        String::from_utf8_lossy(stderr).into_owned()
    };
    Err(DockerError::CommandFailed {
        args: args.to_vec(),
        stderr,
    })
}

/// A container killed by a signal has no exit code to forward.
fn exit_code(args: &[String], status: ExitStatus) -> Result<i32, DockerError> {
    status.code().ok_or_else(|| DockerError::Terminated {
        args: args.to_vec(),
    })
}
