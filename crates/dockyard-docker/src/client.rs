use std::fmt;
use std::path::Path;

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

/// Image label carrying the dependency-layer fingerprint.
pub const FINGERPRINT_LABEL: &str = "dockyard.dependencies";

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Doctor ──

    /// Run all diagnostic checks without early return.
    /// Returns a report with pass/fail for each check item.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        // 1. docker CLI
        match self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await
        {
            Ok(v) => report.docker = CheckResult::ok(v.trim()),
            Err(DockerError::NotFound { .. }) => {
                report.docker = CheckResult::fail("docker CLI not found");
                report.daemon = CheckResult::fail("skipped");
                report.buildx = CheckResult::fail("skipped");
                return report;
            }
            // Also fails when the daemon is down; the daemon row says so.
            Err(e) => report.docker = CheckResult::fail(&e.to_string()),
        }

        // 2. Daemon reachable
        match self
            .executor
            .exec(&args(["info", "--format", "{{.ServerVersion}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => {
                report.daemon = CheckResult::ok(&format!("server {}", v.trim()));
            }
            _ => report.daemon = CheckResult::fail("daemon not reachable"),
        }

        // 3. BuildKit front end
        match self.executor.exec(&args(["buildx", "version"])).await {
            Ok(v) => {
                let version = v.split_whitespace().nth(1).unwrap_or(v.trim());
                report.buildx = CheckResult::ok(version);
            }
            Err(_) => report.buildx = CheckResult::fail("buildx not installed"),
        }

        report
    }

    // ── Build ──

    /// Build the image from a bundled context.
    ///
    /// No `--build-arg` is ever passed, so the result does not depend on the
    /// caller's environment.
    pub async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        labels: &[(String, String)],
    ) -> Result<(), BuildImageError> {
        let context = context_dir
            .to_str()
            .ok_or_else(|| BuildImageError::InvalidPath(context_dir.to_path_buf()))?;
        let dockerfile = context_dir.join("Dockerfile");
        let dockerfile = dockerfile
            .to_str()
            .ok_or_else(|| BuildImageError::InvalidPath(context_dir.to_path_buf()))?;

        let mut cmd = args(["build", "--file", dockerfile, "--tag", tag]);
        for (key, value) in labels {
            cmd.push("--label".to_owned());
            cmd.push(format!("{key}={value}"));
        }
        cmd.push(context.to_owned());

        tracing::info!(tag, context, "docker build");
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| BuildImageError::Build {
                tag: tag.to_owned(),
                source: e,
            })
    }

    // ── Run ──

    /// Start a container with no arguments and return its exit code.
    pub async fn run(&self, tag: &str) -> Result<i32, RunError> {
        tracing::info!(tag, "docker run");
        self.executor
            .exec_passthrough(&args(["run", "--rm", "--interactive", tag]))
            .await
            .map_err(|e| RunError::Start {
                tag: tag.to_owned(),
                source: e,
            })
    }

    // ── Inspect ──

    /// Dependency fingerprint recorded on a built image, if any.
    pub async fn image_fingerprint(&self, tag: &str) -> Result<Option<String>, InspectError> {
        let format = format!("{{{{ index .Config.Labels \"{FINGERPRINT_LABEL}\" }}}}");
        let output = self
            .executor
            .exec(&args(["image", "inspect", "--format", &format, tag]))
            .await
            .map_err(|e| InspectError::Inspect {
                tag: tag.to_owned(),
                source: e,
            })?;

        let value = output.trim();
        if value.is_empty() || value == "<no value>" {
            Ok(None)
        } else {
            Ok(Some(value.to_owned()))
        }
    }
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub daemon: CheckResult,
    pub buildx: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.docker.passed && self.daemon.passed && self.buildx.passed && self.config_file.passed
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Docker CLI", &self.docker),
            ("Docker daemon", &self.daemon),
            ("Buildx", &self.buildx),
            ("dockyard.toml", &self.config_file),
        ];
        writeln!(f, "dockyard doctor")?;
        writeln!(f, "───────────────")?;
        for (label, result) in rows {
            writeln!(f, "[{}] {label:<14} {}", result.icon(), result.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum BuildImageError {
    #[error("build context path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("docker build of {tag} failed")]
    Build { tag: String, source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to run container from {tag}")]
    Start { tag: String, source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("failed to inspect image {tag}")]
    Inspect { tag: String, source: DockerError },
}
