use dockyard_docker::client::{BuildImageError, DockerClient, FINGERPRINT_LABEL};
use dockyard_docker::docker::DockerError;
use dockyard_docker::executor::DockerExecutor;
use mockall::mock;
use std::path::PathBuf;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
        async fn exec_passthrough(&self, args: &[String]) -> Result<i32, DockerError>;
    }
}

fn not_found() -> DockerError {
    DockerError::NotFound {
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    }
}

fn failed(args: &[String]) -> DockerError {
    DockerError::CommandFailed {
        args: args.to_vec(),
        stderr: "Cannot connect to the Docker daemon".to_owned(),
    }
}

// ── Doctor Tests ──

#[tokio::test]
async fn doctor_all_checks_pass() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| Ok("27.4.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("info"))
        .returning(|_| Ok("27.4.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("buildx"))
        .returning(|_| Ok("github.com/docker/buildx v0.19.3 48d6a39\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let mut report = client.doctor().await;
    report.config_file = dockyard_docker::CheckResult::ok("Found");

    assert!(report.docker.passed);
    assert_eq!(report.docker.detail, "27.4.1");
    assert_eq!(report.daemon.detail, "server 27.4.1");
    assert_eq!(report.buildx.detail, "v0.19.3");
    assert!(report.all_passed());

    let rendered = report.to_string();
    assert!(rendered.contains("[OK] Docker CLI"));
    assert!(rendered.contains("[OK] dockyard.toml"));
}

#[tokio::test]
async fn doctor_stops_when_docker_missing() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .times(1)
        .returning(|_| Err(not_found()));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(!report.docker.passed);
    assert!(!report.daemon.passed);
    assert!(!report.buildx.passed);
    assert!(!report.all_passed());
}

#[tokio::test]
async fn doctor_reports_unreachable_daemon() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| Ok("27.4.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("info"))
        .returning(|args| Err(failed(args)));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("buildx"))
        .returning(|_| Ok("github.com/docker/buildx v0.19.3 48d6a39\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(report.docker.passed);
    assert!(!report.daemon.passed);
    assert_eq!(report.daemon.detail, "daemon not reachable");
    assert!(report.to_string().contains("[NG] Docker daemon"));
}

// ── Build Tests ──

#[tokio::test]
async fn build_passes_tag_labels_and_context() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .withf(|args| {
            args == [
                "build",
                "--file",
                "/work/.dockyard-bundle/Dockerfile",
                "--tag",
                "media-tools:latest",
                "--label",
                "dockyard.dependencies=sha256:abc",
                "/work/.dockyard-bundle",
            ]
        })
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    let labels = vec![(FINGERPRINT_LABEL.to_owned(), "sha256:abc".to_owned())];
    client
        .build(
            &PathBuf::from("/work/.dockyard-bundle"),
            "media-tools:latest",
            &labels,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn build_never_passes_build_args() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .withf(|args| !args.iter().any(|a| a == "--build-arg"))
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    client
        .build(&PathBuf::from("/ctx"), "app:1", &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn build_failure_is_fatal() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .times(1)
        .returning(|args| Err(failed(args)));

    let client = DockerClient::with_executor(mock);
    let err = client
        .build(&PathBuf::from("/ctx"), "app:1", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, BuildImageError::Build { .. }));
    assert!(err.to_string().contains("app:1"));
}

// ── Run Tests ──

#[tokio::test]
async fn run_returns_container_exit_code() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_passthrough()
        .withf(|args| args == ["run", "--rm", "--interactive", "media-tools:latest"])
        .times(1)
        .returning(|_| Ok(3));

    let client = DockerClient::with_executor(mock);
    let code = client.run("media-tools:latest").await.unwrap();

    assert_eq!(code, 3);
}

#[tokio::test]
async fn run_fails_when_docker_missing() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_passthrough()
        .returning(|_| Err(not_found()));

    let client = DockerClient::with_executor(mock);
    assert!(client.run("app:1").await.is_err());
}

// ── Inspect Tests ──

#[tokio::test]
async fn image_fingerprint_reads_label() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| {
            args[..2] == ["image", "inspect"]
                && args.iter().any(|a| a.contains(FINGERPRINT_LABEL))
                && args.last().map(String::as_str) == Some("app:1")
        })
        .returning(|_| Ok("sha256:abc\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let fingerprint = client.image_fingerprint("app:1").await.unwrap();

    assert_eq!(fingerprint.as_deref(), Some("sha256:abc"));
}

#[tokio::test]
async fn image_fingerprint_missing_label_is_none() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .returning(|_| Ok("<no value>\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    assert!(client.image_fingerprint("app:1").await.unwrap().is_none());
}
