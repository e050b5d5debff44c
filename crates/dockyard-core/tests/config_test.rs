use dockyard_core::{DockyardConfig, Error, Toolchain};
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = DockyardConfig::load(tmp.path()).unwrap();

    assert!(config.project.name.is_none());
    assert_eq!(config.image.toolchain, Toolchain::Uv);
    assert_eq!(
        config.image.base_image(),
        "ghcr.io/astral-sh/uv:0.5.11-python3.13-bookworm-slim"
    );
    assert_eq!(config.image.workdir, "/app");
    assert_eq!(config.image.version_pin(), Some(".python-version"));
    assert_eq!(config.image.manifest(), "pyproject.toml");
    assert_eq!(config.image.lockfile(), "uv.lock");
    assert_eq!(config.image.sources, vec!["src"]);
    assert_eq!(config.image.entry(), "main.py");
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[project]
name = "media-tools"

[image]
toolchain = "uv"
base_image = "ghcr.io/astral-sh/uv:0.5.11-python3.12-bookworm-slim"
workdir = "/srv/tools"
version_pin = ".python-version"
manifest = "pyproject.toml"
lockfile = "uv.lock"
sources = ["src", "assets"]
entry = "run.py"
tag = "registry.local/media-tools:1.0.0"
"#;
    std::fs::write(tmp.path().join("dockyard.toml"), toml).unwrap();

    let config = DockyardConfig::load(tmp.path()).unwrap();

    assert_eq!(config.project.name.as_deref(), Some("media-tools"));
    assert_eq!(
        config.image.base_image(),
        "ghcr.io/astral-sh/uv:0.5.11-python3.12-bookworm-slim"
    );
    assert_eq!(config.image.workdir, "/srv/tools");
    assert_eq!(config.image.sources, vec!["src", "assets"]);
    assert_eq!(config.image.entry(), "run.py");
    assert_eq!(
        config.image_tag(tmp.path()),
        "registry.local/media-tools:1.0.0"
    );
}

#[test]
fn load_partial_config_uses_toolchain_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("dockyard.toml"),
        "[image]\ntoolchain = \"npm\"\n",
    )
    .unwrap();

    let config = DockyardConfig::load(tmp.path()).unwrap();

    assert_eq!(config.image.toolchain, Toolchain::Npm);
    assert_eq!(config.image.base_image(), "node:22.12.0-bookworm-slim");
    assert_eq!(config.image.manifest(), "package.json");
    assert_eq!(config.image.lockfile(), "package-lock.json");
    assert_eq!(config.image.entry(), "index.js");
    assert!(config.image.version_pin().is_none());
    assert_eq!(
        config.image.dependency_files(),
        vec!["package.json", "package-lock.json"]
    );
}

#[test]
fn empty_version_pin_disables_it() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("dockyard.toml"),
        "[image]\nversion_pin = \"\"\n",
    )
    .unwrap();

    let config = DockyardConfig::load(tmp.path()).unwrap();

    assert!(config.image.version_pin().is_none());
    assert_eq!(
        config.image.dependency_files(),
        vec!["pyproject.toml", "uv.lock"]
    );
}

#[test]
fn dependency_files_put_version_pin_first() {
    let config = DockyardConfig::default();
    assert_eq!(
        config.image.dependency_files(),
        vec![".python-version", "pyproject.toml", "uv.lock"]
    );
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("dockyard.toml"), "[image\nbroken").unwrap();

    let err = DockyardConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }), "got: {err}");
}

#[test]
fn load_unknown_toolchain_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("dockyard.toml"),
        "[image]\ntoolchain = \"conda\"\n",
    )
    .unwrap();

    assert!(DockyardConfig::load(tmp.path()).is_err());
}

#[test]
fn image_tag_defaults_to_directory_name() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("Media_Tools");
    std::fs::create_dir(&project).unwrap();

    let config = DockyardConfig::load(&project).unwrap();

    assert_eq!(config.image_tag(&project), "media_tools:latest");
}
