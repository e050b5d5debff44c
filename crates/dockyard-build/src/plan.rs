use dockyard_core::{ImageConfig, ImageRef, validate_context_path};

/// One instruction of the image build, in the order it must appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Pinned base image with interpreter and package manager.
    From { image: ImageRef },
    /// Absolute working directory for every later relative path.
    Workdir { path: String },
    /// Version pin, manifest and lockfile; nothing else.
    CopyManifests { files: Vec<String> },
    /// Locked install of dependencies only.
    InstallDependencies { command: Vec<String> },
    /// Application sources and the entry script.
    CopySources { paths: Vec<String> },
    /// Run wrapper invoking the entry script.
    Entrypoint { command: Vec<String> },
}

impl Step {
    fn kind(&self) -> StepKind {
        match self {
            Self::From { .. } => StepKind::From,
            Self::Workdir { .. } => StepKind::Workdir,
            Self::CopyManifests { .. } => StepKind::CopyManifests,
            Self::InstallDependencies { .. } => StepKind::InstallDependencies,
            Self::CopySources { .. } => StepKind::CopySources,
            Self::Entrypoint { .. } => StepKind::Entrypoint,
        }
    }

    fn arguments(&self) -> Vec<String> {
        match self {
            Self::From { image } => vec![image.to_string()],
            Self::Workdir { path } => vec![path.clone()],
            Self::CopyManifests { files } => files.clone(),
            Self::InstallDependencies { command } | Self::Entrypoint { command } => command.clone(),
            Self::CopySources { paths } => paths.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepKind {
    From,
    Workdir,
    CopyManifests,
    InstallDependencies,
    CopySources,
    Entrypoint,
}

const STEP_ORDER: [StepKind; 6] = [
    StepKind::From,
    StepKind::Workdir,
    StepKind::CopyManifests,
    StepKind::InstallDependencies,
    StepKind::CopySources,
    StepKind::Entrypoint,
];

/// Ordered, validated description of an image build.
///
/// The dependency layer (manifests + install) always precedes the source
/// copy, so editing application code never invalidates the install layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    steps: Vec<Step>,
}

impl BuildPlan {
    /// Build and validate the plan described by the image configuration.
    pub fn from_config(config: &ImageConfig) -> Result<Self, PlanError> {
        let image = ImageRef::parse_pinned(config.base_image())?;
        let toolchain = config.toolchain;

        let files: Vec<String> = config
            .dependency_files()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let entry = config.entry();
        let mut paths = config.sources.clone();
        if !paths.iter().any(|p| p == entry) {
            paths.push(entry.to_owned());
        }

        let plan = Self::from_steps(vec![
            Step::From { image },
            Step::Workdir {
                path: config.workdir.clone(),
            },
            Step::CopyManifests { files },
            Step::InstallDependencies {
                command: toolchain.install_command(),
            },
            Step::CopySources { paths },
            Step::Entrypoint {
                command: toolchain.run_command(entry.trim_start_matches("./")),
            },
        ])?;

        tracing::debug!(
            toolchain = toolchain.name(),
            base_image = %config.base_image(),
            steps = plan.steps.len(),
            "build plan created"
        );
        Ok(plan)
    }

    /// Wrap explicit steps, rejecting any that break the plan invariants.
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, PlanError> {
        let plan = Self { steps };
        plan.validate()?;
        Ok(plan)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Check step order, path hygiene and the absence of variable references.
    pub fn validate(&self) -> Result<(), PlanError> {
        let kinds: Vec<StepKind> = self.steps.iter().map(Step::kind).collect();
        if kinds != STEP_ORDER {
            return Err(PlanError::StepOrder {
                expected: STEP_ORDER.to_vec(),
                found: kinds,
            });
        }

        for step in &self.steps {
            if let Some(arg) = step.arguments().into_iter().find(|a| a.contains('$')) {
                return Err(PlanError::VariableReference {
                    step: step.kind(),
                    argument: arg,
                });
            }

            match step {
                Step::From { image } => {
                    if !image.is_pinned() {
                        return Err(PlanError::Image(dockyard_core::Error::FloatingImageTag {
                            reference: image.to_string(),
                        }));
                    }
                }
                Step::Workdir { path } => {
                    if !path.starts_with('/') {
                        return Err(PlanError::RelativeWorkdir(path.clone()));
                    }
                }
                Step::CopyManifests { files } => {
                    for file in files {
                        validate_context_path(file)?;
                    }
                }
                Step::CopySources { paths } => {
                    if paths.is_empty() {
                        return Err(PlanError::Empty("source paths"));
                    }
                    for path in paths {
                        validate_context_path(path)?;
                    }
                    let manifests = self.dependency_inputs();
                    if let Some(path) = paths
                        .iter()
                        .find(|p| manifests.iter().any(|m| same_path(m, p)))
                    {
                        return Err(PlanError::ManifestInSources(path.clone()));
                    }
                }
                Step::InstallDependencies { command } | Step::Entrypoint { command } => {
                    if command.is_empty() {
                        return Err(PlanError::Empty("command"));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn base_image(&self) -> &ImageRef {
        match self.steps.first() {
            Some(Step::From { image }) => image,
            _ => unreachable!("validated plans start with FROM"),
        }
    }

    pub fn workdir(&self) -> &str {
        self.find(|s| match s {
            Step::Workdir { path } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Files whose content keys the dependency-install layer.
    pub fn dependency_inputs(&self) -> &[String] {
        self.find(|s| match s {
            Step::CopyManifests { files } => Some(files.as_slice()),
            _ => None,
        })
    }

    pub fn install_command(&self) -> &[String] {
        self.find(|s| match s {
            Step::InstallDependencies { command } => Some(command.as_slice()),
            _ => None,
        })
    }

    pub fn source_paths(&self) -> &[String] {
        self.find(|s| match s {
            Step::CopySources { paths } => Some(paths.as_slice()),
            _ => None,
        })
    }

    pub fn entrypoint(&self) -> &[String] {
        self.find(|s| match s {
            Step::Entrypoint { command } => Some(command.as_slice()),
            _ => None,
        })
    }

    fn find<'a, T: ?Sized>(&'a self, f: impl Fn(&'a Step) -> Option<&'a T>) -> &'a T {
        self.steps
            .iter()
            .find_map(f)
            .unwrap_or_else(|| unreachable!("validated plans contain every step kind"))
    }
}

fn same_path(a: &str, b: &str) -> bool {
    a.trim_start_matches("./").trim_end_matches('/') == b.trim_start_matches("./").trim_end_matches('/')
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Image(#[from] dockyard_core::Error),

    #[error("build steps out of order: expected {expected:?}, found {found:?}")]
    StepOrder {
        expected: Vec<StepKind>,
        found: Vec<StepKind>,
    },

    #[error("{step:?} argument {argument:?} references a variable; builds must not depend on the environment")]
    VariableReference { step: StepKind, argument: String },

    #[error("working directory {0:?} must be absolute")]
    RelativeWorkdir(String),

    #[error("{0:?} is a dependency manifest and must not be copied with the sources")]
    ManifestInSources(String),

    #[error("empty {0} in build plan")]
    Empty(&'static str),
}
