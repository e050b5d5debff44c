use crate::plan::{BuildPlan, Step};

/// Renders a validated [`BuildPlan`] as a single-stage Dockerfile.
///
/// Output depends on the plan alone, so the same plan always produces
/// byte-identical text.
pub struct DockerfileGenerator<'a> {
    plan: &'a BuildPlan,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(plan: &'a BuildPlan) -> Self {
        Self { plan }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in self.plan.steps() {
            match step {
                Step::From { image } => {
                    out.push_str("# === Base: pinned interpreter + package manager ===\n");
                    out.push_str(&format!("FROM {image}\n"));
                }
                Step::Workdir { path } => {
                    out.push_str(&format!("WORKDIR {path}\n"));
                }
                Step::CopyManifests { files } => {
                    out.push_str("\n# === Dependencies: keyed on manifests only ===\n");
                    out.push_str(&copy_instruction(files, "./"));
                }
                Step::InstallDependencies { command } => {
                    out.push_str(&format!("RUN {}\n", exec_form(command)));
                }
                Step::CopySources { paths } => {
                    out.push_str("\n# === Application ===\n");
                    for path in paths {
                        let dest = format!("./{}", path.trim_start_matches("./"));
                        out.push_str(&copy_instruction(std::slice::from_ref(path), &dest));
                    }
                }
                Step::Entrypoint { command } => {
                    out.push_str(&format!("ENTRYPOINT {}\n", exec_form(command)));
                }
            }
        }
        out
    }
}

/// JSON array form, which bypasses the shell.
fn exec_form(args: &[String]) -> String {
    serde_json::to_string(args).expect("a slice of strings always serializes to JSON")
}

fn copy_instruction(sources: &[String], dest: &str) -> String {
    let needs_json = sources
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(dest))
        .any(|p| p.chars().any(char::is_whitespace));

    if needs_json {
        let mut args = sources.to_vec();
        args.push(dest.to_owned());
        format!("COPY {}\n", exec_form(&args))
    } else {
        format!("COPY {} {dest}\n", sources.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_uses_plain_form_without_whitespace() {
        let out = copy_instruction(&["a".to_owned(), "b".to_owned()], "./");
        assert_eq!(out, "COPY a b ./\n");
    }

    #[test]
    fn copy_uses_json_form_with_whitespace() {
        let out = copy_instruction(&["my scripts".to_owned()], "./my scripts");
        assert_eq!(out, "COPY [\"my scripts\",\"./my scripts\"]\n");
    }

    #[test]
    fn exec_form_escapes_quotes() {
        assert_eq!(
            exec_form(&["echo".to_owned(), "say \"hi\"".to_owned()]),
            r#"["echo","say \"hi\""]"#
        );
    }
}
