mod common;

use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use common::{MockExecutor, Project, credentials, silent_executor};
use dockwright_core::CliInput;
use dockwright_runner::{
    ImageOutcome, Pipeline, PipelineError, Prompt, ToolCommand, ValidationError,
};

fn config_yaml(project: &Project) -> String {
    format!(
        r#"
artifactName: orders
helm:
  flavour: stateless
docker:
  namespace: acme
  host: registry.example.com
kubernetes:
  config: '{}'
  context: kind-dev
"#,
        project.kubeconfig().display()
    )
}

fn expect_validation_tools(mock: &mut MockExecutor) {
    mock.expect_locate()
        .returning(|program| Ok(PathBuf::from(format!("/usr/bin/{program}"))));
    mock.expect_exec()
        .withf(|cmd| cmd.program == "docker" && cmd.has_arg("info"))
        .times(1)
        .returning(|_| Ok(String::new()));
}

fn is_helm(cmd: &ToolCommand) -> bool {
    cmd.program == "helm"
}

struct BrokenStdin;

impl Read for BrokenStdin {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
    }
}

#[tokio::test]
async fn full_run_builds_pushes_and_deploys() {
    let project = Project::new().with_dockerfile();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mut mock = MockExecutor::new();
    expect_validation_tools(&mut mock);
    mock.expect_exec_streaming()
        .withf(|cmd| cmd.program == "docker" && cmd.has_arg("build"))
        .times(1)
        .returning(|_| Ok(()));
    mock.expect_exec_with_stdin()
        .withf(|cmd, _| cmd.has_arg("login"))
        .times(1)
        .returning(|_, _| Ok(String::new()));
    mock.expect_exec_streaming()
        .withf(|cmd| cmd.program == "docker" && cmd.has_arg("push"))
        .times(1)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|cmd| is_helm(cmd))
        .times(1)
        .returning(|_| Ok(()));

    let input = CliInput::new().with("auto-approve", "true");
    let mut output = Vec::new();
    let mut prompt = Prompt::new(io::empty(), &mut output);
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let report = pipeline.run(&input, &mut prompt).await.unwrap();

    assert_eq!(report.config.artifact_name, "orders");
    assert_eq!(report.validation.len(), 6);
    assert!(matches!(
        report.image,
        ImageOutcome::Completed {
            simulated: false,
            ..
        }
    ));
    assert!(
        report
            .deploy
            .command
            .has_arg("image.repository=registry.example.com/acme/orders")
    );
    assert!(output.is_empty(), "auto-approve must not prompt");
}

#[tokio::test]
async fn build_disabled_without_dockerfile_spawns_only_helm() {
    let project = Project::new();
    let yaml = config_yaml(&project).replace(
        "  host: registry.example.com\n",
        "  host: registry.example.com\n  build: false\n",
    );
    let project = project.with_config(&yaml);
    let env = credentials();
    let mut mock = MockExecutor::new();
    expect_validation_tools(&mut mock);
    mock.expect_exec_with_stdin().never();
    mock.expect_exec_streaming()
        .withf(|cmd| is_helm(cmd) && !cmd.has_arg("--set"))
        .times(1)
        .returning(|_| Ok(()));

    let input = CliInput::new().with("auto-approve", "yes");
    let mut prompt = Prompt::new(io::empty(), io::sink());
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let report = pipeline.run(&input, &mut prompt).await.unwrap();

    assert!(!report.config.run_docker_build);
    assert_eq!(report.image, ImageOutcome::Skipped);
}

#[tokio::test]
async fn dry_run_skips_prompt_and_mutations() {
    let project = Project::new().with_dockerfile();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mut mock = MockExecutor::new();
    expect_validation_tools(&mut mock);
    mock.expect_exec_streaming().never();
    mock.expect_exec_with_stdin().never();

    let input = CliInput::new().with("dry-run", "true");
    let mut output = Vec::new();
    let mut prompt = Prompt::new(io::empty(), &mut output);
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let report = pipeline.run(&input, &mut prompt).await.unwrap();

    assert!(output.is_empty(), "dry-run must not prompt");
    assert!(matches!(
        report.image,
        ImageOutcome::Completed {
            simulated: true,
            ..
        }
    ));
    assert!(report.deploy.simulated);
    assert!(report.deploy.command.has_arg("--dry-run"));
}

#[tokio::test]
async fn confirmation_is_requested_before_validation() {
    let project = Project::new();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mut mock = MockExecutor::new();
    expect_validation_tools(&mut mock);
    mock.expect_exec_streaming()
        .withf(|cmd| is_helm(cmd))
        .times(1)
        .returning(|_| Ok(()));

    let mut output = Vec::new();
    let mut prompt = Prompt::new(&b"\n"[..], &mut output);
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    pipeline.run(&CliInput::new(), &mut prompt).await.unwrap();

    let shown = String::from_utf8(output).unwrap();
    assert!(shown.starts_with("Please confirm the configuration above."));
}

#[tokio::test]
async fn unreadable_confirmation_aborts() {
    let project = Project::new();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mock = silent_executor();

    let mut prompt = Prompt::new(BufReader::new(BrokenStdin), io::sink());
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let err = pipeline
        .run(&CliInput::new(), &mut prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::UserInput(_)));
    assert_eq!(err.to_string(), "failed to read user input");
}

#[tokio::test]
async fn missing_password_stops_before_image_stage() {
    let project = Project::new().with_dockerfile();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let mut env = credentials();
    env.remove("REGISTRY_PASSWORD");
    let mock = silent_executor();

    let input = CliInput::new().with("auto-approve", "true");
    let mut prompt = Prompt::new(io::empty(), io::sink());
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let err = pipeline.run(&input, &mut prompt).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingEnvVar("REGISTRY_PASSWORD"))
    ));
}

#[test]
fn cli_overrides_config_file() {
    let project = Project::new();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mock = silent_executor();

    let input = CliInput::new()
        .with("helm-flavour", "stateful")
        .with("env", "staging, production");
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let config = pipeline.configure(&input).unwrap();

    assert_eq!(config.helm_flavour, "stateful");
    assert_eq!(config.env, vec!["staging", "production"]);
    assert_eq!(config.docker_namespace, "acme");
}

#[tokio::test]
async fn malformed_config_file_is_ignored() {
    let project = Project::new().with_config("helm: [unclosed");
    let env = credentials();
    let mock = silent_executor();

    let mut prompt = Prompt::new(io::empty(), io::sink());
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let err = pipeline
        .run(&CliInput::new(), &mut prompt)
        .await
        .unwrap_err();

    // Resolution succeeds; the empty file tier leaves helmFlavour unset.
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingField {
            field: "helmFlavour",
            ..
        })
    ));
}

#[tokio::test]
async fn validate_only_never_builds_or_deploys() {
    let project = Project::new().with_dockerfile();
    let yaml = config_yaml(&project);
    let project = project.with_config(&yaml);
    let env = credentials();
    let mut mock = MockExecutor::new();
    expect_validation_tools(&mut mock);
    mock.expect_exec_streaming().never();
    mock.expect_exec_with_stdin().never();

    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let (config, results) = pipeline.validate_only(&CliInput::new()).await.unwrap();

    assert_eq!(config.kubernetes_context, "kind-dev");
    assert!(results.iter().all(|r| r.passed()));
}

#[tokio::test]
async fn validate_only_reports_first_failure() {
    let project = Project::new();
    let env = credentials();
    let mock = silent_executor();

    // No config file, so helm.flavour has nothing to resolve from.
    let pipeline = Pipeline::new(&project.layout, &env, &mock).with_home_dir(None);
    let err = pipeline
        .validate_only(&CliInput::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingField {
            field: "helmFlavour",
            ..
        })
    ));
}
