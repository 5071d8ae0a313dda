use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use graft::descriptor::CLOSING_MARKER;
use graft::error::{ErrorKind, GraftError};
use graft::pipeline::Stage;
use graft::GraftOptions;
use walkdir::WalkDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture project into a scratch directory so tests never touch the original.
fn project_from_fixture(name: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture_path(name);
    for entry in WalkDir::new(&src).min_depth(1) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&src).unwrap();
        let dest = dir.path().join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).unwrap();
        } else {
            std::fs::copy(entry.path(), &dest).unwrap();
        }
    }
    dir
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

fn options(project: &Path, merge: &str) -> GraftOptions {
    GraftOptions {
        project: project.to_path_buf(),
        templates: None,
        merge: merge.to_string(),
        docker: false,
        openshift: false,
        data: vec![],
    }
}

fn read(project: &Path, rel: &str) -> String {
    std::fs::read_to_string(project.join(rel)).unwrap()
}

#[test]
fn test_scaffold_fresh_project() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();

    let plan = graft::graft(options(dir, "skip")).unwrap();
    assert_eq!(plan.report.appname, "demo-app");
    assert!(!plan.report.platform_rendered);

    let jenkinsfile = read(dir, "Jenkinsfile");
    assert!(jenkinsfile.contains("APP_NAME = 'demo-app'"));
    assert!(!jenkinsfile.contains("Build image"));
    assert!(read(dir, "settings.xml").contains("<id>demo-app</id>"));
    assert!(read(dir, "README.devon4j.md").starts_with("# DemoApp\n"));

    let pom = read(dir, "pom.xml");
    assert_eq!(pom.matches("<distributionManagement>").count(), 1);
    assert!(pom.ends_with("  </distributionManagement>\n</project>\n"));
    assert!(pom.contains("<url>http://nexus3-core:8081/nexus3/repository/maven-releases</url>"));

    assert!(!dir.join("Dockerfile").exists());
    assert!(!dir.join("openshift.yaml").exists());

    let gitignore = read(dir, ".gitignore");
    assert!(gitignore.contains("target/"));
    assert!(gitignore.contains(".idea/"));
}

#[test]
fn test_pom_prefix_is_preserved() {
    let project = project_from_fixture("demo-project");
    let original = read(project.path(), "pom.xml");

    graft::graft(options(project.path(), "skip")).unwrap();

    let patched = read(project.path(), "pom.xml");
    let anchor = original.find(CLOSING_MARKER).unwrap();
    assert!(patched.starts_with(&original[..anchor]));
    assert!(patched.ends_with(&original[anchor..]));
}

#[test]
fn test_rerun_leaves_project_unchanged() {
    for strategy in ["skip", "combine", "overwrite"] {
        let project = project_from_fixture("demo-project");
        let dir = project.path();

        graft::graft(options(dir, strategy)).unwrap();
        let after_first = snapshot(dir);

        let plan = graft::graft(options(dir, strategy)).unwrap();
        assert!(plan.changes().is_empty(), "{strategy}: second run staged changes");
        assert!(!plan.report.has_changes(), "{strategy}");
        assert_eq!(snapshot(dir), after_first, "{strategy}");
    }
}

#[test]
fn test_docker_flag_adds_platform_files() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let mut opts = options(dir, "skip");
    opts.docker = true;

    let plan = graft::graft(opts).unwrap();
    assert!(plan.report.platform_rendered);

    assert!(read(dir, "Dockerfile").contains("COPY target/demo-app*.jar /app/demo-app.jar"));
    assert!(dir.join(".dockerignore").exists());
    assert!(!dir.join("openshift.yaml").exists());
    assert!(read(dir, "Jenkinsfile").contains("docker build -t demo-app:"));
}

#[test]
fn test_openshift_flag_adds_openshift_resources() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let mut opts = options(dir, "skip");
    opts.openshift = true;

    graft::graft(opts).unwrap();

    assert!(dir.join("Dockerfile").exists());
    assert!(read(dir, "openshift.yaml").contains("name: demo-app:latest"));
}

#[test]
fn test_skip_keeps_user_edits() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    std::fs::write(dir.join("Jenkinsfile"), "// hand written\n").unwrap();

    let plan = graft::graft(options(dir, "skip")).unwrap();

    assert_eq!(read(dir, "Jenkinsfile"), "// hand written\n");
    assert!(plan.report.merge.skipped.contains(&PathBuf::from("Jenkinsfile")));
}

#[test]
fn test_overwrite_replaces_user_edits() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    std::fs::write(dir.join("Jenkinsfile"), "// hand written\n").unwrap();

    let plan = graft::graft(options(dir, "overwrite")).unwrap();

    assert!(read(dir, "Jenkinsfile").contains("APP_NAME = 'demo-app'"));
    assert!(plan.report.merge.overwritten.contains(&PathBuf::from("Jenkinsfile")));
}

#[test]
fn test_combine_keeps_user_lines_and_adds_template_lines() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    std::fs::write(dir.join("README.devon4j.md"), "# My notes\n").unwrap();

    graft::graft(options(dir, "combine")).unwrap();

    let readme = read(dir, "README.devon4j.md");
    assert!(readme.starts_with("# My notes\n# DemoApp\n"));
}

#[test]
fn test_combine_leaves_user_xml_intact() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let user_settings = "<?xml version=\"1.0\"?>\n<settings>\n  <offline>true</offline>\n</settings>\n";
    std::fs::write(dir.join("settings.xml"), user_settings).unwrap();

    let plan = graft::graft(options(dir, "combine")).unwrap();

    assert_eq!(read(dir, "settings.xml"), user_settings);
    assert!(plan.report.merge.skipped.contains(&PathBuf::from("settings.xml")));
}

#[test]
fn test_missing_project_directory_is_a_precondition_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = graft::check(&dir.path().join("nonexistent")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_existing_distribution_block_is_untouched() {
    let project = project_from_fixture("patched-project");
    let dir = project.path();
    let original = std::fs::read(dir.join("pom.xml")).unwrap();

    let plan = graft::graft(options(dir, "skip")).unwrap();

    assert_eq!(plan.report.appname, "billing-service");
    assert!(!plan.report.descriptor_patched);
    assert_eq!(std::fs::read(dir.join("pom.xml")).unwrap(), original);
}

#[test]
fn test_unknown_strategy_writes_nothing() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let before = snapshot(dir);

    let err = graft::graft(options(dir, "union")).err().unwrap();

    assert!(matches!(&err, GraftError::Stage { stage: Stage::Validate, .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(snapshot(dir), before);
}

#[test]
fn test_missing_descriptor_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    let err = graft::check(dir.path()).unwrap_err();
    assert!(matches!(err, GraftError::DescriptorMissing { .. }));

    let err = graft::graft(options(dir.path(), "skip")).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(snapshot(dir.path()).is_empty());
}

#[test]
fn test_descriptor_without_artifact_id_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pom.xml"), "<project></project>\n").unwrap();

    let err = graft::check(dir.path()).unwrap_err();
    assert!(matches!(err, GraftError::IdentifierNotFound { .. }));
}

#[test]
fn test_plan_does_not_write() {
    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let before = snapshot(dir);

    let plan = graft::plan(options(dir, "skip")).unwrap();

    let changed: Vec<_> = plan.changes().iter().map(|c| c.path.to_path_buf()).collect();
    assert!(changed.contains(&PathBuf::from("pom.xml")));
    assert!(changed.contains(&PathBuf::from("Jenkinsfile")));
    assert_eq!(snapshot(dir), before);
}

#[test]
fn test_late_failure_leaves_disk_untouched() {
    let templates = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(templates.path().join("files")).unwrap();
    std::fs::create_dir_all(templates.path().join("docker")).unwrap();
    std::fs::write(templates.path().join("files/ok.txt.tera"), "{{ appname }}").unwrap();
    std::fs::write(
        templates.path().join("docker/broken.tera"),
        "{{ registry_url }}",
    )
    .unwrap();

    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let before = snapshot(dir);

    let mut opts = options(dir, "skip");
    opts.templates = Some(templates.path().to_path_buf());
    opts.docker = true;

    let err = graft::graft(opts).err().unwrap();
    assert_eq!(err.stage(), Some(Stage::RenderOptional));
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(snapshot(dir), before);
}

#[test]
fn test_data_parameters_reach_custom_templates() {
    let templates = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(templates.path().join("files/{{ team }}")).unwrap();
    std::fs::create_dir_all(templates.path().join("docker")).unwrap();
    std::fs::write(
        templates.path().join("files/{{ team }}/OWNERS.tera"),
        "{{ team }} owns {{ appname }}\n",
    )
    .unwrap();

    let project = project_from_fixture("demo-project");
    let dir = project.path();
    let mut opts = options(dir, "skip");
    opts.templates = Some(templates.path().to_path_buf());
    opts.data = vec![("team".into(), "payments".into())];

    graft::graft(opts).unwrap();

    assert_eq!(read(dir, "payments/OWNERS"), "payments owns demo-app\n");
}
