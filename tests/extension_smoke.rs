//! End-to-end smoke scenarios.
//!
//! The loadable module used here is `tests/fixtures/sqlite-sample.c`, compiled
//! by the build script; it registers `sample()` and `sample_version()`.

use sqlite_smoke::{
    ArtifactError, ArtifactLocator, DatabaseConn, ExtensionLoader, LoadError, LoadGate,
    LoadableArtifact, Platform, QueryError, ScalarValue, SmokeError, SmokeTest,
};
use std::fs;
use std::path::PathBuf;

const SAMPLE_EXTENSION: &str = env!("SQLITE_SMOKE_SAMPLE_EXTENSION");
const SAMPLE_VERSION: &str = "v0.0.1-alpha.1";

fn sample_artifact() -> LoadableArtifact {
    LoadableArtifact {
        path: PathBuf::from(SAMPLE_EXTENSION),
        entry_point: None,
    }
}

#[test]
fn test_load_then_query_version() {
    let artifact = sample_artifact();
    assert_eq!(artifact.init_symbol(), "sqlite3_sample_init");

    let db = DatabaseConn::open_in_memory().unwrap();
    ExtensionLoader::new().load(&db, &artifact).unwrap();

    let version = db.query_scalar("SELECT sample_version()").unwrap();
    assert_eq!(version, ScalarValue::Text(SAMPLE_VERSION.to_string()));

    let value = db.query_scalar("SELECT sample()").unwrap();
    assert_eq!(value.as_text(), Some("yo!"));
    assert!(db.function_exists("sample_version").unwrap());
}

#[test]
fn test_smoke_run_reports_declared_version() {
    let smoke = SmokeTest::new(ArtifactLocator::explicit(SAMPLE_EXTENSION))
        .with_expected(SAMPLE_VERSION);

    let report = smoke.run().unwrap();
    assert_eq!(report.entry_point, "sqlite3_sample_init");
    assert_eq!(report.query, "SELECT sample_version()");
    assert_eq!(report.value.as_text(), Some(SAMPLE_VERSION));
    assert_eq!(report.expected.as_deref(), Some(SAMPLE_VERSION));

    // a leading `v` on either side is tolerated
    assert!(smoke.with_expected("0.0.1-alpha.1").run().is_ok());
}

#[test]
fn test_version_mismatch() {
    let result = SmokeTest::new(ArtifactLocator::explicit(SAMPLE_EXTENSION))
        .with_expected("0.0.2")
        .run();
    match result {
        Err(SmokeError::VersionMismatch { expected, actual }) => {
            assert_eq!(expected, "0.0.2");
            assert_eq!(actual, SAMPLE_VERSION);
        }
        other => panic!("expected a version mismatch, got {:?}", other),
    }
}

#[test]
fn test_check_all_passes_for_sample() {
    let results = SmokeTest::new(ArtifactLocator::explicit(SAMPLE_EXTENSION))
        .with_expected(SAMPLE_VERSION)
        .check_all();

    let checks: Vec<_> = results.iter().map(|r| r.check).collect();
    assert_eq!(checks, vec!["gate-closed", "unloaded", "load"]);
    for result in &results {
        assert!(result.passed, "{}: {}", result.check, result.detail);
    }
    assert_eq!(results[2].detail, SAMPLE_VERSION);
}

#[test]
fn test_unregistered_function_fails_after_load() {
    let db = DatabaseConn::open_in_memory().unwrap();
    ExtensionLoader::new().load(&db, &sample_artifact()).unwrap();

    let result = db.query_scalar("SELECT this_function_is_not_registered()");
    assert!(matches!(result, Err(QueryError::UnknownFunction { .. })));
}

#[test]
fn test_functions_stay_on_loading_handle() {
    let loaded = DatabaseConn::open_in_memory().unwrap();
    ExtensionLoader::new().load(&loaded, &sample_artifact()).unwrap();

    let other = DatabaseConn::open_in_memory().unwrap();
    assert!(matches!(
        other.query_scalar("SELECT sample_version()"),
        Err(QueryError::UnknownFunction { .. })
    ));
}

#[test]
fn test_gate_closed_again_after_load() {
    let db = DatabaseConn::open_in_memory().unwrap();
    let artifact = sample_artifact();
    ExtensionLoader::new().load(&db, &artifact).unwrap();

    let result = ExtensionLoader::with_gate(LoadGate::Closed).load(&db, &artifact);
    assert!(matches!(result, Err(LoadError::NotAuthorized { .. })));
}

#[test]
fn test_function_unknown_before_load() {
    let db = DatabaseConn::open_in_memory().unwrap();
    match db.query_scalar("SELECT sample_version()") {
        Err(QueryError::UnknownFunction { name }) => assert_eq!(name, "sample_version"),
        other => panic!("expected an unknown function error, got {:?}", other),
    }
}

#[test]
fn test_load_while_disabled_is_not_authorized() {
    let db = DatabaseConn::open_in_memory().unwrap();
    let result = ExtensionLoader::with_gate(LoadGate::Closed).load(&db, &sample_artifact());
    assert!(matches!(result, Err(LoadError::NotAuthorized { .. })));

    // nothing was registered by the refused load
    assert!(matches!(
        db.query_scalar("SELECT sample_version()"),
        Err(QueryError::UnknownFunction { .. })
    ));
}

#[test]
fn test_nonexistent_path() {
    let db = DatabaseConn::open_in_memory().unwrap();
    let artifact = LoadableArtifact {
        path: PathBuf::from("/definitely/not/here/hello0.so"),
        entry_point: None,
    };
    let result = ExtensionLoader::new().load(&db, &artifact);
    assert!(matches!(result, Err(LoadError::NotFound(_))));

    let result = SmokeTest::new(ArtifactLocator::explicit("/definitely/not/here/hello0")).run();
    match result {
        Err(SmokeError::Artifact(ArtifactError::NotFound { searched })) => {
            assert_eq!(searched[0], PathBuf::from("/definitely/not/here/hello0"));
        }
        other => panic!("expected artifact not found, got {:?}", other),
    }
}

#[test]
fn test_npm_package_layout_smoke_run() {
    let node_modules = tempfile::tempdir().unwrap();
    let platform = Platform::current().unwrap();
    let package_dir = node_modules
        .path()
        .join(format!("sqlite-sample-{}", platform.npm_name()));
    fs::create_dir(&package_dir).unwrap();
    let file = package_dir.join(format!("sample0.{}", platform.loadable_suffix()));
    fs::copy(SAMPLE_EXTENSION, &file).unwrap();

    let locator =
        ArtifactLocator::package(node_modules.path(), "sample0").with_package_name("sqlite-sample");
    assert_eq!(locator.resolve().unwrap().path, file);

    let report = SmokeTest::new(locator)
        .with_expected(SAMPLE_VERSION)
        .run()
        .unwrap();
    assert_eq!(report.artifact, file.display().to_string());
}

#[test]
fn test_package_layout_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Platform::current().unwrap();
    let platform_dir = dir
        .path()
        .join(format!("sqlite-hello-{}", platform.dir_name()));
    fs::create_dir(&platform_dir).unwrap();
    let file = platform_dir.join(format!("hello0.{}", platform.loadable_suffix()));
    fs::write(&file, b"placeholder").unwrap();

    let artifact = ArtifactLocator::package(dir.path(), "hello0")
        .with_package_name("sqlite-hello")
        .resolve()
        .unwrap();
    assert_eq!(artifact.path, file);
    assert_eq!(artifact.init_symbol(), "sqlite3_hello_init");
}
