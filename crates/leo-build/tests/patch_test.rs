mod support;

use std::path::Path;
use std::sync::{Arc, Mutex};

use leo_build::patch::{
    FsGetter, GitHubGetter, PatchBackend, PatchError, PatchGetter, PatchQuery, apply, apply_dir,
};
use leo_build::shell::{ShellError, ShellExecutor};
use leo_core::PatchSource;
use leo_github::GitHubClient;
use mockall::mock;
use support::FixtureTransport;
use tempfile::TempDir;

mock! {
    Shell {}

    impl ShellExecutor for Shell {
        async fn run(&self, program: &str, args: &[String]) -> Result<String, ShellError>;
    }
}

fn patch_dir(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, content) in files {
        let path = tmp.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    tmp
}

// ── Local backend ──

#[tokio::test]
async fn exact_version_beats_minor() {
    let tmp = patch_dir(&[
        ("envoy/1.29.patch", "minor"),
        ("envoy/1.29.3.patch", "exact"),
    ]);
    let getter = FsGetter::new(tmp.path());

    let patch = getter.get(&PatchQuery::new("envoy", "1.29.3")).await.unwrap();

    assert_eq!(patch.content, b"exact");
    assert_eq!(patch.path, "envoy/1.29.3.patch");
}

#[tokio::test]
async fn variant_minor_beats_bare_exact_version() {
    let tmp = patch_dir(&[
        ("envoy/1.29-fips.patch", "fips minor"),
        ("envoy/1.29.3.patch", "bare exact"),
    ]);
    let getter = FsGetter::new(tmp.path());

    let query = PatchQuery::new("envoy", "1.29.3").with_suffix("-fips");
    let patch = getter.get(&query).await.unwrap();

    assert_eq!(patch.content, b"fips minor");
}

#[tokio::test]
async fn variant_query_falls_back_to_bare_minor() {
    let tmp = patch_dir(&[("envoy/1.29.patch", "bare minor")]);
    let getter = FsGetter::new(tmp.path());

    let query = PatchQuery::new("envoy", "1.29.3").with_suffix("-fips");
    assert_eq!(getter.get(&query).await.unwrap().content, b"bare minor");
}

#[tokio::test]
async fn local_patch_bytes_are_not_decoded() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("envoy")).unwrap();
    std::fs::write(tmp.path().join("envoy/1.29.patch"), b"-caf\xe9\n+cafe\n").unwrap();
    let getter = FsGetter::new(tmp.path());

    let patch = getter.get(&PatchQuery::new("envoy", "1.29.3")).await.unwrap();

    assert_eq!(patch.content, b"-caf\xe9\n+cafe\n");
}

#[tokio::test]
async fn directory_named_like_a_candidate_is_skipped() {
    let tmp = patch_dir(&[("envoy/1.29.patch", "minor")]);
    std::fs::create_dir_all(tmp.path().join("envoy/1.29.3.patch")).unwrap();
    let getter = FsGetter::new(tmp.path());

    let patch = getter.get(&PatchQuery::new("envoy", "1.29.3")).await.unwrap();

    assert_eq!(patch.path, "envoy/1.29.patch");
    assert_eq!(patch.content, b"minor");
}

#[tokio::test]
async fn get_file_on_directory_is_missing() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("extra/envoy-1.patch")).unwrap();
    let getter = FsGetter::new(tmp.path());

    let err = getter.get_file("extra/envoy-1.patch").await.unwrap_err();

    assert!(matches!(err, PatchError::MissingFile { .. }), "{err:?}");
}

#[tokio::test]
async fn bare_query_ignores_variant_patches() {
    let tmp = patch_dir(&[("envoy/1.29.3-fips.patch", "fips")]);
    let getter = FsGetter::new(tmp.path());

    let err = getter
        .get(&PatchQuery::new("envoy", "1.29.3"))
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn missing_component_dir_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let getter = FsGetter::new(tmp.path());

    let err = getter
        .get(&PatchQuery::new("istio-proxy", "1.20.3"))
        .await
        .unwrap_err();

    match err {
        PatchError::NotFound { candidates, .. } => {
            assert_eq!(candidates, ["1.20.3.patch", "1.20.patch"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn list_filters_by_prefix_and_sorts() {
    let tmp = patch_dir(&[
        ("extra/envoy-20-tls.patch", ""),
        ("extra/envoy-03-build.patch", ""),
        ("extra/envoy-10-wasm.patch", ""),
        ("extra/istio-01-base.patch", ""),
        ("extra/envoy-99-nested/ignored.patch", ""),
    ]);
    let getter = FsGetter::new(tmp.path());

    let paths: Vec<String> = getter
        .list("extra", "envoy")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.path)
        .collect();

    assert_eq!(
        paths,
        [
            "extra/envoy-03-build.patch",
            "extra/envoy-10-wasm.patch",
            "extra/envoy-20-tls.patch",
        ]
    );
}

#[tokio::test]
async fn get_file_reports_missing_file() {
    let tmp = TempDir::new().unwrap();
    let getter = FsGetter::new(tmp.path());

    let err = getter.get_file("extra/nope.patch").await.unwrap_err();
    assert!(matches!(err, PatchError::MissingFile { .. }));
    assert!(!err.is_not_found());
}

// ── Remote backend ──

#[tokio::test]
async fn remote_probes_candidates_in_order() {
    let transport = FixtureTransport::new().with(
        "repos/dio/leo/contents/patches/envoy/1.29-fips.patch?ref=main",
        "fips minor",
    );
    let client = GitHubClient::with_transport(transport);
    let getter = GitHubGetter::new(&client, "dio/leo", "main");

    let query = PatchQuery::new("envoy", "1.29.3").with_suffix("-fips");
    let patch = getter.get(&query).await.unwrap();

    assert_eq!(patch.path, "patches/envoy/1.29-fips.patch");
    assert_eq!(patch.content, b"fips minor\n");
    assert_eq!(
        client.transport().calls(),
        [
            "GET repos/dio/leo/contents/patches/envoy/1.29.3-fips.patch?ref=main",
            "GET repos/dio/leo/contents/patches/envoy/1.29-fips.patch?ref=main",
        ]
    );
}

#[tokio::test]
async fn remote_patch_bytes_are_not_decoded() {
    let transport = FixtureTransport::new().with_bytes(
        "repos/dio/leo/contents/patches/envoy/1.29.patch?ref=main",
        b"-caf\xe9\n+cafe".to_vec(),
    );
    let client = GitHubClient::with_transport(transport);
    let getter = GitHubGetter::new(&client, "dio/leo", "main");

    let patch = getter.get(&PatchQuery::new("envoy", "1.29.3")).await.unwrap();

    assert_eq!(patch.content, b"-caf\xe9\n+cafe\n");
}

#[tokio::test]
async fn remote_transport_failure_is_not_a_miss() {
    let transport = FixtureTransport::new()
        .with_status(
            "repos/dio/leo/contents/patches/envoy/1.29.3.patch?ref=main",
            502,
        )
        .with("repos/dio/leo/contents/patches/envoy/1.29.patch?ref=main", "minor");
    let client = GitHubClient::with_transport(transport);
    let getter = GitHubGetter::new(&client, "dio/leo", "main");

    let err = getter
        .get(&PatchQuery::new("envoy", "1.29.3"))
        .await
        .unwrap_err();

    assert!(matches!(err, PatchError::Remote { .. }), "{err:?}");
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn remote_exhausted_candidates_is_not_found() {
    let client = GitHubClient::with_transport(FixtureTransport::new());
    let getter = GitHubGetter::new(&client, "dio/leo", "release-1.0");

    let err = getter
        .get(&PatchQuery::new("envoy", "1.29.3"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(client.transport().calls().len(), 2);
}

#[tokio::test]
async fn remote_list_keeps_prefixed_files_sorted() {
    let listing = r#"[
        {"name": "envoy-2.patch", "path": "extra/envoy-2.patch", "type": "file"},
        {"name": "envoy-1.patch", "path": "extra/envoy-1.patch", "type": "file"},
        {"name": "envoy-dir", "path": "extra/envoy-dir", "type": "dir"},
        {"name": "other-1.patch", "path": "extra/other-1.patch", "type": "file"}
    ]"#;
    let transport = FixtureTransport::new().with("repos/dio/leo/contents/extra?ref=main", listing);
    let client = GitHubClient::with_transport(transport);
    let getter = GitHubGetter::new(&client, "dio/leo", "main");

    let paths: Vec<String> = getter
        .list("extra", "envoy")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.path)
        .collect();

    assert_eq!(paths, ["extra/envoy-1.patch", "extra/envoy-2.patch"]);
}

#[tokio::test]
async fn file_source_selects_local_backend() {
    let tmp = patch_dir(&[("envoy/1.29.patch", "local")]);
    let source: PatchSource = format!("file://{}", tmp.path().display()).parse().unwrap();
    let client = GitHubClient::with_transport(FixtureTransport::new());

    let backend = PatchBackend::from_source(&source, &client);
    let patch = backend.get(&PatchQuery::new("envoy", "1.29.1")).await.unwrap();

    assert!(matches!(backend, PatchBackend::Local(_)));
    assert_eq!(patch.content, b"local");
    assert!(client.transport().calls().is_empty());
}

#[tokio::test]
async fn github_source_uses_default_ref() {
    let source: PatchSource = "github://dio/leo".parse().unwrap();
    let client = GitHubClient::with_transport(FixtureTransport::new());

    match PatchBackend::from_source(&source, &client) {
        PatchBackend::Remote(getter) => {
            assert_eq!(getter.repo(), "dio/leo");
            assert_eq!(getter.git_ref(), "main");
        }
        PatchBackend::Local(_) => panic!("expected remote backend"),
    }
}

// ── Application ──

#[tokio::test]
async fn apply_runs_patch_with_strip_one() {
    let tmp = patch_dir(&[("envoy/1.29.patch", "--- a/x\n+++ b/x\n")]);
    let getter = FsGetter::new(tmp.path());
    let dst = Path::new("/work/envoy");

    let mut shell = MockShell::new();
    shell
        .expect_run()
        .withf(|program, args| {
            program == "patch"
                && args[0] == "-p1"
                && args[1] == "-i"
                && args[2].ends_with(".leo.patch")
                && args[3] == "-d"
                && args[4] == "/work/envoy"
        })
        .times(1)
        .returning(|_, args| {
            let written = std::fs::read_to_string(&args[2]).unwrap();
            assert_eq!(written, "--- a/x\n+++ b/x\n");
            Ok(String::new())
        });

    let patch = apply(&getter, &shell, &PatchQuery::new("envoy", "1.29.0"), dst)
        .await
        .unwrap();

    assert_eq!(patch.path, "envoy/1.29.patch");
}

#[tokio::test]
async fn apply_writes_patch_bytes_verbatim() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("envoy")).unwrap();
    std::fs::write(tmp.path().join("envoy/1.29.patch"), b"-caf\xe9\n").unwrap();
    let getter = FsGetter::new(tmp.path());

    let mut shell = MockShell::new();
    shell.expect_run().times(1).returning(|_, args| {
        assert_eq!(std::fs::read(&args[2]).unwrap(), b"-caf\xe9\n");
        Ok(String::new())
    });

    apply(
        &getter,
        &shell,
        &PatchQuery::new("envoy", "1.29.0"),
        Path::new("/work/envoy"),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn apply_skips_shell_when_patch_is_missing() {
    let tmp = TempDir::new().unwrap();
    let getter = FsGetter::new(tmp.path());

    let mut shell = MockShell::new();
    shell.expect_run().never();

    let err = apply(
        &getter,
        &shell,
        &PatchQuery::new("envoy", "1.29.0"),
        Path::new("/work/envoy"),
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn apply_dir_applies_in_name_order() {
    let tmp = patch_dir(&[
        ("extra/envoy-2.patch", "second"),
        ("extra/envoy-1.patch", "first"),
        ("extra/envoy-3.patch", "third"),
    ]);
    let getter = FsGetter::new(tmp.path());

    let applied = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&applied);

    let mut shell = MockShell::new();
    shell
        .expect_run()
        .withf(|program, _| program == "patch")
        .times(3)
        .returning(move |_, args| {
            let content = std::fs::read_to_string(&args[2]).unwrap();
            seen.lock().unwrap().push(content);
            Ok(String::new())
        });

    let entries = apply_dir(&getter, &shell, "extra", "envoy", Path::new("/work/envoy"))
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(*applied.lock().unwrap(), ["first", "second", "third"]);
}

#[tokio::test]
async fn apply_dir_stops_at_first_failure() {
    let tmp = patch_dir(&[
        ("extra/envoy-1.patch", "first"),
        ("extra/envoy-2.patch", "second"),
    ]);
    let getter = FsGetter::new(tmp.path());

    let mut shell = MockShell::new();
    shell.expect_run().times(1).returning(|program, args| {
        Err(ShellError::CommandFailed {
            program: program.to_owned(),
            args: args.to_vec(),
            stderr: "Hunk #1 FAILED".to_owned(),
        })
    });

    let err = apply_dir(&getter, &shell, "extra", "envoy", Path::new("/work/envoy"))
        .await
        .unwrap_err();

    assert!(matches!(err, PatchError::Shell { .. }), "{err:?}");
}
