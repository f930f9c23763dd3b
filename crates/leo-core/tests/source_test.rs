use leo_core::{DEFAULT_PATCH_REF, PatchSource};

#[test]
fn file_source_is_local() {
    let source = PatchSource::parse("file:///patches").unwrap();

    assert!(source.is_local());
    assert_eq!(source.location(), "/patches");
    assert_eq!(source.git_ref(), None);
}

#[test]
fn relative_file_source() {
    let source = PatchSource::parse("file://patches").unwrap();

    assert!(source.is_local());
    assert_eq!(source.location(), "patches");
}

#[test]
fn github_source_with_ref() {
    let source = PatchSource::parse("github://org/repo@branch").unwrap();

    assert!(!source.is_local());
    assert_eq!(source.scheme(), "github");
    assert_eq!(source.location(), "org/repo");
    assert_eq!(source.git_ref(), Some("branch"));
    assert_eq!(source.git_ref_or_default(), "branch");
}

#[test]
fn github_source_defaults_ref() {
    let source = PatchSource::parse("github://dio/leo").unwrap();

    assert!(!source.is_local());
    assert_eq!(source.location(), "dio/leo");
    assert_eq!(source.git_ref(), None);
    assert_eq!(source.git_ref_or_default(), DEFAULT_PATCH_REF);
}

#[test]
fn display_round_trips() {
    for value in ["file:///patches", "github://org/repo@branch", "github://dio/leo"] {
        assert_eq!(PatchSource::parse(value).unwrap().to_string(), value);
    }
}

#[test]
fn rejects_missing_scheme() {
    let err = PatchSource::parse("patches").unwrap_err();
    assert!(matches!(err, leo_core::Error::InvalidPatchSource { .. }));
}

#[test]
fn rejects_missing_location() {
    assert!(PatchSource::parse("github://").is_err());
    assert!(PatchSource::parse("://dio/leo").is_err());
}
