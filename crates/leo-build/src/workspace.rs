use std::sync::LazyLock;

use leo_core::VersionRef;
use regex::Regex;

/// Bazel workspace file of istio-proxy.
pub const WORKSPACE_FILE: &str = "WORKSPACE";

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(ENVOY_SHA|ENVOY_SHA256|ENVOY_ORG|ENVOY_REPO)[ \t]*=[ \t]*"([^"\n]*)""#)
        .expect("assignment pattern is valid")
});

/// Envoy coordinates pinned by an istio-proxy `WORKSPACE`.
///
/// Fields missing from the file stay empty; callers validate what they need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvoyWorkspaceRef {
    pub org: String,
    pub repo: String,
    pub sha: String,
    pub sha256: String,
}

impl EnvoyWorkspaceRef {
    /// Scans `ENVOY_SHA`, `ENVOY_SHA256`, `ENVOY_ORG` and `ENVOY_REPO`
    /// assignments out of workspace text. Never fails.
    pub fn from_workspace(workspace: &str) -> Self {
        let mut envoy = Self::default();

        for caps in ASSIGNMENT_RE.captures_iter(workspace) {
            let value = caps[2].to_owned();
            match &caps[1] {
                "ENVOY_SHA" => envoy.sha = value,
                "ENVOY_SHA256" => envoy.sha256 = value,
                "ENVOY_ORG" => envoy.org = value,
                "ENVOY_REPO" => envoy.repo = value,
                _ => {}
            }
        }

        envoy
    }

    /// `org/repo`
    pub fn name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }

    /// `org/repo@sha`
    pub fn version_ref(&self) -> VersionRef {
        VersionRef::new(self.name(), self.sha.clone())
    }

    /// First required field (`ENVOY_ORG`, `ENVOY_REPO`, `ENVOY_SHA`) that is empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.org.is_empty() {
            Some("ENVOY_ORG")
        } else if self.repo.is_empty() {
            Some("ENVOY_REPO")
        } else if self.sha.is_empty() {
            Some("ENVOY_SHA")
        } else {
            None
        }
    }
}
