#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use leo_github::{GitHubError, GitHubTransport, MediaType};

/// In-memory GitHub keyed by API path. Unknown paths answer 404.
///
/// Every request is recorded so tests can assert on call counts and order.
#[derive(Default)]
pub struct FixtureTransport {
    bodies: HashMap<String, String>,
    raw_bodies: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u16>,
    links: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(path.into(), body.into());
        self
    }

    /// Body that is served as-is and need not be UTF-8.
    pub fn with_bytes(mut self, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.raw_bodies.insert(path.into(), body.into());
        self
    }

    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.failures.insert(path.into(), status);
        self
    }

    pub fn with_link(mut self, path: impl Into<String>, link: impl Into<String>) -> Self {
        self.links.insert(path.into(), link.into());
        self
    }

    /// Raw file `file` of `repo` at `git_ref`.
    pub fn with_file(self, repo: &str, file: &str, git_ref: &str, body: &str) -> Self {
        self.with(format!("repos/{repo}/contents/{file}?ref={git_ref}"), body)
    }

    /// `git_ref` of `repo` resolves through the commits API to `sha`.
    pub fn with_commit(self, repo: &str, git_ref: &str, sha: &str) -> Self {
        self.with(
            format!("repos/{repo}/commits/{git_ref}"),
            format!(r#"{{"sha":"{sha}"}}"#),
        )
    }

    /// Istio at `istio_ref` pins istio-proxy `proxy_sha`, which pins
    /// upstream Envoy `envoy_sha` reporting `envoy_version`.
    pub fn with_chain(
        self,
        istio_ref: &str,
        proxy_sha: &str,
        envoy_sha: &str,
        envoy_version: &str,
    ) -> Self {
        self.with_file("istio/istio", "istio.deps", istio_ref, &deps_json(proxy_sha))
            .with_file("istio/proxy", "WORKSPACE", proxy_sha, &workspace(envoy_sha))
            .with_file(
                "envoyproxy/envoy",
                "VERSION.txt",
                envoy_sha,
                &format!("{envoy_version}\n"),
            )
    }

    pub fn with_releases(self, page: u32, tags: &[&str]) -> Self {
        let items: Vec<String> = tags
            .iter()
            .map(|t| format!(r#"{{"tag_name":"{t}"}}"#))
            .collect();
        self.with(
            format!("repos/istio/istio/releases?page={page}"),
            format!("[{}]", items.join(",")),
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.contains(needle))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GitHubTransport for FixtureTransport {
    async fn get(&self, path: &str, _media: MediaType) -> Result<String, GitHubError> {
        self.record(format!("GET {path}"));
        if let Some(status) = self.failures.get(path) {
            return Err(status_error(*status, path));
        }
        self.bodies
            .get(path)
            .cloned()
            .ok_or_else(|| status_error(404, path))
    }

    async fn get_bytes(&self, path: &str, _media: MediaType) -> Result<Vec<u8>, GitHubError> {
        self.record(format!("GET {path}"));
        if let Some(status) = self.failures.get(path) {
            return Err(status_error(*status, path));
        }
        if let Some(body) = self.raw_bodies.get(path) {
            return Ok(body.clone());
        }
        self.bodies
            .get(path)
            .map(|body| body.clone().into_bytes())
            .ok_or_else(|| status_error(404, path))
    }

    async fn link_header(&self, path: &str) -> Result<Option<String>, GitHubError> {
        self.record(format!("HEAD {path}"));
        Ok(self.links.get(path).cloned())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), GitHubError> {
        self.record(format!("DOWNLOAD {url}"));
        std::fs::write(dest, b"tarball").map_err(|e| GitHubError::Io {
            path: dest.to_path_buf(),
            source: e,
        })
    }
}

pub fn status_error(status: u16, path: &str) -> GitHubError {
    GitHubError::Status {
        status,
        url: path.to_owned(),
    }
}

pub fn deps_json(proxy_sha: &str) -> String {
    format!(
        r#"[
  {{"_comment": "", "name": "PROXY_REPO_SHA", "repoName": "proxy", "file": "", "lastStableSHA": "{proxy_sha}"}},
  {{"_comment": "", "name": "ZTUNNEL_REPO_SHA", "repoName": "ztunnel", "file": "", "lastStableSHA": "0000000"}}
]"#
    )
}

pub fn workspace(envoy_sha: &str) -> String {
    format!(
        r#"workspace(name = "io_istio_proxy")

# Commit date: 2024-03-01
ENVOY_SHA = "{envoy_sha}"

ENVOY_SHA256 = "sha256-{envoy_sha}"

ENVOY_ORG = "envoyproxy"

ENVOY_REPO = "envoy"

http_archive(
    name = "envoy",
    sha256 = ENVOY_SHA256,
    strip_prefix = ENVOY_REPO + "-" + ENVOY_SHA,
)
"#
    )
}
