#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("failed to build HTTP client")]
    Client { source: reqwest::Error },

    #[error("request to {url} failed")]
    Request { url: String, source: reqwest::Error },

    #[error("GitHub returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("unexpected response body from {path}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write {path}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("{version:?} is not a valid version")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    #[error("no release newer than {version} in {repo}")]
    ReleaseNotFound { repo: String, version: String },

    #[error("tag {tag} in {repo} nests more than {depth} tag objects")]
    TagDepthExceeded {
        repo: String,
        tag: String,
        depth: usize,
    },
}

impl GitHubError {
    /// The requested object does not exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// GitHub answered, but the ref could not be looked up this way.
    ///
    /// 404 for unknown objects, 422 for strings that are not valid SHAs.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::Status { status: 404 | 422, .. })
    }
}
