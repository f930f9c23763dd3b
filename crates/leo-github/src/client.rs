use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::GitHubError;
use crate::release::looks_like_semver;
use crate::transport::{GitHubTransport, MediaType, RealTransport};

/// Annotated tags pointing at other tags are followed at most this deep.
const MAX_TAG_DEPTH: usize = 4;

/// GitHub lookups, parameterized over the transport for testability.
pub struct GitHubClient<T: GitHubTransport = RealTransport> {
    transport: T,
}

impl GitHubClient<RealTransport> {
    pub fn new(transport: RealTransport) -> Self {
        Self { transport }
    }
}

impl<T: GitHubTransport> GitHubClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    // ── Content ──

    /// Raw content of `file` in `repo` at `git_ref`.
    pub async fn get_raw(&self, repo: &str, file: &str, git_ref: &str) -> Result<String, GitHubError> {
        tracing::debug!(repo, file, git_ref, "fetching raw content");
        self.transport
            .get(&format!("repos/{repo}/contents/{file}?ref={git_ref}"), MediaType::Raw)
            .await
    }

    /// Raw content of `file` as bytes, for files that need not be UTF-8.
    pub async fn get_raw_bytes(
        &self,
        repo: &str,
        file: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, GitHubError> {
        tracing::debug!(repo, file, git_ref, "fetching raw bytes");
        self.transport
            .get_bytes(&format!("repos/{repo}/contents/{file}?ref={git_ref}"), MediaType::Raw)
            .await
    }

    /// Directory listing of `dir` in `repo` at `git_ref`.
    pub async fn list_contents(
        &self,
        repo: &str,
        dir: &str,
        git_ref: &str,
    ) -> Result<Vec<ContentEntry>, GitHubError> {
        self.get_json(&format!("repos/{repo}/contents/{dir}?ref={git_ref}"))
            .await
    }

    // ── Refs ──

    /// Resolve a branch, tag, semantic version, or commit to a commit SHA.
    ///
    /// Tried in order, first success wins:
    /// 1. `git_ref` as a commit
    /// 2. `git_ref` as a branch head
    /// 3. a `git_ref` that is not a semantic version is returned unchanged
    /// 4. `git_ref` as a tag, following annotated tag objects to their commit
    ///
    /// Steps 1 and 2 fall through only when GitHub reports the object as
    /// missing (404/422); transport failures and other statuses are fatal.
    pub async fn resolve_commit_sha(
        &self,
        repo: &str,
        git_ref: &str,
    ) -> Result<ResolvedCommit, GitHubError> {
        match self.commit_sha(repo, git_ref).await {
            Ok(sha) => return Ok(ResolvedCommit::new(sha, git_ref)),
            Err(e) if e.is_lookup_miss() => {
                tracing::debug!(repo, git_ref, "not a commit, trying branch");
            }
            Err(e) => return Err(e),
        }

        match self.ref_sha(repo, git_ref, RefKind::Head).await {
            Ok(sha) => return Ok(ResolvedCommit::new(sha, git_ref)),
            Err(e) if e.is_lookup_miss() => {
                tracing::debug!(repo, git_ref, "not a branch");
            }
            Err(e) => return Err(e),
        }

        if !looks_like_semver(git_ref) {
            tracing::warn!(repo, git_ref, "unresolved ref passed through as a commit SHA");
            return Ok(ResolvedCommit::new(git_ref, git_ref));
        }

        let sha = self.ref_sha(repo, git_ref, RefKind::Tag).await?;
        Ok(ResolvedCommit::new(sha, git_ref))
    }

    /// SHA of the commit `git_ref` points to.
    pub async fn commit_sha(&self, repo: &str, git_ref: &str) -> Result<String, GitHubError> {
        let commit: CommitObject = self
            .get_json(&format!("repos/{repo}/commits/{git_ref}"))
            .await?;
        Ok(commit.sha)
    }

    /// SHA of the commit a branch head or tag points to.
    pub async fn ref_sha(
        &self,
        repo: &str,
        name: &str,
        kind: RefKind,
    ) -> Result<String, GitHubError> {
        let reference: GitRef = self
            .get_json(&format!("repos/{repo}/git/ref/{}/{name}", kind.as_str()))
            .await?;

        if kind == RefKind::Head {
            return Ok(reference.object.sha);
        }

        let mut object = reference.object;
        for _ in 0..MAX_TAG_DEPTH {
            if !object.is_tag() {
                return Ok(object.sha);
            }
            tracing::debug!(repo, tag = name, sha = %object.sha, "following annotated tag");
            let tag: GitRef = self
                .get_json(&format!("repos/{repo}/git/tags/{}", object.sha))
                .await?;
            object = tag.object;
        }

        if object.is_tag() {
            return Err(GitHubError::TagDepthExceeded {
                repo: repo.to_owned(),
                tag: name.to_owned(),
                depth: MAX_TAG_DEPTH,
            });
        }
        Ok(object.sha)
    }

    // ── Archives ──

    /// Download the source tarball of `repo` at `git_ref` into `dir`.
    pub async fn download_tarball(
        &self,
        repo: &str,
        git_ref: &str,
        dir: &Path,
    ) -> Result<PathBuf, GitHubError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| GitHubError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let dest = dir.join(format!("{git_ref}.tar.gz"));
        let url = format!("https://github.com/{repo}/archive/{git_ref}.tar.gz");
        self.transport.download(&url, &dest).await?;
        Ok(dest)
    }

    // ── Helpers ──

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, GitHubError> {
        let body = self.transport.get(path, MediaType::Json).await?;
        serde_json::from_str(&body).map_err(|e| GitHubError::Decode {
            path: path.to_owned(),
            source: e,
        })
    }
}

// ── Types ──

/// Kind of git reference namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Head,
    Tag,
}

impl RefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "heads",
            Self::Tag => "tags",
        }
    }
}

/// An immutable commit SHA and the ref it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    pub sha: String,
    pub from_ref: String,
}

impl ResolvedCommit {
    pub fn new(sha: impl Into<String>, from_ref: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            from_ref: from_ref.into(),
        }
    }
}

impl fmt::Display for ResolvedCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sha)
    }
}

/// One entry of a repository directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

#[derive(Debug, Deserialize)]
struct CommitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl GitObject {
    fn is_tag(&self) -> bool {
        self.kind == "tag"
    }
}
