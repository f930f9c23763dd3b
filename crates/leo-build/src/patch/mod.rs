//! Patch selection and application.
//!
//! A [`PatchQuery`] expands into an ordered list of candidate file names.
//! Backends probe the candidates in that order and return the first one that
//! exists:
//!
//! ```text
//! {version}{suffix}.patch   1.29.3-fips.patch
//! {minor}{suffix}.patch     1.29-fips.patch
//! {version}.patch           1.29.3.patch
//! {minor}.patch             1.29.patch
//! ```
//!
//! Full versions beat minor lines and variant patches beat bare ones, with
//! the variant taking precedence over the version.

mod apply;
mod local;
mod remote;

use std::path::PathBuf;

use leo_core::{PatchSource, minor_version};
use leo_github::{GitHubClient, GitHubError, GitHubTransport};

use crate::shell::ShellError;

pub use apply::{apply, apply_dir, apply_patch};
pub use local::FsGetter;
pub use remote::{GitHubGetter, PATCHES_DIR};

/// Which patch a component at a given version needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchQuery {
    pub component: String,
    pub version: String,
    /// Variant such as `-fips`; empty for the generic patch set.
    pub suffix: String,
}

impl PatchQuery {
    pub fn new(component: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            version: version.into(),
            suffix: String::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn minor(&self) -> &str {
        minor_version(&self.version)
    }

    /// Candidate file names, most specific first, without duplicates.
    pub fn candidates(&self) -> Vec<String> {
        let minor = self.minor();
        let ordered = [
            format!("{}{}.patch", self.version, self.suffix),
            format!("{minor}{}.patch", self.suffix),
            format!("{}.patch", self.version),
            format!("{minor}.patch"),
        ];

        let mut candidates: Vec<String> = Vec::with_capacity(ordered.len());
        for name in ordered {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }
        candidates
    }
}

/// A selected patch and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Path relative to the patch source root.
    pub path: String,
    /// Bytes as stored; patches need not be UTF-8.
    pub content: Vec<u8>,
}

/// A file found by [`PatchGetter::list`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatchEntry {
    /// Path relative to the patch source root.
    pub path: String,
}

/// Capability shared by patch backends.
#[allow(async_fn_in_trait)]
pub trait PatchGetter: Send + Sync {
    /// First existing candidate of `query`, or [`PatchError::NotFound`].
    async fn get(&self, query: &PatchQuery) -> Result<Patch, PatchError>;

    /// A single file by its path relative to the source root.
    async fn get_file(&self, path: &str) -> Result<Patch, PatchError>;

    /// Files in `dir` named `{prefix}-*`, sorted by name.
    async fn list(&self, dir: &str, prefix: &str) -> Result<Vec<PatchEntry>, PatchError>;
}

/// Backend picked from a [`PatchSource`].
pub enum PatchBackend<'a, T: GitHubTransport> {
    Local(FsGetter),
    Remote(GitHubGetter<'a, T>),
}

impl<'a, T: GitHubTransport> PatchBackend<'a, T> {
    /// `file://` sources read the filesystem, every other scheme reads GitHub.
    pub fn from_source(source: &PatchSource, client: &'a GitHubClient<T>) -> Self {
        if source.is_local() {
            Self::Local(FsGetter::new(source.location()))
        } else {
            Self::Remote(GitHubGetter::new(
                client,
                source.location(),
                source.git_ref_or_default(),
            ))
        }
    }
}

impl<T: GitHubTransport> PatchGetter for PatchBackend<'_, T> {
    async fn get(&self, query: &PatchQuery) -> Result<Patch, PatchError> {
        match self {
            Self::Local(getter) => getter.get(query).await,
            Self::Remote(getter) => getter.get(query).await,
        }
    }

    async fn get_file(&self, path: &str) -> Result<Patch, PatchError> {
        match self {
            Self::Local(getter) => getter.get_file(path).await,
            Self::Remote(getter) => getter.get_file(path).await,
        }
    }

    async fn list(&self, dir: &str, prefix: &str) -> Result<Vec<PatchEntry>, PatchError> {
        match self {
            Self::Local(getter) => getter.list(dir, prefix).await,
            Self::Remote(getter) => getter.list(dir, prefix).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("patch not found for {component} {version}{suffix} (tried {candidates:?})")]
    NotFound {
        component: String,
        version: String,
        suffix: String,
        candidates: Vec<String>,
    },

    #[error("patch file {path} does not exist")]
    MissingFile { path: String },

    #[error("failed to fetch {path} from the patch repository")]
    Remote { path: String, source: GitHubError },

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to apply patch")]
    Shell {
        #[from]
        source: ShellError,
    },
}

impl PatchError {
    /// No candidate exists. Callers may skip; every other error is fatal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(query: &PatchQuery) -> Self {
        Self::NotFound {
            component: query.component.clone(),
            version: query.version.clone(),
            suffix: query.suffix.clone(),
            candidates: query.candidates(),
        }
    }
}
