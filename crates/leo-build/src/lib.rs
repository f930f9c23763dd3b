//! Istio dependency resolution, Envoy patch selection, and istio-proxy
//! workspace preparation for leo.
//!
//! # Resolution chain
//!
//! ```text
//! istio@ref
//!   1. Istio commit    ── GitHubClient::resolve_commit_sha()
//!   2. istio-proxy     ── istio.deps → "proxy".lastStableSHA   (unless overridden)
//!   3. Envoy           ── proxy WORKSPACE → ENVOY_ORG/REPO/SHA  (unless overridden)
//!   4. Envoy version   ── envoy VERSION.txt
//! ```
//!
//! [`WorkspaceVersionMatcher`] runs the chain backwards: given an Envoy ref
//! it walks Istio `master` and then every release until one pins the same
//! Envoy minor version.
//!
//! # Prepare pipeline
//!
//! ```text
//! leo proxy prepare
//!   1. Resolve   ── DependencyResolver::resolve()
//!   2. Sources   ── tarballs of istio-proxy and Envoy, tar -xzf
//!   3. Patch     ── PatchGetter::get() → patch -p1 (missing patch is skipped)
//!   4. Stamp     ── bazel/bazel_get_workspace_status_*
//! ```

pub mod deps;
pub mod error;
pub mod makefile;
pub mod matcher;
pub mod output;
pub mod patch;
pub mod prepare;
pub mod resolver;
pub mod shell;
pub mod workspace;

pub use deps::{Dep, Deps};
pub use error::ResolveError;
pub use makefile::BaseImage;
pub use matcher::WorkspaceVersionMatcher;
pub use output::{ArtifactTarget, artifact_path, host_arch};
pub use patch::{
    FsGetter, GitHubGetter, Patch, PatchBackend, PatchEntry, PatchError, PatchGetter, PatchQuery,
};
pub use prepare::{PrepareError, PrepareOptions, PreparedWorkspace, prepare};
pub use resolver::{BuildInfo, DependencyResolver, Overrides};
pub use shell::{RealShell, ShellError, ShellExecutor};
pub use workspace::EnvoyWorkspaceRef;
