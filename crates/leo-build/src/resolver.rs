use std::fmt;

use leo_core::VersionRef;
use leo_github::{GitHubClient, GitHubTransport, ResolvedCommit};

use crate::deps::{DEPS_FILE, Deps};
use crate::error::ResolveError;
use crate::workspace::{EnvoyWorkspaceRef, WORKSPACE_FILE};

/// Envoy file holding its human-readable version, e.g. `1.29.3-dev`.
pub const VERSION_FILE: &str = "VERSION.txt";

/// `istio.deps` entry naming the istio-proxy commit.
pub const PROXY_DEP: &str = "proxy";

/// Explicit pins that replace steps of the Istio → istio-proxy → Envoy chain.
///
/// An empty [`VersionRef`] means "follow the chain".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub proxy: VersionRef,
    pub envoy: VersionRef,
}

/// Fully resolved revisions for one Istio build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub istio: VersionRef,
    pub proxy: VersionRef,
    pub envoy: VersionRef,
    /// Archive checksum from the proxy `WORKSPACE`; empty when Envoy is overridden.
    pub envoy_sha256: String,
    /// Contents of Envoy's `VERSION.txt`, trimmed.
    pub envoy_version: String,
}

impl BuildInfo {
    pub fn istio_sha(&self) -> &str {
        self.istio.version()
    }

    pub fn proxy_sha(&self) -> &str {
        self.proxy.version()
    }

    pub fn envoy_sha(&self) -> &str {
        self.envoy.version()
    }

    /// Envoy version used to pick patches, with a trailing `-dev` dropped.
    pub fn patch_version(&self) -> &str {
        self.envoy_version
            .strip_suffix("-dev")
            .unwrap_or(&self.envoy_version)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "build info:")?;
        writeln!(f, "  istio: {}", self.istio)?;
        writeln!(f, "  workspace: {}", self.proxy)?;
        writeln!(f, "  envoy: {}", self.envoy)?;
        write!(f, "  envoyVersion: {}", self.envoy_version)
    }
}

/// Walks Istio → istio-proxy → Envoy pins on GitHub.
pub struct DependencyResolver<'a, T: GitHubTransport> {
    client: &'a GitHubClient<T>,
    istio_repo: String,
    proxy_repo: String,
}

impl<'a, T: GitHubTransport> DependencyResolver<'a, T> {
    pub fn new(
        client: &'a GitHubClient<T>,
        istio_repo: impl Into<String>,
        proxy_repo: impl Into<String>,
    ) -> Self {
        Self {
            client,
            istio_repo: istio_repo.into(),
            proxy_repo: proxy_repo.into(),
        }
    }

    pub fn client(&self) -> &'a GitHubClient<T> {
        self.client
    }

    pub fn istio_repo(&self) -> &str {
        &self.istio_repo
    }

    pub fn proxy_repo(&self) -> &str {
        &self.proxy_repo
    }

    /// Dependency manifest of the Istio repository at `git_ref`.
    pub async fn dependencies(&self, git_ref: &str) -> Result<Deps, ResolveError> {
        let content = self
            .client
            .get_raw(&self.istio_repo, DEPS_FILE, git_ref)
            .await?;

        Deps::parse(&content).map_err(|e| ResolveError::DepsParse {
            file: DEPS_FILE,
            repo: self.istio_repo.clone(),
            git_ref: git_ref.to_owned(),
            source: e,
        })
    }

    /// istio-proxy commit pinned by the Istio revision `istio_ref`.
    pub async fn proxy_commit(&self, istio_ref: &str) -> Result<VersionRef, ResolveError> {
        let dep = self.dependencies(istio_ref).await?.get(PROXY_DEP);
        if dep.is_empty() {
            return Err(ResolveError::MissingDependency {
                repo: self.istio_repo.clone(),
                git_ref: istio_ref.to_owned(),
                name: PROXY_DEP.to_owned(),
            });
        }
        Ok(VersionRef::new(self.proxy_repo.clone(), dep.sha))
    }

    /// Envoy coordinates pinned by the istio-proxy `WORKSPACE` at `proxy`.
    pub async fn envoy_from_proxy(
        &self,
        proxy: &VersionRef,
    ) -> Result<EnvoyWorkspaceRef, ResolveError> {
        let workspace = self
            .client
            .get_raw(proxy.name(), WORKSPACE_FILE, proxy.version())
            .await?;

        let envoy = EnvoyWorkspaceRef::from_workspace(&workspace);
        if let Some(field) = envoy.missing_field() {
            return Err(ResolveError::IncompleteWorkspace {
                repo: proxy.name().to_owned(),
                git_ref: proxy.version().to_owned(),
                field,
            });
        }
        Ok(envoy)
    }

    /// Trimmed `VERSION.txt` of `envoy`.
    pub async fn envoy_version(&self, envoy: &VersionRef) -> Result<String, ResolveError> {
        let content = self
            .client
            .get_raw(envoy.name(), VERSION_FILE, envoy.version())
            .await?;

        let version = content.trim();
        if version.is_empty() {
            return Err(ResolveError::EmptyVersion {
                envoy: envoy.to_string(),
                file: VERSION_FILE,
            });
        }
        Ok(version.to_owned())
    }

    /// Resolve the whole chain for the Istio ref `istio_ref`.
    ///
    /// Any failing step fails the whole resolution.
    pub async fn resolve(
        &self,
        istio_ref: &str,
        overrides: &Overrides,
    ) -> Result<BuildInfo, ResolveError> {
        let istio = self
            .client
            .resolve_commit_sha(&self.istio_repo, istio_ref)
            .await?;
        tracing::info!(repo = %self.istio_repo, git_ref = istio_ref, sha = %istio.sha, "resolved istio");

        let proxy = if overrides.proxy.is_empty() {
            self.proxy_commit(&istio.sha).await?
        } else {
            self.pin("istio-proxy override", &overrides.proxy, &self.proxy_repo)
                .await?
        };
        tracing::info!(proxy = %proxy, "resolved istio-proxy");

        let (envoy, envoy_sha256) = if overrides.envoy.is_empty() {
            let pinned = self.envoy_from_proxy(&proxy).await?;
            (pinned.version_ref(), pinned.sha256)
        } else {
            let envoy = self
                .pin("envoy override", &overrides.envoy, "envoyproxy/envoy")
                .await?;
            (envoy, String::new())
        };
        tracing::info!(envoy = %envoy, "resolved envoy");

        let envoy_version = self.envoy_version(&envoy).await?;

        Ok(BuildInfo {
            istio: VersionRef::new(self.istio_repo.clone(), istio.sha),
            proxy,
            envoy,
            envoy_sha256,
            envoy_version,
        })
    }

    /// Resolve an explicit `repo@ref` pin to `repo@sha`.
    async fn pin(
        &self,
        what: &'static str,
        pinned: &VersionRef,
        default_repo: &str,
    ) -> Result<VersionRef, ResolveError> {
        if !pinned.has_version() {
            return Err(ResolveError::MissingVersion {
                what,
                value: pinned.to_string(),
            });
        }
        let repo = if pinned.name().is_empty() {
            default_repo
        } else {
            pinned.name()
        };

        let ResolvedCommit { sha, .. } = self
            .client
            .resolve_commit_sha(repo, pinned.version())
            .await?;
        Ok(VersionRef::new(repo, sha))
    }
}
