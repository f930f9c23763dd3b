use leo_core::{VersionRef, minor_version};
use leo_github::{GitHubTransport, ResolvedCommit};

use crate::error::ResolveError;
use crate::resolver::DependencyResolver;

/// Istio branch checked before any release is scanned.
pub const DEFAULT_BRANCH: &str = "master";

/// Finds the Istio revision whose pinned Envoy shares a minor version with
/// a given Envoy ref.
///
/// Every candidate costs three sequential content fetches (deps, workspace,
/// version). Nothing is cached between candidates.
pub struct WorkspaceVersionMatcher<'r, 'a, T: GitHubTransport> {
    resolver: &'r DependencyResolver<'a, T>,
}

impl<'r, 'a, T: GitHubTransport> WorkspaceVersionMatcher<'r, 'a, T> {
    pub fn new(resolver: &'r DependencyResolver<'a, T>) -> Self {
        Self { resolver }
    }

    /// Istio commit building the same Envoy minor as `envoy`.
    ///
    /// `master` wins when it matches. Otherwise releases are scanned page by
    /// page in API order and the first match is resolved.
    pub async fn resolve_workspace(
        &self,
        envoy: &VersionRef,
    ) -> Result<ResolvedCommit, ResolveError> {
        if !envoy.has_version() {
            return Err(ResolveError::MissingVersion {
                what: "envoy",
                value: envoy.to_string(),
            });
        }

        let target_version = self.resolver.envoy_version(envoy).await?;
        let target = minor_version(&target_version);
        tracing::info!(envoy = %envoy, minor = target, "matching istio revision");

        if self.reachable_minor(DEFAULT_BRANCH).await? == target {
            tracing::info!(git_ref = DEFAULT_BRANCH, "istio default branch matches");
            return self.resolve(DEFAULT_BRANCH).await;
        }

        let istio_repo = self.resolver.istio_repo();
        let client = self.resolver.client();
        let last_page = client.last_release_page(istio_repo).await?;

        for page in 1..=last_page {
            tracing::debug!(page, last_page, "scanning istio releases");
            for release in client.releases(istio_repo, page).await? {
                if self.reachable_minor(&release.tag_name).await? == target {
                    tracing::info!(tag = %release.tag_name, "istio release matches");
                    return self.resolve(&release.tag_name).await;
                }
            }
        }

        Err(ResolveError::CannotResolve {
            envoy: envoy.to_string(),
            minor: target.to_owned(),
        })
    }

    /// Envoy minor pinned by Istio at `istio_ref`, through istio-proxy.
    async fn reachable_minor(&self, istio_ref: &str) -> Result<String, ResolveError> {
        let proxy = self.resolver.proxy_commit(istio_ref).await?;
        let envoy = self.resolver.envoy_from_proxy(&proxy).await?;
        let version = self.resolver.envoy_version(&envoy.version_ref()).await?;
        Ok(minor_version(&version).to_owned())
    }

    async fn resolve(&self, istio_ref: &str) -> Result<ResolvedCommit, ResolveError> {
        Ok(self
            .resolver
            .client()
            .resolve_commit_sha(self.resolver.istio_repo(), istio_ref)
            .await?)
    }
}
