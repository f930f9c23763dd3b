mod istio;
mod patch;
mod proxy;
mod release;
mod resolve;

use std::path::{Path, PathBuf};

use leo_build::{DependencyResolver, Overrides};
use leo_core::{LeoConfig, PatchSource, VersionRef};
use leo_github::{GitHubClient, RealTransport, discover_token};

pub use istio::base_image;
pub use patch::{patch_apply, patch_apply_dir, patch_show};
pub use proxy::{proxy_info, proxy_output, proxy_prepare};
pub use release::release_next;
pub use resolve::{resolve_commit, resolve_workspace};

/// Short name accepted in place of the configured Istio repository.
const ISTIO_ALIAS: &str = "istio";

/// Configuration and GitHub client shared by every command.
pub(crate) struct Context {
    pub config: LeoConfig,
    pub client: GitHubClient,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let config = LeoConfig::load(Path::new("."))?;

        let token = discover_token();
        if token.is_none() {
            tracing::debug!("no GitHub token found, requests are unauthenticated");
        }
        let transport = RealTransport::new(&config.github.api_url, token)?;

        Ok(Self {
            config,
            client: GitHubClient::new(transport),
        })
    }

    pub fn resolver<'a>(&'a self, istio_repo: &str) -> DependencyResolver<'a, RealTransport> {
        DependencyResolver::new(&self.client, istio_repo, &self.config.github.proxy_repo)
    }

    /// `flag` when given, the configured source otherwise.
    pub fn patch_source(&self, flag: Option<&str>) -> anyhow::Result<PatchSource> {
        Ok(PatchSource::parse(flag.unwrap_or(&self.config.patch.source))?)
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.build.work_dir)
    }

    /// Split `istio@REF` or `owner/repo@REF` into the Istio repository and ref.
    pub fn istio_target(&self, value: &str) -> anyhow::Result<(String, String)> {
        let target = VersionRef::parse(value);
        if !target.has_version() {
            anyhow::bail!("{value:?} must be pinned as istio@REF");
        }

        let repo = match target.name() {
            ISTIO_ALIAS | "" => self.config.github.istio_repo.clone(),
            name if name.contains('/') => name.to_owned(),
            name => anyhow::bail!("unsupported target {name:?}, expected istio@REF"),
        };
        Ok((repo, target.version().to_owned()))
    }
}

/// Build selection shared by the `proxy` commands.
pub struct BuildRequest {
    pub istio: String,
    pub proxy: Option<String>,
    pub envoy: Option<String>,
    pub fips: bool,
}

impl BuildRequest {
    pub fn overrides(&self) -> Overrides {
        let pin = |value: &Option<String>| value.as_deref().map(VersionRef::parse).unwrap_or_default();
        Overrides {
            proxy: pin(&self.proxy),
            envoy: pin(&self.envoy),
        }
    }
}
