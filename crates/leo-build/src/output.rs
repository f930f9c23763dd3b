use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::resolver::BuildInfo;

/// Archive produced by an istio-proxy build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactTarget {
    IstioProxy,
    Envoy,
    EnvoyContrib,
}

impl ArtifactTarget {
    pub const ALL: [Self; 3] = [Self::IstioProxy, Self::Envoy, Self::EnvoyContrib];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IstioProxy => "istio-proxy",
            Self::Envoy => "envoy",
            Self::EnvoyContrib => "envoy-contrib",
        }
    }
}

impl fmt::Display for ArtifactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown artifact target {0:?}, expected istio-proxy, envoy or envoy-contrib")]
pub struct UnknownTarget(pub String);

impl FromStr for ArtifactTarget {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| UnknownTarget(s.to_owned()))
    }
}

/// Architecture name used in artifact file names for the running host.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

/// First seven characters of a commit SHA.
pub fn short_sha(sha: &str) -> &str {
    sha.char_indices().nth(7).map_or(sha, |(end, _)| &sha[..end])
}

/// `{work_dir}/proxy-{proxySha}/out`
pub fn output_dir(work_dir: &Path, info: &BuildInfo) -> PathBuf {
    work_dir.join(format!("proxy-{}", info.proxy_sha())).join("out")
}

/// Where a build of `info` leaves the `target` archive.
pub fn artifact_path(
    work_dir: &Path,
    info: &BuildInfo,
    target: ArtifactTarget,
    arch: &str,
    fips: bool,
) -> PathBuf {
    let fips = if fips { "fips-" } else { "" };
    let envoy = short_sha(info.envoy_sha());

    let name = match target {
        ArtifactTarget::IstioProxy => format!(
            "istio-proxy-{}-{}-{envoy}-{fips}{arch}.tar.gz",
            short_sha(info.istio_sha()),
            short_sha(info.proxy_sha()),
        ),
        ArtifactTarget::Envoy | ArtifactTarget::EnvoyContrib => format!(
            "{target}-{}-{envoy}-{fips}{arch}.tar.gz",
            info.envoy_version
        ),
    };

    output_dir(work_dir, info).join(name)
}
