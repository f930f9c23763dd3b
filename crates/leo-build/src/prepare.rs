use std::path::{Path, PathBuf};

use leo_core::{Repo, VersionRef};
use leo_github::{GitHubClient, GitHubError, GitHubTransport};

use crate::output::short_sha;
use crate::patch::{self, Patch, PatchError, PatchGetter, PatchQuery};
use crate::resolver::BuildInfo;
use crate::shell::{ShellError, ShellExecutor};

/// Envoy repository that needs no distribution qualifier in build stamps.
pub const UPSTREAM_ENVOY: &str = "envoyproxy/envoy";

/// Patch variant applied to FIPS builds.
pub const FIPS_SUFFIX: &str = "-fips";

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub work_dir: PathBuf,
    pub fips: bool,
}

/// Source trees laid out by [`prepare`].
#[derive(Debug, Clone)]
pub struct PreparedWorkspace {
    pub proxy_dir: PathBuf,
    pub envoy_dir: PathBuf,
    /// `None` when no Envoy patch exists for this version.
    pub patch: Option<Patch>,
}

#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("failed to download {repo}@{git_ref}")]
    Download {
        repo: String,
        git_ref: String,
        source: GitHubError,
    },

    #[error("failed to extract {archive}")]
    Extract {
        archive: PathBuf,
        source: ShellError,
    },

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Download `repo` at `git_ref` and unpack it under `dir`.
///
/// Returns `{dir}/{name}-{git_ref}`, the directory GitHub archives unpack to.
pub async fn fetch_source<T, S>(
    client: &GitHubClient<T>,
    shell: &S,
    repo: &str,
    git_ref: &str,
    dir: &Path,
) -> Result<PathBuf, PrepareError>
where
    T: GitHubTransport,
    S: ShellExecutor,
{
    let io_err = |path: &Path, e| PrepareError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let download_dir = tempfile::Builder::new()
        .prefix("leo.")
        .tempdir()
        .map_err(|e| io_err(&std::env::temp_dir(), e))?;

    tracing::info!(repo, git_ref, "downloading source archive");
    let archive = client
        .download_tarball(repo, git_ref, download_dir.path())
        .await
        .map_err(|e| PrepareError::Download {
            repo: repo.to_owned(),
            git_ref: git_ref.to_owned(),
            source: e,
        })?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))?;

    let args = vec![
        "-C".to_owned(),
        dir.display().to_string(),
        "-xzf".to_owned(),
        archive.display().to_string(),
    ];
    shell
        .run("tar", &args)
        .await
        .map_err(|e| PrepareError::Extract {
            archive: archive.clone(),
            source: e,
        })?;

    Ok(dir.join(format!("{}-{git_ref}", Repo::new(repo).name())))
}

/// Content of a `bazel_get_workspace_status` script.
pub fn workspace_status_script(revision: &str, status: &str) -> String {
    format!(
        "#!/bin/bash\n\
         echo \"BUILD_SCM_REVISION {revision}\"\n\
         echo \"BUILD_SCM_STATUS Distribution/{status}\"\n\
         echo \"BUILD_CONFIG Release\"\n"
    )
}

/// Write the build stamp scripts for istio-proxy, envoy and envoy-contrib
/// into `{proxy_dir}/bazel`.
pub async fn write_workspace_status(
    proxy_dir: &Path,
    envoy: &VersionRef,
) -> Result<(), PrepareError> {
    let proxy_revision = proxy_dir
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let proxy_revision = proxy_revision
        .strip_prefix("proxy-")
        .unwrap_or(&proxy_revision);

    let proxy_status = if envoy.name() == UPSTREAM_ENVOY {
        "istio/proxy".to_owned()
    } else {
        format!("istio/proxy/{}/{}", envoy.name(), short_sha(envoy.version()))
    };

    let scripts = [
        ("istio-proxy", proxy_revision.to_owned(), proxy_status),
        ("envoy", envoy.version().to_owned(), envoy.name().to_owned()),
        (
            "envoy-contrib",
            envoy.version().to_owned(),
            format!("{}/contrib", envoy.name()),
        ),
    ];

    let bazel_dir = proxy_dir.join("bazel");
    tokio::fs::create_dir_all(&bazel_dir)
        .await
        .map_err(|e| PrepareError::Io {
            path: bazel_dir.clone(),
            source: e,
        })?;

    for (name, revision, status) in scripts {
        let path = bazel_dir.join(format!("bazel_get_workspace_status_{name}"));
        write_executable(&path, &workspace_status_script(&revision, &status)).await?;
        tracing::debug!(path = %path.display(), "wrote workspace status");
    }
    Ok(())
}

async fn write_executable(path: &Path, content: &str) -> Result<(), PrepareError> {
    let io_err = |e| PrepareError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    tokio::fs::write(path, content).await.map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(io_err)?;
    }
    Ok(())
}

/// Lay out a patched istio-proxy source tree for `info` under the work dir.
///
/// ```text
/// {work_dir}/proxy-{proxySha}/               istio-proxy sources
/// {work_dir}/proxy-{proxySha}/envoy-{sha}/   Envoy sources, patched
/// {work_dir}/proxy-{proxySha}/bazel/bazel_get_workspace_status_*
/// ```
///
/// A missing Envoy patch is logged and skipped. Other patch failures abort.
pub async fn prepare<T, S, G>(
    client: &GitHubClient<T>,
    shell: &S,
    patches: &G,
    info: &BuildInfo,
    options: &PrepareOptions,
) -> Result<PreparedWorkspace, PrepareError>
where
    T: GitHubTransport,
    S: ShellExecutor,
    G: PatchGetter,
{
    let proxy_dir = fetch_source(
        client,
        shell,
        info.proxy.name(),
        info.proxy_sha(),
        &options.work_dir,
    )
    .await?;

    let envoy_dir = fetch_source(client, shell, info.envoy.name(), info.envoy_sha(), &proxy_dir)
        .await?;

    let mut query = PatchQuery::new("envoy", info.patch_version());
    if options.fips {
        query = query.with_suffix(FIPS_SUFFIX);
    }

    let patch = match patch::apply(patches, shell, &query, &envoy_dir).await {
        Ok(patch) => Some(patch),
        Err(e) if e.is_not_found() => {
            tracing::warn!(error = %e, "no envoy patch, skipping");
            None
        }
        Err(e) => return Err(e.into()),
    };

    write_workspace_status(&proxy_dir, &info.envoy).await?;

    Ok(PreparedWorkspace {
        proxy_dir,
        envoy_dir,
        patch,
    })
}
