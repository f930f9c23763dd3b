use leo_build::WorkspaceVersionMatcher;
use leo_core::VersionRef;

use super::Context;

pub async fn resolve_commit(value: &str) -> anyhow::Result<()> {
    let target = VersionRef::parse(value);
    if target.name().is_empty() || !target.has_version() {
        anyhow::bail!("{value:?} must be pinned as OWNER/REPO@REF");
    }

    let ctx = Context::load()?;
    let commit = ctx
        .client
        .resolve_commit_sha(target.name(), target.version())
        .await?;

    println!("{commit}");
    Ok(())
}

pub async fn resolve_workspace(envoy: &str) -> anyhow::Result<()> {
    let envoy = VersionRef::parse(envoy);

    let ctx = Context::load()?;
    let resolver = ctx.resolver(&ctx.config.github.istio_repo);
    let commit = WorkspaceVersionMatcher::new(&resolver)
        .resolve_workspace(&envoy)
        .await?;

    tracing::info!(istio_ref = %commit.from_ref, "matched");
    println!("{commit}");
    Ok(())
}
