use super::Context;

pub async fn release_next(version: &str, minor: bool) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let repo = &ctx.config.github.istio_repo;

    let tag = if minor {
        ctx.client.newer_minor_release(repo, version).await?
    } else {
        ctx.client.newer_patch_release(repo, version).await?
    };

    println!("{tag}");
    Ok(())
}
