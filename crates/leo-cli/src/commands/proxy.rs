use leo_build::{
    ArtifactTarget, BuildInfo, PatchBackend, PrepareOptions, RealShell, artifact_path, host_arch,
};

use super::{BuildRequest, Context};

async fn resolve(ctx: &Context, request: &BuildRequest) -> anyhow::Result<BuildInfo> {
    let (istio_repo, istio_ref) = ctx.istio_target(&request.istio)?;
    let info = ctx
        .resolver(&istio_repo)
        .resolve(&istio_ref, &request.overrides())
        .await?;
    Ok(info)
}

pub async fn proxy_info(request: &BuildRequest) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let info = resolve(&ctx, request).await?;

    println!("{info}");
    println!("  fips: {}", request.fips);
    Ok(())
}

pub async fn proxy_output(
    request: &BuildRequest,
    target: &str,
    arch: Option<&str>,
) -> anyhow::Result<()> {
    let target: ArtifactTarget = target.parse()?;
    let arch = arch.unwrap_or_else(|| host_arch());

    let ctx = Context::load()?;
    let info = resolve(&ctx, request).await?;

    let path = artifact_path(&ctx.work_dir(), &info, target, arch, request.fips);
    println!("{}", path.display());
    Ok(())
}

pub async fn proxy_prepare(request: &BuildRequest, patch_source: Option<&str>) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let source = ctx.patch_source(patch_source)?;
    let info = resolve(&ctx, request).await?;
    eprintln!("{info}");

    let options = PrepareOptions {
        work_dir: ctx.work_dir(),
        fips: request.fips,
    };
    let patches = PatchBackend::from_source(&source, &ctx.client);
    let prepared = leo_build::prepare(&ctx.client, &RealShell, &patches, &info, &options).await?;

    if let Some(patch) = &prepared.patch {
        tracing::info!(patch = %patch.path, "envoy patched");
    }
    println!("{}", prepared.proxy_dir.display());
    Ok(())
}
