use std::io::Write;
use std::path::Path;

use leo_build::patch::{self, PatchGetter};
use leo_build::{PatchBackend, PatchQuery, RealShell};

use super::Context;

pub async fn patch_show(query: &PatchQuery, source: Option<&str>) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let source = ctx.patch_source(source)?;

    let patch = PatchBackend::from_source(&source, &ctx.client)
        .get(query)
        .await?;

    tracing::info!(patch = %patch.path, "selected");
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&patch.content)?;
    stdout.flush()?;
    Ok(())
}

pub async fn patch_apply(query: &PatchQuery, source: Option<&str>, dst: &str) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let source = ctx.patch_source(source)?;
    let backend = PatchBackend::from_source(&source, &ctx.client);

    let applied = patch::apply(&backend, &RealShell, query, Path::new(dst)).await?;

    println!("{}", applied.path);
    Ok(())
}

pub async fn patch_apply_dir(
    dir: &str,
    prefix: &str,
    dst: &str,
    source: Option<&str>,
) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let source = ctx.patch_source(source)?;
    let backend = PatchBackend::from_source(&source, &ctx.client);

    let applied = patch::apply_dir(&backend, &RealShell, dir, prefix, Path::new(dst)).await?;

    for entry in &applied {
        println!("{}", entry.path);
    }
    Ok(())
}
