use leo_build::BaseImage;
use leo_build::makefile::MAKEFILE_CORE;

use super::Context;

pub async fn base_image(istio: &str) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let (repo, git_ref) = ctx.istio_target(istio)?;

    let makefile = ctx.client.get_raw(&repo, MAKEFILE_CORE, &git_ref).await?;
    let image = BaseImage::from_makefile_core(&makefile);
    if image.version.is_empty() {
        tracing::warn!(%repo, %git_ref, "{MAKEFILE_CORE} declares no BASE_VERSION");
    }

    println!("{}", serde_json::to_string_pretty(&image)?);
    Ok(())
}
