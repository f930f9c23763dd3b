use std::path::Path;

use super::{Patch, PatchEntry, PatchError, PatchGetter, PatchQuery};
use crate::shell::ShellExecutor;

/// Select the patch for `query` and apply it to `dst`.
pub async fn apply<G, S>(
    getter: &G,
    shell: &S,
    query: &PatchQuery,
    dst: &Path,
) -> Result<Patch, PatchError>
where
    G: PatchGetter,
    S: ShellExecutor,
{
    let patch = getter.get(query).await?;
    apply_patch(shell, &patch, dst).await?;
    Ok(patch)
}

/// Apply every `{prefix}-*` patch in `dir` to `dst`, in name order.
///
/// Stops at the first failure.
pub async fn apply_dir<G, S>(
    getter: &G,
    shell: &S,
    dir: &str,
    prefix: &str,
    dst: &Path,
) -> Result<Vec<PatchEntry>, PatchError>
where
    G: PatchGetter,
    S: ShellExecutor,
{
    let entries = getter.list(dir, prefix).await?;
    if entries.is_empty() {
        tracing::warn!(dir, prefix, "no patches to apply");
    }

    for entry in &entries {
        let patch = getter.get_file(&entry.path).await?;
        apply_patch(shell, &patch, dst).await?;
    }
    Ok(entries)
}

/// Write `patch` to a temporary file and run `patch -p1 -i <file> -d <dst>`.
pub async fn apply_patch<S: ShellExecutor>(
    shell: &S,
    patch: &Patch,
    dst: &Path,
) -> Result<(), PatchError> {
    let file = tempfile::Builder::new()
        .suffix(".leo.patch")
        .tempfile()
        .map_err(|e| PatchError::Io {
            path: std::env::temp_dir(),
            source: e,
        })?;

    tokio::fs::write(file.path(), &patch.content)
        .await
        .map_err(|e| PatchError::Io {
            path: file.path().to_path_buf(),
            source: e,
        })?;

    tracing::info!(patch = %patch.path, dst = %dst.display(), "applying patch");

    let args = vec![
        "-p1".to_owned(),
        "-i".to_owned(),
        file.path().display().to_string(),
        "-d".to_owned(),
        dst.display().to_string(),
    ];
    shell.run("patch", &args).await?;
    Ok(())
}
