use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Patch, PatchEntry, PatchError, PatchGetter, PatchQuery};

/// Patches stored on disk as `{dir}/{component}/{candidate}`.
#[derive(Debug, Clone)]
pub struct FsGetter {
    dir: PathBuf,
}

impl FsGetter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `Ok(None)` when no regular file exists at `path`.
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, PatchError> {
        let io_err = |e| PatchError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        match tokio::fs::metadata(path).await {
            Ok(meta) if !meta.is_file() => return Ok(None),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        }
        tokio::fs::read(path).await.map(Some).map_err(io_err)
    }
}

impl PatchGetter for FsGetter {
    async fn get(&self, query: &PatchQuery) -> Result<Patch, PatchError> {
        let component_dir = self.dir.join(&query.component);

        for candidate in query.candidates() {
            let path = component_dir.join(&candidate);
            tracing::debug!(path = %path.display(), "probing patch");
            if let Some(content) = self.read(&path).await? {
                return Ok(Patch {
                    path: format!("{}/{candidate}", query.component),
                    content,
                });
            }
        }

        Err(PatchError::not_found(query))
    }

    async fn get_file(&self, path: &str) -> Result<Patch, PatchError> {
        match self.read(&self.dir.join(path)).await? {
            Some(content) => Ok(Patch {
                path: path.to_owned(),
                content,
            }),
            None => Err(PatchError::MissingFile {
                path: path.to_owned(),
            }),
        }
    }

    async fn list(&self, dir: &str, prefix: &str) -> Result<Vec<PatchEntry>, PatchError> {
        let root = self.dir.join(dir);
        let io_err = |e| PatchError::Io {
            path: root.clone(),
            source: e,
        };

        let wanted = format!("{prefix}-");
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&root).await.map_err(io_err)?;
        while let Some(entry) = read_dir.next_entry().await.map_err(io_err)? {
            if !entry.file_type().await.map_err(io_err)?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&wanted) {
                entries.push(PatchEntry {
                    path: format!("{}/{name}", dir.trim_end_matches('/')),
                });
            }
        }

        entries.sort();
        Ok(entries)
    }
}
