use leo_github::{GitHubClient, GitHubError, GitHubTransport};

use super::{Patch, PatchEntry, PatchError, PatchGetter, PatchQuery};

/// Directory of the patch repository holding one subdirectory per component.
pub const PATCHES_DIR: &str = "patches";

/// Patches hosted in a GitHub repository under `patches/{component}/`.
pub struct GitHubGetter<'a, T: GitHubTransport> {
    client: &'a GitHubClient<T>,
    repo: String,
    git_ref: String,
}

impl<'a, T: GitHubTransport> GitHubGetter<'a, T> {
    pub fn new(
        client: &'a GitHubClient<T>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            client,
            repo: repo.into(),
            git_ref: git_ref.into(),
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// `Ok(None)` when GitHub reports the file as missing.
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, PatchError> {
        match self.client.get_raw_bytes(&self.repo, path, &self.git_ref).await {
            Ok(content) => Ok(Some(with_trailing_newline(content))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(remote(path, e)),
        }
    }
}

impl<T: GitHubTransport> PatchGetter for GitHubGetter<'_, T> {
    async fn get(&self, query: &PatchQuery) -> Result<Patch, PatchError> {
        tracing::info!(
            component = %query.component,
            version = %query.version,
            suffix = %query.suffix,
            repo = %self.repo,
            git_ref = %self.git_ref,
            "searching for patch"
        );

        for candidate in query.candidates() {
            let path = format!("{PATCHES_DIR}/{}/{candidate}", query.component);
            tracing::debug!(path, "probing patch");
            if let Some(content) = self.fetch(&path).await? {
                return Ok(Patch { path, content });
            }
        }

        Err(PatchError::not_found(query))
    }

    async fn get_file(&self, path: &str) -> Result<Patch, PatchError> {
        match self.fetch(path).await? {
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
        let wanted = format!("{prefix}-");
        let listing = self
            .client
            .list_contents(&self.repo, dir, &self.git_ref)
            .await
            .map_err(|e| remote(dir, e))?;

        let mut entries: Vec<PatchEntry> = listing
            .into_iter()
            .filter(|entry| entry.is_file() && entry.name.starts_with(&wanted))
            .map(|entry| PatchEntry { path: entry.path })
            .collect();

        entries.sort();
        Ok(entries)
    }
}

fn remote(path: &str, source: GitHubError) -> PatchError {
    PatchError::Remote {
        path: path.to_owned(),
        source,
    }
}

fn with_trailing_newline(mut content: Vec<u8>) -> Vec<u8> {
    if content.last() != Some(&b'\n') {
        content.push(b'\n');
    }
    content
}
