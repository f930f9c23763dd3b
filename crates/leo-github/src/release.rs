use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::client::GitHubClient;
use crate::error::GitHubError;
use crate::transport::GitHubTransport;

static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"page=(\d+)").expect("page pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

impl Release {
    /// Tags like `1.21.0-beta.1` or `1.20.0-rc.0`.
    pub fn is_prerelease(&self) -> bool {
        self.tag_name.contains('-')
    }
}

impl<T: GitHubTransport> GitHubClient<T> {
    /// One page of releases, in API order (newest first).
    pub async fn releases(&self, repo: &str, page: u32) -> Result<Vec<Release>, GitHubError> {
        tracing::debug!(repo, page, "listing releases");
        self.get_json(&format!("repos/{repo}/releases?page={page}"))
            .await
    }

    /// Number of release pages, read from the `Link` header.
    ///
    /// A missing header means everything fits on the first page.
    pub async fn last_release_page(&self, repo: &str) -> Result<u32, GitHubError> {
        let link = self
            .transport()
            .link_header(&format!("repos/{repo}/releases"))
            .await?;

        Ok(link.as_deref().and_then(last_page_from_link).unwrap_or(1))
    }

    /// First stable release whose minor is greater than `version`'s.
    pub async fn newer_minor_release(
        &self,
        repo: &str,
        version: &str,
    ) -> Result<String, GitHubError> {
        let current = parse_lenient(version)?;
        self.find_release(repo, version, |candidate| candidate.minor > current.minor)
            .await
    }

    /// First stable release on `version`'s `major.minor` line with a greater patch.
    pub async fn newer_patch_release(
        &self,
        repo: &str,
        version: &str,
    ) -> Result<String, GitHubError> {
        let current = parse_lenient(version)?;
        self.find_release(repo, version, |candidate| {
            candidate.major == current.major
                && candidate.minor == current.minor
                && candidate.patch > current.patch
        })
        .await
    }

    async fn find_release(
        &self,
        repo: &str,
        version: &str,
        newer: impl Fn(&semver::Version) -> bool,
    ) -> Result<String, GitHubError> {
        let last_page = self.last_release_page(repo).await?;

        for page in 1..=last_page {
            for release in self.releases(repo, page).await? {
                if release.is_prerelease() {
                    continue;
                }
                let candidate = parse_lenient(&release.tag_name)?;
                if newer(&candidate) {
                    return Ok(release.tag_name);
                }
            }
        }

        Err(GitHubError::ReleaseNotFound {
            repo: repo.to_owned(),
            version: version.to_owned(),
        })
    }
}

/// Page number of the last `page=N` in a `Link` header, i.e. the `rel="last"` entry.
pub fn last_page_from_link(link: &str) -> Option<u32> {
    PAGE_RE
        .captures_iter(link)
        .filter_map(|caps| caps.get(1))
        // arch-lint: allow(no-silent-result-drop) reason="page numbers beyond u32 are not real pages"
        .filter_map(|m| m.as_str().parse().ok())
        .last()
}

/// Whether `value` reads as a semantic version: `1.2.3`, `v1.2`, `1.20.0-rc.1`.
pub fn looks_like_semver(value: &str) -> bool {
    parse_lenient(value).is_ok()
}

/// Parses a version, tolerating a leading `v` and missing minor/patch parts.
pub fn parse_lenient(value: &str) -> Result<semver::Version, GitHubError> {
    let trimmed = value.strip_prefix('v').unwrap_or(value);
    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split);

    let padded = match core.split('.').count() {
        1 => format!("{core}.0.0{rest}"),
        2 => format!("{core}.0{rest}"),
        _ => trimmed.to_owned(),
    };

    semver::Version::parse(&padded).map_err(|e| GitHubError::InvalidVersion {
        version: value.to_owned(),
        source: e,
    })
}
