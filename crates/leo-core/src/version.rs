use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A repository path such as `envoyproxy/envoy` or a bare `istio`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Repo(String);

impl Repo {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Full path as given, e.g. `envoyproxy/envoy`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        let trimmed = self.trimmed();
        trimmed
            .rsplit_once('/')
            .map_or(trimmed, |(_, name)| name)
    }

    /// Everything before the last path segment; empty for unqualified names.
    pub fn owner(&self) -> &str {
        self.trimmed()
            .rsplit_once('/')
            .map_or("", |(owner, _)| owner)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn trimmed(&self) -> &str {
        self.0.trim_end_matches('/')
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Repo {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A parsed `owner/name@version` argument.
///
/// Parsing is lenient and never fails: a token without `@` has an empty
/// version, and an empty token yields an empty reference. Callers check
/// [`VersionRef::is_empty`] / [`VersionRef::has_version`] before use.
///
/// The token is split on the *last* `@`, so `a@b@c` parses as repo `a@b`
/// and version `c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionRef {
    repo: Repo,
    version: String,
}

impl VersionRef {
    pub fn new(repo: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            repo: Repo::new(repo),
            version: version.into(),
        }
    }

    pub fn parse(token: &str) -> Self {
        match token.rsplit_once('@') {
            Some((repo, version)) => Self::new(repo, version),
            None => Self::new(token, ""),
        }
    }

    /// Repository part, e.g. `envoyproxy/envoy`.
    pub fn name(&self) -> &str {
        self.repo.as_str()
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        self.repo.owner()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Version prefixed with `v` unless it already is.
    pub fn version_v(&self) -> String {
        if self.version.starts_with('v') {
            self.version.clone()
        } else {
            format!("v{}", self.version)
        }
    }

    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty() && self.version.is_empty()
    }

    /// Same repository pinned at another version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            repo: self.repo.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.repo)
        } else {
            write!(f, "{}@{}", self.repo, self.version)
        }
    }
}

impl FromStr for VersionRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for VersionRef {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Truncates a dotted version at its last `.`: `1.29.3` becomes `1.29`.
///
/// A version without any `.` is returned unchanged.
pub fn minor_version(version: &str) -> &str {
    version.rfind('.').map_or(version, |idx| &version[..idx])
}
