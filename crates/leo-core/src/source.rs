use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Branch used for remote patch sources that do not pin a ref.
pub const DEFAULT_PATCH_REF: &str = "main";

/// Where patches come from, parsed from `scheme://location[@ref]`.
///
/// `file://` selects a local directory; any other scheme (e.g. `github://`)
/// selects a hosted repository. The ref only applies to remote sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSource {
    scheme: String,
    location: String,
    git_ref: Option<String>,
}

impl PatchSource {
    pub fn parse(value: &str) -> crate::Result<Self> {
        let (scheme, rest) = value
            .split_once("://")
            .ok_or_else(|| Error::InvalidPatchSource {
                value: value.to_owned(),
                reason: "expected scheme://location",
            })?;

        if scheme.is_empty() {
            return Err(Error::InvalidPatchSource {
                value: value.to_owned(),
                reason: "missing scheme",
            });
        }

        let (location, git_ref) = if scheme == "file" {
            (rest, None)
        } else {
            match rest.rsplit_once('@') {
                Some((location, git_ref)) if !git_ref.is_empty() => {
                    (location, Some(git_ref.to_owned()))
                }
                Some((location, _)) => (location, None),
                None => (rest, None),
            }
        };

        if location.is_empty() {
            return Err(Error::InvalidPatchSource {
                value: value.to_owned(),
                reason: "missing location",
            });
        }

        Ok(Self {
            scheme: scheme.to_owned(),
            location: location.to_owned(),
            git_ref,
        })
    }

    pub fn is_local(&self) -> bool {
        self.scheme == "file"
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Directory for local sources, `owner/repo` for remote ones.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Explicit ref, if one was given.
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// Explicit ref, or [`DEFAULT_PATCH_REF`].
    pub fn git_ref_or_default(&self) -> &str {
        self.git_ref.as_deref().unwrap_or(DEFAULT_PATCH_REF)
    }
}

impl fmt::Display for PatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.location)?;
        if let Some(git_ref) = &self.git_ref {
            write!(f, "@{git_ref}")?;
        }
        Ok(())
    }
}

impl FromStr for PatchSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
