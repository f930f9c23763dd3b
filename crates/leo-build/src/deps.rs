use serde::{Deserialize, Serialize};

/// File in the Istio repository pinning its sub-project commits.
pub const DEPS_FILE: &str = "istio.deps";

/// One pinned sub-project of an Istio revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dep {
    #[serde(rename = "repoName", default)]
    pub name: String,
    #[serde(rename = "lastStableSHA", default)]
    pub sha: String,
}

impl Dep {
    /// The zero value returned for names not in the manifest.
    pub fn is_empty(&self) -> bool {
        self.sha.is_empty()
    }
}

/// Ordered dependency manifest of an Istio revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deps(Vec<Dep>);

impl Deps {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// First entry named exactly `name`, or an empty [`Dep`] when absent.
    pub fn get(&self, name: &str) -> Dep {
        self.0
            .iter()
            .find(|dep| dep.name == name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dep> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Dep>> for Deps {
    fn from(value: Vec<Dep>) -> Self {
        Self(value)
    }
}
