use leo_github::GitHubError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("failed to parse {file} of {repo}@{git_ref}")]
    DepsParse {
        file: &'static str,
        repo: String,
        git_ref: String,
        source: serde_json::Error,
    },

    #[error("{repo}@{git_ref} does not pin dependency {name:?}")]
    MissingDependency {
        repo: String,
        git_ref: String,
        name: String,
    },

    #[error("WORKSPACE of {repo}@{git_ref} does not set {field}")]
    IncompleteWorkspace {
        repo: String,
        git_ref: String,
        field: &'static str,
    },

    #[error("{what} {value:?} must be pinned as owner/repo@ref")]
    MissingVersion { what: &'static str, value: String },

    #[error("{envoy} has no version line in {file}")]
    EmptyVersion { envoy: String, file: &'static str },

    #[error("cannot resolve an Istio revision building {envoy} (Envoy {minor})")]
    CannotResolve { envoy: String, minor: String },
}
