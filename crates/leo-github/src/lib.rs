//! GitHub lookups for leo.
//!
//! [`GitHubClient`] resolves human refs (branches, tags, versions, SHAs) to
//! commits, fetches raw files at a commit, pages through releases, lists
//! repository directories, and downloads source tarballs. All HTTP goes
//! through the [`GitHubTransport`] trait so resolution logic can be tested
//! against mocks.

pub mod auth;
pub mod client;
pub mod error;
pub mod release;
pub mod transport;

pub use auth::discover_token;
pub use client::{ContentEntry, GitHubClient, RefKind, ResolvedCommit};
pub use error::GitHubError;
pub use release::{Release, looks_like_semver, parse_lenient};
pub use transport::{GitHubTransport, MediaType, RealTransport};
