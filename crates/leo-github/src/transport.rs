use std::path::Path;

use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;

use crate::error::GitHubError;

/// Media type requested from the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// JSON API objects.
    Json,
    /// File contents as-is.
    Raw,
}

impl MediaType {
    pub fn as_header(self) -> &'static str {
        match self {
            Self::Json => "application/vnd.github.v3.json",
            Self::Raw => "application/vnd.github.v3.raw",
        }
    }
}

/// Abstraction over GitHub HTTP access for testability.
///
/// Paths are relative to the API base URL, e.g.
/// `repos/istio/istio/contents/istio.deps?ref=master`.
/// Production code uses [`RealTransport`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait GitHubTransport: Send + Sync {
    /// GET an API path and return the response body.
    async fn get(&self, path: &str, media: MediaType) -> Result<String, GitHubError>;

    /// GET an API path and return the response body undecoded.
    async fn get_bytes(&self, path: &str, media: MediaType) -> Result<Vec<u8>, GitHubError>;

    /// HEAD an API path and return its `Link` header, if any.
    async fn link_header(&self, path: &str) -> Result<Option<String>, GitHubError>;

    /// Download an absolute URL into `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), GitHubError>;
}

/// reqwest-backed transport.
pub struct RealTransport {
    client: reqwest::Client,
    api_url: String,
    token: Option<SecretString>,
}

impl RealTransport {
    pub fn new(api_url: &str, token: Option<SecretString>) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("leo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Client { source: e })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => {
                request.header(AUTHORIZATION, format!("token {}", token.expose_secret()))
            }
            None => request,
        }
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GitHubError> {
        let response = request.send().await.map_err(|e| GitHubError::Request {
            url: url.to_owned(),
            source: e,
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(GitHubError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            })
        }
    }

    /// GET `path`, returning the full URL alongside the successful response.
    async fn fetch(
        &self,
        path: &str,
        media: MediaType,
    ) -> Result<(String, reqwest::Response), GitHubError> {
        let url = self.url(path);
        tracing::debug!(%url, ?media, "GET");

        let request = self
            .authorize(self.client.get(&url))
            .header(ACCEPT, media.as_header());
        let response = self.send(&url, request).await?;
        Ok((url, response))
    }
}

impl GitHubTransport for RealTransport {
    async fn get(&self, path: &str, media: MediaType) -> Result<String, GitHubError> {
        let (url, response) = self.fetch(path, media).await?;
        response
            .text()
            .await
            .map_err(|e| GitHubError::Request { url, source: e })
    }

    async fn get_bytes(&self, path: &str, media: MediaType) -> Result<Vec<u8>, GitHubError> {
        let (url, response) = self.fetch(path, media).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GitHubError::Request { url, source: e })?;
        Ok(bytes.to_vec())
    }

    async fn link_header(&self, path: &str) -> Result<Option<String>, GitHubError> {
        let url = self.url(path);
        tracing::debug!(%url, "HEAD");

        let request = self
            .authorize(self.client.head(&url))
            .header(ACCEPT, MediaType::Json.as_header());
        let response = self.send(&url, request).await?;

        Ok(response
            .headers()
            .get(LINK)
            // arch-lint: allow(no-silent-result-drop) reason="a non-ASCII Link header carries no usable page numbers; treated as absent"
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), GitHubError> {
        tracing::debug!(%url, dest = %dest.display(), "download");

        // Archive downloads authenticate as basic auth with an empty user.
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.basic_auth("", Some(token.expose_secret()));
        }
        let mut response = self.send(url, request).await?;

        let io_err = |e| GitHubError::Io {
            path: dest.to_path_buf(),
            source: e,
        };
        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        while let Some(chunk) = response.chunk().await.map_err(|e| GitHubError::Request {
            url: url.to_owned(),
            source: e,
        })? {
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)
    }
}
