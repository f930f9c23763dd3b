use serde::{Deserialize, Serialize};

/// Name of the optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "leo.toml";

/// leo.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeoConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub patch: PatchConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Repository holding `istio.deps` and the releases
    #[serde(default = "default_istio_repo")]
    pub istio_repo: String,
    /// Repository holding the istio-proxy `WORKSPACE`
    #[serde(default = "default_proxy_repo")]
    pub proxy_repo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Patch source, `file://dir` or `github://owner/repo[@ref]`
    #[serde(default = "default_patch_source")]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory receiving extracted sources
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            istio_repo: default_istio_repo(),
            proxy_repo: default_proxy_repo(),
        }
    }
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            source: default_patch_source(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
        }
    }
}

impl LeoConfig {
    /// Load from leo.toml in the given directory, or return defaults if not found.
    pub fn load(dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), "loading config");
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_istio_repo() -> String {
    "istio/istio".to_owned()
}

fn default_proxy_repo() -> String {
    "istio/proxy".to_owned()
}

fn default_patch_source() -> String {
    "github://dio/leo".to_owned()
}

fn default_work_dir() -> String {
    "work".to_owned()
}
