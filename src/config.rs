use crate::api::AuthInfo;
use crate::models::DEFAULT_MAX_DEPTH;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "document-ai-viewer";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Salesforce login host, e.g. `login.salesforce.com`. Falls back to `LOGIN_URL`.
    #[serde(default)]
    pub login_url: Option<String>,
    /// Connected app consumer key. Falls back to `CLIENT_ID`.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Backend serving `/api/auth-info`. When set it takes precedence over
    /// `login_url`/`client_id`.
    #[serde(default)]
    pub auth_info_url: Option<String>,

    /// File holding the pending PKCE verifier between `reauth` and `callback`.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_max_decode_depth")]
    pub max_decode_depth: usize,
}

fn default_redirect_uri() -> String { "http://localhost:5000/auth/callback?from=home".into() }
fn default_session_file() -> PathBuf { app_dir(dirs::cache_dir()).join("session.json") }
fn default_log_dir() -> PathBuf { app_dir(dirs::cache_dir()).join("logs") }
fn default_max_decode_depth() -> usize { DEFAULT_MAX_DEPTH }

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}

/// `<config_dir>/document-ai-viewer/config.toml`
pub fn default_config_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("config.toml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: None,
            client_id: None,
            redirect_uri: default_redirect_uri(),
            auth_info_url: None,
            session_file: default_session_file(),
            log_dir: default_log_dir(),
            max_decode_depth: default_max_decode_depth(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Auth info from this config, with process env as fallback.
    pub fn auth_info(&self) -> AuthInfo {
        self.auth_info_with_env(|k| std::env::var(k).ok())
    }

    pub fn auth_info_with_env(&self, env: impl Fn(&str) -> Option<String>) -> AuthInfo {
        let pick = |own: &Option<String>, var: &str| {
            own.clone()
                .filter(|s| !s.trim().is_empty())
                .or_else(|| env(var).filter(|s| !s.trim().is_empty()))
        };
        AuthInfo {
            login_url: pick(&self.login_url, "LOGIN_URL"),
            client_id: pick(&self.client_id, "CLIENT_ID"),
        }
    }
}
