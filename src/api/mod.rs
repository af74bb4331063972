pub mod auth_info;
pub mod pkce;
pub mod reauth;
pub mod store;

use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};

/// What the backend knows about the org to authenticate against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl AuthInfo {
    pub fn new(login_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            login_url: Some(login_url.into()),
            client_id: Some(client_id.into()),
        }
    }

    /// Both fields, non-blank, or `AuthNotConfigured` naming the first gap.
    pub fn require(&self) -> Result<(&str, &str)> {
        let login_url = non_blank(&self.login_url).ok_or(ViewerError::AuthNotConfigured("loginUrl"))?;
        let client_id = non_blank(&self.client_id).ok_or(ViewerError::AuthNotConfigured("clientId"))?;
        Ok((login_url, client_id))
    }

    pub fn is_configured(&self) -> bool {
        self.require().is_ok()
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Supplies auth info to the re-auth flow.
#[async_trait::async_trait]
pub trait AuthInfoProvider: Send + Sync {
    async fn auth_info(&self) -> Result<AuthInfo>;
}
