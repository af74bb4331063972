use super::{AuthInfo, AuthInfoProvider};
use crate::error::{Result, ViewerError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, warn};

/// Auth info known up front (config file, env).
#[derive(Debug, Clone, Default)]
pub struct StaticAuthInfo {
    info: AuthInfo,
}

impl StaticAuthInfo {
    pub fn new(info: AuthInfo) -> Self {
        Self { info }
    }
}

#[async_trait]
impl AuthInfoProvider for StaticAuthInfo {
    async fn auth_info(&self) -> Result<AuthInfo> {
        Ok(self.info.clone())
    }
}

/// Fetches `{loginUrl, clientId}` from the backend's `/api/auth-info`.
/// No retries: a failed fetch fails the flow.
pub struct HttpAuthInfoProvider {
    client: Client,
    base_url: String,
}

impl HttpAuthInfoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/auth-info", self.base_url)
    }
}

#[async_trait]
impl AuthInfoProvider for HttpAuthInfoProvider {
    async fn auth_info(&self) -> Result<AuthInfo> {
        let url = self.endpoint();
        debug!("fetching auth info from {}", url);
        let resp = self.client.get(&url).header(ACCEPT, "application/json").send().await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            // An unconfigured backend answers 500 with `{"error": ...}`; hand that
            // back as empty auth info so the flow reports AuthNotConfigured.
            if let Ok(info) = serde_json::from_str::<AuthInfo>(&txt) {
                warn!("auth info endpoint returned {}: {}", status, txt);
                return Ok(info);
            }
            return Err(ViewerError::AuthInfo(format!("{} => {}", status, txt)));
        }
        Ok(resp.json::<AuthInfo>().await?)
    }
}
