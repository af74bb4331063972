use super::pkce::{PkceGenerator, CHALLENGE_METHOD};
use super::store::{KeyValueStore, PKCE_VERIFIER_KEY};
use super::{AuthInfo, AuthInfoProvider};
use crate::error::{Result, ViewerError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Salesforce authorize endpoint, relative to the login host.
pub const AUTHORIZE_PATH: &str = "/services/oauth2/authorize";

/// Outbound authorization request. The verifier stays in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRequest {
    pub url: String,
    pub challenge: String,
}

/// What the token-exchange step needs once the redirect comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationCallback {
    pub code: String,
    pub code_verifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

/// Re-authentication via Authorization Code + PKCE.
///
/// 1. `begin` checks auth info, generates a PKCE pair, stores the verifier
///    under [`PKCE_VERIFIER_KEY`] and returns the authorize URL.
/// 2. The user authorizes and is redirected to `redirect_uri`.
/// 3. `complete` extracts `code` from that redirect and takes the stored
///    verifier back out (single use).
///
/// Only one flow may be pending per store; a second `begin` replaces the
/// first flow's verifier.
pub struct ReauthFlow {
    generator: PkceGenerator,
    store: Arc<dyn KeyValueStore>,
    redirect_uri: String,
}

impl ReauthFlow {
    pub fn new(generator: PkceGenerator, store: Arc<dyn KeyValueStore>, redirect_uri: impl Into<String>) -> Self {
        Self {
            generator,
            store,
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub async fn begin_with(&self, provider: &dyn AuthInfoProvider) -> Result<AuthorizationRequest> {
        let auth_info = provider.auth_info().await?;
        self.begin(&auth_info)
    }

    pub fn begin(&self, auth_info: &AuthInfo) -> Result<AuthorizationRequest> {
        let (login_url, client_id) = auth_info.require()?;
        let base = normalize_login_url(login_url)?;

        let pair = self.generator.generate()?;
        if self.store.get(PKCE_VERIFIER_KEY)?.is_some() {
            warn!("replacing a pending PKCE verifier; the earlier authorization can no longer complete");
        }
        self.store.set(PKCE_VERIFIER_KEY, &pair.verifier)?;

        let url = build_authorization_url(&base, client_id, &self.redirect_uri, &pair.challenge);
        info!("authorization request prepared for {}", base);
        Ok(AuthorizationRequest {
            url,
            challenge: pair.challenge,
        })
    }

    pub fn complete(&self, callback_url: &str) -> Result<AuthorizationCallback> {
        let parsed = Url::parse(callback_url.trim())
            .map_err(|e| ViewerError::Callback(format!("invalid url: {}", e)))?;
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        if let Some(err) = param("error") {
            let detail = match param("error_description") {
                Some(desc) => format!("{}: {}", err, desc),
                None => err,
            };
            return Err(ViewerError::AuthorizationDenied(detail));
        }
        let code = param("code")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ViewerError::Callback("no code in redirect URL".into()))?;
        let code_verifier = self
            .store
            .remove(PKCE_VERIFIER_KEY)?
            .ok_or(ViewerError::MissingVerifier)?;

        info!("authorization code received");
        Ok(AuthorizationCallback {
            code,
            code_verifier,
            return_to: param("from"),
        })
    }
}

/// Prefix `https://` unless an http(s) scheme is already present, and drop
/// trailing slashes so the authorize path can be appended.
pub fn normalize_login_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let mut url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    while url.ends_with('/') {
        url.pop();
    }

    let invalid = |reason: String| ViewerError::InvalidLoginUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(&url).map_err(|e| invalid(e.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("no host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query or fragment not allowed".into()));
    }
    Ok(url)
}

pub fn build_authorization_url(base: &str, client_id: &str, redirect_uri: &str, challenge: &str) -> String {
    let params = [
        ("response_type", "code"),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("code_challenge", challenge),
        ("code_challenge_method", CHALLENGE_METHOD),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}?{}", base, AUTHORIZE_PATH, query)
}
