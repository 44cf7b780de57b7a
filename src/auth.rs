//! Service principal authentication for Microsoft Graph.

use std::env;

use reqwest::Client;
use tracing::{debug, info};

use crate::client::read_json;
use crate::error::{DriveError, Result};
use crate::models::{TokenErrorResponse, TokenResponse};

/// Microsoft identity platform host.
const LOGIN_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Graph scope for application permissions.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Source of bearer tokens for Graph requests.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    /// Acquire a bearer token, or fail with `DriveError::AuthenticationError`.
    async fn acquire_token(&self) -> Result<String>;
}

/// A token obtained elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    async fn acquire_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// OAuth2 client-credentials grant for an Azure AD application.
#[derive(Clone)]
pub struct ClientCredentials {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority: String,
    client: Client,
}

impl ClientCredentials {
    /// Create credentials for an app registration.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: LOGIN_AUTHORITY.to_string(),
            client: Client::new(),
        }
    }

    /// Read `TENANT_ID`, `CLIENT_ID` and `CLIENT_SECRET` from the environment.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| env::var(name).map_err(|_| DriveError::MissingEnvVar(name.to_string()));
        Ok(Self::new(var("TENANT_ID")?, var("CLIENT_ID")?, var("CLIENT_SECRET")?))
    }

    /// Use a different login host.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant_id)
    }
}

impl TokenProvider for ClientCredentials {
    async fn acquire_token(&self) -> Result<String> {
        let url = self.token_url();
        debug!("Requesting token from {}", url);

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("Status {}: {}", status, body),
            };
            return Err(DriveError::AuthenticationError(reason));
        }

        let token_response: TokenResponse = read_json(response).await?;
        info!(
            "Authentication successful ({} token, expires in {}s)",
            token_response.token_type, token_response.expires_in
        );

        Ok(token_response.access_token)
    }
}
