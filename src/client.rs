//! Microsoft Graph client for SharePoint site and drive resolution.
//!
//! The session moves through three states: an authenticated
//! [`SharePointClient`], a resolved [`Site`], and a ready
//! [`Drive`](crate::drive::Drive). Item operations only exist on `Drive`.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::drive::Drive;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, DriveListResponse, DriveSummary, SiteResponse};
use crate::path_codec::{drives_url, site_url, GRAPH_API_BASE};
use crate::url_parser::normalize_site_host;

/// Authenticated client for one SharePoint tenant host.
pub struct SharePointClient {
    http: Client,
    base_url: String,
    site_host: String,
    access_token: String,
}

impl SharePointClient {
    /// Acquire a token once and create a client for `site_name`.
    ///
    /// # Arguments
    /// * `provider` - Source of the bearer token
    /// * `site_name` - Tenant name (`contoso`) or host (`contoso.sharepoint.com`)
    pub async fn connect<P: TokenProvider>(provider: &P, site_name: &str) -> Result<Self> {
        let token = provider.acquire_token().await?;
        Ok(Self::with_token(token, site_name))
    }

    /// Create a client from an already acquired token.
    pub fn with_token(access_token: impl Into<String>, site_name: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: GRAPH_API_BASE.to_string(),
            site_host: normalize_site_host(site_name),
            access_token: access_token.into(),
        }
    }

    /// Send Graph requests to a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the bearer token. Tokens are never refreshed implicitly.
    pub async fn reauthenticate<P: TokenProvider>(&mut self, provider: &P) -> Result<()> {
        self.access_token = provider.acquire_token().await?;
        Ok(())
    }

    pub fn site_host(&self) -> &str {
        &self.site_host
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the site identifier.
    ///
    /// # Arguments
    /// * `site_path` - Server-relative site path (`/sites/team`), empty for the root site
    pub async fn resolve_site(&self, site_path: &str) -> Result<Site<'_>> {
        let url = site_url(&self.base_url, &self.site_host, site_path);
        let response = self.send(self.request(Method::GET, &url), None).await?;
        let site: SiteResponse = read_json(response).await?;

        info!(
            "Site ID retrieved: {} ({})",
            site.id,
            site.display_name.as_deref().unwrap_or(&self.site_host)
        );
        Ok(Site {
            client: self,
            id: site.id,
        })
    }

    /// Authenticated request builder.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.http.request(method, url).bearer_auth(&self.access_token)
    }

    /// Unauthenticated GET, for pre-signed download links.
    pub(crate) fn get_unauthenticated(&self, url: &str) -> RequestBuilder {
        debug!("GET (download link) {}", url);
        self.http.get(url)
    }

    /// Send a request and map non-success statuses to errors.
    ///
    /// With `not_found = Some(path)` a 404 becomes `DriveError::NotFound(path)`.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        not_found: Option<&str>,
    ) -> Result<Response> {
        let response = request.send().await?;
        check_status(response, not_found).await
    }
}

async fn check_status(response: Response, not_found: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 404 {
        if let Some(path) = not_found {
            return Err(DriveError::NotFound(path.to_string()));
        }
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        debug!(
            "Graph error {} ({}): {}",
            status, api_error.error.code, api_error.error.message
        );
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

/// Decode a success body. Malformed JSON fails with `DriveError::JsonError`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// A resolved SharePoint site.
pub struct Site<'a> {
    client: &'a SharePointClient,
    id: String,
}

impl<'a> Site<'a> {
    /// Restore a site from a known identifier.
    pub fn from_id(client: &'a SharePointClient, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DriveError::Precondition(
                "site ID not set; resolve the site first".to_string(),
            ));
        }
        Ok(Self { client, id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// List all document libraries of the site, in remote order.
    pub async fn list_drives(&self) -> Result<Vec<DriveSummary>> {
        let url = drives_url(self.client.base_url(), &self.id);
        let response = self
            .client
            .send(self.client.request(Method::GET, &url), None)
            .await?;
        let list: DriveListResponse = read_json(response).await?;
        Ok(list.value)
    }

    /// Resolve a document library by name.
    ///
    /// The first exact, case-sensitive name match wins. Without a match the
    /// first listed library is used; only an empty listing fails.
    pub async fn resolve_drive(&self, preferred_name: &str) -> Result<Drive<'a>> {
        let drives = self.list_drives().await?;

        let chosen = match drives.iter().find(|d| d.name == preferred_name) {
            Some(drive) => {
                info!("Drive ID retrieved: {}", drive.id);
                drive
            }
            None => {
                let first = drives.first().ok_or_else(|| {
                    DriveError::NotFound(format!(
                        "drive '{}' (site {} has no document libraries)",
                        preferred_name, self.id
                    ))
                })?;
                info!(
                    "Drive '{}' not found, using default drive '{}' ({})",
                    preferred_name, first.name, first.id
                );
                first
            }
        };

        Ok(Drive::new(self.client, &self.id, &chosen.id))
    }
}
