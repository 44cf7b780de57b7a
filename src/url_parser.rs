//! Parser for SharePoint site references (tenant name, host name or site URL).

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Host suffix of SharePoint Online tenants.
const SHAREPOINT_DOMAIN: &str = ".sharepoint.com";

/// `https://<host>`, `https://<host>/sites/<name>` or `https://<host>/teams/<name>`.
static SITE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9.-]+)(/(?:sites|teams)/[^/?#]+)?/?(?:[?#].*)?$")
        .expect("Invalid site URL regex")
});

/// Bare tenant name or host name.
static HOST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9.-]*$").expect("Invalid host regex"));

/// A SharePoint site split into host name and server-relative site path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub host: String,
    /// Empty for the tenant root site, e.g. `/sites/team` otherwise.
    pub site_path: String,
}

impl SiteRef {
    /// Parse a site reference.
    ///
    /// Supports the following formats:
    /// - `contoso` (tenant name, `.sharepoint.com` is appended)
    /// - `contoso.sharepoint.com`
    /// - `https://contoso.sharepoint.com/sites/<name>`
    /// - `https://contoso.sharepoint.com/teams/<name>`
    ///
    /// # Examples
    ///
    /// ```
    /// use sharepoint_drive::url_parser::SiteRef;
    ///
    /// let site = SiteRef::parse("https://contoso.sharepoint.com/sites/finance").unwrap();
    /// assert_eq!(site.host, "contoso.sharepoint.com");
    /// assert_eq!(site.site_path, "/sites/finance");
    ///
    /// let site = SiteRef::parse("contoso").unwrap();
    /// assert_eq!(site.host, "contoso.sharepoint.com");
    /// assert_eq!(site.site_path, "");
    /// ```
    pub fn parse(site: &str) -> Result<Self> {
        let trimmed = site.trim();

        if let Some(captures) = SITE_URL_REGEX.captures(trimmed) {
            if let Some(host) = captures.get(1) {
                let site_path = captures
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                return Ok(Self {
                    host: normalize_site_host(host.as_str()),
                    site_path,
                });
            }
        }

        if HOST_REGEX.is_match(trimmed) {
            return Ok(Self {
                host: normalize_site_host(trimmed),
                site_path: String::new(),
            });
        }

        Err(DriveError::InvalidSite(site.to_string()))
    }
}

/// Append `.sharepoint.com` to a bare tenant name.
pub fn normalize_site_host(name: &str) -> String {
    if name.ends_with(SHAREPOINT_DOMAIN) {
        name.to_string()
    } else {
        format!("{}{}", name, SHAREPOINT_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_without_domain() {
        assert_eq!(normalize_site_host("mysite"), "mysite.sharepoint.com");
    }

    #[test]
    fn test_normalize_with_domain() {
        assert_eq!(
            normalize_site_host("mysite.sharepoint.com"),
            "mysite.sharepoint.com"
        );
    }

    #[test]
    fn test_parse_site_url() {
        let site = SiteRef::parse("https://contoso.sharepoint.com/sites/finance/").unwrap();
        assert_eq!(site.host, "contoso.sharepoint.com");
        assert_eq!(site.site_path, "/sites/finance");
    }

    #[test]
    fn test_parse_root_url() {
        let site = SiteRef::parse("https://contoso.sharepoint.com").unwrap();
        assert_eq!(site.site_path, "");
    }

    #[test]
    fn test_invalid_site() {
        assert!(SiteRef::parse("").is_err());
        assert!(SiteRef::parse("   ").is_err());
        assert!(SiteRef::parse("not a site").is_err());
    }
}
