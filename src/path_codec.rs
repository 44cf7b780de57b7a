//! Translation from logical drive paths to Graph API endpoint URLs.
//!
//! Items are addressed relative to a drive root with the
//! `root:/<encoded-path>` convention; sub-resources append `:/children`
//! or `:/content`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Base URL for Microsoft Graph API v1.0.
pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Bytes left as-is when encoding a path. `/` stays structural.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A logical path that has been percent-encoded for use in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPath(String);

impl EncodedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EncodedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-encode a logical path. `..` and trailing slashes pass through.
pub fn encode_path(path: &str) -> EncodedPath {
    EncodedPath(utf8_percent_encode(path, PATH_SEGMENT).to_string())
}

/// Join a child name onto a logical parent path.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Ensure a non-empty suffix starts with a dot.
pub fn normalize_suffix(suffix: &str) -> String {
    if suffix.is_empty() || suffix.starts_with('.') {
        suffix.to_string()
    } else {
        format!(".{}", suffix)
    }
}

/// Site lookup URL: `{base}/sites/{host}` or `{base}/sites/{host}:{site_path}`.
pub fn site_url(base: &str, host: &str, site_path: &str) -> String {
    if site_path.is_empty() {
        format!("{}/sites/{}", base, host)
    } else {
        format!("{}/sites/{}:{}", base, host, site_path)
    }
}

/// Document libraries of a site.
pub fn drives_url(base: &str, site_id: &str) -> String {
    format!("{}/sites/{}/drives", base, site_id)
}

/// URL builder for the items of one drive.
#[derive(Debug, Clone)]
pub struct DriveUrls {
    drive_base: String,
}

impl DriveUrls {
    pub fn new(base: &str, site_id: &str, drive_id: &str) -> Self {
        Self {
            drive_base: format!("{}/sites/{}/drives/{}", base, site_id, drive_id),
        }
    }

    pub fn root(&self) -> String {
        format!("{}/root", self.drive_base)
    }

    /// The bare root URL for an empty path, `root:/<path>` otherwise.
    pub fn item(&self, path: &EncodedPath) -> String {
        if path.is_empty() {
            self.root()
        } else {
            format!("{}:/{}", self.root(), path)
        }
    }

    pub fn content(&self, path: &EncodedPath) -> String {
        format!("{}:/content", self.item(path))
    }

    /// The root listing has no colon separator: `root/children`.
    pub fn children(&self, path: &EncodedPath) -> String {
        if path.is_empty() {
            format!("{}/children", self.root())
        } else {
            format!("{}:/children", self.item(path))
        }
    }

    pub fn item_by_id(&self, item_id: &str) -> String {
        format!("{}/items/{}", self.drive_base, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> DriveUrls {
        DriveUrls::new(GRAPH_API_BASE, "site-1", "drive-1")
    }

    #[test]
    fn test_encode_keeps_separators() {
        assert_eq!(encode_path("parent/child/folder").as_str(), "parent/child/folder");
        assert_eq!(encode_path("My Folder/a b.txt").as_str(), "My%20Folder/a%20b.txt");
        assert_eq!(encode_path("a#b?c&d").as_str(), "a%23b%3Fc%26d");
        assert_eq!(encode_path("rapport_v1-final.~tmp").as_str(), "rapport_v1-final.~tmp");
    }

    #[test]
    fn test_encode_non_ascii() {
        assert_eq!(encode_path("café").as_str(), "caf%C3%A9");
    }

    #[test]
    fn test_encode_passes_dot_segments_through() {
        assert_eq!(encode_path("../x/").as_str(), "../x/");
    }

    #[test]
    fn test_item_url() {
        let urls = urls();
        assert_eq!(
            urls.item(&encode_path("folder/file.txt")),
            "https://graph.microsoft.com/v1.0/sites/site-1/drives/drive-1/root:/folder/file.txt"
        );
        assert_eq!(urls.item(&encode_path("")), urls.root());
    }

    #[test]
    fn test_content_url() {
        let url = urls().content(&encode_path("test/file.txt"));
        assert!(url.ends_with("/root:/test/file.txt:/content"));
    }

    #[test]
    fn test_children_url() {
        let urls = urls();
        assert!(urls
            .children(&encode_path("my_folder"))
            .ends_with("/root:/my_folder:/children"));

        let root_children = urls.children(&encode_path(""));
        assert!(root_children.ends_with("/root/children"));
        assert!(!root_children.contains(":/children"));
    }

    #[test]
    fn test_item_by_id_url() {
        assert_eq!(
            urls().item_by_id("item-9"),
            "https://graph.microsoft.com/v1.0/sites/site-1/drives/drive-1/items/item-9"
        );
    }

    #[test]
    fn test_site_urls() {
        assert_eq!(
            site_url(GRAPH_API_BASE, "contoso.sharepoint.com", ""),
            "https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com"
        );
        assert_eq!(
            site_url(GRAPH_API_BASE, "contoso.sharepoint.com", "/sites/mysite"),
            "https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com:/sites/mysite"
        );
        assert_eq!(
            drives_url(GRAPH_API_BASE, "site-1"),
            "https://graph.microsoft.com/v1.0/sites/site-1/drives"
        );
    }

    #[test]
    fn test_normalize_suffix() {
        assert_eq!(normalize_suffix("csv"), ".csv");
        assert_eq!(normalize_suffix(".csv"), ".csv");
        assert_eq!(normalize_suffix(""), "");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b.gdb"), "a/b.gdb");
    }
}
