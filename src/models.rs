//! Data models for Microsoft Graph drive responses.

use serde::{Deserialize, Serialize};

use crate::error::{DriveError, Result};

/// Metadata for a file or folder in a SharePoint drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    /// Logical path inside the drive, drive prefix stripped.
    pub path: String,
    pub size: u64,
    pub modified_at: String,
    pub id: String,
    pub web_url: String,
}

impl std::fmt::Display for ItemRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modified = if self.modified_at.is_empty() {
            "-"
        } else {
            &self.modified_at
        };
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.id,
            format_size(self.size),
            modified,
            self.path
        )
    }
}

/// Which kind of item an operation is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

/// A drive item decoded from the `file` / `folder` facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteItem {
    File {
        record: ItemRecord,
        download_url: Option<String>,
    },
    Folder {
        record: ItemRecord,
        child_count: u64,
    },
}

impl RemoteItem {
    pub fn record(&self) -> &ItemRecord {
        match self {
            RemoteItem::File { record, .. } | RemoteItem::Folder { record, .. } => record,
        }
    }

    pub fn into_record(self) -> ItemRecord {
        match self {
            RemoteItem::File { record, .. } | RemoteItem::Folder { record, .. } => record,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            RemoteItem::File { .. } => ItemKind::File,
            RemoteItem::Folder { .. } => ItemKind::Folder,
        }
    }

    pub fn name(&self) -> &str {
        &self.record().name
    }
}

impl TryFrom<DriveItemResponse> for RemoteItem {
    type Error = DriveError;

    fn try_from(item: DriveItemResponse) -> Result<Self> {
        let is_file = item.file.is_some();
        let child_count = item.folder.as_ref().map(|f| f.child_count);
        let download_url = item.download_url.clone();
        let record = item.into_record();

        if is_file {
            Ok(RemoteItem::File {
                record,
                download_url,
            })
        } else if let Some(child_count) = child_count {
            Ok(RemoteItem::Folder {
                record,
                child_count,
            })
        } else {
            Err(DriveError::UnsupportedItemType(record.path))
        }
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// A driveItem resource as returned by the Graph API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItemResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified_date_time: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub parent_reference: Option<ParentReference>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    #[serde(default, rename = "@microsoft.graph.downloadUrl")]
    pub download_url: Option<String>,
}

impl DriveItemResponse {
    /// Build the immutable record, reconstructing the logical path from
    /// `parentReference.path` (e.g. `/drives/x/root:/folder`).
    pub fn into_record(self) -> ItemRecord {
        let parent_path = self
            .parent_reference
            .and_then(|p| p.path)
            .unwrap_or_default();

        let path = if parent_path.is_empty() {
            self.name.clone()
        } else {
            let logical_parent = parent_path.rsplit(':').next().unwrap_or_default();
            format!("{}/{}", logical_parent, self.name)
        };

        ItemRecord {
            name: self.name,
            path,
            size: self.size.unwrap_or(0),
            modified_at: self.last_modified_date_time.unwrap_or_default(),
            id: self.id,
            web_url: self.web_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentReference {
    #[serde(default)]
    pub path: Option<String>,
}

/// Presence marks the item as a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Presence marks the item as a folder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: u64,
}

/// Response from a `/children` listing.
#[derive(Debug, Deserialize)]
pub struct ChildrenResponse {
    #[serde(default)]
    pub value: Vec<DriveItemResponse>,
    #[serde(default, rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Site metadata; only the identifier is consumed.
#[derive(Debug, Deserialize)]
pub struct SiteResponse {
    pub id: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

/// Document library metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveSummary {
    pub id: String,
    pub name: String,
}

/// Response from the site drives listing.
#[derive(Debug, Deserialize)]
pub struct DriveListResponse {
    #[serde(default)]
    pub value: Vec<DriveSummary>,
}

/// Graph API error envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// OAuth2 error response from the identity platform.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: serde_json::Value) -> DriveItemResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_record_path_strips_drive_prefix() {
        let record = item(serde_json::json!({
            "id": "abc123",
            "name": "report.csv",
            "size": 2048,
            "lastModifiedDateTime": "2024-01-01T00:00:00Z",
            "webUrl": "https://contoso.sharepoint.com/report.csv",
            "parentReference": { "path": "/drives/b!xyz/root:/data/2024" },
            "file": { "mimeType": "text/csv" }
        }))
        .into_record();

        assert_eq!(record.path, "/data/2024/report.csv");
        assert_eq!(record.size, 2048);
        assert_eq!(record.modified_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_record_at_drive_root() {
        let record = item(serde_json::json!({
            "id": "r1",
            "name": "top.txt",
            "parentReference": { "path": "/drives/b!xyz/root:" },
            "file": {}
        }))
        .into_record();

        assert_eq!(record.path, "/top.txt");
    }

    #[test]
    fn test_record_without_parent_uses_name() {
        let record = item(serde_json::json!({ "id": "x", "name": "orphan.txt" })).into_record();
        assert_eq!(record.path, "orphan.txt");
        assert_eq!(record.size, 0);
        assert_eq!(record.web_url, "");
    }

    #[test]
    fn test_remote_item_dispatch() {
        let file = RemoteItem::try_from(item(serde_json::json!({
            "id": "f",
            "name": "a.txt",
            "file": {},
            "@microsoft.graph.downloadUrl": "https://download.example/a"
        })))
        .unwrap();
        assert_eq!(file.kind(), ItemKind::File);
        match file {
            RemoteItem::File { download_url, .. } => {
                assert_eq!(download_url.as_deref(), Some("https://download.example/a"))
            }
            _ => panic!("expected file"),
        }

        let folder = RemoteItem::try_from(item(serde_json::json!({
            "id": "d",
            "name": "a.gdb",
            "folder": { "childCount": 3 }
        })))
        .unwrap();
        assert_eq!(folder.kind(), ItemKind::Folder);
    }

    #[test]
    fn test_remote_item_without_facets_is_unsupported() {
        let err = RemoteItem::try_from(item(serde_json::json!({
            "id": "n",
            "name": "Notebook",
            "package": { "type": "oneNote" }
        })))
        .unwrap_err();
        assert!(matches!(err, DriveError::UnsupportedItemType(_)));
    }

    #[test]
    fn test_record_display() {
        let record = ItemRecord {
            name: "document.pdf".to_string(),
            path: "/docs/document.pdf".to_string(),
            size: 1048576,
            modified_at: String::new(),
            id: "abc123".to_string(),
            web_url: String::new(),
        };

        let display = format!("{}", record);
        assert!(display.contains("abc123"));
        assert!(display.contains("1.00 MB"));
        assert!(display.contains("/docs/document.pdf"));
        assert!(display.contains('-'));
    }
}
