//! Path-addressed item operations on one document library.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::json;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::client::{read_json, SharePointClient};
use crate::error::{DriveError, Result};
use crate::models::{ChildrenResponse, DriveItemResponse, ItemKind, ItemRecord, RemoteItem};
use crate::path_codec::{encode_path, join_path, normalize_suffix, DriveUrls};
use crate::walk::{walk, DownloadVisitor, SuffixCollector};

/// Result of [`Drive::download_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downloaded {
    /// File content held in memory.
    Bytes(Vec<u8>),
    /// File written to this local path.
    File(PathBuf),
    /// Folder tree mirrored under this local directory.
    Folder(PathBuf),
}

/// A resolved document library. All paths are relative to the drive root,
/// with `""` addressing the root itself.
pub struct Drive<'a> {
    client: &'a SharePointClient,
    site_id: String,
    drive_id: String,
    urls: DriveUrls,
}

impl<'a> Drive<'a> {
    pub(crate) fn new(client: &'a SharePointClient, site_id: &str, drive_id: &str) -> Self {
        Self {
            client,
            site_id: site_id.to_string(),
            drive_id: drive_id.to_string(),
            urls: DriveUrls::new(client.base_url(), site_id, drive_id),
        }
    }

    /// Restore a drive from known identifiers without any lookup.
    pub fn from_ids(
        client: &'a SharePointClient,
        site_id: impl Into<String>,
        drive_id: impl Into<String>,
    ) -> Result<Self> {
        let site_id = site_id.into();
        let drive_id = drive_id.into();
        if site_id.is_empty() {
            return Err(DriveError::Precondition(
                "site ID not set; resolve the site first".to_string(),
            ));
        }
        if drive_id.is_empty() {
            return Err(DriveError::Precondition(
                "drive ID not set; resolve the drive first".to_string(),
            ));
        }
        Ok(Self::new(client, &site_id, &drive_id))
    }

    pub fn id(&self) -> &str {
        &self.drive_id
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Fetch item metadata at `path`.
    pub async fn get_item(&self, path: &str) -> Result<RemoteItem> {
        let url = self.urls.item(&encode_path(path));
        let response = self
            .client
            .send(self.client.request(Method::GET, &url), Some(path))
            .await?;
        let item: DriveItemResponse = read_json(response).await?;
        RemoteItem::try_from(item)
    }

    /// Resolve a path to the item's remote identifier.
    pub async fn resolve_id_by_path(&self, path: &str) -> Result<String> {
        let url = self.urls.item(&encode_path(path));
        let response = self
            .client
            .send(self.client.request(Method::GET, &url), Some(path))
            .await?;
        let item: DriveItemResponse = read_json(response).await?;

        if item.id.is_empty() {
            return Err(DriveError::UnsupportedItemType(format!(
                "item '{}' has no identifier",
                path
            )));
        }
        Ok(item.id)
    }

    /// List the immediate children of a folder, in remote order.
    ///
    /// One response is taken as the complete listing.
    pub async fn list_children(&self, path: &str) -> Result<Vec<RemoteItem>> {
        let url = self.urls.children(&encode_path(path));
        let response = self
            .client
            .send(self.client.request(Method::GET, &url), Some(path))
            .await?;
        let listing: ChildrenResponse = read_json(response).await?;

        if listing.next_link.is_some() {
            warn!(
                "Listing of '{}' is paginated; only the first {} children are used",
                path,
                listing.value.len()
            );
        }

        let children = listing
            .value
            .into_iter()
            .filter_map(|item| match RemoteItem::try_from(item) {
                Ok(child) => Some(child),
                Err(e) => {
                    warn!("Skipping child of '{}': {}", path, e);
                    None
                }
            })
            .collect();
        Ok(children)
    }

    /// Find the immediate children of `path` of one kind whose name ends with `suffix`.
    ///
    /// A missing leading dot is added to `suffix`; the empty suffix matches every name.
    pub async fn search_children_by_suffix(
        &self,
        path: &str,
        suffix: &str,
        kind: ItemKind,
    ) -> Result<Vec<ItemRecord>> {
        let suffix = normalize_suffix(suffix);
        let matches: Vec<ItemRecord> = self
            .list_children(path)
            .await?
            .into_iter()
            .filter(|item| item.kind() == kind && item.name().ends_with(&suffix))
            .map(RemoteItem::into_record)
            .collect();

        info!(
            "Found {} {} with suffix '{}'",
            matches.len(),
            kind_label(kind),
            suffix
        );
        Ok(matches)
    }

    /// Search the whole subtree under `path`, depth-first.
    ///
    /// Every folder is descended into, including folders that matched.
    pub async fn search_by_suffix_recursive(
        &self,
        path: &str,
        suffix: &str,
        kind: ItemKind,
    ) -> Result<Vec<ItemRecord>> {
        let mut collector = SuffixCollector::new(suffix, kind);
        walk(self, path, &mut collector).await?;
        let matches = collector.into_matches();

        info!(
            "Found {} {} with suffix '{}' (recursive search)",
            matches.len(),
            kind_label(kind),
            normalize_suffix(suffix)
        );
        Ok(matches)
    }

    /// Create or replace `path/file_name` with `content` in a single request.
    pub async fn upload_bytes(
        &self,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<ItemRecord> {
        let target = join_path(path, file_name);
        let url = self.urls.content(&encode_path(&target));
        let mime_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();

        let request = self
            .client
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, mime_type)
            .body(content);
        let response = self.client.send(request, Some(&target)).await?;
        let item: DriveItemResponse = read_json(response).await?;

        info!("File uploaded successfully: {}", target);
        Ok(item.into_record())
    }

    /// Upload a local file into `remote_folder`.
    ///
    /// # Arguments
    /// * `local_path` - Path to the local file
    /// * `remote_folder` - Destination folder, `""` for the drive root
    /// * `file_name` - Remote name, defaults to the local file name
    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        local_path: P,
        remote_folder: &str,
        file_name: Option<&str>,
    ) -> Result<ItemRecord> {
        let local_path = local_path.as_ref();
        let file_name = match file_name {
            Some(name) => name.to_string(),
            None => local_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    DriveError::IoError(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("no file name in {}", local_path.display()),
                    ))
                })?,
        };

        let content = tokio::fs::read(local_path).await?;
        self.upload_bytes(remote_folder, &file_name, content).await
    }

    /// Delete a file or folder. Deleting a folder removes its whole subtree.
    ///
    /// An absent path fails with `DriveError::NotFound`.
    pub async fn delete_item(&self, path: &str) -> Result<()> {
        let url = self.urls.item(&encode_path(path));
        self.client
            .send(self.client.request(Method::DELETE, &url), Some(path))
            .await?;

        info!("Item deleted successfully: {}", path);
        Ok(())
    }

    /// Move an item into another folder.
    ///
    /// Both paths are resolved to identifiers before the update is sent, so
    /// a missing source or destination never leaves a partial move.
    pub async fn move_item(&self, source: &str, destination_folder: &str) -> Result<()> {
        let item_id = self.resolve_id_by_path(source).await?;
        let destination_id = self.resolve_id_by_path(destination_folder).await?;

        let url = self.urls.item_by_id(&item_id);
        let body = json!({
            "parentReference": {
                "id": destination_id
            }
        });
        self.client
            .send(self.client.request(Method::PATCH, &url).json(&body), None)
            .await?;

        info!("Item moved successfully: {} -> {}", source, destination_folder);
        Ok(())
    }

    /// Download a file or folder, dispatching on the item type.
    ///
    /// Files go to memory when `destination` is `None`, otherwise to that
    /// path. Folders are mirrored under `destination`, or under a directory
    /// named after the last path segment.
    pub async fn download_item(
        &self,
        path: &str,
        destination: Option<&Path>,
    ) -> Result<Downloaded> {
        match self.get_item(path).await? {
            RemoteItem::File { download_url, .. } => match destination {
                Some(local_path) => {
                    self.fetch_to_file(path, download_url.as_deref(), local_path)
                        .await?;
                    info!("File downloaded successfully to: {}", local_path.display());
                    Ok(Downloaded::File(local_path.to_path_buf()))
                }
                None => {
                    let bytes = self.fetch_bytes(path, download_url.as_deref()).await?;
                    info!("File downloaded successfully to memory");
                    Ok(Downloaded::Bytes(bytes))
                }
            },
            RemoteItem::Folder { .. } => {
                let local_root = match destination {
                    Some(dir) => dir.to_path_buf(),
                    None => PathBuf::from(default_folder_name(path)),
                };
                let local_root = self.download_tree(path, &local_root).await?;
                Ok(Downloaded::Folder(local_root))
            }
        }
    }

    /// Mirror the folder at `path` into `local_root`.
    ///
    /// Existing local directories are reused; files are overwritten.
    pub async fn download_tree(&self, path: &str, local_root: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(local_root).await?;
        info!("Starting download of folder: {}", path);

        let mut visitor = DownloadVisitor::new(self, path, local_root);
        walk(self, path, &mut visitor).await?;

        info!(
            "Folder downloaded successfully to: {} ({} files)",
            local_root.display(),
            visitor.files_written()
        );
        Ok(local_root.to_path_buf())
    }

    /// Fetch file content into memory.
    pub(crate) async fn fetch_bytes(
        &self,
        path: &str,
        download_url: Option<&str>,
    ) -> Result<Vec<u8>> {
        let response = self.content_response(path, download_url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Stream file content to `destination`.
    pub(crate) async fn fetch_to_file(
        &self,
        path: &str,
        download_url: Option<&str>,
        destination: &Path,
    ) -> Result<()> {
        let response = self.content_response(path, download_url).await?;

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }

    /// Pre-signed download link when present, authenticated `:/content` otherwise.
    async fn content_response(
        &self,
        path: &str,
        download_url: Option<&str>,
    ) -> Result<reqwest::Response> {
        match download_url {
            Some(url) => {
                self.client
                    .send(self.client.get_unauthenticated(url), None)
                    .await
            }
            None => {
                let url = self.urls.content(&encode_path(path));
                self.client
                    .send(self.client.request(Method::GET, &url), Some(path))
                    .await
            }
        }
    }
}

fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::File => "file(s)",
        ItemKind::Folder => "folder(s)",
    }
}

/// Local directory name for a folder download without explicit destination.
fn default_folder_name(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "root",
    }
}
