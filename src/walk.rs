//! Depth-first traversal of a drive folder tree.
//!
//! Search and folder download share [`walk`] and differ only in the
//! [`TreeVisitor`] they pass. Requests are issued one at a time; the first
//! failure aborts the walk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::drive::Drive;
use crate::error::Result;
use crate::models::{ItemKind, ItemRecord, RemoteItem};
use crate::path_codec::{join_path, normalize_suffix};

/// Per-node callbacks of a tree walk.
///
/// `relative` is the item's path relative to the walk root, `/`-separated.
#[allow(async_fn_in_trait)]
pub trait TreeVisitor {
    async fn visit_file(&mut self, relative: &str, item: &RemoteItem) -> Result<()>;

    /// Called before the folder's children are listed.
    async fn visit_folder(&mut self, relative: &str, item: &RemoteItem) -> Result<()>;
}

/// Walk the tree under `root` in pre-order, siblings in remote listing order.
///
/// Every folder is descended into. The remote tree is assumed acyclic.
pub async fn walk<V: TreeVisitor>(drive: &Drive<'_>, root: &str, visitor: &mut V) -> Result<()> {
    let mut pending: Vec<(String, RemoteItem)> = Vec::new();
    push_children(drive, root, "", &mut pending).await?;

    while let Some((relative, item)) = pending.pop() {
        match &item {
            RemoteItem::File { .. } => visitor.visit_file(&relative, &item).await?,
            RemoteItem::Folder { .. } => {
                visitor.visit_folder(&relative, &item).await?;
                let remote = join_path(root, &relative);
                push_children(drive, &remote, &relative, &mut pending).await?;
            }
        }
    }

    Ok(())
}

/// List `remote_dir` and stack its children so the first child pops first.
async fn push_children(
    drive: &Drive<'_>,
    remote_dir: &str,
    relative_dir: &str,
    pending: &mut Vec<(String, RemoteItem)>,
) -> Result<()> {
    let children = drive.list_children(remote_dir).await?;
    debug!("{} children under '{}'", children.len(), remote_dir);

    pending.extend(
        children
            .into_iter()
            .rev()
            .map(|child| (join_path(relative_dir, child.name()), child)),
    );
    Ok(())
}

/// Collects items of one kind whose name ends with a suffix.
pub struct SuffixCollector {
    suffix: String,
    kind: ItemKind,
    matches: Vec<ItemRecord>,
}

impl SuffixCollector {
    pub fn new(suffix: &str, kind: ItemKind) -> Self {
        Self {
            suffix: normalize_suffix(suffix),
            kind,
            matches: Vec::new(),
        }
    }

    fn collect(&mut self, item: &RemoteItem) {
        if item.kind() == self.kind && item.name().ends_with(&self.suffix) {
            self.matches.push(item.record().clone());
        }
    }

    pub fn into_matches(self) -> Vec<ItemRecord> {
        self.matches
    }
}

impl TreeVisitor for SuffixCollector {
    async fn visit_file(&mut self, _relative: &str, item: &RemoteItem) -> Result<()> {
        self.collect(item);
        Ok(())
    }

    async fn visit_folder(&mut self, _relative: &str, item: &RemoteItem) -> Result<()> {
        self.collect(item);
        Ok(())
    }
}

/// Mirrors the remote tree into a local directory.
///
/// Local names are the remote names, unsanitized.
pub struct DownloadVisitor<'d, 'a> {
    drive: &'d Drive<'a>,
    remote_root: String,
    local_root: PathBuf,
    files_written: usize,
}

impl<'d, 'a> DownloadVisitor<'d, 'a> {
    pub fn new(drive: &'d Drive<'a>, remote_root: &str, local_root: &Path) -> Self {
        Self {
            drive,
            remote_root: remote_root.to_string(),
            local_root: local_root.to_path_buf(),
            files_written: 0,
        }
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }
}

impl TreeVisitor for DownloadVisitor<'_, '_> {
    async fn visit_file(&mut self, relative: &str, item: &RemoteItem) -> Result<()> {
        let download_url = match item {
            RemoteItem::File { download_url, .. } => download_url.as_deref(),
            RemoteItem::Folder { .. } => None,
        };
        let remote_path = join_path(&self.remote_root, relative);
        let local_path = self.local_root.join(relative);

        self.drive
            .fetch_to_file(&remote_path, download_url, &local_path)
            .await?;
        self.files_written += 1;
        debug!("Downloaded file: {}", relative);
        Ok(())
    }

    async fn visit_folder(&mut self, relative: &str, _item: &RemoteItem) -> Result<()> {
        tokio::fs::create_dir_all(self.local_root.join(relative)).await?;
        Ok(())
    }
}
