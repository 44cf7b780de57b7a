//! sharepoint_drive - A client for SharePoint document libraries over Microsoft Graph.
//!
//! This library provides functionality to:
//! - Authenticate as a service principal and resolve a site and drive
//! - List, search (optionally recursive) and delete items by path
//! - Upload files and download files or whole folder trees
//! - Move items between folders
//!
//! # Example
//!
//! ```no_run
//! use sharepoint_drive::{ClientCredentials, ItemKind, SharePointClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = ClientCredentials::from_env()?;
//!     let client = SharePointClient::connect(&credentials, "contoso").await?;
//!
//!     let site = client.resolve_site("/sites/team").await?;
//!     let drive = site.resolve_drive("Documents").await?;
//!
//!     for item in drive.search_by_suffix_recursive("", ".csv", ItemKind::File).await? {
//!         println!("{}", item);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod drive;
pub mod error;
pub mod models;
pub mod path_codec;
pub mod url_parser;
pub mod walk;

// Re-exports for convenience
pub use auth::{ClientCredentials, StaticToken, TokenProvider};
pub use client::{SharePointClient, Site};
pub use drive::{Downloaded, Drive};
pub use error::{DriveError, Result};
pub use models::{ItemKind, ItemRecord, RemoteItem};
pub use url_parser::SiteRef;
