//! sharepoint_drive CLI - Interact with a SharePoint document library.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sharepoint_drive::{
    ClientCredentials, Downloaded, ItemKind, ItemRecord, SharePointClient, SiteRef,
};

/// CLI tool for interacting with a SharePoint document library.
#[derive(Parser)]
#[command(name = "sharepoint_drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Azure AD tenant ID.
    #[arg(long, env = "TENANT_ID")]
    tenant_id: String,

    /// Application (client) ID of the app registration.
    #[arg(long, env = "CLIENT_ID")]
    client_id: String,

    /// Client secret of the app registration.
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Tenant name, host name or site URL (e.g. contoso, https://contoso.sharepoint.com/sites/team).
    #[arg(long, env = "SITE_NAME")]
    site: String,

    /// Server-relative site path (e.g. /sites/team); overrides the path of a site URL.
    #[arg(long, env = "SITE_PATH")]
    site_path: Option<String>,

    /// Document library name; the first library is used when it does not exist.
    #[arg(long, env = "DRIVE_NAME", default_value = "Documenten")]
    drive: String,

    /// Enable verbose debug logging (`RUST_LOG` takes precedence).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List items in a folder.
    List {
        /// Folder path (drive root when omitted).
        #[arg(default_value = "")]
        path: String,
    },

    /// Search items by name suffix.
    Search {
        /// Suffix to match (e.g. csv, .gdb).
        suffix: String,

        /// Folder to search in (drive root when omitted).
        #[arg(long, default_value = "")]
        path: String,

        /// Match folders instead of files.
        #[arg(long)]
        folders: bool,

        /// Search all subfolders.
        #[arg(long, short = 'r')]
        recursive: bool,
    },

    /// Upload files to a folder.
    Upload {
        /// File patterns to upload (supports glob patterns like *.csv, file_{1,2,3}.txt).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder path (drive root when omitted).
        #[arg(long, short = 't', default_value = "")]
        to: String,
    },

    /// Download a file or folder.
    Download {
        /// Path of the file or folder.
        path: String,

        /// Local destination (file path or directory).
        #[arg(long, short = 't')]
        to: Option<PathBuf>,
    },

    /// Delete a file or folder (folders are deleted with all contents).
    Delete {
        /// Path of the file or folder.
        path: String,
    },

    /// Move a file or folder into another folder.
    Move {
        /// Current path of the item.
        source: String,

        /// Destination folder path.
        destination: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let site_ref = SiteRef::parse(&cli.site)
        .with_context(|| format!("Invalid site: {}", cli.site))?;
    let site_path = cli.site_path.clone().unwrap_or(site_ref.site_path);

    let credentials = ClientCredentials::new(&cli.tenant_id, &cli.client_id, &cli.client_secret);
    let client = SharePointClient::connect(&credentials, &site_ref.host)
        .await
        .context("Failed to authenticate")?;

    let site = client
        .resolve_site(&site_path)
        .await
        .with_context(|| format!("Failed to resolve site: {}{}", site_ref.host, site_path))?;
    let drive = site
        .resolve_drive(&cli.drive)
        .await
        .with_context(|| format!("Failed to resolve drive: {}", cli.drive))?;

    match cli.command {
        Commands::List { path } => {
            let items = drive
                .list_children(&path)
                .await
                .with_context(|| format!("Failed to list folder: {:?}", path))?;
            let records: Vec<ItemRecord> = items.into_iter().map(|i| i.into_record()).collect();
            print_records(&records);
        }

        Commands::Search {
            suffix,
            path,
            folders,
            recursive,
        } => {
            let kind = if folders {
                ItemKind::Folder
            } else {
                ItemKind::File
            };
            let records = if recursive {
                drive.search_by_suffix_recursive(&path, &suffix, kind).await
            } else {
                drive.search_children_by_suffix(&path, &suffix, kind).await
            }
            .with_context(|| format!("Search for '{}' failed", suffix))?;
            print_records(&records);
        }

        Commands::Upload { patterns, to } => {
            let mut files_to_upload: Vec<PathBuf> = Vec::new();

            for pattern in &patterns {
                for expanded_pattern in expand_braces(pattern) {
                    let matches: Vec<PathBuf> = glob(&expanded_pattern)
                        .with_context(|| format!("Invalid glob pattern: {}", expanded_pattern))?
                        .filter_map(|r| r.ok())
                        .filter(|p| p.is_file())
                        .collect();

                    if matches.is_empty() {
                        let path = PathBuf::from(&expanded_pattern);
                        if path.is_file() {
                            files_to_upload.push(path);
                        } else {
                            warn!("No files matched pattern: {}", expanded_pattern);
                        }
                    } else {
                        files_to_upload.extend(matches);
                    }
                }
            }

            files_to_upload.sort();
            files_to_upload.dedup();

            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }

            println!("Uploading {} file(s) to {:?}...", files_to_upload.len(), to);

            let mut failures = 0;
            for (idx, file_path) in files_to_upload.iter().enumerate() {
                let filename = file_path.file_name().unwrap_or_default().to_string_lossy();
                print!("[{}/{}] Uploading {}... ", idx + 1, files_to_upload.len(), filename);

                match drive.upload_file(file_path, &to, None).await {
                    Ok(record) => println!("OK ({})", record.id),
                    Err(e) => {
                        failures += 1;
                        println!("FAILED");
                        eprintln!("  Error: {}", e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} upload(s) failed", failures, files_to_upload.len());
            }
            println!("Done.");
        }

        Commands::Download { path, to } => {
            if let Some(parent) = to.as_ref().and_then(|p| p.parent()) {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }

            let downloaded = drive
                .download_item(&path, to.as_deref())
                .await
                .with_context(|| format!("Failed to download: {}", path))?;

            match downloaded {
                Downloaded::Bytes(bytes) => {
                    let local = PathBuf::from(path.rsplit('/').next().unwrap_or(&path));
                    std::fs::write(&local, &bytes)
                        .with_context(|| format!("Failed to write {:?}", local))?;
                    println!("Saved to: {:?}", local);
                }
                Downloaded::File(local) | Downloaded::Folder(local) => {
                    println!("Saved to: {:?}", local);
                }
            }
        }

        Commands::Delete { path } => {
            drive
                .delete_item(&path)
                .await
                .with_context(|| format!("Failed to delete: {}", path))?;
            println!("Deleted {}", path);
        }

        Commands::Move {
            source,
            destination,
        } => {
            drive
                .move_item(&source, &destination)
                .await
                .with_context(|| format!("Failed to move {} to {}", source, destination))?;
            println!("Moved {} -> {}", source, destination);
        }
    }

    Ok(())
}

fn print_records(records: &[ItemRecord]) {
    if records.is_empty() {
        println!("No items found.");
        return;
    }

    println!("ID\tSIZE\tMODIFIED\tPATH");
    for record in records {
        println!("{}", record);
    }
}

/// Expand brace patterns like file_{1,2,3}.txt into multiple patterns.
fn expand_braces(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let alternatives = &pattern[start + 1..end];

            return alternatives
                .split(',')
                .flat_map(|alt| {
                    let expanded = format!("{}{}{}", prefix, alt.trim(), suffix);
                    expand_braces(&expanded)
                })
                .collect();
        }
    }

    vec![pattern.to_string()]
}
