//! File commands.

use super::{CliResult, LocalVault};
use clap::Subcommand;
use datakeeper_core::{parse_id, UploadFileRequest, VaultError};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File subcommands.
#[derive(Debug, Subcommand)]
pub enum FileAction {
    /// Upload a local file
    Put {
        /// File to upload
        source: PathBuf,
        /// Name to store (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Format to store (defaults to the extension)
        #[arg(long)]
        format: Option<String>,
    },

    /// Download a file
    Get {
        /// Record id
        id: String,
        /// Where to write the file (defaults to its stored name)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete a file
    Rm {
        /// Record id
        id: String,
    },

    /// List files
    Ls,
}

/// Runs a file subcommand.
pub fn run(local: &LocalVault, action: FileAction) -> CliResult<Value> {
    let files = local.vault.files();
    let ctx = &local.ctx;
    let value = match action {
        FileAction::Put {
            source,
            name,
            format,
        } => {
            let bytes = fs::read(&source)?;
            let name = name.unwrap_or_else(|| file_name(&source));
            let format = format.unwrap_or_else(|| extension(&source));
            let id = files.upload(
                ctx,
                UploadFileRequest {
                    name,
                    format,
                    bytes,
                },
            )?;
            json!({ "id": id })
        }
        FileAction::Get { id, out } => {
            let file = files.download(ctx, parse_id(&id)?)?;
            let out = match out {
                Some(out) => out,
                None => safe_name(&file.name)?,
            };
            fs::write(&out, &file.bytes)?;
            info!(path = %out.display(), size = file.bytes.len(), "file written");
            json!({
                "name": file.name,
                "format": file.format,
                "size": file.bytes.len(),
                "path": out.display().to_string(),
            })
        }
        FileAction::Rm { id } => json!({ "id": files.delete(ctx, parse_id(&id)?)? }),
        FileAction::Ls => serde_json::to_value(files.list(ctx)?)?,
    };
    Ok(value)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Stored names are written into the working directory; refuse anything
// that would escape it.
fn safe_name(name: &str) -> CliResult<PathBuf> {
    let path = Path::new(name);
    match path.file_name() {
        Some(base) if base == path.as_os_str() => Ok(PathBuf::from(base)),
        _ => Err(VaultError::validation(format!(
            "stored name {name:?} is not a plain file name, use --out"
        ))
        .into()),
    }
}
