//! Best-effort download of artifact URLs to a local directory.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use crate::common::errors::{StudioError, StudioResult};

/// Result of a download attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes written to this path.
    Saved(PathBuf),
    /// Fetch failed; the caller should open the URL directly.
    DirectLink(String),
}

/// Fetch `url` and write it to `dest_dir/filename`. Inline `data:` URLs are
/// decoded locally. `filename` must be a bare file name. Any failure falls
/// back to [`DownloadOutcome::DirectLink`].
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    filename: &str,
) -> DownloadOutcome {
    match fetch_and_write(client, url, dest_dir, filename).await {
        Ok(path) => {
            info!(path = %path.display(), "download saved");
            DownloadOutcome::Saved(path)
        }
        Err(err) => {
            warn!(%url, error = %err, "download failed, falling back to direct link");
            DownloadOutcome::DirectLink(url.to_string())
        }
    }
}

async fn fetch_and_write(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    filename: &str,
) -> StudioResult<PathBuf> {
    check_file_name(filename)?;
    let bytes = match decode_data_url(url) {
        Some(bytes) => bytes?,
        None => {
            let response = client.get(url).send().await?.error_for_status()?;
            response.bytes().await?.to_vec()
        }
    };
    tokio::fs::create_dir_all(dest_dir).await?;
    let path = dest_dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

fn check_file_name(filename: &str) -> StudioResult<()> {
    let bare = Path::new(filename).file_name().and_then(|name| name.to_str()) == Some(filename);
    if bare && !filename.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(StudioError::InvalidOperation(format!(
            "not a plain file name: {filename:?}"
        )))
    }
}

fn decode_data_url(url: &str) -> Option<StudioResult<Vec<u8>>> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(
        STANDARD
            .decode(payload)
            .map_err(|err| StudioError::InvalidOperation(format!("bad data url: {err}"))),
    )
}
