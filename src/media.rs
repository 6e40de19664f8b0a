use std::path::Path;

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

pub const COVERS_ROUTE: &str = "/covers";
pub const MAX_COVER_BYTES: usize = 5 * 1024 * 1024;

fn is_remote(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();

    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

async fn download_cover(
    http_client: &reqwest::Client,
    covers_dir: &Path,
    url: &str,
) -> Result<String, anyhow::Error> {
    let mut response = http_client.get(url).send().await?.error_for_status()?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let extension = extension_for(&content_type)
        .with_context(|| format!("unsupported cover content type '{}'", content_type))?;

    if let Some(length) = response.content_length() {
        if length > MAX_COVER_BYTES as u64 {
            anyhow::bail!("cover is {} bytes, limit is {}", length, MAX_COVER_BYTES);
        }
    }

    // Content-Length may be missing or wrong, so count while reading.
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > MAX_COVER_BYTES {
            anyhow::bail!("cover exceeds {} bytes", MAX_COVER_BYTES);
        }
        bytes.extend_from_slice(&chunk);
    }

    tokio::fs::create_dir_all(covers_dir)
        .await
        .context("create covers directory")?;

    let file_name = format!("{}.{}", Uuid::new_v4(), extension);
    tokio::fs::write(covers_dir.join(&file_name), &bytes)
        .await
        .context("write cover file")?;

    Ok(format!("{}/{}", COVERS_ROUTE, file_name))
}

/// Mirrors a remote cover into `covers_dir` and returns its served path.
/// Anything that is not an http(s) URL, or fails to download, is returned unchanged.
#[tracing::instrument(name = "persist cover image", skip_all, fields(cover = %cover))]
pub async fn persist_cover_image(
    http_client: &reqwest::Client,
    covers_dir: &Path,
    cover: String,
) -> String {
    if !is_remote(&cover) {
        return cover;
    }

    match download_cover(http_client, covers_dir, &cover).await {
        Ok(stored) => stored,
        Err(error) => {
            tracing::warn!(err.msg = %error, "Keeping remote cover image");
            cover
        }
    }
}
