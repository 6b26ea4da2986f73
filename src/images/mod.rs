use std::path::PathBuf;

use crate::config;
use crate::error::ApiError;

/// Accepted image formats, as (content type, filename extension) pairs.
const ACCEPTED_TYPES: [(&str, &str); 3] = [
    ("image/png", "png"),
    ("image/jpeg", "jpeg"),
    ("image/gif", "gif"),
];

/// Map a request Content-Type to a filename extension. Parameters after a
/// semicolon are ignored.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    ACCEPTED_TYPES
        .iter()
        .find(|(ct, _)| *ct == media_type)
        .map(|(_, ext)| *ext)
}

/// Map a stored filename back to the Content-Type served on GET.
pub fn content_type_for_filename(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit('.').next().unwrap_or("");
    ACCEPTED_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| *ct)
}

fn image_path(filename: &str) -> PathBuf {
    PathBuf::from(&config::config().storage.image_dir).join(filename)
}

pub async fn load(filename: &str) -> Result<Vec<u8>, ApiError> {
    Ok(tokio::fs::read(image_path(filename)).await?)
}

pub async fn save(filename: &str, bytes: &[u8]) -> Result<(), ApiError> {
    let path = image_path(filename);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Best-effort removal; a missing file is not an error since the database
/// reference is authoritative.
pub async fn remove(filename: &str) {
    if let Err(e) = tokio::fs::remove_file(image_path(filename)).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove image file {}: {}", filename, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_png_jpeg_gif_only() {
        assert_eq!(extension_for_content_type("image/png"), Some("png"));
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpeg"));
        assert_eq!(extension_for_content_type("image/gif"), Some("gif"));
        assert_eq!(extension_for_content_type("image/webp"), None);
        assert_eq!(extension_for_content_type("text/plain"), None);
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            extension_for_content_type("image/png; charset=binary"),
            Some("png")
        );
    }

    #[test]
    fn filename_extension_round_trips() {
        assert_eq!(content_type_for_filename("user_4.png"), Some("image/png"));
        assert_eq!(content_type_for_filename("petition_9.gif"), Some("image/gif"));
        assert_eq!(content_type_for_filename("noextension"), None);
    }
}
