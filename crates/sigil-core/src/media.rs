//! Loading outgoing media from bytes, files or URLs.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::transport::{MediaKind, OutgoingMedia};

/// Where the bytes of an outgoing media message come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    /// An `http://` or `https://` address.
    Url(String),
}

impl MediaSource {
    /// Interprets `raw` as a URL when it has an HTTP scheme, else as a path.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw)
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }

    /// The base name of a path source.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Self::Bytes(_) | Self::Url(_) => None,
        }
    }

    /// Reads the media bytes.
    pub async fn read(self) -> ApiResult<Vec<u8>> {
        match self {
            Self::Bytes(data) => Ok(data),
            Self::Path(path) => read_file(&path).await,
            Self::Url(url) => fetch(&url).await,
        }
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for MediaSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for MediaSource {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for MediaSource {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

async fn read_file(path: &Path) -> ApiResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::media_unavailable(format!("{}: {e}", path.display())))
}

#[cfg(feature = "http-media")]
async fn fetch(url: &str) -> ApiResult<Vec<u8>> {
    debug!(url = %url, "Downloading media");
    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| ApiError::media_unavailable(format!("{url}: {e}")))?;
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::media_unavailable(format!("{url}: {e}")))?;
    Ok(body.to_vec())
}

#[cfg(not(feature = "http-media"))]
async fn fetch(url: &str) -> ApiResult<Vec<u8>> {
    Err(ApiError::media_unavailable(format!(
        "{url}: downloading media requires the `http-media` feature"
    )))
}

impl OutgoingMedia {
    /// Loads media from `source`.
    ///
    /// A path source also sets the file name to the path's base name.
    pub async fn load(kind: MediaKind, source: impl Into<MediaSource>) -> ApiResult<Self> {
        let source = source.into();
        let file_name = source.file_name();
        let data = source.read().await?;
        debug!(?kind, bytes = data.len(), "Loaded media");

        let media = Self::new(kind, data);
        Ok(match file_name {
            Some(name) => media.with_file_name(name),
            None => media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            MediaSource::parse("https://example.com/cat.png"),
            MediaSource::Url("https://example.com/cat.png".into())
        );
        assert_eq!(
            MediaSource::parse("media/cat.png"),
            MediaSource::Path(PathBuf::from("media/cat.png"))
        );
        assert_eq!(
            MediaSource::parse("media/cat.png").file_name().as_deref(),
            Some("cat.png")
        );
        assert_eq!(MediaSource::parse("http://x/y.png").file_name(), None);
    }

    #[tokio::test]
    async fn test_load_from_path_names_the_file() {
        let path = std::env::temp_dir().join(format!("sigil-media-{}.png", std::process::id()));
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nbody").unwrap();

        let media = OutgoingMedia::load(MediaKind::Image, path.as_path())
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(media.mimetype, "image/png");
        assert_eq!(
            media.file_name.as_deref(),
            path.file_name().and_then(|name| name.to_str())
        );
        assert_eq!(media.data.len(), 12);
    }

    #[tokio::test]
    async fn test_load_from_bytes_keeps_defaults() {
        let media = OutgoingMedia::load(MediaKind::Document, vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(media.file_name.as_deref(), Some("document"));
        assert_eq!(media.mimetype, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = OutgoingMedia::load(MediaKind::Video, "/nonexistent/sigil/clip.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MediaUnavailable(_)));
    }
}
