//! Reading image files into data URIs

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not an image ({mime})")]
    NotAnImage { path: PathBuf, mime: String },
}

/// Encode raw bytes as a `data:<mime>;base64,` URI
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Read an image file into a data URI, with the MIME type taken from its extension
pub async fn read_data_uri(path: impl AsRef<Path>) -> Result<String, ImageError> {
    let path = path.as_ref();
    debug!(?path, "read_data_uri: called");

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        debug!(%mime, "read_data_uri: not an image");
        return Err(ImageError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.to_string(),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(%mime, len = bytes.len(), "read_data_uri: read file");
    Ok(to_data_uri(mime.essence_str(), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_data_uri() {
        assert_eq!(to_data_uri("image/png", b"A"), "data:image/png;base64,QQ==");
    }

    #[tokio::test]
    async fn test_read_png() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shoe.png");
        std::fs::write(&path, b"A").unwrap();

        assert_eq!(read_data_uri(&path).await.unwrap(), "data:image/png;base64,QQ==");
    }

    #[tokio::test]
    async fn test_read_jpeg_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bag.JPG");
        std::fs::write(&path, b"foo").unwrap();

        assert_eq!(read_data_uri(&path).await.unwrap(), "data:image/jpeg;base64,Zm9v");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = read_data_uri("/nonexistent/athea/shoe.png").await.unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }

    #[tokio::test]
    async fn test_not_an_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = read_data_uri(&path).await.unwrap_err();
        assert!(matches!(err, ImageError::NotAnImage { .. }));
    }
}
